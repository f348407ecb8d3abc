//! URL modeling and filename derivation.
//!
//! Validates audio URLs against the domain allow-list, classifies clicked
//! links, and derives the on-disk `voice/NNNN_voice.mp3` path from a voice
//! name and sequence number.

mod link;
mod sanitize;
mod validate;

pub use link::LinkMatcher;
pub(crate) use link::looks_like_audio;
pub use sanitize::sanitize_voice_name;
pub use validate::{UrlPolicy, UrlRejection};

/// Relative destination for a download: `<voice>/<NNNN>_<voice>.mp3`.
///
/// `voice` must already be sanitized. Numbers above 9999 are written in full.
///
/// # Examples
///
/// - `compose_filename("dictor", 7)` → `"dictor/0007_dictor.mp3"`
pub fn compose_filename(voice: &str, number: u64) -> String {
    format!("{voice}/{number:04}_{voice}.mp3")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_four_digits() {
        assert_eq!(compose_filename("dictor", 1), "dictor/0001_dictor.mp3");
        assert_eq!(compose_filename("anna", 42), "anna/0042_anna.mp3");
        assert_eq!(compose_filename("anna", 12345), "anna/12345_anna.mp3");
    }
}
