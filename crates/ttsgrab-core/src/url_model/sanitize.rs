//! Voice-name sanitization for use as a directory and filename prefix.

use crate::names::DEFAULT_VOICE;

/// Sanitizes a voice name before it becomes part of a download path.
///
/// - Replaces `< > : " / \ | ? *` and control characters with `_`
/// - Replaces runs of two or more dots with `_` (no `..` traversal)
/// - Strips leading and trailing dots
/// - Limits length to `max_len` characters
///
/// Falls back to the default voice when nothing usable remains.
pub fn sanitize_voice_name(name: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(name.len());
    let mut dots = 0usize;

    for c in name.chars() {
        if c == '.' {
            dots += 1;
            continue;
        }
        flush_dots(&mut out, dots);
        dots = 0;
        let replacement = match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        };
        out.push(replacement);
    }
    flush_dots(&mut out, dots);

    let truncated: String = out.trim_matches('.').chars().take(max_len).collect();
    let trimmed = truncated.trim_matches('.');
    if trimmed.is_empty() {
        DEFAULT_VOICE.to_string()
    } else {
        trimmed.to_string()
    }
}

fn flush_dots(out: &mut String, dots: usize) {
    match dots {
        0 => {}
        1 => out.push('.'),
        _ => out.push('_'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_unchanged() {
        assert_eq!(sanitize_voice_name("dictor", 100), "dictor");
        assert_eq!(sanitize_voice_name("Анна-2", 100), "Анна-2");
        assert_eq!(sanitize_voice_name("v1.2", 100), "v1.2");
    }

    #[test]
    fn replaces_reserved_characters() {
        assert_eq!(sanitize_voice_name("a<b>c:d\"e", 100), "a_b_c_d_e");
        assert_eq!(sanitize_voice_name("a/b\\c|d?e*f", 100), "a_b_c_d_e_f");
        assert_eq!(sanitize_voice_name("a\x00b\x1fc", 100), "a_b_c");
    }

    #[test]
    fn blocks_traversal() {
        assert_eq!(sanitize_voice_name("../../etc", 100), "____etc");
        assert_eq!(sanitize_voice_name("a...b", 100), "a_b");
        assert!(!sanitize_voice_name("x/../y", 100).contains(".."));
    }

    #[test]
    fn strips_leading_and_trailing_dots() {
        assert_eq!(sanitize_voice_name(".hidden", 100), "hidden");
        assert_eq!(sanitize_voice_name("name.", 100), "name");
    }

    #[test]
    fn truncates_by_chars() {
        let long = "я".repeat(150);
        let s = sanitize_voice_name(&long, 100);
        assert_eq!(s.chars().count(), 100);
        // A dot exposed by truncation is trimmed too.
        assert_eq!(sanitize_voice_name("abc.def", 4), "abc");
    }

    #[test]
    fn empty_falls_back_to_default() {
        assert_eq!(sanitize_voice_name("", 100), "dictor");
        assert_eq!(sanitize_voice_name(".", 100), "dictor");
    }
}
