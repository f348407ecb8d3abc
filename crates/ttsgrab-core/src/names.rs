//! Voice names: built-ins and validation of user-added custom names.

/// Fallback voice for tabs that never picked one.
pub const DEFAULT_VOICE: &str = "dictor";

/// Names that always exist and cannot be removed.
pub const BUILTIN_VOICES: [&str; 2] = ["dictor", "doctor"];

/// Maximum length of a custom name, in characters.
pub const MAX_CUSTOM_NAME_LEN: usize = 50;

/// Device names Windows refuses as file or directory names.
const RESERVED_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name cannot be empty")]
    Empty,
    #[error("name is too long (max 50 characters)")]
    TooLong,
    #[error("use only letters, digits, _ and -")]
    InvalidChars,
    #[error("\"{0}\" is reserved by the system")]
    Reserved(String),
    #[error("name \"{0}\" already exists")]
    Duplicate(String),
    #[error("built-in names cannot be removed")]
    Builtin,
    #[error("name \"{0}\" is not in the list")]
    NotFound(String),
}

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_VOICES.contains(&name)
}

pub fn is_reserved_device_name(name: &str) -> bool {
    let upper = name.to_uppercase();
    RESERVED_DEVICE_NAMES.contains(&upper.as_str())
}

/// Latin and Cyrillic letters, ASCII digits, `_` and `-`.
fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || ('а'..='я').contains(&c) || ('А'..='Я').contains(&c)
}

/// Validates a candidate custom name against the existing custom list.
///
/// Returns the trimmed name on success.
pub fn validate_custom_name(candidate: &str, existing: &[String]) -> Result<String, NameError> {
    let name = candidate.trim();
    let len = name.chars().count();
    if len > MAX_CUSTOM_NAME_LEN {
        return Err(NameError::TooLong);
    }
    if len == 0 {
        return Err(NameError::Empty);
    }
    if !name.chars().all(is_allowed_char) {
        return Err(NameError::InvalidChars);
    }
    if is_reserved_device_name(name) {
        return Err(NameError::Reserved(name.to_string()));
    }
    if is_builtin(name) || existing.iter().any(|n| n == name) {
        return Err(NameError::Duplicate(name.to_string()));
    }
    Ok(name.to_string())
}

/// Checks that `name` may be removed from `existing`.
pub fn check_removable(name: &str, existing: &[String]) -> Result<(), NameError> {
    if is_builtin(name) {
        return Err(NameError::Builtin);
    }
    if !existing.iter().any(|n| n == name) {
        return Err(NameError::NotFound(name.to_string()));
    }
    Ok(())
}

/// All selectable voices: built-ins first, then custom names in insertion order.
pub fn all_voices(custom: &[String]) -> Vec<String> {
    BUILTIN_VOICES
        .iter()
        .map(|s| s.to_string())
        .chain(custom.iter().cloned())
        .collect()
}
