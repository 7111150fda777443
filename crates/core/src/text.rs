//! Text normalization shared by the keyword scanners.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lower-case and strip diacritics (`Café Crème` becomes `cafe creme`).
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Join the two free-text reservation fields for scanning.
pub fn combine(special_request_text: &str, dietary_preferences: &str) -> String {
    format!("{}\n{}", special_request_text, dietary_preferences)
}
