//! Accent- and case-insensitive comparison keys
//!
//! Only used for matching; stored names are never rewritten.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, decompose (NFD) and drop combining marks.
///
/// Total over all input and idempotent: `"Réunion"` and `"reunion"` both
/// map to `"reunion"`, the empty string maps to itself.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}
