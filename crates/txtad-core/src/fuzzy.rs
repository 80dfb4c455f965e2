//! Case-insensitive fuzzy classification of a pattern against a text.

use std::fmt;

use strsim::levenshtein;

/// Minimum length ratio for two words to be compared by edit distance.
const LENGTH_RATIO: f64 = 0.8;

/// Distance ratio accepted for short texts (exclusive).
const SHORT_TEXT_RATIO: f64 = 0.2;

/// Distance ratio accepted for longer texts (inclusive).
const LONG_TEXT_RATIO: f64 = 0.3;

/// Texts up to this many characters use the stricter ratio.
const SHORT_TEXT_LEN: usize = 4;

/// How a pattern matched a text. The discriminants are part of the
/// expression language (`{direct}` evaluates to `1`, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FuzzyMatch {
    /// No similarity.
    NoMatch = 0,
    /// Equal ignoring case.
    Direct = 1,
    /// The text starts with the pattern.
    StartsWith = 2,
    /// The text contains the pattern.
    Contains = 3,
    /// Small edit distance.
    Fuzzy = 4,
}

impl FuzzyMatch {
    /// Ordinal code used by the expression language.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for FuzzyMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Classify `pattern` against `text`, ignoring case.
///
/// Exact, prefix and substring checks come first. Otherwise the words are
/// compared by Levenshtein distance relative to the pattern length, with a
/// stricter threshold for texts of four characters or fewer. An empty
/// pattern is a prefix of every text, so it never reaches the ratio.
pub fn classify(pattern: &str, text: &str) -> FuzzyMatch {
    let pattern = pattern.to_lowercase();
    let text = text.to_lowercase();
    let pattern_len = pattern.chars().count();
    let text_len = text.chars().count();

    if pattern_len <= text_len {
        if text.starts_with(&pattern) {
            return if pattern_len == text_len {
                FuzzyMatch::Direct
            } else {
                FuzzyMatch::StartsWith
            };
        }
        if text.contains(&pattern) {
            return FuzzyMatch::Contains;
        }
    }

    let shorter = pattern_len.min(text_len) as f64;
    let longer = pattern_len.max(text_len) as f64;
    if longer == 0.0 || shorter / longer < LENGTH_RATIO {
        return FuzzyMatch::NoMatch;
    }

    let ratio = levenshtein(&text, &pattern) as f64 / pattern_len as f64;
    let close = if text_len <= SHORT_TEXT_LEN {
        ratio < SHORT_TEXT_RATIO
    } else {
        ratio <= LONG_TEXT_RATIO
    };
    if close {
        FuzzyMatch::Fuzzy
    } else {
        FuzzyMatch::NoMatch
    }
}
