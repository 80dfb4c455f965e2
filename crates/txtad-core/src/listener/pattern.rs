use regex::Regex;

use crate::error::{EngineError, EngineResult};

/// An anchored event pattern.
///
/// A `*` is a literal star unless it follows `.`, `)`, `]` or a backslash,
/// so commands such as `#ctx remove *rooms` can be written without escaping.
#[derive(Debug, Clone)]
pub struct EventPattern {
    source: String,
    regex: Regex,
}

impl EventPattern {
    /// Compile `pattern` as a full-string match.
    pub fn new(pattern: &str) -> EngineResult<Self> {
        let anchored = format!("^(?:{})$", escape_stars(pattern));
        let regex = Regex::new(&anchored).map_err(|source| EngineError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `input` matches the whole pattern.
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// On a match, the first capture group (empty if there is none).
    pub fn capture(&self, input: &str) -> Option<String> {
        let caps = self.regex.captures(input)?;
        Some(caps.get(1).map_or_else(String::new, |m| m.as_str().to_string()))
    }

    /// Number of capture groups.
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }
}

fn escape_stars(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut prev = None;
    for c in pattern.chars() {
        if c == '*' && !matches!(prev, Some('.' | ')' | ']' | '\\')) {
            out.push_str("\\*");
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_match_only() {
        let pattern = EventPattern::new("go (.*)").unwrap();
        assert_eq!(pattern.capture("go west").as_deref(), Some("west"));
        assert!(pattern.capture("please go west").is_none());
        assert_eq!(pattern.group_count(), 1);
    }

    #[test]
    fn no_group_captures_empty() {
        let pattern = EventPattern::new("look").unwrap();
        assert_eq!(pattern.capture("look").as_deref(), Some(""));
        assert_eq!(pattern.group_count(), 0);
    }

    #[test]
    fn bare_star_is_literal() {
        let pattern = EventPattern::new("#ctx replace *rooms -> (.*)").unwrap();
        assert_eq!(
            pattern.capture("#ctx replace *rooms -> rooms/hall").as_deref(),
            Some("rooms/hall")
        );
        assert!(!pattern.is_match("#ctx replace rooms -> rooms/hall"));
        assert!(EventPattern::new("#lst* atts (.*)").unwrap().is_match("#lst* atts player"));
        assert!(EventPattern::new("(ab)*").unwrap().is_match("abab"));
        assert!(EventPattern::new("[ab]*").unwrap().is_match("abba"));
        assert!(EventPattern::new(r"a\*b").unwrap().is_match("a*b"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        assert!(matches!(
            EventPattern::new("(unclosed"),
            Err(EngineError::InvalidPattern { .. })
        ));
    }
}
