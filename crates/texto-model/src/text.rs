// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const DEFAULT_MAX_TEXT_BYTES: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    EmptyText,
    TextTooLong { len: usize, max: usize },
}

impl ValidationError {
    /// Stable machine-readable reason, used in API error details.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::EmptyText => "empty_text",
            Self::TextTooLong { .. } => "text_too_long",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => f.write_str("text must not be empty"),
            Self::TextTooLong { len, max } => {
                write!(f, "text is {len} bytes, exceeds max length {max}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Half-open range of character (Unicode scalar value) offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharSpan {
    pub start: usize,
    pub end: usize,
}

impl CharSpan {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A validated analysis input. The only way to build one is [`AnalysisRequest::parse`],
/// so holding one proves the text is non-empty and within the byte bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    text: String,
}

impl AnalysisRequest {
    /// Oversized input is rejected rather than truncated; the bound applies to
    /// the raw input as received.
    pub fn parse(input: &str, max_bytes: usize) -> Result<Self, ValidationError> {
        if input.len() > max_bytes {
            return Err(ValidationError::TextTooLong {
                len: input.len(),
                max: max_bytes,
            });
        }
        let cleaned = input.trim();
        if cleaned.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(Self {
            text: cleaned.to_string(),
        })
    }

    /// Cleaned text: leading and trailing whitespace removed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_outer_whitespace() {
        let req = AnalysisRequest::parse("  hola mundo \n", 64).expect("valid");
        assert_eq!(req.text(), "hola mundo");
    }

    #[test]
    fn parse_rejects_whitespace_only() {
        let err = AnalysisRequest::parse(" \t\n ", 64).expect_err("empty");
        assert_eq!(err, ValidationError::EmptyText);
        assert_eq!(err.reason(), "empty_text");
    }

    #[test]
    fn parse_rejects_oversized_input_by_bytes() {
        // "ñ" is two bytes: five of them exceed a nine byte bound.
        let err = AnalysisRequest::parse("ñññññ", 9).expect_err("too long");
        assert_eq!(err, ValidationError::TextTooLong { len: 10, max: 9 });
        assert!(err.to_string().contains("exceeds max length 9"));
    }

    #[test]
    fn span_overlap_is_half_open() {
        let a = CharSpan::new(0, 4);
        let b = CharSpan::new(4, 6);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&CharSpan::new(3, 5)));
        assert_eq!(b.len(), 2);
    }
}
