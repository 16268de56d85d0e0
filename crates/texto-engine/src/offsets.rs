// SPDX-License-Identifier: Apache-2.0

use texto_model::CharSpan;

/// Byte <-> character offset translation for one text.
pub(crate) struct CharIndex {
    /// Byte offset of each char, plus a trailing entry for `text.len()`.
    char_starts: Vec<usize>,
}

impl CharIndex {
    #[must_use]
    pub(crate) fn new(text: &str) -> Self {
        let mut char_starts: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_starts.push(text.len());
        Self { char_starts }
    }

    /// `byte` must lie on a char boundary.
    #[must_use]
    pub(crate) fn to_char(&self, byte: usize) -> usize {
        self.char_starts
            .binary_search(&byte)
            .unwrap_or_else(|insert_at| insert_at)
    }

    #[must_use]
    pub(crate) fn span(&self, byte_start: usize, byte_end: usize) -> CharSpan {
        CharSpan::new(self.to_char(byte_start), self.to_char(byte_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_multibyte_offsets() {
        let text = "año ñu";
        let index = CharIndex::new(text);
        // "ñu" starts at byte 5, char 4.
        assert_eq!(index.to_char(5), 4);
        assert_eq!(index.span(0, 4), CharSpan::new(0, 3));
        assert_eq!(index.to_char(text.len()), 6);
    }
}
