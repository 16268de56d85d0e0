// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

const PREFIXES: &[char] = &[
    '¿', '¡', '(', '[', '{', '"', '«', '\'', '“', '‘', '—', '–', '$', '€', '£',
];
const SUFFIXES: &[char] = &[
    ',', ';', ':', '!', '?', ')', ']', '}', '"', '»', '\'', '”', '’', '…', '—', '–', '%', '€',
];
const INFIXES: &[char] = &[
    '/', ',', ';', '(', ')', '[', ']', '"', '«', '»', '!', '?', '¿', '¡', '…', '—', '–',
];

/// Byte range of one token in the tokenized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    #[must_use]
    pub fn as_str<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }
}

/// Rule-based Spanish segmenter: whitespace split, then prefix, suffix and
/// infix punctuation peeled into their own tokens. Abbreviations known to the
/// model, e-mail addresses, URLs and numbers are kept whole.
pub struct Tokenizer<'m> {
    abbreviations: &'m HashSet<String>,
}

impl<'m> Tokenizer<'m> {
    #[must_use]
    pub fn new(abbreviations: &'m HashSet<String>) -> Self {
        Self { abbreviations }
    }

    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<TokenSpan> {
        let mut out = Vec::new();
        let mut chunk_start = None;
        for (i, c) in text.char_indices() {
            if c.is_whitespace() {
                if let Some(start) = chunk_start.take() {
                    self.split_chunk(text, start, i, &mut out);
                }
            } else if chunk_start.is_none() {
                chunk_start = Some(i);
            }
        }
        if let Some(start) = chunk_start {
            self.split_chunk(text, start, text.len(), &mut out);
        }
        out
    }

    fn split_chunk(&self, text: &str, mut start: usize, mut end: usize, out: &mut Vec<TokenSpan>) {
        let mut suffixes = Vec::new();
        loop {
            let core = &text[start..end];
            if core.is_empty() || self.is_protected(core) {
                break;
            }
            if let Some(c) = core.chars().next().filter(|c| PREFIXES.contains(c)) {
                out.push(TokenSpan {
                    start,
                    end: start + c.len_utf8(),
                });
                start += c.len_utf8();
                continue;
            }
            match core.chars().next_back() {
                Some('.') => {
                    // A run of dots ("...") is one token.
                    let run = core.len() - core.trim_end_matches('.').len();
                    suffixes.push(TokenSpan {
                        start: end - run,
                        end,
                    });
                    end -= run;
                }
                Some(c) if SUFFIXES.contains(&c) => {
                    suffixes.push(TokenSpan {
                        start: end - c.len_utf8(),
                        end,
                    });
                    end -= c.len_utf8();
                }
                _ => break,
            }
        }
        if start < end {
            self.split_infixes(text, start, end, out);
        }
        out.extend(suffixes.into_iter().rev());
    }

    fn split_infixes(&self, text: &str, start: usize, end: usize, out: &mut Vec<TokenSpan>) {
        let core = &text[start..end];
        if self.is_protected(core) {
            out.push(TokenSpan { start, end });
            return;
        }
        let mut piece_start = start;
        for (offset, c) in core.char_indices() {
            if !INFIXES.contains(&c) {
                continue;
            }
            let at = start + offset;
            if piece_start < at {
                out.push(TokenSpan {
                    start: piece_start,
                    end: at,
                });
            }
            out.push(TokenSpan {
                start: at,
                end: at + c.len_utf8(),
            });
            piece_start = at + c.len_utf8();
        }
        if piece_start < end {
            out.push(TokenSpan {
                start: piece_start,
                end,
            });
        }
    }

    fn is_protected(&self, core: &str) -> bool {
        self.abbreviations.contains(&core.to_lowercase())
            || is_email(core)
            || is_url(core)
            || is_number(core)
    }
}

#[must_use]
pub fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && s.chars().next().is_some_and(char::is_alphanumeric)
        && s.chars().next_back().is_some_and(char::is_alphanumeric)
}

#[must_use]
pub fn is_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www."))
        && lower.len() > 7
        && s.chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '/')
}

/// Digits with internal `.`, `,` or `:` separators (`1.234,56`, `10:30`).
#[must_use]
pub fn is_number(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
        && s.chars().next_back().is_some_and(|c| c.is_ascii_digit())
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | ':'))
}
