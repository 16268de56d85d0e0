// SPDX-License-Identifier: Apache-2.0

use crate::recognizers::PatternMatch;
use std::cmp::Ordering;

fn priority(a: &PatternMatch, b: &PatternMatch) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| (b.end - b.start).cmp(&(a.end - a.start)))
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.entity_type.cmp(b.entity_type))
}

/// Keeps a non-overlapping subset of `candidates`: higher score first, then
/// longer span, then earlier start. The result is ordered by start offset.
#[must_use]
pub fn resolve_conflicts(mut candidates: Vec<PatternMatch>) -> Vec<PatternMatch> {
    candidates.sort_by(priority);
    let mut kept: Vec<PatternMatch> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if kept
            .iter()
            .all(|k| candidate.end <= k.start || k.end <= candidate.start)
        {
            kept.push(candidate);
        }
    }
    kept.sort_by_key(|m| m.start);
    kept
}

/// Replaces each match with `<ENTITY_TYPE>`. `matches` must be ordered and
/// non-overlapping, as returned by [`resolve_conflicts`].
#[must_use]
pub fn anonymize(text: &str, matches: &[PatternMatch]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for m in matches {
        out.push_str(&text[cursor..m.start]);
        out.push('<');
        out.push_str(m.entity_type);
        out.push('>');
        cursor = m.end;
    }
    out.push_str(&text[cursor..]);
    out
}
