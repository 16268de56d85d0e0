// SPDX-License-Identifier: Apache-2.0

use crate::model::LanguageModel;
use crate::tagger::{is_acronym, is_capitalized};
use texto_model::{EntityLabel, PosTag};

const CONNECTORS: &[&str] = &["de", "del", "la", "las", "los"];
const MAX_ORG_ACRONYM_CHARS: usize = 5;

/// Entity over the token range `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TokenEntity {
    pub start: usize,
    pub end: usize,
    pub label: EntityLabel,
}

/// Finds entities left to right. Results are ordered and never overlap.
pub(crate) fn recognize(
    model: &LanguageModel,
    words: &[&str],
    lowered: &[String],
    tags: &[PosTag],
) -> Vec<TokenEntity> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < words.len() {
        if is_capitalized(words[i]) {
            if let Some((len, label)) = model.gazetteer().longest_match(lowered, i) {
                let last = i + len - 1;
                if len == 1 || is_capitalized(words[last]) {
                    out.push(TokenEntity {
                        start: i,
                        end: i + len,
                        label,
                    });
                    i += len;
                    continue;
                }
            }
        }
        if tags[i] == PosTag::Propn {
            let end = extend_run(model, lowered, tags, i);
            out.push(TokenEntity {
                start: i,
                end,
                label: classify(model, words, lowered, i, end),
            });
            i = end;
            continue;
        }
        i += 1;
    }
    out
}

/// End of a proper-noun run starting at `start`, bridging lowercase
/// connectors ("Universidad de Buenos Aires") and, inside organisation names,
/// "y" ("Ministerio de Ciencia y Tecnología").
fn extend_run(model: &LanguageModel, lowered: &[String], tags: &[PosTag], start: usize) -> usize {
    let n = tags.len();
    let mut end = start + 1;
    loop {
        if end < n && tags[end] == PosTag::Propn {
            end += 1;
            continue;
        }
        let has_org_cue = lowered[start..end].iter().any(|w| model.is_org_cue(w));
        let is_connector =
            |w: &str| CONNECTORS.contains(&w) || (has_org_cue && w == "y");
        let bridge = (end..n)
            .take_while(|&j| is_connector(&lowered[j]))
            .take(2)
            .count();
        if bridge > 0 && end + bridge < n && tags[end + bridge] == PosTag::Propn {
            end += bridge + 1;
            continue;
        }
        return end;
    }
}

fn classify(
    model: &LanguageModel,
    words: &[&str],
    lowered: &[String],
    start: usize,
    end: usize,
) -> EntityLabel {
    let run = &lowered[start..end];
    let previous = start.checked_sub(1).map(|p| lowered[p].as_str());

    if run.iter().any(|w| model.is_org_cue(w)) {
        return EntityLabel::Org;
    }
    if end - start == 1
        && is_acronym(words[start])
        && words[start].chars().count() <= MAX_ORG_ACRONYM_CHARS
    {
        return EntityLabel::Org;
    }
    if run.iter().any(|w| model.is_loc_head(w)) {
        return EntityLabel::Loc;
    }
    if model.is_first_name(&run[0]) || previous.is_some_and(|p| model.is_title(p)) {
        return EntityLabel::Per;
    }
    if previous.is_some_and(|p| model.is_loc_cue(p)) {
        return EntityLabel::Loc;
    }
    if end - start >= 2 && !run.iter().any(|w| CONNECTORS.contains(&w.as_str())) {
        return EntityLabel::Per;
    }
    EntityLabel::Misc
}
