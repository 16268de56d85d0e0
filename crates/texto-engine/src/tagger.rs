// SPDX-License-Identifier: Apache-2.0

use crate::model::LanguageModel;
use crate::tokenizer::{is_email, is_number, is_url};
use texto_model::PosTag;

const SENTENCE_ENDERS: &[&str] = &[".", "!", "?", "…"];
const OPENERS: &[&str] = &["¿", "¡", "(", "[", "«", "\"", "“", "'", "‘", "—", "–"];
const SYMBOLS: &[char] = &[
    '$', '€', '£', '%', '+', '=', '<', '>', '#', '&', '*', '@', '^', '~', '|', '\\', '°',
];

const ADJ_AFTER_NOUN: &[&str] = &[
    "oso", "osa", "osos", "osas", "ble", "bles", "ico", "ica", "icos", "icas", "al", "ales",
    "ivo", "iva", "ivos", "ivas", "ente", "entes", "ante", "antes", "ario", "aria",
];
const FINITE_VERB: &[&str] = &[
    "aba", "abas", "ábamos", "aban", "ía", "ías", "íamos", "ían", "ió", "aron", "ieron", "aste",
    "iste", "aré", "ará", "arán", "eré", "erá", "erán", "iré", "irá", "irán", "aría", "ería",
    "iría", "amos", "emos", "imos",
];
const PARTICIPLE: &[&str] = &[
    "ado", "ada", "ados", "adas", "ido", "ida", "idos", "idas",
];

pub(crate) fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

pub(crate) fn is_acronym(word: &str) -> bool {
    let letters = word.chars().filter(|c| c.is_alphabetic()).count();
    letters >= 2 && word.chars().all(|c| c.is_uppercase() || c == '.' || c == '&')
}

fn is_punctuation(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| !c.is_alphanumeric())
}

fn is_sentence_end(word: &str) -> bool {
    SENTENCE_ENDERS.contains(&word) || word.starts_with("..")
}

/// Assigns one UPOS tag per token. `words` are token surface forms in order.
pub(crate) fn tag(model: &LanguageModel, words: &[&str]) -> Vec<PosTag> {
    let mut tags: Vec<PosTag> = Vec::with_capacity(words.len());
    let mut sentence_initial = true;
    for (i, word) in words.iter().copied().enumerate() {
        let prev = i.checked_sub(1).map(|p| tags[p]);
        let tag = tag_one(model, word, prev, sentence_initial);
        tags.push(tag);
        sentence_initial = if is_sentence_end(word) {
            true
        } else if OPENERS.contains(&word) {
            sentence_initial
        } else {
            false
        };
    }
    tags
}

fn tag_one(
    model: &LanguageModel,
    word: &str,
    prev: Option<PosTag>,
    sentence_initial: bool,
) -> PosTag {
    if is_punctuation(word) {
        return if word.chars().any(|c| SYMBOLS.contains(&c)) {
            PosTag::Sym
        } else {
            PosTag::Punct
        };
    }
    if is_number(word) {
        return PosTag::Num;
    }
    if is_email(word) || is_url(word) {
        return PosTag::X;
    }

    let lowered = word.to_lowercase();
    let entry = model.lookup(&lowered);

    if is_capitalized(word) {
        if model.is_title(&lowered) {
            return entry.map_or(PosTag::Noun, |e| e.pos);
        }
        if model.is_first_name(&lowered) || model.gazetteer().contains_single(&lowered) {
            return PosTag::Propn;
        }
        if is_acronym(word) {
            return entry
                .filter(|e| e.pos == PosTag::Noun)
                .map_or(PosTag::Propn, |e| e.pos);
        }
        if !sentence_initial && entry.map_or(true, |e| !e.pos.is_closed_class()) {
            return PosTag::Propn;
        }
    }

    if let Some(entry) = entry {
        return entry.pos;
    }
    guess_open_class(&lowered, prev)
}

/// Suffix and context heuristics for words the lexicon does not know.
fn guess_open_class(lowered: &str, prev: Option<PosTag>) -> PosTag {
    let chars = lowered.chars().count();
    let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|s| lowered.ends_with(s));

    if lowered.ends_with("mente") && chars > 6 {
        return PosTag::Adv;
    }
    if prev == Some(PosTag::Det) {
        return PosTag::Noun;
    }
    if ends_with_any(&["ando", "iendo", "yendo"]) {
        return PosTag::Verb;
    }
    if ends_with_any(&["ar", "er", "ir"]) && chars > 3 {
        return PosTag::Verb;
    }
    if ends_with_any(PARTICIPLE) {
        return if prev == Some(PosTag::Aux) {
            PosTag::Verb
        } else {
            PosTag::Adj
        };
    }
    let after_nominal = matches!(prev, Some(PosTag::Noun | PosTag::Propn));
    if after_nominal && ends_with_any(ADJ_AFTER_NOUN) {
        return PosTag::Adj;
    }
    if ends_with_any(FINITE_VERB) {
        return PosTag::Verb;
    }
    if matches!(prev, Some(PosTag::Noun | PosTag::Propn | PosTag::Pron))
        && ends_with_any(&["a", "e", "an", "en"])
    {
        return PosTag::Verb;
    }
    PosTag::Noun
}
