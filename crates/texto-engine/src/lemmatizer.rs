// SPDX-License-Identifier: Apache-2.0

use crate::model::{LanguageModel, VerbClass};
use texto_model::PosTag;

/// Which infinitive an inflectional ending points back to.
#[derive(Debug, Clone, Copy)]
enum Target {
    Ar,
    Er,
    Ir,
    /// Shared by -er and -ir verbs; the stem table decides, -er otherwise.
    ErIr,
    /// Shared by all classes; the stem table decides, -ar otherwise.
    Any,
}

const VERB_ENDINGS: &[(&str, Target)] = &[
    // gerund, participle
    ("ando", Target::Ar),
    ("iendo", Target::ErIr),
    ("yendo", Target::ErIr),
    ("ado", Target::Ar),
    ("ada", Target::Ar),
    ("ados", Target::Ar),
    ("adas", Target::Ar),
    ("ido", Target::ErIr),
    ("ida", Target::ErIr),
    ("idos", Target::ErIr),
    ("idas", Target::ErIr),
    // present
    ("o", Target::Any),
    ("as", Target::Ar),
    ("a", Target::Ar),
    ("amos", Target::Ar),
    ("áis", Target::Ar),
    ("an", Target::Ar),
    ("es", Target::ErIr),
    ("e", Target::ErIr),
    ("emos", Target::Er),
    ("éis", Target::Er),
    ("en", Target::ErIr),
    ("imos", Target::Ir),
    ("ís", Target::Ir),
    // preterite
    ("é", Target::Ar),
    ("aste", Target::Ar),
    ("ó", Target::Ar),
    ("asteis", Target::Ar),
    ("aron", Target::Ar),
    ("í", Target::ErIr),
    ("iste", Target::ErIr),
    ("ió", Target::ErIr),
    ("isteis", Target::ErIr),
    ("ieron", Target::ErIr),
    // imperfect
    ("aba", Target::Ar),
    ("abas", Target::Ar),
    ("ábamos", Target::Ar),
    ("abais", Target::Ar),
    ("aban", Target::Ar),
    ("ía", Target::ErIr),
    ("ías", Target::ErIr),
    ("íamos", Target::ErIr),
    ("íais", Target::ErIr),
    ("ían", Target::ErIr),
    // future and conditional keep the infinitive as stem
    ("aré", Target::Ar),
    ("arás", Target::Ar),
    ("ará", Target::Ar),
    ("aremos", Target::Ar),
    ("arán", Target::Ar),
    ("aría", Target::Ar),
    ("arían", Target::Ar),
    ("eré", Target::Er),
    ("erás", Target::Er),
    ("erá", Target::Er),
    ("eremos", Target::Er),
    ("erán", Target::Er),
    ("ería", Target::Er),
    ("erían", Target::Er),
    ("iré", Target::Ir),
    ("irás", Target::Ir),
    ("irá", Target::Ir),
    ("iremos", Target::Ir),
    ("irán", Target::Ir),
    ("iría", Target::Ir),
    ("irían", Target::Ir),
];

const MIN_STEM_CHARS: usize = 2;

/// Lemma for one token given its assigned tag.
pub(crate) fn lemmatize(model: &LanguageModel, word: &str, pos: PosTag) -> String {
    let lowered = word.to_lowercase();
    if let Some(entry) = model.lookup(&lowered).filter(|e| e.pos == pos) {
        return entry.lemma.clone();
    }
    match pos {
        PosTag::Propn | PosTag::Punct | PosTag::Sym | PosTag::Num | PosTag::X => word.to_string(),
        PosTag::Verb | PosTag::Aux => verb_lemma(model, &lowered),
        PosTag::Noun => singularize(&lowered),
        PosTag::Adj => masculinize(&singularize(&lowered)),
        _ => lowered,
    }
}

fn verb_lemma(model: &LanguageModel, lowered: &str) -> String {
    if ["ar", "er", "ir"].iter().any(|inf| lowered.ends_with(inf)) {
        return lowered.to_string();
    }
    let best = VERB_ENDINGS
        .iter()
        .filter_map(|(ending, target)| {
            let stem = lowered.strip_suffix(ending)?;
            (stem.chars().count() >= MIN_STEM_CHARS).then_some((ending.len(), stem, *target))
        })
        .max_by_key(|(len, _, _)| *len);
    let Some((_, stem, target)) = best else {
        return lowered.to_string();
    };
    let class = match target {
        Target::Ar => VerbClass::Ar,
        Target::Er => VerbClass::Er,
        Target::Ir => VerbClass::Ir,
        Target::ErIr => match model.verb_class(stem) {
            Some(VerbClass::Ir) => VerbClass::Ir,
            _ => VerbClass::Er,
        },
        Target::Any => model.verb_class(stem).unwrap_or(VerbClass::Ar),
    };
    format!("{stem}{}", class.infinitive_ending())
}

fn singularize(lowered: &str) -> String {
    if lowered.chars().count() < 4 {
        return lowered.to_string();
    }
    if let Some(stem) = lowered.strip_suffix("ces") {
        return format!("{stem}z");
    }
    if let Some(stem) = lowered.strip_suffix("iones") {
        return format!("{stem}ión");
    }
    if let Some(stem) = lowered.strip_suffix("es") {
        if stem.chars().next_back().is_some_and(|c| "lrndjy".contains(c)) {
            return stem.to_string();
        }
    }
    if let Some(stem) = lowered.strip_suffix('s') {
        if stem.chars().next_back().is_some_and(|c| "aeiou".contains(c)) {
            return stem.to_string();
        }
    }
    lowered.to_string()
}

fn masculinize(singular: &str) -> String {
    if singular.ends_with("ista") {
        return singular.to_string();
    }
    let mut chars = singular.chars().rev();
    match (chars.next(), chars.next()) {
        (Some('a'), Some(c)) if "dtcgjñvbpmir".contains(c) => {
            format!("{}o", &singular[..singular.len() - 1])
        }
        _ => singular.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelSource;

    fn model() -> LanguageModel {
        LanguageModel::load(&ModelSource::Builtin).expect("builtin model")
    }

    #[test]
    fn lexicon_lemma_wins_when_tags_agree() {
        let model = model();
        assert_eq!(lemmatize(&model, "El", PosTag::Det), "el");
        assert_eq!(lemmatize(&model, "corre", PosTag::Verb), "correr");
        assert_eq!(lemmatize(&model, "niños", PosTag::Noun), "niño");
    }

    #[test]
    fn inflection_rules_recover_infinitives() {
        let model = model();
        assert_eq!(lemmatize(&model, "caminaban", PosTag::Verb), "caminar");
        assert_eq!(lemmatize(&model, "vivimos", PosTag::Verb), "vivir");
        assert_eq!(lemmatize(&model, "escribió", PosTag::Verb), "escribir");
        assert_eq!(lemmatize(&model, "bebiendo", PosTag::Verb), "beber");
        assert_eq!(lemmatize(&model, "cantará", PosTag::Verb), "cantar");
        assert_eq!(lemmatize(&model, "nadar", PosTag::Verb), "nadar");
    }

    #[test]
    fn nominal_rules_singularize_and_masculinize() {
        let model = model();
        assert_eq!(lemmatize(&model, "lápices", PosTag::Noun), "lápiz");
        assert_eq!(lemmatize(&model, "canciones", PosTag::Noun), "canción");
        assert_eq!(lemmatize(&model, "papeles", PosTag::Noun), "papel");
        assert_eq!(lemmatize(&model, "mesas", PosTag::Noun), "mesa");
        assert_eq!(lemmatize(&model, "bonitas", PosTag::Adj), "bonito");
        assert_eq!(lemmatize(&model, "optimista", PosTag::Adj), "optimista");
    }

    #[test]
    fn proper_nouns_keep_their_surface_form() {
        assert_eq!(lemmatize(&model(), "Madrid", PosTag::Propn), "Madrid");
    }
}
