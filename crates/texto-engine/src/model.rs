// SPDX-License-Identifier: Apache-2.0

use crate::engine_error::EngineError;
use crate::tokenizer::Tokenizer;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use texto_model::{EntityLabel, ModelInfo, PosTag};

const BASE_MODEL_JSON: &str = include_str!("../data/es_core_news_md.json");
#[cfg(feature = "model-lg")]
const LARGE_EXTENSION_JSON: &str = include_str!("../data/es_core_news_lg.ext.json");

/// Where the language model data comes from.
#[derive(Debug, Clone)]
pub enum ModelSource {
    /// The model compiled into the binary (the large variant under `model-lg`).
    Builtin,
    /// A serialized model file, e.g. read from disk.
    Json(Vec<u8>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelFile {
    name: String,
    version: String,
    lang: String,
    #[serde(default)]
    abbreviations: Vec<String>,
    #[serde(default)]
    titles: Vec<String>,
    #[serde(default)]
    stopwords: Vec<String>,
    #[serde(default)]
    lexicon: BTreeMap<String, (String, String)>,
    #[serde(default)]
    verb_classes: BTreeMap<String, String>,
    #[serde(default)]
    first_names: Vec<String>,
    #[serde(default)]
    gazetteer: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    org_cues: Vec<String>,
    #[serde(default)]
    loc_heads: Vec<String>,
    #[serde(default)]
    loc_cues: Vec<String>,
}

impl ModelFile {
    fn parse(bytes: &[u8]) -> Result<Self, EngineError> {
        serde_json::from_slice(bytes)
            .map_err(|e| EngineError::model_unavailable(format!("model data is malformed: {e}")))
    }

    /// Layers an extension file on top of this one. Identity fields and
    /// lexicon entries of the extension win.
    #[cfg_attr(not(feature = "model-lg"), allow(dead_code))]
    fn extend(&mut self, ext: Self) {
        self.name = ext.name;
        self.version = ext.version;
        self.lang = ext.lang;
        self.abbreviations.extend(ext.abbreviations);
        self.titles.extend(ext.titles);
        self.stopwords.extend(ext.stopwords);
        self.lexicon.extend(ext.lexicon);
        self.verb_classes.extend(ext.verb_classes);
        self.first_names.extend(ext.first_names);
        for (label, phrases) in ext.gazetteer {
            self.gazetteer.entry(label).or_default().extend(phrases);
        }
        self.org_cues.extend(ext.org_cues);
        self.loc_heads.extend(ext.loc_heads);
        self.loc_cues.extend(ext.loc_cues);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexEntry {
    pub pos: PosTag,
    pub lemma: String,
}

/// Conjugation class of a verb stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbClass {
    Ar,
    Er,
    Ir,
}

impl VerbClass {
    #[must_use]
    pub const fn infinitive_ending(self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::Er => "er",
            Self::Ir => "ir",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GazetteerEntry {
    tokens: Vec<String>,
    label: EntityLabel,
}

/// Known multi-word names, indexed by their first lowercased token.
#[derive(Debug, Default)]
pub(crate) struct Gazetteer {
    by_first: HashMap<String, Vec<GazetteerEntry>>,
}

impl Gazetteer {
    fn insert(&mut self, tokens: Vec<String>, label: EntityLabel) {
        let Some(first) = tokens.first().cloned() else {
            return;
        };
        let bucket = self.by_first.entry(first).or_default();
        if bucket.iter().any(|e| e.tokens == tokens) {
            return;
        }
        bucket.push(GazetteerEntry { tokens, label });
        bucket.sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));
    }

    /// Longest entry matching `lowered[at..]`, as (token count, label).
    pub(crate) fn longest_match(&self, lowered: &[String], at: usize) -> Option<(usize, EntityLabel)> {
        let bucket = self.by_first.get(lowered.get(at)?)?;
        bucket.iter().find_map(|entry| {
            let end = at + entry.tokens.len();
            (end <= lowered.len() && lowered[at..end] == entry.tokens[..])
                .then_some((entry.tokens.len(), entry.label))
        })
    }

    pub(crate) fn contains_single(&self, lowered: &str) -> bool {
        self.by_first
            .get(lowered)
            .is_some_and(|bucket| bucket.iter().any(|e| e.tokens.len() == 1))
    }

    fn len(&self) -> usize {
        self.by_first.values().map(Vec::len).sum()
    }
}

/// An immutable, validated Spanish language model.
#[derive(Debug)]
pub struct LanguageModel {
    info: ModelInfo,
    digest: String,
    abbreviations: HashSet<String>,
    titles: HashSet<String>,
    stopwords: HashSet<String>,
    lexicon: HashMap<String, LexEntry>,
    verb_classes: HashMap<String, VerbClass>,
    first_names: HashSet<String>,
    gazetteer: Gazetteer,
    org_cues: HashSet<String>,
    loc_heads: HashSet<String>,
    loc_cues: HashSet<String>,
}

fn lowered_set(items: Vec<String>) -> HashSet<String> {
    items.into_iter().map(|s| s.to_lowercase()).collect()
}

impl LanguageModel {
    pub fn load(source: &ModelSource) -> Result<Self, EngineError> {
        match source {
            ModelSource::Builtin => Self::builtin(),
            ModelSource::Json(bytes) => {
                let digest = sha256_hex(&[bytes.as_slice()]);
                Self::from_file(ModelFile::parse(bytes)?, digest)
            }
        }
    }

    #[cfg(not(feature = "model-lg"))]
    fn builtin() -> Result<Self, EngineError> {
        let file = ModelFile::parse(BASE_MODEL_JSON.as_bytes())?;
        Self::from_file(file, sha256_hex(&[BASE_MODEL_JSON.as_bytes()]))
    }

    #[cfg(feature = "model-lg")]
    fn builtin() -> Result<Self, EngineError> {
        let mut file = ModelFile::parse(BASE_MODEL_JSON.as_bytes())?;
        file.extend(ModelFile::parse(LARGE_EXTENSION_JSON.as_bytes())?);
        let digest = sha256_hex(&[
            BASE_MODEL_JSON.as_bytes(),
            LARGE_EXTENSION_JSON.as_bytes(),
        ]);
        Self::from_file(file, digest)
    }

    fn from_file(file: ModelFile, digest: String) -> Result<Self, EngineError> {
        if file.name.trim().is_empty() || file.lang.trim().is_empty() {
            return Err(EngineError::model_unavailable(
                "model name and lang must be non-empty",
            ));
        }
        if file.lexicon.is_empty() {
            return Err(EngineError::model_unavailable(format!(
                "model {} has an empty lexicon",
                file.name
            )));
        }

        let mut lexicon = HashMap::with_capacity(file.lexicon.len());
        for (form, (pos, lemma)) in file.lexicon {
            let pos = pos.parse::<PosTag>().map_err(|e| {
                EngineError::model_unavailable(format!("lexicon entry {form:?}: {e}"))
            })?;
            if lemma.is_empty() {
                return Err(EngineError::model_unavailable(format!(
                    "lexicon entry {form:?} has an empty lemma"
                )));
            }
            lexicon.insert(form.to_lowercase(), LexEntry { pos, lemma });
        }

        let mut verb_classes = HashMap::with_capacity(file.verb_classes.len());
        for (stem, class) in file.verb_classes {
            let class = match class.as_str() {
                "ar" => VerbClass::Ar,
                "er" => VerbClass::Er,
                "ir" => VerbClass::Ir,
                other => {
                    return Err(EngineError::model_unavailable(format!(
                        "verb class for stem {stem:?} must be ar, er or ir, got {other:?}"
                    )))
                }
            };
            verb_classes.insert(stem, class);
        }

        let abbreviations = lowered_set(file.abbreviations);
        let mut gazetteer = Gazetteer::default();
        {
            let tokenizer = Tokenizer::new(&abbreviations);
            for (label, phrases) in file.gazetteer {
                let label = label.parse::<EntityLabel>().map_err(|e| {
                    EngineError::model_unavailable(format!("gazetteer: {e}"))
                })?;
                for phrase in phrases {
                    let lowered = phrase.to_lowercase();
                    let tokens = tokenizer
                        .tokenize(&lowered)
                        .iter()
                        .map(|span| span.as_str(&lowered).to_string())
                        .collect();
                    gazetteer.insert(tokens, label);
                }
            }
        }

        let model = Self {
            info: ModelInfo {
                name: file.name,
                version: file.version,
                lang: file.lang,
            },
            digest,
            abbreviations,
            titles: lowered_set(file.titles),
            stopwords: lowered_set(file.stopwords),
            lexicon,
            verb_classes,
            first_names: lowered_set(file.first_names),
            gazetteer,
            org_cues: lowered_set(file.org_cues),
            loc_heads: lowered_set(file.loc_heads),
            loc_cues: lowered_set(file.loc_cues),
        };
        tracing::debug!(
            model = %model.info.name,
            version = %model.info.version,
            lexicon = model.lexicon.len(),
            gazetteer = model.gazetteer.len(),
            "language model loaded"
        );
        Ok(model)
    }

    #[must_use]
    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// SHA-256 of the model data, hex encoded.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    #[must_use]
    pub fn abbreviations(&self) -> &HashSet<String> {
        &self.abbreviations
    }

    #[must_use]
    pub fn lookup(&self, lowered: &str) -> Option<&LexEntry> {
        self.lexicon.get(lowered)
    }

    #[must_use]
    pub fn verb_class(&self, stem: &str) -> Option<VerbClass> {
        self.verb_classes.get(stem).copied()
    }

    #[must_use]
    pub fn is_stopword(&self, lowered: &str) -> bool {
        self.stopwords.contains(lowered)
    }

    #[must_use]
    pub fn is_title(&self, lowered: &str) -> bool {
        self.titles.contains(lowered)
    }

    #[must_use]
    pub fn is_first_name(&self, lowered: &str) -> bool {
        self.first_names.contains(lowered)
    }

    #[must_use]
    pub fn is_org_cue(&self, lowered: &str) -> bool {
        self.org_cues.contains(lowered)
    }

    #[must_use]
    pub fn is_loc_head(&self, lowered: &str) -> bool {
        self.loc_heads.contains(lowered)
    }

    #[must_use]
    pub fn is_loc_cue(&self, lowered: &str) -> bool {
        self.loc_cues.contains(lowered)
    }

    pub(crate) fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }
}

fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
