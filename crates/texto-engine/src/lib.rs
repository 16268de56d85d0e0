// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Spanish text analysis: tokenization, part-of-speech tagging,
//! lemmatization, named entities and personal-data redaction over an
//! embedded lexical model.

mod anonymizer;
mod engine;
mod engine_error;
mod lemmatizer;
mod limits;
mod model;
mod ner;
mod offsets;
mod recognizers;
mod tagger;
mod tokenizer;

pub use anonymizer::{anonymize, resolve_conflicts};
pub use engine::Engine;
pub use engine_error::{EngineError, EngineErrorCode};
pub use limits::AnalysisLimits;
pub use model::{LanguageModel, LexEntry, ModelSource, VerbClass};
pub use recognizers::{default_recognizers, pii_entity_type, PatternMatch, PatternRecognizer};
pub use tokenizer::{TokenSpan, Tokenizer};

pub const CRATE_NAME: &str = "texto-engine";

/// Model size the binary was built with.
#[cfg(not(feature = "model-lg"))]
pub const MODEL_VARIANT: &str = "md";
#[cfg(feature = "model-lg")]
pub const MODEL_VARIANT: &str = "lg";
