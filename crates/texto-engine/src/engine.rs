// SPDX-License-Identifier: Apache-2.0

use crate::anonymizer::{anonymize, resolve_conflicts};
use crate::engine_error::EngineError;
use crate::lemmatizer::lemmatize;
use crate::limits::AnalysisLimits;
use crate::model::{LanguageModel, ModelSource};
use crate::ner::{self, TokenEntity};
use crate::offsets::CharIndex;
use crate::recognizers::{
    default_recognizers, pii_entity_type, PatternMatch, PatternRecognizer, NER_RECOGNIZER,
    NER_SCORE,
};
use crate::tagger;
use crate::tokenizer::{TokenSpan, Tokenizer};
use std::collections::BTreeSet;
use texto_model::{
    AnalysisRequest, AnalysisResponse, AnnotatedToken, NamedEntity, PiiFinding, PosTag,
    RedactionReport, ValidationError,
};

/// The loaded analysis pipeline. Immutable once built; share it behind an `Arc`.
#[derive(Debug)]
pub struct Engine {
    model: LanguageModel,
    recognizers: Vec<PatternRecognizer>,
    limits: AnalysisLimits,
}

/// Intermediate per-call annotation state; never outlives one call.
struct Annotated<'t> {
    spans: Vec<TokenSpan>,
    words: Vec<&'t str>,
    lowered: Vec<String>,
    tags: Vec<PosTag>,
    entities: Vec<TokenEntity>,
}

impl Engine {
    pub fn load(source: &ModelSource, limits: AnalysisLimits) -> Result<Self, EngineError> {
        let model = LanguageModel::load(source)?;
        let recognizers = default_recognizers()
            .map_err(|e| EngineError::internal(format!("PII pattern failed to compile: {e}")))?;
        tracing::debug!(
            model = %model.info().name,
            recognizers = recognizers.len(),
            max_text_bytes = limits.max_text_bytes,
            "engine ready"
        );
        Ok(Self {
            model,
            recognizers,
            limits,
        })
    }

    pub fn builtin() -> Result<Self, EngineError> {
        Self::load(&ModelSource::Builtin, AnalysisLimits::default())
    }

    #[must_use]
    pub fn model(&self) -> &LanguageModel {
        &self.model
    }

    #[must_use]
    pub fn limits(&self) -> &AnalysisLimits {
        &self.limits
    }

    fn check_limits(&self, text: &str) -> Result<(), EngineError> {
        if text.len() > self.limits.max_text_bytes {
            return Err(ValidationError::TextTooLong {
                len: text.len(),
                max: self.limits.max_text_bytes,
            }
            .into());
        }
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText.into());
        }
        Ok(())
    }

    fn annotate<'t>(&self, text: &'t str) -> Annotated<'t> {
        let spans = Tokenizer::new(self.model.abbreviations()).tokenize(text);
        let words: Vec<&str> = spans.iter().map(|s| s.as_str(text)).collect();
        let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        let tags = tagger::tag(&self.model, &words);
        let entities = ner::recognize(&self.model, &words, &lowered, &tags);
        Annotated {
            spans,
            words,
            lowered,
            tags,
            entities,
        }
    }

    /// Tokens, lemmas, tags, stop-word flags and named entities for the
    /// request's cleaned text. Offsets are character offsets into that text.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, EngineError> {
        let text = request.text();
        self.check_limits(text)?;
        let annotated = self.annotate(text);
        let index = CharIndex::new(text);

        let mut tokens = Vec::with_capacity(annotated.spans.len());
        for (i, span) in annotated.spans.iter().enumerate() {
            let next_start = annotated.spans.get(i + 1).map_or(text.len(), |n| n.start);
            let whitespace = &text[span.end..next_start];
            if !whitespace.chars().all(char::is_whitespace) {
                return Err(EngineError::internal(format!(
                    "tokenizer skipped text at byte {}",
                    span.end
                )));
            }
            let pos = annotated.tags[i];
            tokens.push(AnnotatedToken {
                surface_form: annotated.words[i].to_string(),
                lemma: lemmatize(&self.model, annotated.words[i], pos),
                part_of_speech: pos,
                is_stopword: self.model.is_stopword(&annotated.lowered[i]),
                character_offset: index.span(span.start, span.end),
                whitespace: whitespace.to_string(),
            });
        }
        if annotated.spans.first().map(|s| s.start) != Some(0) {
            return Err(EngineError::internal("tokens do not start at the text start"));
        }

        let entities = annotated
            .entities
            .iter()
            .map(|e| {
                let start = annotated.spans[e.start].start;
                let end = annotated.spans[e.end - 1].end;
                NamedEntity {
                    text_span: text[start..end].to_string(),
                    label: e.label,
                    character_offset: index.span(start, end),
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            tokens = tokens.len(),
            entities = entities.len(),
            "analysis complete"
        );
        Ok(AnalysisResponse {
            model: self.model.info().clone(),
            text: text.to_string(),
            tokens,
            entities,
        })
    }

    /// Personal data found in the cleaned text, and the text with each kept
    /// finding replaced by `<ENTITY_TYPE>`.
    pub fn redact(&self, request: &AnalysisRequest) -> Result<RedactionReport, EngineError> {
        let text = request.text();
        self.check_limits(text)?;
        let annotated = self.annotate(text);

        let mut candidates: Vec<PatternMatch> = self
            .recognizers
            .iter()
            .flat_map(|r| r.find_all(text))
            .collect();
        candidates.extend(annotated.entities.iter().filter_map(|e| {
            Some(PatternMatch {
                entity_type: pii_entity_type(e.label)?,
                recognizer: NER_RECOGNIZER,
                start: annotated.spans[e.start].start,
                end: annotated.spans[e.end - 1].end,
                score: NER_SCORE,
            })
        }));

        let kept = resolve_conflicts(candidates);
        let sanitized_text = anonymize(text, &kept);
        let index = CharIndex::new(text);
        let detected_items = kept
            .iter()
            .map(|m| m.entity_type.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let findings = kept
            .iter()
            .map(|m| PiiFinding {
                entity_type: m.entity_type.to_string(),
                text_span: text[m.start..m.end].to_string(),
                character_offset: index.span(m.start, m.end),
                score: m.score,
                recognizer: m.recognizer.to_string(),
            })
            .collect::<Vec<_>>();
        tracing::debug!(findings = findings.len(), "redaction complete");
        Ok(RedactionReport {
            sanitized_text,
            detected_items,
            findings,
        })
    }
}
