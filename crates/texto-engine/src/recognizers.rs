// SPDX-License-Identifier: Apache-2.0

use regex::Regex;
use texto_model::EntityLabel;

pub const NER_SCORE: f32 = 0.85;
pub const NER_RECOGNIZER: &str = "ner";

/// A regular-expression detector for one kind of personal data.
#[derive(Debug, Clone)]
pub struct PatternRecognizer {
    name: &'static str,
    entity_type: &'static str,
    regex: Regex,
    score: f32,
}

/// A raw match, in byte offsets of the scanned text.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub entity_type: &'static str,
    pub recognizer: &'static str,
    pub start: usize,
    pub end: usize,
    pub score: f32,
}

impl PatternRecognizer {
    pub fn new(
        name: &'static str,
        entity_type: &'static str,
        pattern: &str,
        score: f32,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            entity_type,
            regex: Regex::new(pattern)?,
            score,
        })
    }

    pub fn find_all<'a>(&'a self, text: &'a str) -> impl Iterator<Item = PatternMatch> + 'a {
        self.regex
            .find_iter(text)
            .filter(|m| !m.as_str().trim().is_empty())
            .map(move |m| PatternMatch {
                entity_type: self.entity_type,
                recognizer: self.name,
                start: m.start(),
                end: m.end(),
                score: self.score,
            })
    }
}

/// E-mail, phone, bank account, Argentine DNI and money amount detectors.
pub fn default_recognizers() -> Result<Vec<PatternRecognizer>, regex::Error> {
    Ok(vec![
        PatternRecognizer::new(
            "email_pattern",
            "EMAIL_CUSTOM",
            r"\b[\w.-]+@[\w.-]+\.\w{2,4}\b",
            1.0,
        )?,
        PatternRecognizer::new(
            "phone_pattern",
            "PHONE_CUSTOM",
            r"\b(?:\+?\d{1,3}[- ]?)?\(?\d{2,4}\)?[- ]?\d{3,4}[- ]?\d{3,4}\b",
            0.8,
        )?,
        PatternRecognizer::new(
            "bank_pattern",
            "BANK_ACCOUNT",
            r"\b[A-Z0-9]{15,30}\b|(?:\d[ -]*?){10,22}",
            0.6,
        )?,
        PatternRecognizer::new(
            "dni_pattern",
            "DNI_ARG",
            r"\b\d{1,2}\.?\d{3}\.?\d{3}\b",
            0.85,
        )?,
        PatternRecognizer::new(
            "money_pattern",
            "MONEY_AMOUNT",
            r"(?:\$|USD|EUR)\s?[\d.,]+|[\d.,]+\s?(?:pesos|dólares|usd|eur|us\$)",
            0.8,
        )?,
    ])
}

/// PII entity type reported for a named entity, if that label is personal data.
#[must_use]
pub fn pii_entity_type(label: EntityLabel) -> Option<&'static str> {
    match label {
        EntityLabel::Per => Some("PERSON"),
        EntityLabel::Loc => Some("LOCATION"),
        EntityLabel::Org => Some("ORGANIZATION"),
        _ => None,
    }
}
