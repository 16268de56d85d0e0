// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Texto model SSOT.
//!
//! Every type that crosses a crate boundary (engine output, HTTP payloads)
//! lives here so that the wire layout is defined exactly once.
//!
//! ```compile_fail
//! use texto_model::EntityLabel;
//!
//! fn exhaustive_match(l: EntityLabel) -> &'static str {
//!     match l {
//!         EntityLabel::Per => "p",
//!         EntityLabel::Loc => "l",
//!         EntityLabel::Org => "o",
//!         EntityLabel::Misc => "m",
//!     }
//! }
//! ```

mod annotation;
mod exit;
mod privacy;
mod text;

pub use annotation::{
    AnalysisResponse, AnnotatedToken, EntityLabel, ModelInfo, NamedEntity, PosTag,
};
pub use exit::ExitCode;
pub use privacy::{
    PiiFinding, RedactionReport, SafetyReport, SecureChatRequest, SecureChatResponse,
    DEFAULT_CHAT_USER_ID,
};
pub use text::{AnalysisRequest, CharSpan, ValidationError, DEFAULT_MAX_TEXT_BYTES};

pub const CRATE_NAME: &str = "texto-model";
