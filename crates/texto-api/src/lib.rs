// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! HTTP contract of the texto service: error envelope, status mapping,
//! request body decoding and the OpenAPI document. Transport-free.

pub mod decode;
pub mod error_mapping;
mod errors;
pub mod openapi;

pub use decode::{decode_analysis_request, decode_chat_request, AnalyzeBody};
pub use errors::{ApiError, ApiErrorCode, UNKNOWN_REQUEST_ID};
pub use openapi::openapi_v1_spec;

pub const CRATE_NAME: &str = "texto-api";
