// SPDX-License-Identifier: Apache-2.0

use crate::ApiErrorCode;
use serde_json::{json, Value};

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ErrorEnvelope"}}}
    })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {"application/json": {"schema": {"$ref": format!("#/components/schemas/{schema}")}}}
    })
}

fn json_response(description: &str, schema: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": format!("#/components/schemas/{schema}")}}}
    })
}

#[must_use]
pub fn openapi_v1_spec() -> Value {
    let error_codes: Vec<&str> = ApiErrorCode::ALL.iter().map(|c| c.as_str()).collect();
    let pos_tags: Vec<&str> = texto_model::PosTag::ALL.iter().map(|t| t.as_str()).collect();
    let labels: Vec<&str> = texto_model::EntityLabel::ALL
        .iter()
        .map(|l| l.as_str())
        .collect();
    json!({
      "openapi": "3.0.3",
      "info": {
        "title": "texto API",
        "version": "v1"
      },
      "paths": {
        "/": {"get": {"responses": {"200": {"description": "service status and chat mode"}}}},
        "/chat/secure": {
          "post": {
            "requestBody": json_body("SecureChatRequest"),
            "responses": {
              "200": json_response("sanitized prompt and assistant reply", "SecureChatResponse"),
              "400": error_response("invalid prompt"),
              "502": error_response("chat backend failed"),
              "503": error_response("model unavailable or timed out")
            }
          }
        },
        "/healthz": {"get": {"responses": {"200": {"description": "ok"}}}},
        "/metrics": {"get": {"responses": {"200": {"description": "prometheus metrics"}}}},
        "/readyz": {
          "get": {
            "responses": {
              "200": {"description": "ready"},
              "503": {"description": "not ready"}
            }
          }
        },
        "/v1/analyze": {
          "post": {
            "requestBody": json_body("AnalyzeRequest"),
            "responses": {
              "200": json_response("tokens and named entities", "AnalysisResponse"),
              "400": error_response("invalid input"),
              "500": error_response("internal failure"),
              "503": error_response("model unavailable or timed out")
            }
          }
        },
        "/v1/openapi.json": {"get": {"responses": {"200": {"description": "this document"}}}},
        "/v1/redact": {
          "post": {
            "requestBody": json_body("AnalyzeRequest"),
            "responses": {
              "200": json_response("detected personal data and sanitized text", "RedactionReport"),
              "400": error_response("invalid input"),
              "503": error_response("model unavailable or timed out")
            }
          }
        },
        "/v1/version": {"get": {"responses": {"200": {"description": "service and model identity"}}}}
      },
      "components": {
        "schemas": {
          "AnalysisResponse": {
            "type": "object",
            "required": ["model", "text", "tokens", "entities"],
            "additionalProperties": false,
            "properties": {
              "entities": {"type": "array", "items": {"$ref": "#/components/schemas/NamedEntity"}},
              "model": {"$ref": "#/components/schemas/ModelInfo"},
              "text": {"type": "string"},
              "tokens": {"type": "array", "items": {"$ref": "#/components/schemas/AnnotatedToken"}}
            }
          },
          "AnalyzeRequest": {
            "type": "object",
            "required": ["text"],
            "additionalProperties": false,
            "properties": {"text": {"type": "string", "minLength": 1}}
          },
          "AnnotatedToken": {
            "type": "object",
            "required": ["surface_form", "lemma", "part_of_speech", "is_stopword", "character_offset", "whitespace"],
            "additionalProperties": false,
            "properties": {
              "character_offset": {"$ref": "#/components/schemas/CharSpan"},
              "is_stopword": {"type": "boolean"},
              "lemma": {"type": "string"},
              "part_of_speech": {"type": "string", "enum": pos_tags},
              "surface_form": {"type": "string"},
              "whitespace": {"type": "string"}
            }
          },
          "ApiError": {
            "type": "object",
            "required": ["code", "message", "details", "request_id"],
            "additionalProperties": false,
            "properties": {
              "code": {"$ref": "#/components/schemas/ApiErrorCode"},
              "details": {"type": "object"},
              "message": {"type": "string"},
              "request_id": {"type": "string"}
            }
          },
          "ApiErrorCode": {"type": "string", "enum": error_codes},
          "CharSpan": {
            "type": "object",
            "required": ["start", "end"],
            "additionalProperties": false,
            "properties": {
              "end": {"type": "integer", "minimum": 0},
              "start": {"type": "integer", "minimum": 0}
            }
          },
          "ErrorEnvelope": {
            "type": "object",
            "required": ["error"],
            "properties": {"error": {"$ref": "#/components/schemas/ApiError"}}
          },
          "ModelInfo": {
            "type": "object",
            "required": ["name", "version", "lang"],
            "additionalProperties": false,
            "properties": {
              "lang": {"type": "string"},
              "name": {"type": "string"},
              "version": {"type": "string"}
            }
          },
          "NamedEntity": {
            "type": "object",
            "required": ["text_span", "label", "character_offset"],
            "additionalProperties": false,
            "properties": {
              "character_offset": {"$ref": "#/components/schemas/CharSpan"},
              "label": {"type": "string", "enum": labels},
              "text_span": {"type": "string"}
            }
          },
          "PiiFinding": {
            "type": "object",
            "required": ["entity_type", "text_span", "character_offset", "score", "recognizer"],
            "additionalProperties": false,
            "properties": {
              "character_offset": {"$ref": "#/components/schemas/CharSpan"},
              "entity_type": {"type": "string"},
              "recognizer": {"type": "string"},
              "score": {"type": "number"},
              "text_span": {"type": "string"}
            }
          },
          "RedactionReport": {
            "type": "object",
            "required": ["sanitized_text", "detected_items", "findings"],
            "additionalProperties": false,
            "properties": {
              "detected_items": {"type": "array", "items": {"type": "string"}},
              "findings": {"type": "array", "items": {"$ref": "#/components/schemas/PiiFinding"}},
              "sanitized_text": {"type": "string"}
            }
          },
          "SecureChatRequest": {
            "type": "object",
            "required": ["prompt"],
            "additionalProperties": false,
            "properties": {
              "prompt": {"type": "string", "minLength": 1},
              "user_id": {"type": "string", "default": "guest"}
            }
          },
          "SecureChatResponse": {
            "type": "object",
            "required": ["ai_response", "safety_report"],
            "additionalProperties": false,
            "properties": {
              "ai_response": {"type": "string"},
              "safety_report": {
                "type": "object",
                "required": ["detected_items", "sanitized_prompt"],
                "properties": {
                  "detected_items": {"type": "array", "items": {"type": "string"}},
                  "sanitized_prompt": {"type": "string"}
                }
              }
            }
          }
        }
      }
    })
}
