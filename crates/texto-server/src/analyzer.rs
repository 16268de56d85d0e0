// SPDX-License-Identifier: Apache-2.0

use texto_engine::{Engine, EngineError};
use texto_model::{AnalysisRequest, AnalysisResponse, ModelInfo, RedactionReport};

/// The blocking analysis surface the HTTP layer drives.
pub trait Analyzer: Send + Sync + 'static {
    fn model_info(&self) -> &ModelInfo;
    fn model_digest(&self) -> &str;
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, EngineError>;
    fn redact(&self, request: &AnalysisRequest) -> Result<RedactionReport, EngineError>;
}

impl Analyzer for Engine {
    fn model_info(&self) -> &ModelInfo {
        self.model().info()
    }

    fn model_digest(&self) -> &str {
        self.model().digest()
    }

    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, EngineError> {
        Engine::analyze(self, request)
    }

    fn redact(&self, request: &AnalysisRequest) -> Result<RedactionReport, EngineError> {
        Engine::redact(self, request)
    }
}
