// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use texto_engine::{AnalysisLimits, Engine, EngineError, ModelSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl BootstrapPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

/// One-shot model loading. `Ready` and `Failed` are terminal.
#[derive(Debug)]
pub struct Bootstrap {
    phase: BootstrapPhase,
    engine: Option<Arc<Engine>>,
    failure: Option<EngineError>,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new()
    }
}

impl Bootstrap {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: BootstrapPhase::Uninitialized,
            engine: None,
            failure: None,
        }
    }

    /// A bootstrap that already failed with `err`.
    #[must_use]
    pub fn failed(err: EngineError) -> Self {
        Self {
            phase: BootstrapPhase::Failed,
            engine: None,
            failure: Some(err),
        }
    }

    pub fn load(
        &mut self,
        source: &ModelSource,
        limits: AnalysisLimits,
    ) -> Result<Arc<Engine>, EngineError> {
        if self.phase != BootstrapPhase::Uninitialized {
            return Err(EngineError::internal(format!(
                "bootstrap already {}",
                self.phase.as_str()
            )));
        }
        self.phase = BootstrapPhase::Loading;
        let started = std::time::Instant::now();
        match Engine::load(source, limits) {
            Ok(engine) => {
                let engine = Arc::new(engine);
                tracing::info!(
                    model = %engine.model().info().name,
                    model_version = %engine.model().info().version,
                    variant = texto_engine::MODEL_VARIANT,
                    sha256 = %engine.model().digest(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "language model ready"
                );
                self.engine = Some(Arc::clone(&engine));
                self.phase = BootstrapPhase::Ready;
                Ok(engine)
            }
            Err(err) => {
                tracing::error!(error = %err, "language model failed to load");
                self.failure = Some(err.clone());
                self.phase = BootstrapPhase::Failed;
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn phase(&self) -> BootstrapPhase {
        self.phase
    }

    #[must_use]
    pub fn engine(&self) -> Option<Arc<Engine>> {
        self.engine.clone()
    }

    #[must_use]
    pub fn failure(&self) -> Option<&EngineError> {
        self.failure.as_ref()
    }
}
