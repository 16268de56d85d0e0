// SPDX-License-Identifier: Apache-2.0

use texto_model::DEFAULT_MAX_TEXT_BYTES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisLimits {
    pub max_text_bytes: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
        }
    }
}
