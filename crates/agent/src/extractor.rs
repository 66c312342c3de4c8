use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use orderflow_core::{ExtractError, OrderDraft};

use crate::llm::LlmClient;
use crate::prompt::extraction_prompt;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("language model call failed: {0}")]
    Llm(#[source] anyhow::Error),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Extraction collaborator: one model call plus tolerant JSON extraction.
///
/// The client handle is injected at construction; there is no process-wide
/// lazily initialized transport, so wiring order is explicit and tests can
/// swap in a scripted client.
pub struct DraftExtractor {
    client: Arc<dyn LlmClient>,
}

impl DraftExtractor {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Extracts a draft from free-form request text.
    ///
    /// The first attempt carries the JSON-only hint. If no draft can be
    /// extracted from the response, a single fallback reattempt without the
    /// hint is made; there is no other retry. Transport failures and a
    /// still-unparseable fallback are fatal for the turn.
    pub async fn extract(&self, request_text: &str) -> Result<OrderDraft, ExtractorError> {
        let raw = self.complete(request_text, true).await?;
        match OrderDraft::from_llm_output(&raw) {
            Ok(draft) => Ok(draft),
            Err(error) => {
                warn!(error = %error, "draft extraction failed, retrying without the JSON-only hint");
                let raw = self.complete(request_text, false).await?;
                OrderDraft::from_llm_output(&raw).map_err(ExtractorError::Extract)
            }
        }
    }

    async fn complete(&self, request_text: &str, json_only: bool) -> Result<String, ExtractorError> {
        let prompt = extraction_prompt(request_text, json_only);
        self.client.complete(&prompt).await.map_err(ExtractorError::Llm)
    }
}
