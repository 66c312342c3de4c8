use anyhow::Result;
use async_trait::async_trait;

/// Minimal completion interface the extraction flow depends on.
///
/// One invocation is exactly one model call; retry and fallback policy
/// belong to the caller, not the client.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
