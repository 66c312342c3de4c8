//! LLM extraction collaborator: turns free-form order requests into drafts.
//!
//! The model is strictly a translator: it maps what the user literally wrote
//! into a draft-shaped JSON object and leaves unresolved fields absent. It
//! never fills gaps, decides prices, or answers dialogue questions; those
//! are deterministic decisions made by `orderflow-core`, which also never
//! trusts the returned string's shape directly.
//!
//! The pieces:
//! - [`LlmClient`]: pluggable completion trait
//! - [`AnthropicClient`] / [`OllamaClient`]: concrete HTTP providers
//! - [`prompt`]: the fixed Japanese instruction templates
//! - [`DraftExtractor`]: prompt assembly, the model call, and tolerant
//!   JSON extraction with a single no-hint fallback

pub mod anthropic;
pub mod extractor;
pub mod llm;
pub mod ollama;
pub mod prompt;

pub use anthropic::AnthropicClient;
pub use extractor::{DraftExtractor, ExtractorError};
pub use llm::LlmClient;
pub use ollama::OllamaClient;
