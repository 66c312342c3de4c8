use serde_json::Value;

use crate::domain::draft::OrderDraft;
use crate::errors::ExtractError;

/// Locates a JSON value inside possibly prose-wrapped model output.
///
/// A strict parse of the whole string is attempted first. On failure the
/// substring between the first `{` and the last `}` is retried, which
/// tolerates a JSON object embedded in explanatory prose. Anything less
/// structured than that is an extraction error.
pub fn extract_json(raw: &str) -> Result<Value, ExtractError> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Ok(value);
    }
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str(&raw[start..=end]).map_err(ExtractError::InvalidJson)
        }
        _ => Err(ExtractError::NoJsonObject),
    }
}

impl OrderDraft {
    /// Routes untrusted model output through JSON extraction and typed
    /// deserialization. The output's shape is never trusted directly; a
    /// structural mismatch is an extraction error, fatal for the turn.
    pub fn from_llm_output(raw: &str) -> Result<Self, ExtractError> {
        let value = extract_json(raw)?;
        serde_json::from_value(value).map_err(ExtractError::DraftShape)
    }
}
