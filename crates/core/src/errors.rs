use thiserror::Error;

/// Strict-validation failure raised while promoting a draft into an
/// [`Order`](crate::Order). The `field` uses the same dotted/indexed path
/// syntax the dialogue uses, so a failure can be routed back to a question.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid value for `{field}`: {reason}")]
    Validation { field: String, reason: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), reason: reason.into() }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Validation { field, .. } => field,
        }
    }
}

/// Failure to locate or decode a JSON draft inside model output.
/// Fatal for the turn; the caller restarts the request.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON object found in model output")]
    NoJsonObject,
    #[error("model output is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("extracted JSON does not match the draft shape: {0}")]
    DraftShape(#[source] serde_json::Error),
}
