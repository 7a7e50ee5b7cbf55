use super::domain::ApplicationId;

/// Request-level problems reported before any application is read or written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid application id '{0}': expected a positive integer")]
    InvalidApplicationId(String),
    #[error("invalid decision type '{0}': expected approve, request_documents, or decline")]
    UnknownDecision(String),
    #[error("invalid status filter '{0}'")]
    UnknownStatus(String),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Parse a path or CLI supplied identifier.
pub fn parse_application_id(raw: &str) -> Result<ApplicationId, ValidationError> {
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidApplicationId(trimmed.to_string()))?;
    ApplicationId::new(value)
}
