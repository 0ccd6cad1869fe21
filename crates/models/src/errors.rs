use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A required attribute was absent. Displays as the handler-facing message.
    #[error("Missing {0}")]
    MissingField(&'static str),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unknown attribute: {0}")]
    UnknownField(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl ModelError {
    pub fn wrong_type(field: &str, expected: &str) -> Self {
        Self::Validation(format!("{field} must be {expected}"))
    }
}
