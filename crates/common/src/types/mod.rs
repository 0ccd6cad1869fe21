use serde::{Deserialize, Serialize};

/// Body of `GET /api/v1/status`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub status: String,
}

impl Status {
    pub fn ok() -> Self {
        Self { status: "OK".into() }
    }
}

/// Uniform error body: `{"error": "<message>"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}
