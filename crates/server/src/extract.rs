use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};

use crate::errors::JsonApiError;

/// Request body that must be a JSON object; anything else is `400 Not a JSON`.
///
/// Content-Type is not checked.
#[derive(Debug)]
pub struct JsonObject(pub Map<String, Value>);

impl JsonObject {
    /// Also treat `{}` as `Not a JSON`.
    pub fn non_empty(self) -> Result<Self, JsonApiError> {
        if self.0.is_empty() {
            return Err(JsonApiError::not_a_json());
        }
        Ok(self)
    }
}

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|_| JsonApiError::not_a_json())?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(JsonObject(map)),
            _ => Err(JsonApiError::not_a_json()),
        }
    }
}
