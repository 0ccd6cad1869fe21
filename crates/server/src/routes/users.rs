use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use models::EntityKind;

use super::resource::{self, JsonResult};
use super::{JsonObject, ServerState};
use crate::errors::JsonApiError;

pub async fn list_users(State(state): State<ServerState>) -> JsonResult {
    resource::list(&state, EntityKind::User).await
}

pub async fn get_user(State(state): State<ServerState>, Path(user_id): Path<String>) -> JsonResult {
    resource::show(&state, EntityKind::User, &user_id).await
}

/// Removes the user's places (with their reviews) and the user's reviews too.
pub async fn delete_user(State(state): State<ServerState>, Path(user_id): Path<String>) -> JsonResult {
    resource::destroy(&state, EntityKind::User, &user_id).await
}

pub async fn create_user(
    State(state): State<ServerState>,
    body: JsonObject,
) -> JsonResult<(StatusCode, Json<Value>)> {
    let JsonObject(body) = body.non_empty()?;
    resource::require(&body, &["email", "password"])?;
    let mut tx = state.storage.begin().await;
    // a taken email comes back from the store as 409
    resource::create(&state, &mut tx, EntityKind::User, &body).await
}

/// `email` cannot be changed; a new `password` is re-hashed.
pub async fn update_user(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    body: Result<JsonObject, JsonApiError>,
) -> JsonResult {
    resource::update(&state, EntityKind::User, &user_id, body).await
}
