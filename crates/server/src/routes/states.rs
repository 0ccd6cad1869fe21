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

pub async fn list_states(State(state): State<ServerState>) -> JsonResult {
    resource::list(&state, EntityKind::State).await
}

pub async fn get_state(State(state): State<ServerState>, Path(state_id): Path<String>) -> JsonResult {
    resource::show(&state, EntityKind::State, &state_id).await
}

pub async fn delete_state(State(state): State<ServerState>, Path(state_id): Path<String>) -> JsonResult {
    resource::destroy(&state, EntityKind::State, &state_id).await
}

pub async fn create_state(
    State(state): State<ServerState>,
    body: JsonObject,
) -> JsonResult<(StatusCode, Json<Value>)> {
    let JsonObject(body) = body.non_empty()?;
    resource::require(&body, &["name"])?;
    let mut tx = state.storage.begin().await;
    resource::create(&state, &mut tx, EntityKind::State, &body).await
}

pub async fn update_state(
    State(state): State<ServerState>,
    Path(state_id): Path<String>,
    body: Result<JsonObject, JsonApiError>,
) -> JsonResult {
    resource::update(&state, EntityKind::State, &state_id, body).await
}
