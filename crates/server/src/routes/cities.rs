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

/// Cities of one state.
pub async fn list_cities(State(state): State<ServerState>, Path(state_id): Path<String>) -> JsonResult {
    let index = state.storage.read().await;
    if !index.contains(EntityKind::State, &state_id) {
        return Err(JsonApiError::not_found());
    }
    resource::dicts(index.cities_of_state(&state_id))
}

pub async fn get_city(State(state): State<ServerState>, Path(city_id): Path<String>) -> JsonResult {
    resource::show(&state, EntityKind::City, &city_id).await
}

pub async fn delete_city(State(state): State<ServerState>, Path(city_id): Path<String>) -> JsonResult {
    resource::destroy(&state, EntityKind::City, &city_id).await
}

/// The owning state comes from the path and overrides any `state_id` in the body.
pub async fn create_city(
    State(state): State<ServerState>,
    Path(state_id): Path<String>,
    body: Result<JsonObject, JsonApiError>,
) -> JsonResult<(StatusCode, Json<Value>)> {
    let mut tx = state.storage.begin().await;
    if !tx.contains(EntityKind::State, &state_id) {
        return Err(JsonApiError::not_found());
    }
    let JsonObject(mut body) = body?;
    resource::require(&body, &["name"])?;
    body.insert("state_id".into(), Value::String(state_id));
    resource::create(&state, &mut tx, EntityKind::City, &body).await
}

pub async fn update_city(
    State(state): State<ServerState>,
    Path(city_id): Path<String>,
    body: Result<JsonObject, JsonApiError>,
) -> JsonResult {
    resource::update(&state, EntityKind::City, &city_id, body).await
}
