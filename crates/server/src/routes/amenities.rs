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

pub async fn list_amenities(State(state): State<ServerState>) -> JsonResult {
    resource::list(&state, EntityKind::Amenity).await
}

pub async fn get_amenity(State(state): State<ServerState>, Path(amenity_id): Path<String>) -> JsonResult {
    resource::show(&state, EntityKind::Amenity, &amenity_id).await
}

/// Also unlinks the amenity from every place.
pub async fn delete_amenity(State(state): State<ServerState>, Path(amenity_id): Path<String>) -> JsonResult {
    resource::destroy(&state, EntityKind::Amenity, &amenity_id).await
}

pub async fn create_amenity(
    State(state): State<ServerState>,
    body: JsonObject,
) -> JsonResult<(StatusCode, Json<Value>)> {
    let JsonObject(body) = body.non_empty()?;
    resource::require(&body, &["name"])?;
    let mut tx = state.storage.begin().await;
    resource::create(&state, &mut tx, EntityKind::Amenity, &body).await
}

pub async fn update_amenity(
    State(state): State<ServerState>,
    Path(amenity_id): Path<String>,
    body: Result<JsonObject, JsonApiError>,
) -> JsonResult {
    resource::update(&state, EntityKind::Amenity, &amenity_id, body).await
}
