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

/// Reviews of one place.
pub async fn list_reviews(State(state): State<ServerState>, Path(place_id): Path<String>) -> JsonResult {
    let index = state.storage.read().await;
    if !index.contains(EntityKind::Place, &place_id) {
        return Err(JsonApiError::not_found());
    }
    resource::dicts(index.reviews_of_place(&place_id))
}

pub async fn get_review(State(state): State<ServerState>, Path(review_id): Path<String>) -> JsonResult {
    resource::show(&state, EntityKind::Review, &review_id).await
}

pub async fn delete_review(State(state): State<ServerState>, Path(review_id): Path<String>) -> JsonResult {
    resource::destroy(&state, EntityKind::Review, &review_id).await
}

pub async fn create_review(
    State(state): State<ServerState>,
    Path(place_id): Path<String>,
    body: Result<JsonObject, JsonApiError>,
) -> JsonResult<(StatusCode, Json<Value>)> {
    let mut tx = state.storage.begin().await;
    if !tx.contains(EntityKind::Place, &place_id) {
        return Err(JsonApiError::not_found());
    }
    let JsonObject(mut body) = body.and_then(JsonObject::non_empty)?;
    resource::require_value(&body, "user_id")?;
    if !tx.contains(EntityKind::User, resource::id_field(&body, "user_id")?) {
        return Err(JsonApiError::not_found());
    }
    resource::require_value(&body, "text")?;
    body.insert("place_id".into(), Value::String(place_id));
    resource::create(&state, &mut tx, EntityKind::Review, &body).await
}

pub async fn update_review(
    State(state): State<ServerState>,
    Path(review_id): Path<String>,
    body: Result<JsonObject, JsonApiError>,
) -> JsonResult {
    resource::update(&state, EntityKind::Review, &review_id, body.and_then(JsonObject::non_empty)).await
}
