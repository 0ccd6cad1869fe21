use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;

use models::{Amenity, EntityKind, Place};

use super::resource::{self, JsonResult};
use super::ServerState;
use crate::errors::JsonApiError;

pub async fn list_place_amenities(State(state): State<ServerState>, Path(place_id): Path<String>) -> JsonResult {
    let index = state.storage.read().await;
    let place = index.get_as::<Place>(&place_id).ok_or_else(JsonApiError::not_found)?;
    resource::dicts(index.amenities_of_place(place))
}

/// `201` for a new link, `200` when already linked; the body is the amenity.
pub async fn link_amenity(
    State(state): State<ServerState>,
    Path((place_id, amenity_id)): Path<(String, String)>,
) -> JsonResult<(StatusCode, Json<Value>)> {
    let mut tx = state.storage.begin().await;
    let amenity = tx.get_as::<Amenity>(&amenity_id).cloned().ok_or_else(JsonApiError::not_found)?;
    if !tx.contains(EntityKind::Place, &place_id) {
        return Err(JsonApiError::not_found());
    }
    if !tx.link_amenity(&place_id, &amenity_id)? {
        return Ok((StatusCode::OK, Json(resource::dict_of(&amenity)?)));
    }
    tx.save().await?;
    info!(%place_id, %amenity_id, "amenity linked");
    Ok((StatusCode::CREATED, Json(resource::dict_of(&amenity)?)))
}

/// `404` unless both exist and are linked; `200 {}` otherwise.
pub async fn unlink_amenity(
    State(state): State<ServerState>,
    Path((place_id, amenity_id)): Path<(String, String)>,
) -> JsonResult {
    let mut tx = state.storage.begin().await;
    if !tx.contains(EntityKind::Place, &place_id) || !tx.contains(EntityKind::Amenity, &amenity_id) {
        return Err(JsonApiError::not_found());
    }
    if !tx.unlink_amenity(&place_id, &amenity_id)? {
        return Err(JsonApiError::not_found());
    }
    tx.save().await?;
    info!(%place_id, %amenity_id, "amenity unlinked");
    Ok(Json(Value::Object(Default::default())))
}
