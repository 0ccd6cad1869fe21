use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::debug;

use models::EntityKind;
use service::PlaceSearch;

use super::resource::{self, JsonResult};
use super::{JsonObject, ServerState};
use crate::errors::JsonApiError;

/// Places of one city.
pub async fn list_places(State(state): State<ServerState>, Path(city_id): Path<String>) -> JsonResult {
    let index = state.storage.read().await;
    if !index.contains(EntityKind::City, &city_id) {
        return Err(JsonApiError::not_found());
    }
    resource::dicts(index.places_of_city(&city_id))
}

pub async fn get_place(State(state): State<ServerState>, Path(place_id): Path<String>) -> JsonResult {
    resource::show(&state, EntityKind::Place, &place_id).await
}

/// Reviews go with the place.
pub async fn delete_place(State(state): State<ServerState>, Path(place_id): Path<String>) -> JsonResult {
    resource::destroy(&state, EntityKind::Place, &place_id).await
}

/// City from the path, owner from `user_id`; both must exist.
pub async fn create_place(
    State(state): State<ServerState>,
    Path(city_id): Path<String>,
    body: Result<JsonObject, JsonApiError>,
) -> JsonResult<(StatusCode, Json<Value>)> {
    let mut tx = state.storage.begin().await;
    if !tx.contains(EntityKind::City, &city_id) {
        return Err(JsonApiError::not_found());
    }
    let JsonObject(mut body) = body.and_then(JsonObject::non_empty)?;
    resource::require_value(&body, "user_id")?;
    if !tx.contains(EntityKind::User, resource::id_field(&body, "user_id")?) {
        return Err(JsonApiError::not_found());
    }
    resource::require(&body, &["name"])?;
    body.insert("city_id".into(), Value::String(city_id));
    resource::create(&state, &mut tx, EntityKind::Place, &body).await
}

pub async fn update_place(
    State(state): State<ServerState>,
    Path(place_id): Path<String>,
    body: Result<JsonObject, JsonApiError>,
) -> JsonResult {
    resource::update(&state, EntityKind::Place, &place_id, body.and_then(JsonObject::non_empty)).await
}

/// Places filtered by states, cities and required amenities.
pub async fn search_places(State(state): State<ServerState>, JsonObject(body): JsonObject) -> JsonResult {
    let filter: PlaceSearch = serde_json::from_value(Value::Object(body))
        .map_err(|e| JsonApiError::bad_request(format!("Invalid search: {e}")))?;
    let index = state.storage.read().await;
    let places = index.search_places(&filter);
    debug!(?filter, matched = places.len(), "places search");
    resource::dicts(places)
}
