//! CRUD building blocks shared by every entity's handlers.

use axum::{http::StatusCode, Json};
use serde_json::{Map, Value};
use tracing::info;

use models::{Entity, EntityKind, Instance};
use service::Transaction;

use super::ServerState;
use crate::errors::JsonApiError;

pub type JsonResult<T = Json<Value>> = Result<T, JsonApiError>;

/// Transport form of a stored instance.
pub fn dict(instance: &Instance) -> Result<Value, JsonApiError> {
    Ok(Value::Object(instance.to_dict()?))
}

pub fn dict_of<E: Entity>(entity: &E) -> Result<Value, JsonApiError> {
    dict(&entity.clone().into())
}

pub fn dicts<'a, E: Entity + 'a>(entities: impl IntoIterator<Item = &'a E>) -> JsonResult {
    let items = entities.into_iter().map(dict_of).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(Value::Array(items)))
}

/// Fail with `Missing <field>` for the first absent field.
pub fn require(body: &Map<String, Value>, fields: &[&str]) -> Result<(), JsonApiError> {
    match fields.iter().find(|f| !body.contains_key(**f)) {
        Some(field) => Err(JsonApiError::missing(field)),
        None => Ok(()),
    }
}

/// Like [`require`], but `null` and `""` count as absent too.
pub fn require_value(body: &Map<String, Value>, field: &str) -> Result<(), JsonApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Err(JsonApiError::missing(field)),
        Some(Value::String(s)) if s.is_empty() => Err(JsonApiError::missing(field)),
        Some(_) => Ok(()),
    }
}

/// String value of a present field, `400` if it is not a string.
pub fn id_field<'a>(body: &'a Map<String, Value>, field: &str) -> Result<&'a str, JsonApiError> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| JsonApiError::bad_request(format!("{field} must be a string")))
}

pub async fn list(state: &ServerState, kind: EntityKind) -> JsonResult {
    let index = state.storage.read().await;
    let items = index.iter(Some(kind)).map(dict).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(Value::Array(items)))
}

pub async fn show(state: &ServerState, kind: EntityKind, id: &str) -> JsonResult {
    let instance = state.storage.get(kind, id).await.ok_or_else(JsonApiError::not_found)?;
    Ok(Json(dict(&instance)?))
}

/// Delete with cascade and flush; `200 {}`.
pub async fn destroy(state: &ServerState, kind: EntityKind, id: &str) -> JsonResult {
    let mut tx = state.storage.begin().await;
    if !tx.contains(kind, id) {
        return Err(JsonApiError::not_found());
    }
    let removed = tx.remove(kind, id).await?;
    info!(%kind, %id, removed = removed.len(), "deleted");
    Ok(Json(Value::Object(Map::new())))
}

/// Construct from a validated body inside `tx` and flush; `201` with the new object.
pub async fn create(
    state: &ServerState,
    tx: &mut Transaction<'_>,
    kind: EntityKind,
    body: &Map<String, Value>,
) -> JsonResult<(StatusCode, Json<Value>)> {
    let instance = Instance::construct(kind, None, body, state.unknown_fields)?;
    let saved = tx.put(instance).await?;
    info!(%kind, id = %saved.id(), "created");
    Ok((StatusCode::CREATED, Json(dict(&saved)?)))
}

/// Apply a partial body to an existing instance and flush.
///
/// The id is resolved before the body is looked at, so an unknown id is
/// `404` even when the body is malformed.
pub async fn update(
    state: &ServerState,
    kind: EntityKind,
    id: &str,
    body: Result<super::JsonObject, JsonApiError>,
) -> JsonResult {
    let mut tx = state.storage.begin().await;
    let mut instance = tx.get(kind, id).cloned().ok_or_else(JsonApiError::not_found)?;
    let super::JsonObject(body) = body?;
    let applied = instance.update(&body, state.unknown_fields)?;
    let saved = tx.put(instance).await?;
    info!(%kind, %id, fields = ?applied, "updated");
    Ok(Json(dict(&saved)?))
}
