use axum::{extract::State, Json};
use serde_json::{Map, Value};

use common::types::Status;
use models::EntityKind;

use super::ServerState;

pub async fn status() -> Json<Status> {
    Json(Status::ok())
}

/// Object counts per collection.
pub async fn stats(State(state): State<ServerState>) -> Json<Value> {
    let index = state.storage.read().await;
    let counts: Map<String, Value> = EntityKind::ALL
        .into_iter()
        .map(|kind| (kind.collection().to_string(), Value::from(index.count(Some(kind)))))
        .collect();
    Json(Value::Object(counts))
}
