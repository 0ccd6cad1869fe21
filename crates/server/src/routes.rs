use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use models::UnknownFields;
use service::Storage;

use crate::errors::JsonApiError;
pub use crate::extract::JsonObject;

pub mod amenities;
pub mod cities;
pub mod index;
pub mod places;
pub mod places_amenities;
pub mod resource;
pub mod reviews;
pub mod states;
pub mod users;

/// Shared handler state: the object store and the payload policy.
#[derive(Clone)]
pub struct ServerState {
    pub storage: Arc<Storage>,
    pub unknown_fields: UnknownFields,
}

impl ServerState {
    pub fn new(storage: Arc<Storage>, unknown_fields: UnknownFields) -> Self {
        Self { storage, unknown_fields }
    }
}

async fn not_found() -> JsonApiError {
    JsonApiError::not_found()
}

async fn metrics() -> (StatusCode, String) {
    match service::metrics::encode() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Routes under `/api/v1`.
pub fn api_router() -> Router<ServerState> {
    Router::new()
        .route("/status", get(index::status))
        .route("/stats", get(index::stats))
        .route("/states", get(states::list_states).post(states::create_state))
        .route(
            "/states/:state_id",
            get(states::get_state).put(states::update_state).delete(states::delete_state),
        )
        .route("/states/:state_id/cities", get(cities::list_cities).post(cities::create_city))
        .route(
            "/cities/:city_id",
            get(cities::get_city).put(cities::update_city).delete(cities::delete_city),
        )
        .route("/amenities", get(amenities::list_amenities).post(amenities::create_amenity))
        .route(
            "/amenities/:amenity_id",
            get(amenities::get_amenity).put(amenities::update_amenity).delete(amenities::delete_amenity),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:user_id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/cities/:city_id/places", get(places::list_places).post(places::create_place))
        .route(
            "/places/:place_id",
            get(places::get_place).put(places::update_place).delete(places::delete_place),
        )
        .route("/places_search", post(places::search_places))
        .route("/places/:place_id/reviews", get(reviews::list_reviews).post(reviews::create_review))
        .route(
            "/reviews/:review_id",
            get(reviews::get_review).put(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/places/:place_id/amenities", get(places_amenities::list_place_amenities))
        .route(
            "/places/:place_id/amenities/:amenity_id",
            post(places_amenities::link_amenity).delete(places_amenities::unlink_amenity),
        )
}

/// Build the full application router.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    Router::new()
        .nest("/api/v1", api_router())
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx logged at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use service::MemoryBackend;
    use tower::ServiceExt;

    use super::*;

    async fn app() -> Router {
        let storage = Storage::open(Arc::new(MemoryBackend::new())).await;
        build_router(ServerState::new(storage, UnknownFields::Ignore), CorsLayer::very_permissive())
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.oneshot(req).await.expect("response");
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn status_route() {
        let req = Request::get("/api/v1/status").body(Body::empty()).expect("request");
        let (status, body) = call(app().await, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "OK"}));
    }

    #[tokio::test]
    async fn stats_counts_every_collection() {
        let req = Request::get("/api/v1/stats").body(Body::empty()).expect("request");
        let (_, body) = call(app().await, req).await;
        assert_eq!(
            body,
            json!({"amenities": 0, "cities": 0, "places": 0, "reviews": 0, "states": 0, "users": 0})
        );
    }

    #[tokio::test]
    async fn fallback_is_json_404() {
        let req = Request::get("/api/v2/states").body(Body::empty()).expect("request");
        let (status, body) = call(app().await, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn array_body_is_not_a_json_object() {
        let req = Request::post("/api/v1/amenities")
            .header("content-type", "application/json")
            .body(Body::from("[1, 2]"))
            .expect("request");
        let (status, body) = call(app().await, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Not a JSON"}));
    }

    #[tokio::test]
    async fn create_then_show_amenity() {
        let app = app().await;
        let req = Request::post("/api/v1/amenities")
            .body(Body::from(r#"{"name": "Wifi"}"#))
            .expect("request");
        let (status, created) = call(app.clone(), req).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().expect("id").to_string();

        let req = Request::get(format!("/api/v1/amenities/{id}")).body(Body::empty()).expect("request");
        let (status, shown) = call(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(shown, created);
    }
}
