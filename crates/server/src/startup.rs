use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, StorageBackend, UnknownFieldsMode};
use tower_http::cors::CorsLayer;
use tracing::info;

use common::env::ensure_storage_dir;
use models::UnknownFields;
use service::{Backend, JsonFileBackend, MemoryBackend, Storage};

use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn unknown_fields(mode: UnknownFieldsMode) -> UnknownFields {
    match mode {
        UnknownFieldsMode::Ignore => UnknownFields::Ignore,
        UnknownFieldsMode::Reject => UnknownFields::Reject,
    }
}

/// Storage engine for the configured backend, reloaded and ready.
pub async fn open_storage(cfg: &AppConfig) -> anyhow::Result<Arc<Storage>> {
    let backend: Arc<dyn Backend> = match cfg.storage.backend {
        StorageBackend::File => {
            ensure_storage_dir(&cfg.storage.path).await?;
            Arc::new(JsonFileBackend::new(&cfg.storage.path))
        }
        StorageBackend::Memory => Arc::new(MemoryBackend::new()),
    };
    Ok(Storage::open(backend).await)
}

/// Router over an opened store with the configured payload policy.
pub fn build_app(cfg: &AppConfig, storage: Arc<Storage>) -> Router {
    let state = ServerState::new(storage, unknown_fields(cfg.api.unknown_fields));
    routes::build_router(state, build_cors())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: open storage, serve until Ctrl+C, then close the store.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let storage = open_storage(&cfg).await?;
    info!(backend = %storage.describe(), objects = storage.count(None).await, "storage ready");

    let app = build_app(&cfg, Arc::clone(&storage));

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting hbnb api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    storage.close().await;
    Ok(())
}
