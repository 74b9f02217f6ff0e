//! HTTP surface: JSON routes over the `Storefront`.

mod auth;
mod error;
mod items;
mod orders;

pub use error::ApiJson;

use crate::application::engine::Storefront;
use crate::domain::ports::IdentityProvider;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub shop: Arc<Storefront>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(shop: Arc<Storefront>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { shop, identity }
    }
}

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route("/items", get(items::list).post(items::create))
        .route("/items/checkout", post(items::checkout))
        .route(
            "/items/{id}",
            get(items::get).put(items::update).delete(items::remove),
        )
        .route("/orders", get(orders::list).post(orders::place))
        .route("/orders/{id}", get(orders::get).patch(orders::set_status));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::map_response(error::timeout_body))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Server is running" }))
}

/// Serves `app` until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await
}
