//! HTTP surface for the outbreak query service.
//!
//! ```text
//! GET /outbreaks
//! X-API-Key: <secret>
//! ```
//!
//! 200 returns a JSON array of outbreaks. A missing or wrong key returns
//! 403 `{"detail": "Invalid API Key"}`. An unreadable or malformed table
//! returns 500 `{"detail": "Data unavailable"}`.
//!
//! CORS mirrors the request origin, methods, and headers and allows
//! credentials. This keeps the dashboard open to any origin and is not
//! suitable for a deployment that needs origin restrictions.

use crate::api::service::OutbreakService;
use crate::error::QueryError;
use crate::models::Outbreak;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Error body, shaped like `{"detail": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            QueryError::Unauthorized => (StatusCode::FORBIDDEN, "Invalid API Key"),
            QueryError::DataUnavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Data unavailable"),
        };
        (
            status,
            Json(ErrorResponse {
                detail: detail.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub service: Arc<OutbreakService>,
}

/// `GET /outbreaks`
pub async fn list_outbreaks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Outbreak>>, QueryError> {
    let credential = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let service = Arc::clone(&state.service);
    let outbreaks = tokio::task::spawn_blocking(move || service.list_outbreaks(credential.as_deref()))
        .await
        .map_err(|e| QueryError::DataUnavailable(format!("table read task failed: {e}")))??;

    Ok(Json(outbreaks))
}

pub fn create_router(service: OutbreakService) -> Router {
    let state = AppState {
        service: Arc::new(service),
    };
    Router::new()
        .route("/outbreaks", get(list_outbreaks))
        .with_state(state)
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Bind a `host:port` address; host names such as `localhost` are resolved.
pub async fn bind_listener(listen: &str) -> std::io::Result<TcpListener> {
    TcpListener::bind(listen).await
}

/// Bind `listen` and serve until Ctrl-C.
#[instrument(level = "info", skip_all, fields(%listen))]
pub async fn serve(listen: &str, service: OutbreakService) -> Result<(), Box<dyn Error>> {
    let clean_table = service.clean_table().display().to_string();
    let app = create_router(service);

    let listener = bind_listener(listen).await?;
    let addr = listener.local_addr()?;
    info!(%addr, %clean_table, "Outbreak API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
