//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the shared catalog service
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: query parameters and response envelopes
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the HTTP router around already-constructed services.
pub fn router(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::trace_layer())
                .layer(middleware::cors_layer())
                .layer(Extension(services)),
        )
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Returns the services too so the caller can close the store on shutdown.
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<(Router, Arc<AppServices>)> {
    let services = Arc::new(services::build_services(config).await?);
    Ok((router(services.clone()), services))
}

pub use services::AppServices;
