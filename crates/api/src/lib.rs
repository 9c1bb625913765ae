//! HTTP API composing product and checkout responses from the services
//! that own each part of them.
//!
//! Provides REST endpoints backed by the composer, with structured logging
//! (tracing) and Prometheus metrics.

pub mod compose;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use composer::ServiceComposer;
use metrics_exporter_prometheus::PrometheusHandle;
use services::{Services, configure_all};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use error::ApiError;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/livez", get(routes::health::check))
        .route("/product/{id}", get(routes::products::by_id))
        .route("/products", get(routes::products::search))
        .route("/checkout/complete", post(routes::checkout::complete))
        .route("/composer/configuration", get(routes::configuration::show))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state from the given services, registering every
/// participator they provide.
pub fn create_state(services: Services, config: &Config) -> Result<Arc<AppState>, ApiError> {
    let registry = Arc::new(configure_all(&services)?);
    tracing::info!(
        pairs = registry.describe().len(),
        max_wave_count = config.composer.max_wave_count,
        "participator registry built"
    );

    Ok(Arc::new(AppState {
        composer: ServiceComposer::new(registry, config.composer),
        services,
        text_filters: config.configuration_text_filters.clone(),
    }))
}

/// Creates the default application state backed by the demo services.
pub fn create_default_state(config: &Config) -> Result<Arc<AppState>, ApiError> {
    create_state(Services::demo(), config)
}
