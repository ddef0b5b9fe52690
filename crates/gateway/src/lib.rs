//! HTTP API gateway for RustedTutor.
//!
//! Exposes the tutoring operations as JSON endpoints plus a health check.
//!
//! Built on Axum for high performance async HTTP.

pub mod routes;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{
    Router,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use rustedtutor_config::{AppConfig, GatewayConfig};
use rustedtutor_tutor::Tutor;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub tutor: Arc<Tutor>,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(tutor: Arc<Tutor>) -> SharedState {
        Arc::new(Self { tutor })
    }
}

/// Build the tutoring routes without transport layers.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ask-question", post(routes::ask_question))
        .route("/clear-conversation", post(routes::clear_conversation))
        .route("/socratic-question", post(routes::socratic_question))
        .route("/generate-quiz", post(routes::generate_quiz))
        .route("/generate-flashcards", post(routes::generate_flashcards))
        .route("/evaluate-answers", post(routes::evaluate_answers))
        .with_state(state)
}

/// Build the full router.
///
/// Layers applied:
/// - CORS from `[gateway] allowed_origins` (any origin when empty)
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_full_router(state: SharedState, gateway: &GatewayConfig) -> Router {
    build_router(state)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors_layer(&gateway.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let tutor = Arc::new(Tutor::from_config(&config)?);
    let app = build_full_router(GatewayState::new(tutor), &config.gateway);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
