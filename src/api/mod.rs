//! HTTP API
//!
//! - `POST /checkin` - Score, evaluate and store a check-in
//! - `GET /timeline` - Stored check-ins ordered by time
//! - `GET /health` - Health check

pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::checkin::CheckinService;

/// State shared across handlers
pub struct AppState {
    pub service: CheckinService,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(service: CheckinService) -> Self {
        Self { service }
    }
}

/// Create the API router
pub fn create_router(state: SharedState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/checkin", post(routes::submit_checkin))
        .route("/timeline", get(routes::timeline))
        .route("/health", get(routes::health))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the browser frontend. `"*"` allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
