//! HTTP surface: router, handlers and shutdown.

use std::sync::Arc;
use std::time::Instant;

use async_graphql::dynamic::Schema;
use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{CorsConfig, ServerConfig};
use crate::context::{RequestContext, RequestInfo};
use crate::driver::SharedDriver;

pub const GRAPHQL_PATH: &str = "/graphql";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub schema: Schema,
    pub driver: SharedDriver,
    start_time: Arc<Instant>,
}

impl AppState {
    pub fn new(schema: Schema, driver: SharedDriver) -> Self {
        Self {
            schema,
            driver,
            start_time: Arc::new(Instant::now()),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Build the application router.
pub fn build_router(state: AppState, server: &ServerConfig, cors: &CorsConfig) -> Router {
    let graphql = if server.playground {
        get(playground).post(graphql_handler)
    } else {
        post(graphql_handler)
    };

    Router::new()
        .route(GRAPHQL_PATH, graphql)
        .route("/health", get(health_check))
        .route("/api/health", get(api_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
}

/// Permissive when no origins are configured.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    tracing::info!(origins = ?config.allowed_origins, "CORS allowed origins");

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// `POST /graphql`. Each request runs with its own [`RequestContext`].
async fn graphql_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let context = RequestContext::new(
        RequestInfo {
            method,
            uri,
            headers,
        },
        state.driver.clone(),
    );
    state
        .schema
        .execute(request.into_inner().data(context))
        .await
        .into()
}

/// `GET /graphql`
async fn playground() -> Html<String> {
    Html(playground_source(GraphQLPlaygroundConfig::new(GRAPHQL_PATH)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiHealthResponse {
    pub status: String,

    /// Graph database connectivity
    pub database: String,

    pub uptime_seconds: u64,

    pub version: String,
}

/// `GET /health`: liveness only, never touches the database.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// `GET /api/health`: round-trips a statement through the driver.
async fn api_health(State(state): State<AppState>) -> (StatusCode, Json<ApiHealthResponse>) {
    let connected = match state.driver.verify_connectivity().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Graph database health check failed");
            false
        }
    };

    let (status_code, status, database) = if connected {
        (StatusCode::OK, "ok", "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "disconnected")
    };

    (
        status_code,
        Json(ApiHealthResponse {
            status: status.to_string(),
            database: database.to_string(),
            uptime_seconds: state.uptime_seconds(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
