//! HTTP server for the metrics endpoint and status page.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::Router;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::exporter::SharedExporter;
use crate::summary;

/// Header and query parameter names that may carry an access token.
static TOKEN_HEADERS: [&str; 2] = ["x_token", "x-token"];
static TOKEN_PARAMS: [&str; 3] = ["x_token", "x-token", "X-Token"];

const CACHE_CONTROL: &str = "no-cache, max-age=0, must-revalidate, no-store";

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    exporter: SharedExporter,
    metrics_path: String,
}

/// Create the HTTP router.
pub fn create_router(exporter: SharedExporter, metrics_path: &str) -> Router {
    let state = AppState {
        exporter,
        metrics_path: metrics_path.to_string(),
    };

    Router::new()
        .route(metrics_path, get(metrics_handler))
        .route("/", get(summary_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Candidate tokens in lookup order: headers first, then query parameters.
fn candidate_tokens<'a>(
    headers: &'a HeaderMap,
    query: &'a HashMap<String, String>,
) -> impl Iterator<Item = &'a str> {
    let from_headers = TOKEN_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok());
    let from_query = TOKEN_PARAMS
        .iter()
        .filter_map(|name| query.get(*name))
        .map(String::as_str);
    from_headers.chain(from_query)
}

fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
    remote: Option<SocketAddr>,
) -> Result<String, Response> {
    state
        .exporter
        .authorize(candidate_tokens(headers, query))
        .map_err(|reason| {
            warn!(
                remote = ?remote,
                reason = %reason,
                "Unauthorized access"
            );
            (StatusCode::FORBIDDEN, "Forbidden\n").into_response()
        })
}

fn remote_addr(connect_info: Option<ConnectInfo<SocketAddr>>) -> Option<SocketAddr> {
    connect_info.map(|ConnectInfo(addr)| addr)
}

/// Handler for the metrics endpoint.
async fn metrics_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = authorize(&state, &headers, &query, remote_addr(connect_info)) {
        return response;
    }

    let body = state.exporter.render().await;
    debug!(bytes = body.len(), "Served metrics");

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Handler for the status page.
async fn summary_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let cache = [(header::CACHE_CONTROL, CACHE_CONTROL)];

    match authorize(&state, &headers, &query, remote_addr(connect_info)) {
        Ok(token) => {
            let page = summary::render(state.exporter.nodes(), &state.metrics_path, &token);
            (cache, Html(page)).into_response()
        }
        Err(response) => (cache, response).into_response(),
    }
}

/// Handler for the /health endpoint.
async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

/// HTTP server configuration.
pub struct HttpServer {
    exporter: SharedExporter,
    listen_addr: SocketAddr,
    metrics_path: String,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(exporter: SharedExporter, listen_addr: SocketAddr, metrics_path: String) -> Self {
        Self {
            exporter,
            listen_addr,
            metrics_path,
        }
    }

    /// Run the HTTP server until the shutdown signal is received.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let router = create_router(self.exporter, &self.metrics_path);

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;

        info!(
            addr = %self.listen_addr,
            path = %self.metrics_path,
            "HTTP server listening"
        );

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            loop {
                if shutdown.changed().await.is_err() {
                    break;
                }
                if *shutdown.borrow() {
                    break;
                }
            }
            info!("HTTP server shutting down");
        })
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
