//! HTTP server exposing the multi-target scrape endpoint.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::collector::OPENMETRICS_CONTENT_TYPE;
use crate::config::ScrapeConfig;
use crate::scrape::{fetch_budget, log_failure, require_target, scrape_target};

/// Application state shared across handlers. Read-only.
#[derive(Clone)]
struct AppState {
    metrics_path: String,
    scrape: ScrapeConfig,
}

/// Create the HTTP router.
fn create_router(metrics_path: &str, scrape: ScrapeConfig) -> Router {
    let state = AppState {
        metrics_path: metrics_path.to_string(),
        scrape,
    };

    Router::new()
        .route("/", get(landing_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for the landing page.
async fn landing_handler(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>dump1090 Exporter</title></head>\n\
         <body>\n\
         <h1>dump1090 Exporter</h1>\n\
         <p><a href=\"{path}?target=localhost:8080\">{path}?target=&lt;host:port&gt;</a></p>\n\
         </body>\n\
         </html>\n",
        path = state.metrics_path
    ))
}

/// Handler for the scrape endpoint.
///
/// If the collector disconnects, axum drops this future and the upstream
/// fetch with it.
async fn metrics_handler(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let target = first_target(&params);

    let result = match require_target(target) {
        Ok(target) => {
            let budget = fetch_budget(&headers, state.scrape.timeout_offset());
            scrape_target(target, budget).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(scrape) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)],
            scrape.body,
        )
            .into_response(),
        Err(e) => {
            log_failure(target, &e);
            e.into_response()
        }
    }
}

/// First `target` value in the query string. Later repeats are ignored.
fn first_target(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "target")
        .map(|(_, value)| value.as_str())
}

/// Handler for the /health endpoint.
async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

/// HTTP server configuration.
pub struct HttpServer {
    listen_addr: SocketAddr,
    metrics_path: String,
    scrape: ScrapeConfig,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(listen_addr: SocketAddr, metrics_path: String, scrape: ScrapeConfig) -> Self {
        Self {
            listen_addr,
            metrics_path,
            scrape,
        }
    }

    /// Run the HTTP server until the shutdown signal is received.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;

        self.serve(listener, shutdown).await
    }

    /// Run the HTTP server on an already bound listener.
    pub async fn serve(
        self,
        listener: tokio::net::TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let router = create_router(&self.metrics_path, self.scrape);

        info!(
            addr = %listener.local_addr().unwrap_or(self.listen_addr),
            path = %self.metrics_path,
            "HTTP server listening"
        );

        axum::serve(listener, router)
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
