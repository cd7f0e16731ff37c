//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, remote address)
//! - Bind server to listener
//! - Answer every request with the forwarding metadata it carried

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::EchoConfig;
use crate::forwarded::{self, Extractor, ForwardedInfo};
use crate::http::middleware::remote_addr::{remote_addr_middleware, RemoteAddr, RemoteAddrState};
use crate::lifecycle::shutdown;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn Extractor>,
}

/// Body of every echo response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoResponse {
    /// Address recorded by the remote address middleware.
    pub remote_addr: Option<String>,
    #[serde(flatten)]
    pub forwarded: ForwardedInfo,
}

/// HTTP server that reports what a backend would learn about its clients.
pub struct EchoServer {
    router: Router,
    config: EchoConfig,
}

impl EchoServer {
    /// Create a new echo server with the given configuration.
    pub fn new(config: EchoConfig) -> Self {
        let extractor: Arc<dyn Extractor> = Arc::new(config.forwarded.extractor());
        tracing::debug!(extractor = ?extractor, "Forwarding strategy built");

        let router = Self::build_router(&config, extractor);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &EchoConfig, extractor: Arc<dyn Extractor>) -> Router {
        let remote_addr = RemoteAddrState::new(extractor.clone())
            .overwrite_empty(config.forwarded.overwrite_empty);

        Router::new()
            .route("/health", get(health_handler))
            .route("/", any(echo_handler))
            .route("/{*path}", any(echo_handler))
            .with_state(AppState { extractor })
            .layer(middleware::from_fn_with_state(remote_addr, remote_addr_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Router without a listener, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            strategy = ?self.config.forwarded.strategy,
            overwrite_empty = self.config.forwarded.overwrite_empty,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn echo_handler(State(state): State<AppState>, request: Request<Body>) -> impl IntoResponse {
    let info = forwarded::resolve(&*state.extractor, request.headers());
    let remote_addr = request
        .extensions()
        .get::<RemoteAddr>()
        .map(|addr| addr.0.clone());

    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        remote_addr = ?remote_addr,
        forwarded_for = %info.for_,
        "Echoing forwarding metadata"
    );
    metrics::record_echo(if info.for_.is_empty() { "peer" } else { "forwarded" });

    Json(EchoResponse {
        remote_addr,
        forwarded: info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    async fn echo(server: &EchoServer, headers: &[(&str, &str)]) -> EchoResponse {
        let mut builder = Request::builder().uri("/some/path");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let response = server
            .router()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_echo_default_policy() {
        let server = EchoServer::new(EchoConfig::default());
        let body = echo(
            &server,
            &[
                ("forwarded", "for=192.0.2.43;proto=https"),
                ("x-forwarded-host", "api.example.com"),
            ],
        )
        .await;
        assert_eq!(body.remote_addr.as_deref(), Some("192.0.2.43"));
        assert_eq!(body.forwarded.for_, "192.0.2.43");
        assert_eq!(body.forwarded.proto, "https");
        assert_eq!(body.forwarded.host, "api.example.com");
        assert_eq!(body.forwarded.by, "");
    }

    #[tokio::test]
    async fn test_echo_without_headers() {
        let server = EchoServer::new(EchoConfig::default());
        let body = echo(&server, &[]).await;
        // oneshot carries no ConnectInfo, so there is no peer to fall back to.
        assert_eq!(body, EchoResponse::default());
    }

    #[tokio::test]
    async fn test_echo_overwrite_empty() {
        let mut config = EchoConfig::default();
        config.forwarded.overwrite_empty = true;
        let server = EchoServer::new(config);
        let body = echo(&server, &[("x-forwarded-proto", "https")]).await;
        assert_eq!(body.remote_addr.as_deref(), Some(""));
        assert_eq!(body.forwarded.proto, "https");
    }

    #[tokio::test]
    async fn test_health() {
        let server = EchoServer::new(EchoConfig::default());
        let response = server
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }
}
