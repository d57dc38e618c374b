//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, request timeout)
//! - Build the upstream client (connection pool, TLS, connect timeout)
//! - Orchestrate auth gate → request rewrite → forward → response rewrite
//! - Bind server to listener and serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_tls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::schema::{ProxyConfig, UpstreamConfig};
use crate::config::validation::ValidationError;
use crate::http::request::{dump_request, Director};
use crate::http::response::ResponseRewriter;
use crate::security::basic_auth::{AuthDecision, AuthGate};

/// Upstream client type: pooled hyper client over an HTTPS-capable
/// connector.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Error building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Semantic configuration problem surfaced while compiling the
    /// pipeline.
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    /// Upstream TLS connector could not be initialized.
    #[error("failed to initialize upstream TLS: {0}")]
    Tls(#[from] hyper_tls::native_tls::Error),
}

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGate>,
    pub director: Arc<Director>,
    pub rewriter: Arc<ResponseRewriter>,
    pub client: UpstreamClient,
    pub access_log: bool,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Every pipeline piece is compiled eagerly here; nothing is parsed
    /// or initialized lazily on the request path.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let auth = Arc::new(AuthGate::from_config(&config.auth)?);
        let director = Arc::new(Director::from_config(&config)?);
        let rewriter = Arc::new(ResponseRewriter::from_config(&config.response)?);
        let client = build_upstream_client(&config.upstream)?;

        let state = AppState {
            auth,
            director,
            rewriter,
            client,
            access_log: config.observability.access_log,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.upstream.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            origin = %self.config.upstream.origin,
            "HTTP server starting"
        );

        let app = self.router.into_make_service();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Build the pooled upstream client.
///
/// TLS verification is skipped only when `insecure_tls` is configured;
/// the connect timeout always applies.
fn build_upstream_client(upstream: &UpstreamConfig) -> Result<UpstreamClient, ServerError> {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(Duration::from_secs(upstream.connect_timeout_secs)));

    let tls = hyper_tls::native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(upstream.insecure_tls)
        .danger_accept_invalid_hostnames(upstream.insecure_tls)
        .build()?;

    let https = HttpsConnector::from((http, tls.into()));
    Ok(Client::builder(TokioExecutor::new()).build(https))
}

/// Main proxy handler.
/// Gates, rewrites and forwards the request, then rewrites the response.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    // 1. Frontend auth gate; nothing reaches the upstream on denial.
    if let AuthDecision::Denied { challenge } = state.auth.check(request.headers()) {
        return (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, challenge)],
            "Unauthorized",
        )
            .into_response();
    }

    let (mut parts, body) = request.into_parts();

    tracing::debug!(
        method = %parts.method,
        path = %parts.uri.path(),
        "Proxying request"
    );

    // 2. Rewrite the request head into its outbound form.
    if let Err(e) = state.director.rewrite(&mut parts) {
        tracing::error!(error = %e, "Failed to assemble outbound request");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to assemble outbound request",
        )
            .into_response();
    }

    // 3. Access log. Buffering lets the dump include the body while the
    //    same bytes are still forwarded; a failure here is logged and
    //    never aborts the request.
    let body = if state.access_log {
        match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => {
                tracing::info!(target: "revprox::access", "{}", dump_request(&parts, &bytes));
                Body::from(bytes)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read request body for access log");
                Body::empty()
            }
        }
    } else {
        body
    };

    // 4. Forward to the origin and rewrite the response headers; the
    //    response body streams through untouched.
    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            state.rewriter.apply(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(error = %e, "Upstream request failed");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
