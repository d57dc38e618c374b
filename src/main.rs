//! revprox — single-upstream HTTP reverse proxy.
//!
//! Accepts inbound HTTP requests, rewrites them according to a fixed
//! configuration, forwards them to one configured origin, and rewrites
//! the response before returning it to the client.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                   REVPROX                      │
//!                      │                                                │
//!     Client Request   │  ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//!     ─────────────────┼─▶│ security │──▶│   http   │──▶│ upstream  │──┼──▶ Origin
//!                      │  │auth gate │   │ director │   │  client   │  │
//!                      │  └──────────┘   └──────────┘   └───────────┘  │
//!                      │                                                │
//!     Client Response  │  ┌──────────┐                                  │
//!     ◀────────────────┼──│ response │◀─────────────────────────────────┼──── Origin
//!                      │  │ rewriter │                                  │
//!                      │  └──────────┘                                  │
//!                      │                                                │
//!                      │  ┌──────────────────────────────────────────┐  │
//!                      │  │     config (flags or TOML, validated)    │  │
//!                      │  └──────────────────────────────────────────┘  │
//!                      └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revprox::config::loader::{load_config, ConfigError};
use revprox::config::validation::validate_config;
use revprox::config::ProxyConfig;
use revprox::http::HttpServer;

#[derive(Parser)]
#[command(name = "revprox", version, about = "Single-upstream HTTP reverse proxy")]
struct Cli {
    /// Listen address and port.
    #[arg(long, default_value = "0.0.0.0:8080")]
    addr: String,

    /// Target upstream URL.
    #[arg(long, default_value = "http://localhost")]
    target: String,

    /// Override the Host header sent to the upstream.
    #[arg(long)]
    host: Option<String>,

    /// Override the User-Agent header sent to the upstream.
    #[arg(long)]
    user_agent: Option<String>,

    /// Override the request path.
    #[arg(long)]
    path: Option<String>,

    /// Strip the request path (outbound path is always "/").
    #[arg(long)]
    strip_uri: bool,

    /// Extra comma-separated "Name:Value" request headers to send to
    /// the upstream.
    #[arg(long, default_value = "")]
    extra_request: String,

    /// Extra comma-separated "Name:Value" response headers to send back
    /// to the client.
    #[arg(long, default_value = "")]
    extra_response: String,

    /// HTTP basic auth realm (frontend).
    #[arg(long, default_value = "Restricted")]
    auth_realm: String,

    /// HTTP basic auth username (frontend).
    #[arg(long = "auth-user", default_value = "admin")]
    auth_username: String,

    /// HTTP basic auth password (frontend, empty disables auth).
    #[arg(long = "auth-pass", default_value = "")]
    auth_password: String,

    /// Hide the upstream server identity in responses.
    #[arg(long)]
    hide_server: bool,

    /// Send a no-cache header in responses.
    #[arg(long)]
    no_cache: bool,

    /// Enable access logging of each outbound request.
    #[arg(long)]
    access_log: bool,

    /// Skip upstream TLS certificate verification.
    #[arg(long)]
    insecure_tls: bool,

    /// Upstream connect timeout in seconds.
    #[arg(long, default_value_t = 5)]
    connect_timeout: u64,

    /// Whole-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    request_timeout: u64,

    /// Load the full configuration from a TOML file instead of flags.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = self.addr;
        config.upstream.origin = self.target;
        config.upstream.connect_timeout_secs = self.connect_timeout;
        config.upstream.request_timeout_secs = self.request_timeout;
        config.upstream.insecure_tls = self.insecure_tls;
        config.rewrite.host = self.host;
        config.rewrite.user_agent = self.user_agent;
        config.rewrite.path = self.path;
        config.rewrite.strip_uri = self.strip_uri;
        config.rewrite.extra_headers = self.extra_request;
        config.response.hide_server = self.hide_server;
        config.response.no_cache = self.no_cache;
        config.response.extra_headers = self.extra_response;
        config.auth.realm = self.auth_realm;
        config.auth.username = self.auth_username;
        config.auth.password = self.auth_password;
        config.observability.access_log = self.access_log;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revprox=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // A config file is authoritative; the per-field flags build the
    // same structure otherwise. Both paths are validated identically.
    let config = if let Some(path) = cli.config.clone() {
        load_config(&path)?
    } else {
        let config = cli.into_config();
        validate_config(&config).map_err(ConfigError::Validation)?;
        config
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.upstream.origin,
        auth = !config.auth.password.is_empty(),
        access_log = config.observability.access_log,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
