//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files;
//! the CLI builds the same structure from flags.

use serde::{Deserialize, Serialize};

/// Root configuration for the reverse proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream origin and transport settings.
    pub upstream: UpstreamConfig,

    /// Outbound request rewriting rules.
    pub rewrite: RewriteConfig,

    /// Response header rewriting rules.
    pub response: ResponseConfig,

    /// Frontend HTTP Basic Auth settings.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream origin configuration.
///
/// Exactly one origin per process; every inbound request is forwarded
/// to it after rewriting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin URL. Must have an http/https scheme and a non-empty host.
    /// The origin's path and query participate in request rewriting.
    pub origin: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Whole-request timeout (request + response) in seconds.
    pub request_timeout_secs: u64,

    /// Skip upstream TLS certificate and hostname verification.
    /// Off by default; intended for self-signed or internal origins.
    pub insecure_tls: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            insecure_tls: false,
        }
    }
}

/// Outbound request rewriting rules.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RewriteConfig {
    /// Host header override sent to the upstream. When unset, the
    /// inbound Host header is forwarded untouched.
    pub host: Option<String>,

    /// User-Agent override. When unset and the inbound request carries
    /// no User-Agent, an empty one is sent so the transport cannot
    /// inject a default.
    pub user_agent: Option<String>,

    /// Path override. Joined onto the origin path like an inbound path.
    pub path: Option<String>,

    /// Force the outbound path to "/" regardless of inbound path and
    /// path override.
    pub strip_uri: bool,

    /// Extra request headers in "Name:Value,Name:Value" form. Each pair
    /// overwrites any existing header of the same name. Parsed and
    /// validated at startup.
    pub extra_headers: String,
}

/// Response header rewriting rules.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResponseConfig {
    /// Replace the origin's Server header with this proxy's identity
    /// instead of appending alongside it.
    pub hide_server: bool,

    /// Force `Cache-Control: no-cache` on every response.
    pub no_cache: bool,

    /// Extra response headers in "Name:Value,Name:Value" form.
    pub extra_headers: String,
}

/// Frontend HTTP Basic Auth configuration.
///
/// The gate is enforced only when realm, username and password are all
/// non-empty. Credentials are checked at the proxy frontend and never
/// relayed upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Realm announced in the WWW-Authenticate challenge.
    pub realm: String,

    /// Expected username.
    pub username: String,

    /// Expected password. Empty disables the gate.
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            realm: "Restricted".to_string(),
            username: "admin".to_string(),
            password: String::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Dump each fully-rewritten outbound request (head + body) to the
    /// log before it is sent.
    pub access_log: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.upstream.origin, "http://localhost");
        assert_eq!(config.auth.realm, "Restricted");
        assert_eq!(config.auth.username, "admin");
        assert!(config.auth.password.is_empty());
        assert!(!config.rewrite.strip_uri);
        assert!(!config.response.hide_server);
        assert!(!config.upstream.insecure_tls);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [upstream]
            origin = "https://internal.example:8443/base"
            "#,
        )
        .unwrap();
        assert_eq!(config.upstream.origin, "https://internal.example:8443/base");
        assert_eq!(config.upstream.connect_timeout_secs, 5);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_full_toml_round_trip() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [upstream]
            origin = "http://backend:3000"
            insecure_tls = true

            [rewrite]
            host = "backend.internal"
            strip_uri = true
            extra_headers = "X-Forwarded-Proto:https"

            [response]
            hide_server = true
            no_cache = true

            [auth]
            realm = "Staging"
            username = "ops"
            password = "hunter2"

            [observability]
            access_log = true
            "#,
        )
        .unwrap();
        assert_eq!(config.rewrite.host.as_deref(), Some("backend.internal"));
        assert!(config.rewrite.strip_uri);
        assert!(config.response.hide_server);
        assert_eq!(config.auth.realm, "Staging");
        assert!(config.observability.access_log);
    }
}
