//! Request rewriting.
//!
//! # Responsibilities
//! - Rewrite the inbound request head into the outbound request
//!   (scheme, authority, query merge, Host/User-Agent, path, extras)
//! - Join origin and inbound paths without doubled or missing slashes
//! - Render the outbound request for the access log
//!
//! # Design Decisions
//! - The rewriter is compiled once from config; per-request work is
//!   pure header/URI mutation with no allocation of config data
//! - The inbound Host header is forwarded untouched unless an override
//!   is configured (override, never reset)
//! - Query merge is literal concatenation; duplicate keys pass through

use axum::http::request::Parts;
use axum::http::uri::{Authority, Scheme, Uri};
use axum::http::{header, HeaderName, HeaderValue};

use crate::config::schema::ProxyConfig;
use crate::config::validation::{parse_header_pairs, parse_origin, ValidationError};

/// Compiled request rewriter ("director"), built once at startup.
pub struct Director {
    scheme: Scheme,
    authority: Authority,
    origin_path: String,
    origin_query: String,
    host_override: Option<HeaderValue>,
    user_agent_override: Option<HeaderValue>,
    path_override: Option<String>,
    strip_uri: bool,
    extra_headers: Vec<(HeaderName, HeaderValue)>,
}

impl Director {
    /// Compile the rewriter from configuration.
    ///
    /// Parses the origin URL and the extra-header pairs; any failure
    /// here is a startup error, never a per-request one.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ValidationError> {
        let origin = parse_origin(&config.upstream.origin)?;

        let scheme =
            Scheme::try_from(origin.scheme()).map_err(|_| ValidationError::UnsupportedScheme {
                url: config.upstream.origin.clone(),
            })?;

        let host = origin
            .host_str()
            .ok_or_else(|| ValidationError::MissingHost {
                url: config.upstream.origin.clone(),
            })?;
        let authority_raw = match origin.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = Authority::try_from(authority_raw.as_str()).map_err(|e| {
            ValidationError::InvalidOrigin {
                url: config.upstream.origin.clone(),
                reason: e.to_string(),
            }
        })?;

        let host_override = compile_override(config.rewrite.host.as_deref(), "host")?;
        let user_agent_override =
            compile_override(config.rewrite.user_agent.as_deref(), "user-agent")?;
        let extra_headers = parse_header_pairs(&config.rewrite.extra_headers)?;

        if config.rewrite.path.is_some() && config.rewrite.strip_uri {
            tracing::warn!("strip_uri set together with a path override, outbound path will always be /");
        }

        Ok(Self {
            scheme,
            authority,
            origin_path: origin.path().to_string(),
            origin_query: origin.query().unwrap_or("").to_string(),
            host_override,
            user_agent_override,
            path_override: config.rewrite.path.clone(),
            strip_uri: config.rewrite.strip_uri,
            extra_headers,
        })
    }

    /// Rewrite the request head in place into the outbound form.
    ///
    /// Steps are ordered; later steps read what earlier steps produced
    /// (the path override feeds the join unless strip_uri wins).
    pub fn rewrite(&self, parts: &mut Parts) -> Result<(), axum::http::Error> {
        // Host header: override only, never reset.
        if let Some(host) = &self.host_override {
            parts.headers.insert(header::HOST, host.clone());
        }

        // Merge raw queries; literal concatenation, no deduplication.
        let inbound_query = parts.uri.query().unwrap_or("");
        let query = if self.origin_query.is_empty() || inbound_query.is_empty() {
            format!("{}{}", self.origin_query, inbound_query)
        } else {
            format!("{}&{}", self.origin_query, inbound_query)
        };

        // Force an empty User-Agent when the client sent none, so the
        // transport cannot substitute its own default.
        if let Some(user_agent) = &self.user_agent_override {
            parts.headers.insert(header::USER_AGENT, user_agent.clone());
        } else if !parts.headers.contains_key(header::USER_AGENT) {
            parts
                .headers
                .insert(header::USER_AGENT, HeaderValue::from_static(""));
        }

        // Path: override replaces the inbound path, strip_uri wins over
        // both, and everything else is joined onto the origin path.
        let mut path = parts.uri.path().to_string();
        if let Some(override_path) = &self.path_override {
            path = override_path.clone();
        }
        let path = if self.strip_uri {
            "/".to_string()
        } else {
            single_joining_slash(&self.origin_path, &path)
        };

        let path_and_query = if query.is_empty() {
            path
        } else {
            format!("{path}?{query}")
        };

        parts.uri = Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query.as_str())
            .build()?;

        // Extra headers overwrite, in configured order.
        for (name, value) in &self.extra_headers {
            parts.headers.insert(name.clone(), value.clone());
        }

        Ok(())
    }
}

fn compile_override(
    value: Option<&str>,
    name: &str,
) -> Result<Option<HeaderValue>, ValidationError> {
    value
        .map(HeaderValue::from_str)
        .transpose()
        .map_err(|_| ValidationError::InvalidHeaderValue {
            name: name.to_string(),
        })
}

/// Join two path segments with exactly one `/` between them.
pub fn single_joining_slash(a: &str, b: &str) -> String {
    let a_slash = a.ends_with('/');
    let b_slash = b.starts_with('/');
    match (a_slash, b_slash) {
        (true, true) => format!("{}{}", a, &b[1..]),
        (false, false) => format!("{}/{}", a, b),
        _ => format!("{}{}", a, b),
    }
}

/// Render an outbound request head and body for the access log.
///
/// Lossy UTF-8 for the body keeps binary uploads loggable.
pub fn dump_request(parts: &Parts, body: &[u8]) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let _ = writeln!(out, "{} {} {:?}", parts.method, parts.uri, parts.version);
    for (name, value) in &parts.headers {
        let _ = writeln!(out, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
    }
    if !body.is_empty() {
        let _ = writeln!(out);
        out.push_str(&String::from_utf8_lossy(body));
    }
    out
}
