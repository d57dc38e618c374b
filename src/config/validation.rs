//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the origin URL (scheme, host)
//! - Parse flat "Name:Value,Name:Value" header-pair strings
//! - Validate bind address and header overrides
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Header pairs split on the first `:` only, so values may themselves
//!   contain colons (URLs, timestamps)

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A semantic configuration error.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Bind address does not parse as `ip:port`.
    #[error("invalid bind address '{address}': {reason}")]
    InvalidBindAddress { address: String, reason: String },

    /// Origin URL failed to parse.
    #[error("invalid origin url '{url}': {reason}")]
    InvalidOrigin { url: String, reason: String },

    /// Origin URL scheme is not http or https.
    #[error("origin url '{url}' must use the http or https scheme")]
    UnsupportedScheme { url: String },

    /// Origin URL has no host component.
    #[error("origin url '{url}' is missing a host")]
    MissingHost { url: String },

    /// A header-pair entry did not split into name and value.
    #[error("malformed header pair '{entry}': expected 'Name:Value'")]
    MalformedHeaderPair { entry: String },

    /// A header-pair entry carries an invalid header name.
    #[error("invalid header name '{name}'")]
    InvalidHeaderName { name: String },

    /// A header value (pair entry or override) is not a legal value.
    #[error("invalid value for header '{name}'")]
    InvalidHeaderValue { name: String },
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::InvalidBindAddress {
            address: config.listener.bind_address.clone(),
            reason: e.to_string(),
        });
    }

    if let Err(e) = parse_origin(&config.upstream.origin) {
        errors.push(e);
    }

    if let Err(e) = parse_header_pairs(&config.rewrite.extra_headers) {
        errors.push(e);
    }
    if let Err(e) = parse_header_pairs(&config.response.extra_headers) {
        errors.push(e);
    }

    if let Some(host) = &config.rewrite.host {
        if HeaderValue::from_str(host).is_err() {
            errors.push(ValidationError::InvalidHeaderValue {
                name: "host".to_string(),
            });
        }
    }
    if let Some(user_agent) = &config.rewrite.user_agent {
        if HeaderValue::from_str(user_agent).is_err() {
            errors.push(ValidationError::InvalidHeaderValue {
                name: "user-agent".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse and check the origin URL.
///
/// The origin must carry an http/https scheme and a host; its path and
/// raw query feed the request rewriter.
pub fn parse_origin(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidOrigin {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        _ => {
            return Err(ValidationError::UnsupportedScheme {
                url: raw.to_string(),
            })
        }
    }

    if url.host_str().is_none() {
        return Err(ValidationError::MissingHost {
            url: raw.to_string(),
        });
    }

    Ok(url)
}

/// Parse a flat "Name:Value,Name:Value" header-pair string.
///
/// Splits each comma-separated entry on the first `:` only; an entry
/// with no `:` at all is a configuration error. An empty input yields
/// an empty list.
pub fn parse_header_pairs(
    raw: &str,
) -> Result<Vec<(HeaderName, HeaderValue)>, ValidationError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',')
        .map(|entry| {
            let (name, value) =
                entry
                    .split_once(':')
                    .ok_or_else(|| ValidationError::MalformedHeaderPair {
                        entry: entry.to_string(),
                    })?;
            let header_name =
                name.parse::<HeaderName>()
                    .map_err(|_| ValidationError::InvalidHeaderName {
                        name: name.to_string(),
                    })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| ValidationError::InvalidHeaderValue {
                    name: name.to_string(),
                })?;
            Ok((header_name, header_value))
        })
        .collect()
}
