//! Frontend HTTP Basic Auth gate.
//!
//! # Responsibilities
//! - Extract credentials from the Authorization header (RFC 7617)
//! - Compare against the configured username/password
//! - Produce the WWW-Authenticate challenge on denial
//!
//! # Design Decisions
//! - Gate enabled only when realm, username and password are all non-empty
//! - Absent or malformed credentials are treated as empty, never skipped
//! - Password comparison is constant-time (subtle); username is plain equality

use axum::http::{header, HeaderMap, HeaderValue};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use subtle::ConstantTimeEq;

use crate::config::schema::AuthConfig;
use crate::config::validation::ValidationError;

/// Outcome of the auth check.
#[derive(Debug, Clone)]
pub enum AuthDecision {
    /// Request may proceed to the rewriter.
    Allowed,
    /// Request must be answered with 401 and this challenge value.
    Denied { challenge: HeaderValue },
}

/// Compiled Basic Auth gate, built once at startup.
pub struct AuthGate {
    credentials: Option<Credentials>,
}

struct Credentials {
    username: String,
    password: String,
    challenge: HeaderValue,
}

impl AuthGate {
    /// Compile the gate from configuration.
    ///
    /// The gate is disabled unless realm, username and password are all
    /// non-empty. A partially-filled auth section gets a startup warning
    /// so a typo does not silently leave the frontend open.
    pub fn from_config(auth: &AuthConfig) -> Result<Self, ValidationError> {
        if auth.realm.is_empty() || auth.username.is_empty() || auth.password.is_empty() {
            if !auth.password.is_empty() {
                tracing::warn!("auth password set but realm or username empty, basic auth disabled");
            }
            return Ok(Self { credentials: None });
        }

        let challenge = HeaderValue::from_str(&format!("Basic realm=\"{}\"", auth.realm))
            .map_err(|_| ValidationError::InvalidHeaderValue {
                name: "www-authenticate".to_string(),
            })?;

        Ok(Self {
            credentials: Some(Credentials {
                username: auth.username.clone(),
                password: auth.password.clone(),
                challenge,
            }),
        })
    }

    /// Whether the gate is enforced at all.
    pub fn enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Check the inbound request headers against the configured
    /// credentials.
    pub fn check(&self, headers: &HeaderMap) -> AuthDecision {
        let Some(expected) = &self.credentials else {
            return AuthDecision::Allowed;
        };

        let (username, password) = decode_credentials(headers);

        let username_ok = username == expected.username;
        let password_ok: bool = password
            .as_bytes()
            .ct_eq(expected.password.as_bytes())
            .into();

        if username_ok && password_ok {
            AuthDecision::Allowed
        } else {
            AuthDecision::Denied {
                challenge: expected.challenge.clone(),
            }
        }
    }
}

/// Extract username and password from an `Authorization: Basic` header.
///
/// Anything short of a well-formed header (missing, wrong scheme, bad
/// base64, non-UTF-8 payload, no colon) degrades to empty credentials so
/// the comparison still runs.
fn decode_credentials(headers: &HeaderMap) -> (String, String) {
    let empty = (String::new(), String::new());

    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return empty;
    };
    let Ok(value) = value.to_str() else {
        return empty;
    };

    const SCHEME: &str = "Basic ";
    if value.len() < SCHEME.len() || !value[..SCHEME.len()].eq_ignore_ascii_case(SCHEME) {
        return empty;
    }

    let Ok(decoded) = STANDARD.decode(&value[SCHEME.len()..]) else {
        return empty;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return empty;
    };

    match decoded.split_once(':') {
        Some((username, password)) => (username.to_string(), password.to_string()),
        None => empty,
    }
}
