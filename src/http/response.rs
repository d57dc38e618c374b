//! Response rewriting.
//!
//! # Responsibilities
//! - Transform the upstream response for the client
//! - Advertise or hide the proxy in the Server header
//! - Force Cache-Control and apply configured extra headers
//!
//! # Design Decisions
//! - Streaming responses avoid buffering the entire body
//! - Header mutation happens once, before the body starts flowing
//! - Appending (not replacing) Server keeps the origin identity visible

use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::schema::ResponseConfig;
use crate::config::validation::{parse_header_pairs, ValidationError};

/// Identity advertised in the Server header.
pub const SERVER_STRING: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Compiled response-header rewriter, built once at startup.
pub struct ResponseRewriter {
    server: HeaderValue,
    hide_server: bool,
    no_cache: bool,
    extra_headers: Vec<(axum::http::HeaderName, HeaderValue)>,
}

impl ResponseRewriter {
    /// Compile the rewriter from configuration.
    pub fn from_config(config: &ResponseConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            server: HeaderValue::from_static(SERVER_STRING),
            hide_server: config.hide_server,
            no_cache: config.no_cache,
            extra_headers: parse_header_pairs(&config.extra_headers)?,
        })
    }

    /// Mutate the upstream response headers before they reach the client.
    pub fn apply(&self, headers: &mut HeaderMap) {
        if self.hide_server {
            headers.insert(header::SERVER, self.server.clone());
        } else {
            headers.append(header::SERVER, self.server.clone());
        }

        if self.no_cache {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        }

        for (name, value) in &self.extra_headers {
            headers.insert(name.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter(mutate: impl FnOnce(&mut ResponseConfig)) -> ResponseRewriter {
        let mut config = ResponseConfig::default();
        mutate(&mut config);
        ResponseRewriter::from_config(&config).unwrap()
    }

    #[test]
    fn test_server_identity_appended_by_default() {
        let rewriter = rewriter(|_| {});
        let mut headers = HeaderMap::new();
        headers.insert(header::SERVER, "nginx".parse().unwrap());
        rewriter.apply(&mut headers);

        let values: Vec<_> = headers.get_all(header::SERVER).iter().collect();
        assert_eq!(values, vec!["nginx", SERVER_STRING]);
    }

    #[test]
    fn test_server_identity_replaces_when_hidden() {
        let rewriter = rewriter(|c| c.hide_server = true);
        let mut headers = HeaderMap::new();
        headers.insert(header::SERVER, "nginx".parse().unwrap());
        rewriter.apply(&mut headers);

        let values: Vec<_> = headers.get_all(header::SERVER).iter().collect();
        assert_eq!(values, vec![SERVER_STRING]);
    }

    #[test]
    fn test_server_identity_set_when_origin_sent_none() {
        let rewriter = rewriter(|_| {});
        let mut headers = HeaderMap::new();
        rewriter.apply(&mut headers);
        assert_eq!(headers.get(header::SERVER).unwrap(), SERVER_STRING);
    }

    #[test]
    fn test_no_cache_overwrites_origin_value() {
        let rewriter = rewriter(|c| c.no_cache = true);
        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, "max-age=3600".parse().unwrap());
        rewriter.apply(&mut headers);
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-cache");
    }

    #[test]
    fn test_cache_control_untouched_without_no_cache() {
        let rewriter = rewriter(|_| {});
        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, "max-age=3600".parse().unwrap());
        rewriter.apply(&mut headers);
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "max-age=3600");
    }

    #[test]
    fn test_extra_headers_overwrite_and_are_idempotent() {
        let rewriter = rewriter(|c| {
            c.hide_server = true;
            c.extra_headers = "X-Frame-Options:DENY,X-Robots-Tag:noindex".to_string();
        });
        let mut headers = HeaderMap::new();
        headers.insert("x-frame-options", "SAMEORIGIN".parse().unwrap());
        rewriter.apply(&mut headers);
        rewriter.apply(&mut headers);

        let frame: Vec<_> = headers.get_all("x-frame-options").iter().collect();
        assert_eq!(frame, vec!["DENY"]);
        assert_eq!(headers.get("x-robots-tag").unwrap(), "noindex");
        // Applying twice must not duplicate the Server value either,
        // because hide_server uses insert.
        let server: Vec<_> = headers.get_all(header::SERVER).iter().collect();
        assert_eq!(server, vec![SERVER_STRING]);
    }
}
