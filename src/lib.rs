//! Single-upstream HTTP reverse proxy library.

pub mod config;
pub mod http;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
