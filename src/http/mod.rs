//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, auth gate, forwarding)
//!     → request.rs (rewrite head: scheme, host, query, path, headers)
//!     → [upstream client call]
//!     → response.rs (rewrite headers: Server, Cache-Control, extras)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{single_joining_slash, Director};
pub use response::{ResponseRewriter, SERVER_STRING};
pub use server::HttpServer;
