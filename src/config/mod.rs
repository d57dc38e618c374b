//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags ──┐
//!             ├─→ ProxyConfig
//! TOML file ──┘      → validation.rs (semantic checks)
//!                    → compiled pipeline pieces (AuthGate, Director, ...)
//!                    → shared via Arc to all request tasks
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ProxyConfig;
pub use validation::{validate_config, ValidationError};
