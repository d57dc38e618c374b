//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → basic_auth.rs (frontend credential gate)
//!     → Pass to request rewriting
//! ```
//!
//! # Design Decisions
//! - Fail closed: a request that does not satisfy the gate is answered
//!   with 401 and never forwarded
//! - No trust in client input

pub mod basic_auth;

pub use basic_auth::{AuthDecision, AuthGate};
