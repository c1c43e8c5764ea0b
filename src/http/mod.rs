//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, gateway handler)
//!     → routing (resolve path against route table snapshot)
//!     → dispatch (tag resolution or live upstream call)
//!     → JSON response {"server_tag": "<tag>"} or error status
//! ```

pub mod error;
pub mod server;

pub use error::GatewayError;
pub use server::{AppState, HttpServer};
