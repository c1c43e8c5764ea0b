//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Compile route table → Bind listener → Serve
//!
//! Shutdown:
//!     Signal received → Stop accepting → Drain connections → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal with a non-zero exit
//! - Listener binds last, so traffic only arrives when routing is ready
//! - Shutdown is a broadcast: every long-running task observes one signal

pub mod shutdown;

pub use shutdown::Shutdown;
