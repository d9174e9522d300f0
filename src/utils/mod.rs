//! Utility functions module
//!
//! Command execution shared by the service and supervisor code, and signal
//! handling for the HTTP server.

pub mod command;
pub mod signals;

// Re-export main functions
pub use command::{run_checked, run_logged, CommandLine};
pub use signals::shutdown_signal;
