// src/lib.rs

/// The version of the running binary, compared against `elc_min_version`
/// in workspace configurations.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
