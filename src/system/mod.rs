// src/system/mod.rs

pub mod executor;

pub use executor::{ExecutionError, Platform, RealPlatform};
