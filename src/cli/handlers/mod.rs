// src/cli/handlers/mod.rs

pub mod commons;

pub mod clone;
pub mod compose;
pub mod exec;
pub mod list;
pub mod restart;
pub mod start;
pub mod stop;
pub mod vars;
pub mod wrap;
