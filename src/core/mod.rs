// src/core/mod.rs

pub mod component;
pub mod context;
pub mod workspace;
