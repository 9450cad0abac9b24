// src/cli/handlers/mod.rs

//! Command handlers.

pub mod deploy;
