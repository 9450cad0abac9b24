// src/system/mod.rs

//! # System Interaction Layer
//!
//! This module provides abstractions for interacting with the world outside the process.
//! It serves as a boundary between the pure planning logic in `core` and the specifics of
//! process management, HTTP and the filesystem.
//!
//! ## Modules
//!
//! - **`executor`**: Spawns external processes on the tokio runtime, captures their output
//!   and masks secret arguments in everything it logs.
//! - **`git`**: Read-only branch and `git cherry` queries.
//! - **`themes_api`**: Lists the store's themes over the Admin REST API.
//! - **`themekit`**: Theme Kit download/create and the build-and-deploy command.
//! - **`workspace`**: The per-run scratch directory.

pub mod executor;
pub mod git;
pub mod themekit;
pub mod themes_api;
pub mod workspace;
