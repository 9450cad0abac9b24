// src/lib.rs

//! themeship: branch-aware deployment of Shopify-style storefront themes.
//!
//! The crate is split the same way a run flows:
//! - [`system`] talks to git, the store API, Theme Kit and the filesystem,
//! - [`core`] classifies branches and theme names and decides what to do,
//! - [`cli`] wires both together behind the `themeship` binary.

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
