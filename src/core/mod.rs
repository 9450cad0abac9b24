// src/core/mod.rs

//! Classification, planning and plan execution.

pub mod classify;
pub mod config_loader;
pub mod planner;
pub mod workflow;
