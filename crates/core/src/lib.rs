//! stubmap-core
//!
//! Core library for classifying the functions of a disassembled executable into
//! library stubs, startup artifacts to skip, and application code to recompile.
//!
//! This crate defines the function model, the name heuristics and thunk policy,
//! selector disambiguation, listing loaders standing in for the analysis platform,
//! and rendering of the recompiler config and function map.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends (CLI, disassembler plugins, etc.).

pub mod analysis;
pub mod config;
pub mod model;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
