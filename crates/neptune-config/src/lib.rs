// crates/neptune-config/src/lib.rs
// ============================================================================
// Module: Neptune Config Library
// Description: Configuration model and validation for Neptune deployments.
// Purpose: Single source of truth for neptune.toml semantics.
// Dependencies: neptune-core, neptune-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `neptune-config` loads `neptune.toml`, validates it fail-closed, and turns
//! it into the pieces a Neptune application wires together: a log sink, a
//! schema registry for the configured dialect, and an `SQLite` executor.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
