// crates/neptune-store-sqlite/src/lib.rs
// ============================================================================
// Module: Neptune SQLite Store
// Description: Execution capability backed by SQLite.
// Purpose: Run compiled Neptune statements against an embedded database.
// Dependencies: neptune-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides [`SqliteExecutor`], an [`neptune_core::Executor`]
//! over a single `rusqlite` connection. Pair it with a driver validated for
//! [`neptune_core::Dialect::Sqlite`] so the generated DDL and literals match
//! the engine.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteExecutor;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
