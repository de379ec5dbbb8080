// crates/neptune-store-sqlite/tests/common/mod.rs
// ============================================================================
// Module: Common SQLite Test Fixtures
// Description: Sample entities and driver setup over the SQLite dialect.
// Purpose: Share schema declarations across the SQLite integration tests.
// Dependencies: neptune-core, neptune-store-sqlite
// ============================================================================

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use neptune_core::Connection;
use neptune_core::Dialect;
use neptune_core::Driver;
use neptune_core::NoopLogSink;
use neptune_core::SchemaRegistry;
use neptune_store_sqlite::SqliteExecutor;

// ============================================================================
// SECTION: Entities
// ============================================================================

neptune_core::entity! {
    /// Author owning at most one biography.
    pub struct Author("author") {
        columns {
            id: primary,
            name: varchar(32),
            born: int32 [nullable],
        }
        relations {
            biography: Biography => left("biography", "author"),
        }
    }
}

neptune_core::entity! {
    /// Biography written about one author.
    pub struct Biography("biography") {
        columns {
            id: primary,
            body: varchar(256) [nullable],
            pages: uint32 [nullable],
        }
        relations {
            author: Author => right("author", "biography"),
        }
    }
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Validates the sample schemas for the `SQLite` dialect.
pub fn driver() -> Arc<Driver> {
    let mut registry = SchemaRegistry::new(Dialect::Sqlite, Arc::new(NoopLogSink));
    registry.register::<Author>().register::<Biography>();
    Arc::new(registry.validate().unwrap())
}

/// Creates the tables through `executor` and wraps it in a connection.
pub fn connect(driver: &Arc<Driver>, mut executor: SqliteExecutor) -> Connection {
    driver.initialize(&mut executor).unwrap();
    driver.connect(Box::new(executor))
}

/// Opens an initialized in-memory connection.
pub fn memory_connection() -> Connection {
    connect(&driver(), SqliteExecutor::open_in_memory().unwrap())
}

/// Builds an author with a name and optional birth year.
pub fn author(name: &str, born: Option<i32>) -> Author {
    let mut author = Author::default();
    author.name.set(name.to_string());
    author.born = born.into();
    author
}
