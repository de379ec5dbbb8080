// crates/neptune-core/src/lib.rs
// ============================================================================
// Module: Neptune Core Library
// Description: Public API surface for the Neptune record mapper.
// Purpose: Expose schemas, cells, queries, the SQL compiler, and connections.
// Dependencies: crate::{compiler, connection, dialect, entity, fetch, query, registry, ...}
// ============================================================================

//! ## Overview
//! Neptune maps typed record structs to relational rows and back. Schemas
//! are declared with [`entity!`] (or built by hand), validated together by a
//! [`SchemaRegistry`], and then used through a [`Connection`] that owns an
//! [`Executor`]. Queries are structured values compiled to SQL text by pure
//! functions in [`compiler`]; the fetch engine hydrates rows back into
//! records and resolves one-to-one relations one hop per request.
//!
//! Security posture: the compiler inlines literals into SQL text with quote
//! escaping only. Values from untrusted sources should be validated before
//! they reach a query.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod compiler;
pub mod connection;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod executor;
mod fetch;
pub mod instance_key;
pub mod logging;
pub mod predicate;
pub mod query;
pub mod record;
pub mod registry;
pub mod schema;
pub mod value;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compiler::compile_create_table;
pub use compiler::compile_delete;
pub use compiler::compile_insert;
pub use compiler::compile_predicate;
pub use compiler::compile_select;
pub use compiler::compile_update;
pub use connection::Connection;
pub use dialect::Dialect;
pub use entity::Entity;
pub use error::NeptuneError;
pub use error::NeptuneResult;
pub use error::StoreError;
pub use executor::Executor;
pub use executor::Row;
pub use logging::FileLogSink;
pub use logging::LogEvent;
pub use logging::LogLevel;
pub use logging::LogSink;
pub use logging::NoopLogSink;
pub use logging::StderrLogSink;
pub use predicate::CompareOp;
pub use predicate::Comparison;
pub use predicate::LogicOp;
pub use predicate::Predicate;
pub use query::OrderBy;
pub use query::OrderDirection;
pub use query::Query;
pub use record::Record;
pub use record::RelationCell;
pub use registry::Driver;
pub use registry::SchemaRegistry;
pub use schema::ColumnDescriptor;
pub use schema::ColumnKind;
pub use schema::EntitySchema;
pub use schema::EntitySchemaBuilder;
pub use schema::INSTANCE_KEY_COLUMN;
pub use schema::RelationDescriptor;
pub use schema::RelationDirection;
pub use value::Cell;
pub use value::ColumnValue;
pub use value::Value;
