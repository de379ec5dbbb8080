// crates/neptune-core/src/executor.rs
// ============================================================================
// Module: Execution Capability
// Description: Trait boundary between the core and a concrete SQL driver.
// Purpose: Let the fetch engine run SQL without depending on a driver crate.
// Dependencies: crate::error
// ============================================================================

//! ## Overview
//! An [`Executor`] runs SQL text and returns rows of string-keyed values.
//! Values arrive in their textual form; `None` is the wire-level null marker,
//! so an empty string is always an empty text value. Implementations are not
//! required to be thread-safe beyond `Send`: the connection handle serializes
//! all access behind its own mutex.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::error::StoreError;

// ============================================================================
// SECTION: Rows
// ============================================================================

/// One result row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Column values in text form; `None` is SQL `NULL`.
    values: BTreeMap<String, Option<String>>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Builds a row from `(column, value)` pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(column, value)| (column.into(), value.map(Into::into)))
                .collect(),
        }
    }

    /// Stores a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: Option<String>) {
        self.values.insert(column.into(), value);
    }

    /// Looks up a column.
    ///
    /// The outer `Option` is column presence, the inner one is SQL `NULL`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<Option<&str>> {
        self.values.get(column).map(Option::as_deref)
    }

    /// Returns true when the row carries the column.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// SQL execution capability consumed by the core.
pub trait Executor: Send {
    /// Executes a statement that produces no rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the driver rejects the statement.
    fn execute(&mut self, sql: &str) -> Result<(), StoreError>;

    /// Executes a query and returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the driver rejects the statement.
    fn execute_query(&mut self, sql: &str) -> Result<Vec<Row>, StoreError>;

    /// Releases the underlying resource.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the driver fails to close.
    fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&mut self, sql: &str) -> Result<(), StoreError> {
        (**self).execute(sql)
    }

    fn execute_query(&mut self, sql: &str) -> Result<Vec<Row>, StoreError> {
        (**self).execute_query(sql)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        (**self).close()
    }
}
