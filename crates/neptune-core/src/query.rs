// crates/neptune-core/src/query.rs
// ============================================================================
// Module: Query Descriptors
// Description: Fluent query builder over predicate trees.
// Purpose: Carry filtering, ordering, pagination, and projection into the compiler.
// Dependencies: crate::{predicate, value}
// ============================================================================

//! ## Overview
//! A [`Query`] bundles an optional predicate tree, an ordered list of
//! [`OrderBy`] entries, independent limit/offset values, and an optional
//! projection of columns and relations. Builder methods consume and return
//! the query so calls chain naturally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::predicate::Comparison;
use crate::predicate::Predicate;
use crate::predicate::fold_and;
use crate::value::Value;

// ============================================================================
// SECTION: Ordering
// ============================================================================

/// Sort direction of an order-by entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One order-by entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    /// Column name.
    pub column: String,
    /// Direction.
    pub direction: OrderDirection,
}

// ============================================================================
// SECTION: Query
// ============================================================================

/// Structured query description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Root of the WHERE tree.
    predicate: Option<Predicate>,
    /// Order-by entries in application order.
    order_by: Vec<OrderBy>,
    /// Optional row limit.
    limit: Option<u64>,
    /// Optional row offset.
    offset: Option<u64>,
    /// Explicitly projected columns; empty means every column.
    columns: BTreeSet<String>,
    /// Relations to resolve.
    relations: BTreeSet<String>,
    /// Caller confirmed a predicate-less update or delete.
    unconditional: bool,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a comparison, folded under AND with any existing predicate.
    #[must_use]
    pub fn where_clause(
        self,
        column: impl Into<String>,
        operator: impl Into<String>,
        literal: impl Into<Value>,
    ) -> Self {
        self.where_tree(Comparison::new(column, operator, literal))
    }

    /// Adds a predicate tree, folded under AND with any existing predicate.
    #[must_use]
    pub fn where_tree(mut self, predicate: impl Into<Predicate>) -> Self {
        self.predicate = Some(fold_and(self.predicate.take(), predicate.into()));
        self
    }

    /// Appends an order-by entry.
    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by.push(OrderBy {
            column: column.into(),
            direction,
        });
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the row offset.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Adds a column to the projection.
    #[must_use]
    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.columns.insert(column.into());
        self
    }

    /// Adds several columns to the projection.
    #[must_use]
    pub fn select_all<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Requests resolution of a relation.
    #[must_use]
    pub fn relation(mut self, key: impl Into<String>) -> Self {
        self.relations.insert(key.into());
        self
    }

    /// Requests resolution of several relations.
    #[must_use]
    pub fn relations<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Confirms that an update or delete without a predicate is intended.
    #[must_use]
    pub fn confirm_unconditional(mut self) -> Self {
        self.unconditional = true;
        self
    }

    /// Returns the predicate root.
    #[must_use]
    pub const fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// Returns the order-by entries.
    #[must_use]
    pub fn order_entries(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// Returns the limit.
    #[must_use]
    pub const fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    /// Returns the offset.
    #[must_use]
    pub const fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// Returns the explicitly projected columns.
    #[must_use]
    pub const fn projected_columns(&self) -> &BTreeSet<String> {
        &self.columns
    }

    /// Returns the requested relations.
    #[must_use]
    pub const fn requested_relations(&self) -> &BTreeSet<String> {
        &self.relations
    }

    /// Returns true when the caller confirmed an unconditional mutation.
    #[must_use]
    pub const fn is_unconditional(&self) -> bool {
        self.unconditional
    }
}
