// crates/neptune-core/src/schema.rs
// ============================================================================
// Module: Entity Schema
// Description: Column and relation descriptors for a record type.
// Purpose: Describe table layout once and share it across every instance.
// Dependencies: crate::{error, value}, serde
// ============================================================================

//! ## Overview
//! An [`EntitySchema`] is the ordered list of [`ColumnDescriptor`]s and
//! [`RelationDescriptor`]s for one table. Schemas are built once, wrapped in an
//! `Arc`, and treated as immutable for the lifetime of the driver. Every schema
//! also carries the hidden instance-key column named by
//! [`INSTANCE_KEY_COLUMN`], which is never part of the descriptor lists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::error::NeptuneError;
use crate::error::NeptuneResult;
use crate::value::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name of the hidden column correlating inserted rows and relations.
pub const INSTANCE_KEY_COLUMN: &str = "__instance_key";
/// Length of an instance key and of every relation foreign-key column.
pub const INSTANCE_KEY_LENGTH: usize = 36;
/// Largest accepted `VARCHAR` length.
pub const MAX_VARCHAR_LENGTH: usize = 65_535;

// ============================================================================
// SECTION: Columns
// ============================================================================

/// Storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Store-assigned unsigned identity.
    PrimaryUInt32,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Bounded text.
    Varchar {
        /// Maximum length in characters.
        max_length: usize,
    },
}

impl ColumnKind {
    /// Returns true when the value type fits this column kind.
    #[must_use]
    pub const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::PrimaryUInt32 | Self::UInt32, Value::UInt32(_))
                | (Self::Int32, Value::Int32(_))
                | (Self::Varchar { .. }, Value::Text(_))
        )
    }

    /// Returns the text bound for varchar columns.
    #[must_use]
    pub const fn max_length(self) -> Option<usize> {
        match self {
            Self::Varchar {
                max_length,
            } => Some(max_length),
            Self::PrimaryUInt32 | Self::Int32 | Self::UInt32 => None,
        }
    }

    /// Parses the store's text form of a value.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::Runtime`] when the text does not parse or a
    /// text value exceeds the column bound.
    pub fn parse(self, raw: &str) -> NeptuneResult<Value> {
        match self {
            Self::Int32 => raw
                .parse::<i32>()
                .map(Value::Int32)
                .map_err(|err| NeptuneError::runtime(format!("invalid int32 [{raw}]: {err}"))),
            Self::PrimaryUInt32 | Self::UInt32 => raw
                .parse::<u32>()
                .map(Value::UInt32)
                .map_err(|err| NeptuneError::runtime(format!("invalid uint32 [{raw}]: {err}"))),
            Self::Varchar {
                max_length,
            } => {
                if raw.chars().count() > max_length {
                    return Err(NeptuneError::runtime(format!(
                        "stored text exceeds varchar({max_length})"
                    )));
                }
                Ok(Value::Text(raw.to_string()))
            }
        }
    }
}

/// Descriptor of one column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, unique within the schema.
    pub name: String,
    /// Storage kind.
    pub kind: ColumnKind,
    /// Whether this column is the store-assigned identity.
    pub is_primary: bool,
    /// Whether the column accepts `NULL`.
    pub is_nullable: bool,
}

impl ColumnDescriptor {
    /// Creates a regular column descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ColumnKind, is_nullable: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            is_primary: false,
            is_nullable,
        }
    }

    /// Creates the auto-assigned unsigned primary key descriptor.
    #[must_use]
    pub fn primary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::PrimaryUInt32,
            is_primary: true,
            is_nullable: false,
        }
    }

    /// Returns true when an insert must supply a non-null value.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        !self.is_primary && !self.is_nullable
    }
}

// ============================================================================
// SECTION: Relations
// ============================================================================

/// Side of a one-to-one relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationDirection {
    /// Owns the foreign-key column holding the peer's instance key.
    Left,
    /// Owns no column and is resolved by reverse lookup.
    Right,
}

impl RelationDirection {
    /// Returns the direction the peer must declare.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Descriptor of one one-to-one relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationDescriptor {
    /// Relation key, unique within the schema and disjoint from column names.
    pub key: String,
    /// Table of the peer record type.
    pub target_table: String,
    /// Relation key declared on the peer.
    pub target_key: String,
    /// Side of the relation this schema holds.
    pub direction: RelationDirection,
}

impl RelationDescriptor {
    /// Creates a relation descriptor.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        target_table: impl Into<String>,
        target_key: impl Into<String>,
        direction: RelationDirection,
    ) -> Self {
        Self {
            key: key.into(),
            target_table: target_table.into(),
            target_key: target_key.into(),
            direction,
        }
    }

    /// Returns true when this side stores the foreign-key column.
    #[must_use]
    pub const fn owns_column(&self) -> bool {
        matches!(self.direction, RelationDirection::Left)
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Table layout shared by every instance of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Table name.
    table: String,
    /// Columns in declaration order.
    columns: Vec<ColumnDescriptor>,
    /// Relations in declaration order.
    relations: Vec<RelationDescriptor>,
}

impl EntitySchema {
    /// Creates a schema from complete descriptor lists.
    #[must_use]
    pub fn new(
        table: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
        relations: Vec<RelationDescriptor>,
    ) -> Self {
        Self {
            table: table.into(),
            columns,
            relations,
        }
    }

    /// Starts a schema builder for `table`.
    #[must_use]
    pub fn builder(table: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            schema: Self::new(table, Vec::new(), Vec::new()),
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Returns the relations in declaration order.
    #[must_use]
    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Looks up a relation by key.
    #[must_use]
    pub fn relation(&self, key: &str) -> Option<&RelationDescriptor> {
        self.relations.iter().find(|relation| relation.key == key)
    }

    /// Returns the primary key column, if one is declared.
    #[must_use]
    pub fn primary_key(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.is_primary)
    }

    /// Resolves a column, failing for unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] when the column is not declared.
    pub fn require_column(&self, name: &str) -> NeptuneResult<(usize, &ColumnDescriptor)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.name == name)
            .ok_or_else(|| {
                NeptuneError::invalid(format!("unknown column [{name}] on table [{}]", self.table))
            })
    }

    /// Resolves a relation, failing for unknown keys.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] when the relation is not declared.
    pub fn require_relation(&self, key: &str) -> NeptuneResult<(usize, &RelationDescriptor)> {
        self.relations
            .iter()
            .enumerate()
            .find(|(_, relation)| relation.key == key)
            .ok_or_else(|| {
                NeptuneError::invalid(format!("unknown relation [{key}] on table [{}]", self.table))
            })
    }
}

/// Incremental schema builder.
#[derive(Debug, Clone)]
pub struct EntitySchemaBuilder {
    /// Schema under construction.
    schema: EntitySchema,
}

impl EntitySchemaBuilder {
    /// Appends a column descriptor.
    #[must_use]
    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.schema.columns.push(column);
        self
    }

    /// Appends the auto-assigned primary key column.
    #[must_use]
    pub fn primary(self, name: impl Into<String>) -> Self {
        self.column(ColumnDescriptor::primary(name))
    }

    /// Appends a relation descriptor.
    #[must_use]
    pub fn relation(mut self, relation: RelationDescriptor) -> Self {
        self.schema.relations.push(relation);
        self
    }

    /// Finishes the schema.
    #[must_use]
    pub fn build(self) -> EntitySchema {
        self.schema
    }
}
