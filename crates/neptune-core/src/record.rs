// crates/neptune-core/src/record.rs
// ============================================================================
// Module: Records
// Description: Schema-driven generic entity instances.
// Purpose: Hold column and relation cells for the compiler and fetch engine.
// Dependencies: crate::{error, schema, value}
// ============================================================================

//! ## Overview
//! A [`Record`] is the generic form of an entity instance: one [`Cell`] per
//! schema column (indexed by declaration position), one [`RelationCell`] per
//! relation, and the hidden instance key. Typed entities declared with
//! [`crate::entity!`] convert to and from records; the compiler and fetch
//! engine only ever see records.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::error::NeptuneError;
use crate::error::NeptuneResult;
use crate::instance_key::is_well_formed;
use crate::schema::EntitySchema;
use crate::schema::INSTANCE_KEY_LENGTH;
use crate::value::Cell;
use crate::value::Value;

/// Cell holding a shared reference to a related record.
pub type RelationCell = Cell<Arc<Record>>;

// ============================================================================
// SECTION: Record
// ============================================================================

/// Generic entity instance.
///
/// # Invariants
/// - `values.len()` equals the schema's column count.
/// - `relations.len()` equals the schema's relation count.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Shared schema of the record type.
    schema: Arc<EntitySchema>,
    /// Column cells by declaration position.
    values: Vec<Cell<Value>>,
    /// Relation cells by declaration position.
    relations: Vec<RelationCell>,
    /// Hidden instance key.
    instance_key: Cell<String>,
}

impl Record {
    /// Creates a record with every cell undefined.
    #[must_use]
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        let values = vec![Cell::Undefined; schema.columns().len()];
        let relations = vec![Cell::Undefined; schema.relations().len()];
        Self {
            schema,
            values,
            relations,
            instance_key: Cell::Undefined,
        }
    }

    /// Returns the record's schema.
    #[must_use]
    pub const fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        self.schema.table()
    }

    // ------------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------------

    /// Sets a column value.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown columns, values of
    /// the wrong type, or text exceeding the column bound.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> NeptuneResult<()> {
        self.assign(name, Cell::Present(value.into()))
    }

    /// Sets a column to null.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown columns.
    pub fn set_null(&mut self, name: &str) -> NeptuneResult<()> {
        self.assign(name, Cell::Null)
    }

    /// Forces a column back to undefined.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown columns.
    pub fn set_undefined(&mut self, name: &str) -> NeptuneResult<()> {
        self.assign(name, Cell::Undefined)
    }

    /// Replaces a column cell after validating it against the schema.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown columns, values of
    /// the wrong type, or text exceeding the column bound.
    pub fn assign(&mut self, name: &str, cell: Cell<Value>) -> NeptuneResult<()> {
        let (index, column) = self.schema.require_column(name)?;
        if let Cell::Present(value) = &cell {
            if !column.kind.accepts(value) {
                return Err(NeptuneError::invalid(format!(
                    "column [{name}] does not accept {} values",
                    value.type_name()
                )));
            }
            if let (Some(max_length), Value::Text(text)) = (column.kind.max_length(), value)
                && text.chars().count() > max_length
            {
                return Err(NeptuneError::invalid(format!(
                    "value for column [{name}] exceeds max length {max_length}"
                )));
            }
        }
        self.values[index] = cell;
        Ok(())
    }

    /// Parses and stores the store's text form of a column.
    ///
    /// `None` is the wire-level null marker.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown columns and
    /// [`NeptuneError::Runtime`] when the text does not parse.
    pub fn set_value_from_string(&mut self, name: &str, raw: Option<&str>) -> NeptuneResult<()> {
        let (index, column) = self.schema.require_column(name)?;
        let cell = match raw {
            None => Cell::Null,
            Some(text) => Cell::Present(
                column
                    .kind
                    .parse(text)
                    .map_err(|err| NeptuneError::runtime(format!("column [{name}]: {err}")))?,
            ),
        };
        self.values[index] = cell;
        Ok(())
    }

    /// Returns a column cell.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown columns.
    pub fn cell(&self, name: &str) -> NeptuneResult<&Cell<Value>> {
        let (index, _) = self.schema.require_column(name)?;
        Ok(&self.values[index])
    }

    /// Reads a column value; `None` means null.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown columns and
    /// [`NeptuneError::Runtime`] when the cell is undefined.
    pub fn get(&self, name: &str) -> NeptuneResult<Option<&Value>> {
        self.cell(name)?
            .get()
            .map_err(|_| NeptuneError::runtime(format!("column [{name}] is undefined")))
    }

    /// Returns true when the column was never set.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown columns.
    pub fn is_undefined(&self, name: &str) -> NeptuneResult<bool> {
        Ok(self.cell(name)?.is_undefined())
    }

    /// Returns true when the column is null.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown columns.
    pub fn is_null(&self, name: &str) -> NeptuneResult<bool> {
        Ok(self.cell(name)?.is_null())
    }

    /// Iterates column descriptors paired with their cells.
    pub fn columns(
        &self,
    ) -> impl Iterator<Item = (&crate::schema::ColumnDescriptor, &Cell<Value>)> + '_ {
        self.schema.columns().iter().zip(self.values.iter())
    }

    // ------------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------------

    /// Returns a relation cell.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown relations.
    pub fn relation(&self, key: &str) -> NeptuneResult<&RelationCell> {
        let (index, _) = self.schema.require_relation(key)?;
        Ok(&self.relations[index])
    }

    /// Replaces a relation cell.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown relations or a
    /// peer from the wrong table.
    pub fn assign_relation(&mut self, key: &str, cell: RelationCell) -> NeptuneResult<()> {
        let (index, relation) = self.schema.require_relation(key)?;
        if let Cell::Present(peer) = &cell
            && peer.table() != relation.target_table
        {
            return Err(NeptuneError::invalid(format!(
                "relation [{key}] expects a [{}] record, found [{}]",
                relation.target_table,
                peer.table()
            )));
        }
        self.relations[index] = cell;
        Ok(())
    }

    /// Links a peer record.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown relations or a
    /// peer from the wrong table.
    pub fn set_relation(&mut self, key: &str, peer: Arc<Self>) -> NeptuneResult<()> {
        self.assign_relation(key, Cell::Present(peer))
    }

    /// Sets a relation to null.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown relations.
    pub fn set_relation_null(&mut self, key: &str) -> NeptuneResult<()> {
        self.assign_relation(key, Cell::Null)
    }

    /// Forces a relation back to undefined.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unknown relations.
    pub fn set_relation_undefined(&mut self, key: &str) -> NeptuneResult<()> {
        self.assign_relation(key, Cell::Undefined)
    }

    /// Iterates relation descriptors paired with their cells.
    pub fn relations(
        &self,
    ) -> impl Iterator<Item = (&crate::schema::RelationDescriptor, &RelationCell)> + '_ {
        self.schema.relations().iter().zip(self.relations.iter())
    }

    // ------------------------------------------------------------------------
    // Instance key
    // ------------------------------------------------------------------------

    /// Returns the hidden instance key cell.
    #[must_use]
    pub const fn instance_key(&self) -> &Cell<String> {
        &self.instance_key
    }

    /// Sets the hidden instance key.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] when the key is not a
    /// hyphenated hex key of [`INSTANCE_KEY_LENGTH`] characters.
    pub fn set_instance_key(&mut self, key: impl Into<String>) -> NeptuneResult<()> {
        let key = key.into();
        if !is_well_formed(&key) {
            return Err(NeptuneError::invalid(format!(
                "instance key must be a {INSTANCE_KEY_LENGTH}-character hyphenated hex key"
            )));
        }
        self.instance_key = Cell::Present(key);
        Ok(())
    }

    /// Replaces the hidden instance key cell without validation.
    pub fn set_instance_key_cell(&mut self, cell: Cell<String>) {
        self.instance_key = cell;
    }
}
