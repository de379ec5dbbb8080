// crates/neptune-core/src/fetch.rs
// ============================================================================
// Module: Fetch Engine
// Description: Statement execution, row hydration, and relation resolution.
// Purpose: Turn compiled SQL into records while holding one executor borrow.
// Dependencies: crate::{compiler, error, executor, instance_key, logging, query, record, registry}
// ============================================================================

//! ## Overview
//! A [`Fetcher`] pairs the driver's schemas with an executor that the caller
//! has already locked. Nested relation lookups reuse the same borrow, so a
//! top-level call never re-acquires the connection lock.
//!
//! Per fetch: compile, execute, then for each row hydrate the projected
//! columns and resolve the requested relations. A `Left` relation selects the
//! peer whose instance key equals this row's relation column; a `Right`
//! relation selects the peer whose relation column equals this row's
//! instance key. Nested fetches load every column and no relations, so one
//! call traverses one hop.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::compiler::compile_delete;
use crate::compiler::compile_insert;
use crate::compiler::compile_select;
use crate::compiler::compile_select_by;
use crate::compiler::compile_update;
use crate::error::NeptuneError;
use crate::error::NeptuneResult;
use crate::executor::Executor;
use crate::executor::Row;
use crate::instance_key;
use crate::logging::LogEvent;
use crate::logging::LogLevel;
use crate::query::Query;
use crate::record::Record;
use crate::record::RelationCell;
use crate::registry::Driver;
use crate::schema::EntitySchema;
use crate::schema::INSTANCE_KEY_COLUMN;
use crate::schema::RelationDescriptor;
use crate::schema::RelationDirection;
use crate::value::Cell;
use crate::value::Value;

// ============================================================================
// SECTION: Fetcher
// ============================================================================

/// Executes statements for one top-level operation.
pub(crate) struct Fetcher<'a> {
    /// Driver providing schemas, dialect, and log sink.
    driver: &'a Driver,
    /// Executor borrowed from the locked connection.
    executor: &'a mut dyn Executor,
}

impl<'a> Fetcher<'a> {
    /// Creates a fetcher over a locked executor.
    pub(crate) fn new(driver: &'a Driver, executor: &'a mut dyn Executor) -> Self {
        Self {
            driver,
            executor,
        }
    }

    // ------------------------------------------------------------------------
    // Raw execution
    // ------------------------------------------------------------------------

    /// Runs a statement that returns no rows.
    pub(crate) fn run_statement(&mut self, table: Option<&str>, sql: &str) -> NeptuneResult<()> {
        self.log("statement_executed", table, sql);
        self.executor.execute(sql)?;
        Ok(())
    }

    /// Runs a query and returns its rows.
    pub(crate) fn run_query(&mut self, table: Option<&str>, sql: &str) -> NeptuneResult<Vec<Row>> {
        self.log("query_executed", table, sql);
        Ok(self.executor.execute_query(sql)?)
    }

    /// Emits a debug event for a statement about to run.
    fn log(&self, event: &'static str, table: Option<&str>, sql: &str) {
        let mut entry = LogEvent::new(event, LogLevel::Debug).with_sql(sql);
        if let Some(table) = table {
            entry = entry.with_table(table);
        }
        self.driver.sink().record(&entry);
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Inserts a record and returns it as stored.
    ///
    /// A fresh instance key is assigned, the row is inserted, then reselected
    /// by that key to learn the store-assigned primary key. The caller's
    /// relation cells are carried onto the returned record.
    pub(crate) fn insert(&mut self, record: &Record) -> NeptuneResult<Record> {
        let schema = Arc::clone(record.schema());
        let key = instance_key::generate();
        let mut staged = record.clone();
        staged.set_instance_key(key.clone())?;
        let sql = compile_insert(&staged, self.driver.dialect())?;
        self.run_statement(Some(schema.table()), &sql)?;

        let reselect =
            compile_select_by(&schema, INSTANCE_KEY_COLUMN, &Value::Text(key), self.driver.dialect());
        let rows = self.run_query(Some(schema.table()), &reselect)?;
        let row = match rows.as_slice() {
            [row] => row,
            other => {
                return Err(NeptuneError::runtime(format!(
                    "reselect after insert into [{}] returned {} rows",
                    schema.table(),
                    other.len()
                )));
            }
        };
        let mut stored = self.hydrate(&schema, row, &BTreeSet::new(), &BTreeSet::new())?;
        for (relation, cell) in record.relations() {
            stored.assign_relation(&relation.key, cell.clone())?;
        }
        Ok(stored)
    }

    /// Selects and hydrates every matching record.
    pub(crate) fn select(
        &mut self,
        schema: &Arc<EntitySchema>,
        query: &Query,
    ) -> NeptuneResult<Vec<Record>> {
        let sql = compile_select(schema, query, self.driver.dialect())?;
        let rows = self.run_query(Some(schema.table()), &sql)?;
        rows.iter()
            .map(|row| {
                self.hydrate(schema, row, query.projected_columns(), query.requested_relations())
            })
            .collect()
    }

    /// Updates the rows matched by `query` with the record's defined cells.
    pub(crate) fn update(&mut self, record: &Record, query: &Query) -> NeptuneResult<()> {
        let sql = compile_update(record, query, self.driver.dialect())?;
        self.run_statement(Some(record.table()), &sql)
    }

    /// Deletes the rows matched by `query`.
    pub(crate) fn delete(&mut self, schema: &EntitySchema, query: &Query) -> NeptuneResult<()> {
        let sql = compile_delete(schema, query, self.driver.dialect())?;
        self.run_statement(Some(schema.table()), &sql)
    }

    // ------------------------------------------------------------------------
    // Hydration
    // ------------------------------------------------------------------------

    /// Builds a record from one row.
    ///
    /// An empty column set means every column; relations are resolved only
    /// when named in `relations`.
    fn hydrate(
        &mut self,
        schema: &Arc<EntitySchema>,
        row: &Row,
        columns: &BTreeSet<String>,
        relations: &BTreeSet<String>,
    ) -> NeptuneResult<Record> {
        let mut record = Record::new(Arc::clone(schema));
        for column in schema.columns() {
            if !columns.is_empty() && !columns.contains(&column.name) {
                continue;
            }
            let raw = row.get(&column.name).ok_or_else(|| missing_column(schema, &column.name))?;
            record.set_value_from_string(&column.name, raw)?;
        }
        if let Some(raw) = row.get(INSTANCE_KEY_COLUMN) {
            record.set_instance_key_cell(raw.map(str::to_string).into());
        }
        for relation in schema.relations() {
            if !relations.contains(&relation.key) {
                continue;
            }
            let cell = self.resolve_relation(schema, relation, row, &record)?;
            record.assign_relation(&relation.key, cell)?;
        }
        Ok(record)
    }

    /// Resolves one relation of a freshly hydrated record.
    fn resolve_relation(
        &mut self,
        schema: &EntitySchema,
        relation: &RelationDescriptor,
        row: &Row,
        record: &Record,
    ) -> NeptuneResult<RelationCell> {
        let target = Arc::clone(self.driver.require_schema(&relation.target_table)?);
        match relation.direction {
            RelationDirection::Left => {
                let raw = row.get(&relation.key).ok_or_else(|| missing_column(schema, &relation.key))?;
                match raw {
                    None => Ok(Cell::Null),
                    Some(key) => self.fetch_peer(&target, relation, INSTANCE_KEY_COLUMN, key),
                }
            }
            RelationDirection::Right => match record.instance_key() {
                Cell::Present(key) => self.fetch_peer(&target, relation, &relation.target_key, key),
                Cell::Undefined | Cell::Null => Err(NeptuneError::runtime(format!(
                    "cannot resolve relation [{}] on table [{}] without an instance key",
                    relation.key,
                    schema.table()
                ))),
            },
        }
    }

    /// Loads the single peer whose `column` equals `key`.
    fn fetch_peer(
        &mut self,
        target: &Arc<EntitySchema>,
        relation: &RelationDescriptor,
        column: &str,
        key: &str,
    ) -> NeptuneResult<RelationCell> {
        let sql =
            compile_select_by(target, column, &Value::Text(key.to_string()), self.driver.dialect());
        let rows = self.run_query(Some(target.table()), &sql)?;
        match rows.as_slice() {
            [] => Ok(Cell::Null),
            [row] => {
                let peer = self.hydrate(target, row, &BTreeSet::new(), &BTreeSet::new())?;
                Ok(Cell::Present(Arc::new(peer)))
            }
            many => Err(NeptuneError::runtime(format!(
                "relation [{}] matched {} rows in table [{}]",
                relation.key,
                many.len(),
                target.table()
            ))),
        }
    }
}

/// Builds the error for a row lacking an expected column.
fn missing_column(schema: &EntitySchema, column: &str) -> NeptuneError {
    NeptuneError::runtime(format!(
        "result row for table [{}] is missing column [{column}]",
        schema.table()
    ))
}
