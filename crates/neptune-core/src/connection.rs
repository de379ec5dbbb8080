// crates/neptune-core/src/connection.rs
// ============================================================================
// Module: Connection Handle
// Description: Mutex-guarded executor with a fail-fast close flag.
// Purpose: Serialize every operation on one handle, nested fetches included.
// Dependencies: crate::{entity, error, executor, fetch, logging, query, record, registry}
// ============================================================================

//! ## Overview
//! A [`Connection`] owns one executor behind a mutex. Each public operation
//! locks it once and hands the guarded executor to the fetch engine, which
//! issues nested relation lookups through the same borrow. Concurrent
//! callers on one handle therefore never interleave statements.
//!
//! The close flag is checked before and after locking. [`Connection::close`]
//! raises the flag, then waits for the lock before closing the executor, so
//! no operation is in flight during teardown.
//!
//! There is no timeout: a hung executor blocks every caller of the handle.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::entity::Entity;
use crate::error::NeptuneError;
use crate::error::NeptuneResult;
use crate::executor::Executor;
use crate::executor::Row;
use crate::fetch::Fetcher;
use crate::logging::LogEvent;
use crate::logging::LogLevel;
use crate::query::Query;
use crate::record::Record;
use crate::registry::Driver;
use crate::schema::EntitySchema;

// ============================================================================
// SECTION: Connection
// ============================================================================

/// Thread-safe handle over one executor.
pub struct Connection {
    /// Validated schemas, dialect, and log sink.
    driver: Arc<Driver>,
    /// Executor guarded for the full duration of each operation.
    executor: Mutex<Box<dyn Executor>>,
    /// Set once closing has begun.
    should_close: AtomicBool,
}

impl Connection {
    /// Wraps an executor.
    pub(crate) fn new(driver: Arc<Driver>, executor: Box<dyn Executor>) -> Self {
        Self {
            driver,
            executor: Mutex::new(executor),
            should_close: AtomicBool::new(false),
        }
    }

    /// Returns the driver this connection was opened from.
    #[must_use]
    pub const fn driver(&self) -> &Arc<Driver> {
        &self.driver
    }

    /// Returns true once [`Connection::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.should_close.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------------
    // Typed operations
    // ------------------------------------------------------------------------

    /// Inserts an entity and returns it as stored, primary key included.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for unregistered types or
    /// missing required columns, [`NeptuneError::Runtime`] when the reselect
    /// does not find exactly one row, and [`NeptuneError::Store`] when a
    /// statement is rejected.
    pub fn insert<T: Entity>(&self, entity: &T) -> NeptuneResult<T> {
        let table = T::schema().table().to_string();
        self.guarded("insert", &table, |fetcher, driver| {
            driver.require_entity::<T>()?;
            let stored = fetcher.insert(&entity.to_record()?)?;
            T::from_record(&stored)
        })
    }

    /// Selects entities matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for invalid queries,
    /// [`NeptuneError::Runtime`] for hydration or relation failures, and
    /// [`NeptuneError::Store`] when a statement is rejected.
    pub fn select<T: Entity>(&self, query: &Query) -> NeptuneResult<Vec<T>> {
        let table = T::schema().table().to_string();
        self.guarded("select", &table, |fetcher, driver| {
            let schema = driver.require_entity::<T>()?;
            fetcher.select(schema, query)?.iter().map(T::from_record).collect()
        })
    }

    /// Updates the rows matched by `query` with the entity's defined fields.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for invalid or unconfirmed
    /// queries and [`NeptuneError::Store`] when the statement is rejected.
    pub fn update<T: Entity>(&self, entity: &T, query: &Query) -> NeptuneResult<()> {
        let table = T::schema().table().to_string();
        self.guarded("update", &table, |fetcher, driver| {
            driver.require_entity::<T>()?;
            fetcher.update(&entity.to_record()?, query)
        })
    }

    /// Updates the row identified by the entity's primary key.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] when the primary key is not
    /// present and [`NeptuneError::Store`] when the statement is rejected.
    pub fn update_by_primary_key<T: Entity>(&self, entity: &T) -> NeptuneResult<()> {
        let table = T::schema().table().to_string();
        self.guarded("update", &table, |fetcher, driver| {
            driver.require_entity::<T>()?;
            let record = entity.to_record()?;
            fetcher.update(&record, &primary_key_query(&record)?)
        })
    }

    /// Deletes the rows of `T` matched by `query`.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for invalid or unconfirmed
    /// queries and [`NeptuneError::Store`] when the statement is rejected.
    pub fn remove<T: Entity>(&self, query: &Query) -> NeptuneResult<()> {
        let table = T::schema().table().to_string();
        self.guarded("remove", &table, |fetcher, driver| {
            let schema = driver.require_entity::<T>()?;
            fetcher.delete(schema, query)
        })
    }

    /// Deletes the row identified by the entity's primary key.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] when the primary key is not
    /// present and [`NeptuneError::Store`] when the statement is rejected.
    pub fn remove_by_primary_key<T: Entity>(&self, entity: &T) -> NeptuneResult<()> {
        let table = T::schema().table().to_string();
        self.guarded("remove", &table, |fetcher, driver| {
            let schema = driver.require_entity::<T>()?;
            let record = entity.to_record()?;
            fetcher.delete(schema, &primary_key_query(&record)?)
        })
    }

    // ------------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------------

    /// Inserts a generic record and returns it as stored.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::insert`].
    pub fn insert_record(&self, record: &Record) -> NeptuneResult<Record> {
        self.guarded("insert", record.table(), |fetcher, driver| {
            require_same_schema(driver, record.schema())?;
            fetcher.insert(record)
        })
    }

    /// Selects generic records of `table`.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::select`].
    pub fn select_records(&self, table: &str, query: &Query) -> NeptuneResult<Vec<Record>> {
        self.guarded("select", table, |fetcher, driver| {
            let schema = driver.require_schema(table)?;
            fetcher.select(schema, query)
        })
    }

    /// Updates rows of the record's table matched by `query`.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::update`].
    pub fn update_record(&self, record: &Record, query: &Query) -> NeptuneResult<()> {
        self.guarded("update", record.table(), |fetcher, driver| {
            require_same_schema(driver, record.schema())?;
            fetcher.update(record, query)
        })
    }

    /// Updates the row identified by the record's primary key.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::update_by_primary_key`].
    pub fn update_record_by_primary_key(&self, record: &Record) -> NeptuneResult<()> {
        self.guarded("update", record.table(), |fetcher, driver| {
            require_same_schema(driver, record.schema())?;
            fetcher.update(record, &primary_key_query(record)?)
        })
    }

    /// Deletes rows of `table` matched by `query`.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::remove`].
    pub fn remove_records(&self, table: &str, query: &Query) -> NeptuneResult<()> {
        self.guarded("remove", table, |fetcher, driver| {
            let schema = driver.require_schema(table)?;
            fetcher.delete(schema, query)
        })
    }

    /// Deletes the row identified by the record's primary key.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::remove_by_primary_key`].
    pub fn remove_record(&self, record: &Record) -> NeptuneResult<()> {
        self.guarded("remove", record.table(), |fetcher, driver| {
            require_same_schema(driver, record.schema())?;
            fetcher.delete(record.schema(), &primary_key_query(record)?)
        })
    }

    // ------------------------------------------------------------------------
    // Raw SQL
    // ------------------------------------------------------------------------

    /// Executes raw SQL that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::Runtime`] on a closed handle and
    /// [`NeptuneError::Store`] when the statement is rejected.
    pub fn execute(&self, sql: &str) -> NeptuneResult<()> {
        self.locked("execute", None, |fetcher, _| fetcher.run_statement(None, sql))
    }

    /// Executes a raw query.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::Runtime`] on a closed handle and
    /// [`NeptuneError::Store`] when the statement is rejected.
    pub fn query(&self, sql: &str) -> NeptuneResult<Vec<Row>> {
        self.locked("query", None, |fetcher, _| fetcher.run_query(None, sql))
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Closes the handle; later operations fail fast. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::Runtime`] when the lock is poisoned and
    /// [`NeptuneError::Store`] when the executor fails to close.
    pub fn close(&self) -> NeptuneResult<()> {
        if self.should_close.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut guard =
            self.executor.lock().map_err(|_| NeptuneError::runtime("connection mutex poisoned"))?;
        let result = guard.close().map_err(NeptuneError::from);
        drop(guard);
        match &result {
            Ok(()) => {
                self.driver.sink().record(&LogEvent::new("connection_closed", LogLevel::Info));
            }
            Err(err) => self.report_failure("close", None, err),
        }
        result
    }

    // ------------------------------------------------------------------------
    // Locking
    // ------------------------------------------------------------------------

    /// Runs a table-scoped operation under the lock.
    fn guarded<R>(
        &self,
        operation: &'static str,
        table: &str,
        run: impl FnOnce(&mut Fetcher<'_>, &Driver) -> NeptuneResult<R>,
    ) -> NeptuneResult<R> {
        self.locked(operation, Some(table), run)
    }

    /// Locks the executor, runs `run`, and reports failures to the sink.
    fn locked<R>(
        &self,
        operation: &'static str,
        table: Option<&str>,
        run: impl FnOnce(&mut Fetcher<'_>, &Driver) -> NeptuneResult<R>,
    ) -> NeptuneResult<R> {
        let result = self.with_executor(run);
        if let Err(err) = &result {
            self.report_failure(operation, table, err);
        }
        result
    }

    /// Acquires the lock, re-checking the close flag on both sides.
    fn with_executor<R>(
        &self,
        run: impl FnOnce(&mut Fetcher<'_>, &Driver) -> NeptuneResult<R>,
    ) -> NeptuneResult<R> {
        if self.is_closed() {
            return Err(closed_error());
        }
        let mut guard =
            self.executor.lock().map_err(|_| NeptuneError::runtime("connection mutex poisoned"))?;
        if self.is_closed() {
            return Err(closed_error());
        }
        let driver: &Driver = &self.driver;
        let mut fetcher = Fetcher::new(driver, &mut **guard);
        run(&mut fetcher, driver)
    }

    /// Records an `operation_failed` event.
    fn report_failure(&self, operation: &str, table: Option<&str>, err: &NeptuneError) {
        let mut event = LogEvent::new("operation_failed", LogLevel::Error)
            .with_message(format!("{operation} ({}): {err}", err.kind()));
        if let Some(table) = table {
            event = event.with_table(table);
        }
        self.driver.sink().record(&event);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the error for operations on a closed handle.
fn closed_error() -> NeptuneError {
    NeptuneError::runtime("connection is closed")
}

/// Fails unless `schema` is the one registered for its table.
fn require_same_schema(driver: &Driver, schema: &EntitySchema) -> NeptuneResult<()> {
    let registered = driver.require_schema(schema.table())?;
    if **registered == *schema {
        Ok(())
    } else {
        Err(NeptuneError::invalid(format!(
            "table [{}] is registered with a different layout",
            schema.table()
        )))
    }
}

/// Builds `primary = value` for a record whose primary key is present.
fn primary_key_query(record: &Record) -> NeptuneResult<Query> {
    let primary = record.schema().primary_key().ok_or_else(|| {
        NeptuneError::invalid(format!("table [{}] has no primary key", record.table()))
    })?;
    let value = record.cell(&primary.name)?.as_present().ok_or_else(|| {
        NeptuneError::invalid(format!(
            "primary key [{}] on table [{}] is not set",
            primary.name,
            record.table()
        ))
    })?;
    Ok(Query::new().where_clause(primary.name.clone(), "=", value.clone()))
}
