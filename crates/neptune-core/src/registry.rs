// crates/neptune-core/src/registry.rs
// ============================================================================
// Module: Schema Registry
// Description: Closed-world schema validation and the validated driver.
// Purpose: Refuse inconsistent schemas before any connection exists.
// Dependencies: crate::{compiler, connection, dialect, entity, error, executor, logging, schema}
// ============================================================================

//! ## Overview
//! Schemas are collected into a [`SchemaRegistry`] and checked together by
//! [`SchemaRegistry::validate`], which is the only way to obtain a
//! [`Driver`]. Validation is closed-world: relation contracts are checked
//! against every registered schema, so it must run after all registrations.
//!
//! Checks, in order:
//! - table names are non-empty, backtick-free, and pairwise distinct
//! - column and relation keys share one namespace per schema and never reuse
//!   the hidden instance-key name
//! - exactly one primary column per schema
//! - varchar lengths are within `1..=65535`
//! - every relation targets a registered table that declares the mirrored
//!   relation on the opposite side

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::compiler::compile_create_table;
use crate::connection::Connection;
use crate::dialect::Dialect;
use crate::entity::Entity;
use crate::error::NeptuneError;
use crate::error::NeptuneResult;
use crate::executor::Executor;
use crate::logging::LogEvent;
use crate::logging::LogLevel;
use crate::logging::LogSink;
use crate::schema::ColumnDescriptor;
use crate::schema::ColumnKind;
use crate::schema::EntitySchema;
use crate::schema::INSTANCE_KEY_COLUMN;
use crate::schema::MAX_VARCHAR_LENGTH;
use crate::schema::RelationDescriptor;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Collects schemas prior to validation.
pub struct SchemaRegistry {
    /// Registered schemas in registration order.
    schemas: Vec<Arc<EntitySchema>>,
    /// Dialect handed to the driver.
    dialect: Dialect,
    /// Log sink handed to the driver.
    sink: Arc<dyn LogSink>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(dialect: Dialect, sink: Arc<dyn LogSink>) -> Self {
        Self {
            schemas: Vec::new(),
            dialect,
            sink,
        }
    }

    /// Creates a registry from ordered `(table, columns, relations)` tuples.
    #[must_use]
    pub fn from_declarations<I, S>(dialect: Dialect, sink: Arc<dyn LogSink>, declarations: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<ColumnDescriptor>, Vec<RelationDescriptor>)>,
        S: Into<String>,
    {
        let mut registry = Self::new(dialect, sink);
        for (table, columns, relations) in declarations {
            registry.register_schema(Arc::new(EntitySchema::new(table, columns, relations)));
        }
        registry
    }

    /// Registers the schema of an entity type.
    pub fn register<T: Entity>(&mut self) -> &mut Self {
        self.register_schema(T::schema())
    }

    /// Registers a schema.
    pub fn register_schema(&mut self, schema: Arc<EntitySchema>) -> &mut Self {
        self.sink
            .record(&LogEvent::new("schema_registered", LogLevel::Debug).with_table(schema.table()));
        self.schemas.push(schema);
        self
    }

    /// Returns the registered schemas.
    #[must_use]
    pub fn schemas(&self) -> &[Arc<EntitySchema>] {
        &self.schemas
    }

    /// Validates every registered schema and produces the driver.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] describing the first
    /// violation found.
    pub fn validate(self) -> NeptuneResult<Driver> {
        if let Err(err) = validate_schemas(&self.schemas) {
            self.sink.record(
                &LogEvent::new("operation_failed", LogLevel::Error)
                    .with_message(format!("registry validation: {err}")),
            );
            return Err(err);
        }
        let index = self
            .schemas
            .iter()
            .enumerate()
            .map(|(position, schema)| (schema.table().to_string(), position))
            .collect();
        self.sink.record(
            &LogEvent::new("registry_validated", LogLevel::Info)
                .with_message(format!("{} schemas", self.schemas.len())),
        );
        Ok(Driver {
            schemas: self.schemas,
            index,
            dialect: self.dialect,
            sink: self.sink,
        })
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Runs every registry check.
fn validate_schemas(schemas: &[Arc<EntitySchema>]) -> NeptuneResult<()> {
    let mut tables = BTreeMap::new();
    for schema in schemas {
        validate_identifier("table", schema.table())?;
        if tables.insert(schema.table(), Arc::clone(schema)).is_some() {
            return Err(NeptuneError::invalid(format!(
                "table [{}] is registered more than once",
                schema.table()
            )));
        }
    }
    for schema in schemas {
        validate_schema(schema)?;
    }
    for schema in schemas {
        for relation in schema.relations() {
            validate_relation(schema, relation, &tables)?;
        }
    }
    Ok(())
}

/// Checks one schema in isolation.
fn validate_schema(schema: &EntitySchema) -> NeptuneResult<()> {
    let table = schema.table();
    let mut names = BTreeSet::new();
    let declared = schema
        .columns()
        .iter()
        .map(|column| ("column", column.name.as_str()))
        .chain(schema.relations().iter().map(|relation| ("relation", relation.key.as_str())));
    for (kind, name) in declared {
        validate_identifier(kind, name)?;
        if name == INSTANCE_KEY_COLUMN {
            return Err(NeptuneError::invalid(format!(
                "{kind} [{name}] on table [{table}] uses a reserved name"
            )));
        }
        if !names.insert(name) {
            return Err(NeptuneError::invalid(format!(
                "{kind} [{name}] is declared more than once on table [{table}]"
            )));
        }
    }

    let primaries = schema.columns().iter().filter(|column| column.is_primary).count();
    if primaries != 1 {
        return Err(NeptuneError::invalid(format!(
            "table [{table}] declares {primaries} primary key columns; exactly one is required"
        )));
    }
    for column in schema.columns() {
        if column.is_primary != matches!(column.kind, ColumnKind::PrimaryUInt32) {
            return Err(NeptuneError::invalid(format!(
                "column [{}] on table [{table}] mixes primary and regular kinds",
                column.name
            )));
        }
        if let Some(max_length) = column.kind.max_length()
            && !(1 ..= MAX_VARCHAR_LENGTH).contains(&max_length)
        {
            return Err(NeptuneError::invalid(format!(
                "column [{}] on table [{table}] has varchar length {max_length} outside \
                 1..={MAX_VARCHAR_LENGTH}",
                column.name
            )));
        }
    }
    Ok(())
}

/// Checks that a relation's peer declares the mirrored side.
fn validate_relation(
    schema: &EntitySchema,
    relation: &RelationDescriptor,
    tables: &BTreeMap<&str, Arc<EntitySchema>>,
) -> NeptuneResult<()> {
    let Some(peer) = tables.get(relation.target_table.as_str()) else {
        return Err(NeptuneError::invalid(format!(
            "relation [{}] on table [{}] targets unregistered table [{}]",
            relation.key,
            schema.table(),
            relation.target_table
        )));
    };
    let mirrored = peer.relation(&relation.target_key).is_some_and(|back| {
        back.target_table == schema.table()
            && back.target_key == relation.key
            && back.direction == relation.direction.opposite()
    });
    if mirrored {
        Ok(())
    } else {
        Err(NeptuneError::invalid(format!(
            "{} relation [{}] on table [{}] has no matching {} relation [{}] on table [{}]",
            relation.direction.as_str(),
            relation.key,
            schema.table(),
            relation.direction.opposite().as_str(),
            relation.target_key,
            relation.target_table
        )))
    }
}

/// Rejects empty identifiers and identifiers that would break quoting.
fn validate_identifier(kind: &str, name: &str) -> NeptuneResult<()> {
    if name.is_empty() {
        return Err(NeptuneError::invalid(format!("{kind} name must be non-empty")));
    }
    if name.contains('`') {
        return Err(NeptuneError::invalid(format!("{kind} name [{name}] contains a backtick")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Driver
// ============================================================================

/// Validated, immutable set of schemas.
pub struct Driver {
    /// Schemas in registration order.
    schemas: Vec<Arc<EntitySchema>>,
    /// Table name to position in `schemas`.
    index: BTreeMap<String, usize>,
    /// SQL dialect.
    dialect: Dialect,
    /// Log sink shared with connections.
    sink: Arc<dyn LogSink>,
}

impl Driver {
    /// Returns the SQL dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the log sink.
    #[must_use]
    pub fn sink(&self) -> &dyn LogSink {
        self.sink.as_ref()
    }

    /// Returns the schemas in registration order.
    #[must_use]
    pub fn schemas(&self) -> &[Arc<EntitySchema>] {
        &self.schemas
    }

    /// Looks up a schema by table name.
    #[must_use]
    pub fn schema(&self, table: &str) -> Option<&Arc<EntitySchema>> {
        self.index.get(table).and_then(|position| self.schemas.get(*position))
    }

    /// Looks up a schema, failing for unregistered tables.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] when the table is unknown.
    pub fn require_schema(&self, table: &str) -> NeptuneResult<&Arc<EntitySchema>> {
        self.schema(table)
            .ok_or_else(|| NeptuneError::invalid(format!("table [{table}] is not registered")))
    }

    /// Looks up the registered schema of an entity type.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] when the type's table is
    /// unknown or registered with a different layout.
    pub fn require_entity<T: Entity>(&self) -> NeptuneResult<&Arc<EntitySchema>> {
        let declared = T::schema();
        let registered = self.require_schema(declared.table())?;
        if **registered != *declared {
            return Err(NeptuneError::invalid(format!(
                "table [{}] is registered with a different layout",
                declared.table()
            )));
        }
        Ok(registered)
    }

    /// Returns the CREATE TABLE statement of every schema.
    #[must_use]
    pub fn create_table_statements(&self) -> Vec<String> {
        self.schemas.iter().map(|schema| compile_create_table(schema, self.dialect)).collect()
    }

    /// Creates every table through `executor`.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::Store`] when a statement is rejected.
    pub fn initialize(&self, executor: &mut dyn Executor) -> NeptuneResult<()> {
        for schema in &self.schemas {
            let sql = compile_create_table(schema, self.dialect);
            if let Err(err) = executor.execute(&sql) {
                let err = NeptuneError::from(err);
                self.sink.record(
                    &LogEvent::new("operation_failed", LogLevel::Error)
                        .with_table(schema.table())
                        .with_sql(&sql)
                        .with_message(err.to_string()),
                );
                return Err(err);
            }
            self.sink.record(
                &LogEvent::new("table_created", LogLevel::Info)
                    .with_table(schema.table())
                    .with_sql(sql),
            );
        }
        Ok(())
    }

    /// Opens a connection handle over `executor`.
    #[must_use]
    pub fn connect(self: &Arc<Self>, executor: Box<dyn Executor>) -> Connection {
        Connection::new(Arc::clone(self), executor)
    }
}
