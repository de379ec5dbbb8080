// crates/neptune-core/src/compiler.rs
// ============================================================================
// Module: SQL Compiler
// Description: Pure rendering of records and queries into SQL text.
// Purpose: Validate names and operators against the schema before any SQL runs.
// Dependencies: crate::{dialect, error, predicate, query, record, schema, value}
// ============================================================================

//! ## Overview
//! Every function here is pure: it reads a schema, record, or query and
//! returns SQL text or an [`NeptuneError::InvalidArgument`]. Nothing is
//! executed, so validation failures can never reach the execution capability.
//!
//! Predicates are rendered depth-first with parentheses at every node:
//! a leaf is ``(`col` OP literal)`` and an internal node is
//! `(left LOGIC right)`, so precedence never depends on the engine.
//!
//! Security posture: literals are inlined, see [`crate::dialect`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use crate::dialect::Dialect;
use crate::error::NeptuneError;
use crate::error::NeptuneResult;
use crate::predicate::CompareOp;
use crate::predicate::Predicate;
use crate::query::Query;
use crate::record::Record;
use crate::record::RelationCell;
use crate::schema::EntitySchema;
use crate::schema::INSTANCE_KEY_COLUMN;
use crate::schema::RelationDescriptor;
use crate::value::Cell;
use crate::value::Value;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Quotes an identifier with backticks.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("`{name}`")
}

// ============================================================================
// SECTION: Insert
// ============================================================================

/// Compiles an INSERT for a record.
///
/// Emits every defined non-primary column in schema order, then the instance
/// key when it is present, then every defined `Left` relation column.
///
/// # Errors
///
/// Returns [`NeptuneError::InvalidArgument`] when a required column is
/// undefined or null, the instance key is null, or a linked peer has no
/// instance key.
pub fn compile_insert(record: &Record, dialect: Dialect) -> NeptuneResult<String> {
    let table = record.table();
    let mut names = Vec::new();
    let mut values = Vec::new();

    for (column, cell) in record.columns() {
        if column.is_primary {
            continue;
        }
        if column.is_required() && !cell.is_present() {
            return Err(NeptuneError::invalid(format!(
                "column [{}] on table [{table}] requires a value",
                column.name
            )));
        }
        if let Some(literal) = dialect.cell_literal(cell) {
            names.push(quote_ident(&column.name));
            values.push(literal);
        }
    }

    match record.instance_key() {
        Cell::Undefined => {}
        Cell::Null => {
            return Err(NeptuneError::invalid(format!(
                "instance key on table [{table}] cannot be null"
            )));
        }
        Cell::Present(key) => {
            names.push(quote_ident(INSTANCE_KEY_COLUMN));
            values.push(dialect.quote_text(key));
        }
    }

    for (relation, cell) in record.relations() {
        if !relation.owns_column() {
            continue;
        }
        if let Some(literal) = relation_literal(relation, cell, dialect)? {
            names.push(quote_ident(&relation.key));
            values.push(literal);
        }
    }

    if names.is_empty() {
        return Ok(format!(
            "INSERT INTO {} {}",
            quote_ident(table),
            dialect.default_values_clause()
        ));
    }
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names.join(", "),
        values.join(", ")
    ))
}

/// Renders the column value of a `Left` relation cell.
fn relation_literal(
    relation: &RelationDescriptor,
    cell: &RelationCell,
    dialect: Dialect,
) -> NeptuneResult<Option<String>> {
    match cell {
        Cell::Undefined => Ok(None),
        Cell::Null => Ok(Some("NULL".to_string())),
        Cell::Present(peer) => match peer.instance_key() {
            Cell::Present(key) => Ok(Some(dialect.quote_text(key))),
            Cell::Undefined | Cell::Null => Err(NeptuneError::invalid(format!(
                "peer linked through relation [{}] has no instance key",
                relation.key
            ))),
        },
    }
}

// ============================================================================
// SECTION: Select
// ============================================================================

/// Compiles a SELECT for a query.
///
/// # Errors
///
/// Returns [`NeptuneError::InvalidArgument`] for unknown projected columns,
/// relations, predicate columns, order-by columns, or unsupported operators.
pub fn compile_select(
    schema: &EntitySchema,
    query: &Query,
    dialect: Dialect,
) -> NeptuneResult<String> {
    let mut sql = format!(
        "SELECT {} FROM {}",
        projection(schema, query)?,
        quote_ident(schema.table())
    );
    if let Some(predicate) = query.predicate() {
        sql.push_str(" WHERE ");
        sql.push_str(&compile_predicate(schema, predicate, dialect)?);
    }
    if !query.order_entries().is_empty() {
        let mut entries = Vec::with_capacity(query.order_entries().len());
        for entry in query.order_entries() {
            schema.require_column(&entry.column)?;
            entries.push(format!("{} {}", entry.column, entry.direction.as_str()));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&entries.join(", "));
    }
    match (query.limit_value(), query.offset_value()) {
        (Some(limit), Some(offset)) => {
            let _ = write!(sql, " LIMIT {limit} OFFSET {offset}");
        }
        (Some(limit), None) => {
            let _ = write!(sql, " LIMIT {limit}");
        }
        (None, Some(offset)) => {
            let _ = write!(sql, " LIMIT {} OFFSET {offset}", dialect.unbounded_limit());
        }
        (None, None) => {}
    }
    Ok(sql)
}

/// Renders the projection list of a select.
///
/// Without explicit columns every column is selected. With explicit columns
/// the list is the named columns in schema order, the instance key, then the
/// requested `Left` relation columns.
fn projection(schema: &EntitySchema, query: &Query) -> NeptuneResult<String> {
    for name in query.projected_columns() {
        schema.require_column(name)?;
    }
    for key in query.requested_relations() {
        schema.require_relation(key)?;
    }
    if query.projected_columns().is_empty() {
        return Ok("*".to_string());
    }
    let mut names: Vec<String> = schema
        .columns()
        .iter()
        .filter(|column| query.projected_columns().contains(&column.name))
        .map(|column| quote_ident(&column.name))
        .collect();
    names.push(quote_ident(INSTANCE_KEY_COLUMN));
    names.extend(
        schema
            .relations()
            .iter()
            .filter(|relation| {
                relation.owns_column() && query.requested_relations().contains(&relation.key)
            })
            .map(|relation| quote_ident(&relation.key)),
    );
    Ok(names.join(", "))
}

/// Compiles an unvalidated `SELECT *` filtered by one equality.
///
/// Used for reselects and relation lookups, which may target the hidden
/// instance-key column or a relation column.
pub(crate) fn compile_select_by(
    schema: &EntitySchema,
    column: &str,
    value: &Value,
    dialect: Dialect,
) -> String {
    format!(
        "SELECT * FROM {} WHERE ({} = {})",
        quote_ident(schema.table()),
        quote_ident(column),
        dialect.literal(value)
    )
}

// ============================================================================
// SECTION: Predicates
// ============================================================================

/// Compiles a predicate tree into a WHERE body.
///
/// # Errors
///
/// Returns [`NeptuneError::InvalidArgument`] when a leaf names an unknown
/// column or uses an unsupported operator.
pub fn compile_predicate(
    schema: &EntitySchema,
    predicate: &Predicate,
    dialect: Dialect,
) -> NeptuneResult<String> {
    match predicate {
        Predicate::Compare(comparison) => {
            schema.require_column(&comparison.column)?;
            let op: CompareOp = comparison.operator.parse()?;
            Ok(format!(
                "({} {} {})",
                quote_ident(&comparison.column),
                op.as_str(),
                dialect.literal(&comparison.literal)
            ))
        }
        Predicate::Logic {
            op,
            left,
            right,
        } => Ok(format!(
            "({} {} {})",
            compile_predicate(schema, left, dialect)?,
            op.as_str(),
            compile_predicate(schema, right, dialect)?
        )),
    }
}

/// Renders the WHERE suffix of an UPDATE or DELETE.
///
/// Refuses an absent predicate unless the query confirmed it.
fn mutation_filter(
    schema: &EntitySchema,
    query: &Query,
    dialect: Dialect,
    verb: &str,
) -> NeptuneResult<String> {
    match query.predicate() {
        Some(predicate) => Ok(format!(" WHERE {}", compile_predicate(schema, predicate, dialect)?)),
        None if query.is_unconditional() => Ok(String::new()),
        None => Err(NeptuneError::invalid(format!(
            "{verb} on table [{}] without a predicate requires confirm_unconditional",
            schema.table()
        ))),
    }
}

// ============================================================================
// SECTION: Update / Delete
// ============================================================================

/// Compiles an UPDATE assigning every defined column and `Left` relation.
///
/// The primary key and instance key are never assigned.
///
/// # Errors
///
/// Returns [`NeptuneError::InvalidArgument`] when the query has no predicate
/// and is not confirmed, a required column is null, nothing is assigned, or
/// the predicate is invalid.
pub fn compile_update(record: &Record, query: &Query, dialect: Dialect) -> NeptuneResult<String> {
    let schema = record.schema();
    let filter = mutation_filter(schema, query, dialect, "update")?;
    let mut assignments = Vec::new();

    for (column, cell) in record.columns() {
        if column.is_primary {
            continue;
        }
        if column.is_required() && cell.is_null() {
            return Err(NeptuneError::invalid(format!(
                "column [{}] on table [{}] cannot be null",
                column.name,
                schema.table()
            )));
        }
        if let Some(literal) = dialect.cell_literal(cell) {
            assignments.push(format!("{} = {literal}", quote_ident(&column.name)));
        }
    }
    for (relation, cell) in record.relations() {
        if !relation.owns_column() {
            continue;
        }
        if let Some(literal) = relation_literal(relation, cell, dialect)? {
            assignments.push(format!("{} = {literal}", quote_ident(&relation.key)));
        }
    }

    if assignments.is_empty() {
        return Err(NeptuneError::invalid(format!(
            "update on table [{}] has no defined columns to assign",
            schema.table()
        )));
    }
    Ok(format!(
        "UPDATE {} SET {}{filter}",
        quote_ident(schema.table()),
        assignments.join(", ")
    ))
}

/// Compiles a DELETE.
///
/// # Errors
///
/// Returns [`NeptuneError::InvalidArgument`] when the query has no predicate
/// and is not confirmed, or the predicate is invalid.
pub fn compile_delete(schema: &EntitySchema, query: &Query, dialect: Dialect) -> NeptuneResult<String> {
    let filter = mutation_filter(schema, query, dialect, "delete")?;
    Ok(format!("DELETE FROM {}{filter}", quote_ident(schema.table())))
}

// ============================================================================
// SECTION: Create Table
// ============================================================================

/// Compiles the CREATE TABLE statement of a schema.
#[must_use]
pub fn compile_create_table(schema: &EntitySchema, dialect: Dialect) -> String {
    let mut clauses: Vec<String> = schema
        .columns()
        .iter()
        .map(|column| {
            let mut clause =
                format!("{} {}", quote_ident(&column.name), dialect.column_type(column.kind));
            if column.is_required() {
                clause.push_str(" NOT NULL");
            }
            clause
        })
        .collect();
    clauses.push(format!(
        "{} {} NOT NULL",
        quote_ident(INSTANCE_KEY_COLUMN),
        dialect.key_column_type()
    ));
    clauses.extend(
        schema
            .relations()
            .iter()
            .filter(|relation| relation.owns_column())
            .map(|relation| format!("{} {}", quote_ident(&relation.key), dialect.key_column_type())),
    );
    format!("CREATE TABLE IF NOT EXISTS {} ({})", quote_ident(schema.table()), clauses.join(", "))
}
