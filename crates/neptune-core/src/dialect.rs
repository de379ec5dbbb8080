// crates/neptune-core/src/dialect.rs
// ============================================================================
// Module: SQL Dialects
// Description: Dialect-specific column types and literal quoting.
// Purpose: Keep the compiler free of per-engine string tables.
// Dependencies: crate::{schema, value}, serde
// ============================================================================

//! ## Overview
//! The compiler renders identifiers with backticks for every dialect; what
//! differs between engines is the spelling of the identity column and the
//! quoting of text literals. [`Dialect::MariaDb`] double-quotes text and
//! escapes backslashes, [`Dialect::Sqlite`] single-quotes text.
//!
//! Security posture: literals are embedded into SQL text, not bound as
//! parameters. Quote doubling keeps well-formed input inside the literal but
//! is not a substitute for parameterized statements.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::schema::ColumnKind;
use crate::schema::INSTANCE_KEY_LENGTH;
use crate::value::Cell;
use crate::value::Value;

// ============================================================================
// SECTION: Dialect
// ============================================================================

/// Target SQL engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dialect {
    /// MariaDB / MySQL.
    #[serde(rename = "mariadb")]
    MariaDb,
    /// SQLite 3.
    #[default]
    #[serde(rename = "sqlite")]
    Sqlite,
}

impl Dialect {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MariaDb => "mariadb",
            Self::Sqlite => "sqlite",
        }
    }

    /// Returns the column type clause for a column kind.
    ///
    /// The primary kind renders its full identity constraint.
    #[must_use]
    pub fn column_type(self, kind: ColumnKind) -> String {
        match (self, kind) {
            (Self::MariaDb, ColumnKind::PrimaryUInt32) => {
                "INT UNSIGNED AUTO_INCREMENT PRIMARY KEY".to_string()
            }
            (Self::Sqlite, ColumnKind::PrimaryUInt32) => {
                "INTEGER PRIMARY KEY AUTOINCREMENT".to_string()
            }
            (_, ColumnKind::Int32) => "INT".to_string(),
            (Self::MariaDb, ColumnKind::UInt32) => "INT UNSIGNED".to_string(),
            (Self::Sqlite, ColumnKind::UInt32) => "INTEGER".to_string(),
            (
                _,
                ColumnKind::Varchar {
                    max_length,
                },
            ) => format!("VARCHAR({max_length})"),
        }
    }

    /// Returns the type clause of the instance-key and relation columns.
    #[must_use]
    pub fn key_column_type(self) -> String {
        format!("VARCHAR({INSTANCE_KEY_LENGTH})")
    }

    /// Returns the row limit emitted when only an offset was requested.
    ///
    /// Neither engine accepts `OFFSET` without `LIMIT`.
    #[must_use]
    pub const fn unbounded_limit(self) -> &'static str {
        match self {
            Self::MariaDb => "18446744073709551615",
            Self::Sqlite => "-1",
        }
    }

    /// Returns the statement tail inserting a row of defaults.
    #[must_use]
    pub const fn default_values_clause(self) -> &'static str {
        match self {
            Self::MariaDb => "() VALUES ()",
            Self::Sqlite => "DEFAULT VALUES",
        }
    }

    /// Renders a present value as a SQL literal.
    #[must_use]
    pub fn literal(self, value: &Value) -> String {
        match value {
            Value::Int32(inner) => inner.to_string(),
            Value::UInt32(inner) => inner.to_string(),
            Value::Text(text) => self.quote_text(text),
        }
    }

    /// Renders a cell as a SQL literal; `None` for undefined cells.
    #[must_use]
    pub fn cell_literal(self, cell: &Cell<Value>) -> Option<String> {
        match cell {
            Cell::Undefined => None,
            Cell::Null => Some("NULL".to_string()),
            Cell::Present(value) => Some(self.literal(value)),
        }
    }

    /// Quotes a text literal.
    #[must_use]
    pub fn quote_text(self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        match self {
            Self::MariaDb => {
                out.push('"');
                for ch in text.chars() {
                    match ch {
                        '"' => out.push_str("\"\""),
                        '\\' => out.push_str("\\\\"),
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            Self::Sqlite => {
                out.push('\'');
                for ch in text.chars() {
                    if ch == '\'' {
                        out.push_str("''");
                    } else {
                        out.push(ch);
                    }
                }
                out.push('\'');
            }
        }
        out
    }
}
