// crates/neptune-core/src/value.rs
// ============================================================================
// Module: Values and Cells
// Description: Typed column values and the tri-state cell that holds them.
// Purpose: Represent defined, null, and undefined column state without flag pairs.
// Dependencies: crate::error
// ============================================================================

//! ## Overview
//! A [`Cell`] is the storage for one column or relation on one instance. It is
//! either [`Cell::Undefined`] (never set, omitted from generated statements),
//! [`Cell::Null`] (explicitly absent), or [`Cell::Present`]. [`Value`] is the
//! dynamically typed payload used by the generic compiler and fetch paths;
//! [`ColumnValue`] bridges it to the statically typed entity fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::error::NeptuneError;
use crate::error::NeptuneResult;

// ============================================================================
// SECTION: Value
// ============================================================================

/// A present column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// UTF-8 text.
    Text(String),
}

impl Value {
    /// Returns a stable label for the value type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uint32",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32(value) => write!(f, "{value}"),
            Self::UInt32(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::UInt32(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// ============================================================================
// SECTION: Cell
// ============================================================================

/// Tri-state holder for one column or relation.
///
/// # Invariants
/// - `Undefined` is only re-entered through [`Cell::set_undefined`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cell<T> {
    /// Never set on this instance.
    Undefined,
    /// Explicitly absent.
    Null,
    /// Holds a value.
    Present(T),
}

impl<T> Default for Cell<T> {
    fn default() -> Self {
        Self::Undefined
    }
}

impl<T> Cell<T> {
    /// Returns true when the cell was never set.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns true when the cell is explicitly null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true when the cell holds a value.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Stores a value.
    pub fn set(&mut self, value: T) {
        *self = Self::Present(value);
    }

    /// Marks the cell as null.
    pub fn set_null(&mut self) {
        *self = Self::Null;
    }

    /// Forces the cell back to undefined.
    pub fn set_undefined(&mut self) {
        *self = Self::Undefined;
    }

    /// Reads the cell.
    ///
    /// Returns `Ok(None)` for a null cell.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::Runtime`] when the cell is undefined.
    pub fn get(&self) -> NeptuneResult<Option<&T>> {
        match self {
            Self::Undefined => Err(NeptuneError::runtime("cell is undefined")),
            Self::Null => Ok(None),
            Self::Present(value) => Ok(Some(value)),
        }
    }

    /// Returns the present value, if any.
    #[must_use]
    pub const fn as_present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Undefined | Self::Null => None,
        }
    }

    /// Maps the present value, keeping the cell state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cell<U> {
        match self {
            Self::Undefined => Cell::Undefined,
            Self::Null => Cell::Null,
            Self::Present(value) => Cell::Present(f(value)),
        }
    }
}

impl<T> From<Option<T>> for Cell<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Present)
    }
}

// ============================================================================
// SECTION: Typed Column Values
// ============================================================================

/// Rust types that can back an entity column.
pub trait ColumnValue: Clone + Sized {
    /// Converts into the dynamic value representation.
    fn into_value(self) -> Value;

    /// Converts from the dynamic value representation.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::Runtime`] when the value has a different type.
    fn from_value(value: &Value) -> NeptuneResult<Self>;
}

impl ColumnValue for i32 {
    fn into_value(self) -> Value {
        Value::Int32(self)
    }

    fn from_value(value: &Value) -> NeptuneResult<Self> {
        match value {
            Value::Int32(inner) => Ok(*inner),
            other => Err(type_mismatch("int32", other)),
        }
    }
}

impl ColumnValue for u32 {
    fn into_value(self) -> Value {
        Value::UInt32(self)
    }

    fn from_value(value: &Value) -> NeptuneResult<Self> {
        match value {
            Value::UInt32(inner) => Ok(*inner),
            other => Err(type_mismatch("uint32", other)),
        }
    }
}

impl ColumnValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> NeptuneResult<Self> {
        match value {
            Value::Text(inner) => Ok(inner.clone()),
            other => Err(type_mismatch("text", other)),
        }
    }
}

/// Builds the error for a typed read of the wrong value type.
fn type_mismatch(expected: &str, actual: &Value) -> NeptuneError {
    NeptuneError::runtime(format!("expected {expected} value, found {}", actual.type_name()))
}
