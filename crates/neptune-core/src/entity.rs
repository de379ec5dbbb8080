// crates/neptune-core/src/entity.rs
// ============================================================================
// Module: Typed Entities
// Description: Entity trait and the declarative macro that implements it.
// Purpose: Give each record type statically typed fields over the generic record.
// Dependencies: crate::{error, record, schema, value}
// ============================================================================

//! ## Overview
//! [`Entity`] is implemented by the structs generated with [`crate::entity!`].
//! Each generated struct holds one typed [`Cell`] per column and relation,
//! builds its [`EntitySchema`] once per process, and converts to and from the
//! generic [`Record`] that the compiler and fetch engine operate on.
//!
//! ```
//! use neptune_core::Cell;
//! use neptune_core::Entity;
//!
//! neptune_core::entity! {
//!     /// Account holder.
//!     pub struct User("user") {
//!         columns {
//!             id: primary,
//!             age: int32 [nullable],
//!             name: varchar(32),
//!         }
//!         relations {}
//!     }
//! }
//!
//! let mut user = User::default();
//! user.age = Cell::Present(29);
//! assert_eq!(User::schema().table(), "user");
//! assert!(user.id.is_undefined());
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::error::NeptuneError;
use crate::error::NeptuneResult;
use crate::record::Record;
use crate::record::RelationCell;
use crate::schema::EntitySchema;
use crate::value::Cell;
use crate::value::ColumnValue;
use crate::value::Value;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// A statically typed record type.
pub trait Entity: Sized {
    /// Returns the shared schema of this type.
    fn schema() -> Arc<EntitySchema>;

    /// Converts into a generic record.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] when a field violates its
    /// column bound.
    fn to_record(&self) -> NeptuneResult<Record>;

    /// Builds the typed value from a generic record.
    ///
    /// # Errors
    ///
    /// Returns [`NeptuneError::InvalidArgument`] for a record of another table
    /// and [`NeptuneError::Runtime`] for mismatched value types.
    fn from_record(record: &Record) -> NeptuneResult<Self>;

    /// Returns the hidden instance key.
    fn instance_key(&self) -> &Cell<String>;
}

// ============================================================================
// SECTION: Conversion Helpers
// ============================================================================

/// Converts a typed column cell into a dynamic one.
#[must_use]
pub fn value_cell<T: ColumnValue>(cell: &Cell<T>) -> Cell<Value> {
    cell.clone().map(ColumnValue::into_value)
}

/// Converts a dynamic column cell into a typed one.
///
/// # Errors
///
/// Returns [`NeptuneError::Runtime`] when the value type differs.
pub fn typed_cell<T: ColumnValue>(cell: &Cell<Value>) -> NeptuneResult<Cell<T>> {
    cell.as_present().map_or_else(
        || Ok(if cell.is_null() { Cell::Null } else { Cell::Undefined }),
        |value| T::from_value(value).map(Cell::Present),
    )
}

/// Converts a typed relation cell into a record relation cell.
///
/// # Errors
///
/// Propagates errors from the peer's [`Entity::to_record`].
pub fn peer_to_record<P: Entity>(cell: &Cell<Arc<P>>) -> NeptuneResult<RelationCell> {
    match cell {
        Cell::Undefined => Ok(Cell::Undefined),
        Cell::Null => Ok(Cell::Null),
        Cell::Present(peer) => Ok(Cell::Present(Arc::new(peer.to_record()?))),
    }
}

/// Converts a record relation cell into a typed one.
///
/// # Errors
///
/// Propagates errors from the peer's [`Entity::from_record`].
pub fn peer_from_record<P: Entity>(cell: &RelationCell) -> NeptuneResult<Cell<Arc<P>>> {
    match cell {
        Cell::Undefined => Ok(Cell::Undefined),
        Cell::Null => Ok(Cell::Null),
        Cell::Present(peer) => Ok(Cell::Present(Arc::new(P::from_record(peer)?))),
    }
}

/// Fails unless the record belongs to `table`.
///
/// # Errors
///
/// Returns [`NeptuneError::InvalidArgument`] on a table mismatch.
pub fn ensure_table(record: &Record, table: &str) -> NeptuneResult<()> {
    if record.table() == table {
        Ok(())
    } else {
        Err(NeptuneError::invalid(format!(
            "expected a [{table}] record, found [{}]",
            record.table()
        )))
    }
}

// ============================================================================
// SECTION: Declaration Macro
// ============================================================================

/// Declares a typed entity and implements [`Entity`] for it.
///
/// Column kinds are `primary`, `int32`, `uint32`, and `varchar(N)`; append
/// `[nullable]` to accept `NULL`. Relations name the peer type, the side
/// (`left` owns the key column, `right` is resolved by reverse lookup), the
/// peer table, and the relation key declared on the peer.
///
/// ```
/// neptune_core::entity! {
///     pub struct Profile("profile") {
///         columns {
///             id: primary,
///             bio: varchar(140) [nullable],
///         }
///         relations {
///             user: Owner => right("owner", "profile"),
///         }
///     }
/// }
///
/// neptune_core::entity! {
///     pub struct Owner("owner") {
///         columns {
///             id: primary,
///         }
///         relations {
///             profile: Profile => left("profile", "user"),
///         }
///     }
/// }
/// ```
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident ($table:literal) {
            columns {
                $( $col:ident : $kind:ident $( ( $len:literal ) )? $( [ $flag:ident ] )? ),* $(,)?
            }
            relations {
                $( $rel:ident : $peer:ty => $dir:ident ( $target_table:literal , $target_key:literal ) ),* $(,)?
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $(
                #[doc = concat!("Column `", stringify!($col), "`.")]
                pub $col: $crate::Cell<$crate::__neptune_column_type!($kind)>,
            )*
            $(
                #[doc = concat!("Relation `", stringify!($rel), "`.")]
                pub $rel: $crate::Cell<::std::sync::Arc<$peer>>,
            )*
            /// Hidden instance key assigned on insert.
            __instance_key: $crate::Cell<::std::string::String>,
        }

        impl $name {
            /// Table backing this entity.
            pub const TABLE: &'static str = $table;
        }

        impl $crate::Entity for $name {
            fn schema() -> ::std::sync::Arc<$crate::EntitySchema> {
                static SCHEMA: ::std::sync::OnceLock<::std::sync::Arc<$crate::EntitySchema>> =
                    ::std::sync::OnceLock::new();
                ::std::sync::Arc::clone(SCHEMA.get_or_init(|| {
                    ::std::sync::Arc::new(
                        $crate::EntitySchema::builder($table)
                            $(
                                .column($crate::__neptune_column_descriptor!(
                                    stringify!($col), $kind $( ($len) )? $(, $flag)?
                                ))
                            )*
                            $(
                                .relation($crate::RelationDescriptor::new(
                                    stringify!($rel),
                                    $target_table,
                                    $target_key,
                                    $crate::__neptune_direction!($dir),
                                ))
                            )*
                            .build(),
                    )
                }))
            }

            fn to_record(&self) -> $crate::NeptuneResult<$crate::Record> {
                let mut record = $crate::Record::new(<Self as $crate::Entity>::schema());
                $(
                    record.assign(stringify!($col), $crate::entity::value_cell(&self.$col))?;
                )*
                $(
                    record.assign_relation(
                        stringify!($rel),
                        $crate::entity::peer_to_record(&self.$rel)?,
                    )?;
                )*
                record.set_instance_key_cell(self.__instance_key.clone());
                Ok(record)
            }

            fn from_record(record: &$crate::Record) -> $crate::NeptuneResult<Self> {
                $crate::entity::ensure_table(record, $table)?;
                Ok(Self {
                    $(
                        $col: $crate::entity::typed_cell(record.cell(stringify!($col))?)?,
                    )*
                    $(
                        $rel: $crate::entity::peer_from_record(record.relation(stringify!($rel))?)?,
                    )*
                    __instance_key: record.instance_key().clone(),
                })
            }

            fn instance_key(&self) -> &$crate::Cell<::std::string::String> {
                &self.__instance_key
            }
        }
    };
}

/// Maps a column kind token to its Rust field type.
#[doc(hidden)]
#[macro_export]
macro_rules! __neptune_column_type {
    (primary) => { u32 };
    (int32) => { i32 };
    (uint32) => { u32 };
    (varchar) => { ::std::string::String };
}

/// Maps a column declaration to its descriptor.
#[doc(hidden)]
#[macro_export]
macro_rules! __neptune_column_descriptor {
    ($name:expr, primary) => {
        $crate::ColumnDescriptor::primary($name)
    };
    ($name:expr, int32 $(, $flag:ident)?) => {
        $crate::ColumnDescriptor::new(
            $name,
            $crate::ColumnKind::Int32,
            $crate::__neptune_nullable!($($flag)?),
        )
    };
    ($name:expr, uint32 $(, $flag:ident)?) => {
        $crate::ColumnDescriptor::new(
            $name,
            $crate::ColumnKind::UInt32,
            $crate::__neptune_nullable!($($flag)?),
        )
    };
    ($name:expr, varchar ($len:literal) $(, $flag:ident)?) => {
        $crate::ColumnDescriptor::new(
            $name,
            $crate::ColumnKind::Varchar {
                max_length: $len,
            },
            $crate::__neptune_nullable!($($flag)?),
        )
    };
}

/// Maps an optional `nullable` flag to a bool.
#[doc(hidden)]
#[macro_export]
macro_rules! __neptune_nullable {
    () => {
        false
    };
    (nullable) => {
        true
    };
}

/// Maps a relation side token to its direction.
#[doc(hidden)]
#[macro_export]
macro_rules! __neptune_direction {
    (left) => {
        $crate::RelationDirection::Left
    };
    (right) => {
        $crate::RelationDirection::Right
    };
}
