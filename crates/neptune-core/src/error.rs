// crates/neptune-core/src/error.rs
// ============================================================================
// Module: Neptune Errors
// Description: Error taxonomy shared by the compiler, fetch engine, and registry.
// Purpose: Classify failures as caller mistakes, runtime faults, or store rejections.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every fallible operation in the core returns [`NeptuneError`]. Argument
//! errors are always raised before any SQL reaches the execution capability;
//! store errors carry the capability's message verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the execution capability.
///
/// # Invariants
/// - The message is the driver's rejection text, unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    /// Creates a store error from any displayable message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Core error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NeptuneError {
    /// Caller supplied an invalid column, operator, value, or schema.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An operation failed at runtime (undefined read, bad hydration, closed handle).
    #[error("runtime error: {0}")]
    Runtime(String),
    /// The execution capability rejected a statement.
    #[error("store error: {0}")]
    Store(String),
}

impl NeptuneError {
    /// Builds an [`NeptuneError::InvalidArgument`].
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Builds an [`NeptuneError::Runtime`].
    #[must_use]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Runtime(_) => "runtime_error",
            Self::Store(_) => "store_error",
        }
    }
}

impl From<StoreError> for NeptuneError {
    fn from(error: StoreError) -> Self {
        Self::Store(error.0)
    }
}

/// Result alias used throughout the core.
pub type NeptuneResult<T> = Result<T, NeptuneError>;
