// crates/neptune-core/src/predicate.rs
// ============================================================================
// Module: Predicate Trees
// Description: Boolean trees of column comparisons.
// Purpose: Describe WHERE clauses structurally so they can be validated and reused.
// Dependencies: crate::{error, value}
// ============================================================================

//! ## Overview
//! A [`Predicate`] is either a [`Comparison`] leaf or an AND/OR node owning
//! two subtrees. Trees are plain values: [`Predicate::and`] and
//! [`Predicate::or`] consume their inputs and return a new root, so a tree is
//! reused by cloning it. Operators are kept as the caller wrote them and are
//! checked by the compiler, which rejects anything outside
//! `= != > < >= <=` before SQL is produced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::NeptuneError;
use crate::value::Value;

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Supported comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
}

impl CompareOp {
    /// Returns the SQL token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }
}

impl FromStr for CompareOp {
    type Err = NeptuneError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "=" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            other => Err(NeptuneError::invalid(format!("invalid operator in query: [{other}]"))),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical connective of an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    /// Both sides must hold.
    And,
    /// Either side must hold.
    Or,
}

impl LogicOp {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

// ============================================================================
// SECTION: Leaves
// ============================================================================

/// A single `column OP literal` comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comparison {
    /// Column name.
    pub column: String,
    /// Operator token as supplied by the caller.
    pub operator: String,
    /// Right-hand literal.
    pub literal: Value,
}

impl Comparison {
    /// Creates a comparison leaf.
    #[must_use]
    pub fn new(
        column: impl Into<String>,
        operator: impl Into<String>,
        literal: impl Into<Value>,
    ) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            literal: literal.into(),
        }
    }
}

// ============================================================================
// SECTION: Trees
// ============================================================================

/// Boolean tree of comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// Comparison leaf.
    Compare(Comparison),
    /// Internal node combining two subtrees.
    Logic {
        /// Connective.
        op: LogicOp,
        /// Left subtree.
        left: Box<Predicate>,
        /// Right subtree.
        right: Box<Predicate>,
    },
}

impl Predicate {
    /// Creates a comparison leaf.
    #[must_use]
    pub fn compare(
        column: impl Into<String>,
        operator: impl Into<String>,
        literal: impl Into<Value>,
    ) -> Self {
        Self::Compare(Comparison::new(column, operator, literal))
    }

    /// Combines two subtrees under AND.
    #[must_use]
    pub fn and(left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::combine(LogicOp::And, left.into(), right.into())
    }

    /// Combines two subtrees under OR.
    #[must_use]
    pub fn or(left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::combine(LogicOp::Or, left.into(), right.into())
    }

    /// Builds an internal node.
    #[must_use]
    pub fn combine(op: LogicOp, left: Self, right: Self) -> Self {
        Self::Logic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Returns the number of comparison leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Compare(_) => 1,
            Self::Logic {
                left,
                right,
                ..
            } => left.leaf_count() + right.leaf_count(),
        }
    }
}

impl From<Comparison> for Predicate {
    fn from(comparison: Comparison) -> Self {
        Self::Compare(comparison)
    }
}

/// Fold a new subtree into an optional root under an implicit AND.
///
/// The existing root always stays on the left, so repeated folding is
/// left-associative: `a, b, c` becomes `((a AND b) AND c)`.
#[must_use]
pub fn fold_and(root: Option<Predicate>, next: Predicate) -> Predicate {
    match root {
        None => next,
        Some(existing) => Predicate::combine(LogicOp::And, existing, next),
    }
}
