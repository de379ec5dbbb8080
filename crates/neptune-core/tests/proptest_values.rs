// crates/neptune-core/tests/proptest_values.rs
// ============================================================================
// Module: Value Property-Based Tests
// Description: Round-trip and rendering properties over wide input ranges.
// Purpose: Detect lossy serialization and unbalanced predicate rendering.
// ============================================================================

//! Property-based tests for value serialization and predicate rendering.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    missing_docs,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;

use neptune_core::ColumnDescriptor;
use neptune_core::ColumnKind;
use neptune_core::Dialect;
use neptune_core::EntitySchema;
use neptune_core::Predicate;
use neptune_core::Query;
use neptune_core::Record;
use neptune_core::Value;
use neptune_core::compile_predicate;
use proptest::prelude::*;

fn schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::builder("sample")
            .primary("id")
            .column(ColumnDescriptor::new("signed", ColumnKind::Int32, true))
            .column(ColumnDescriptor::new("unsigned", ColumnKind::UInt32, true))
            .column(ColumnDescriptor::new(
                "label",
                ColumnKind::Varchar {
                    max_length: 24,
                },
                true,
            ))
            .build(),
    )
}

/// Serializes a value the way the compiler does, then hydrates it back.
fn round_trip(column: &str, value: Value) -> Value {
    let mut record = Record::new(schema());
    record.set(column, value).unwrap();
    let literal = Dialect::MariaDb.cell_literal(record.cell(column).unwrap()).unwrap();
    let mut hydrated = Record::new(schema());
    hydrated.set_value_from_string(column, Some(&literal)).unwrap();
    hydrated.get(column).unwrap().unwrap().clone()
}

fn leaf_strategy() -> impl Strategy<Value = Predicate> {
    (
        prop_oneof![Just("signed"), Just("unsigned")],
        prop_oneof![Just("="), Just("!="), Just(">"), Just("<"), Just(">="), Just("<=")],
        any::<u16>(),
    )
        .prop_map(|(column, op, literal)| {
            if column == "signed" {
                Predicate::compare(column, op, i32::from(literal))
            } else {
                Predicate::compare(column, op, u32::from(literal))
            }
        })
}

fn tree_strategy() -> impl Strategy<Value = Predicate> {
    leaf_strategy().prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(left, right)| Predicate::and(left, right)),
            (inner.clone(), inner).prop_map(|(left, right)| Predicate::or(left, right)),
        ]
    })
}

proptest! {
    #[test]
    fn signed_values_round_trip(value in any::<i32>()) {
        prop_assert_eq!(round_trip("signed", Value::Int32(value)), Value::Int32(value));
    }

    #[test]
    fn unsigned_values_round_trip(value in any::<u32>()) {
        prop_assert_eq!(round_trip("unsigned", Value::UInt32(value)), Value::UInt32(value));
    }

    #[test]
    fn text_survives_hydration(text in "[^\"\\\\]{0,24}") {
        let mut record = Record::new(schema());
        record.set_value_from_string("label", Some(&text)).unwrap();
        prop_assert_eq!(record.get("label").unwrap(), Some(&Value::Text(text.clone())));
    }

    #[test]
    fn rendered_trees_are_fully_parenthesized(tree in tree_strategy()) {
        let sql = compile_predicate(&schema(), &tree, Dialect::MariaDb).unwrap();
        let opens = sql.matches('(').count();
        let closes = sql.matches(')').count();
        prop_assert_eq!(opens, closes);
        prop_assert_eq!(opens, 2 * tree.leaf_count() - 1);
        prop_assert!(sql.starts_with('(') && sql.ends_with(')'));
    }

    #[test]
    fn chained_where_matches_explicit_left_fold(
        leaves in prop::collection::vec(leaf_strategy(), 1 .. 6)
    ) {
        let chained = leaves
            .iter()
            .cloned()
            .fold(Query::new(), |query, leaf| query.where_tree(leaf));
        let mut iter = leaves.into_iter();
        let first = iter.next().unwrap();
        let folded = iter.fold(first, |root, leaf| Predicate::and(root, leaf));
        prop_assert_eq!(chained.predicate(), Some(&folded));
    }
}
