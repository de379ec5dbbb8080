// crates/neptune-core/tests/value_cells.rs
// ============================================================================
// Module: Value Cell Tests
// Description: Tri-state cells, record validation, and typed entity conversion.
// Purpose: Ensure undefined, null, and present states stay distinct end to end.
// Dependencies: neptune-core
// ============================================================================

//! ## Overview
//! Covers cell transitions, record-level type and length checks, text
//! parsing on hydration, and the `entity!` conversions to and from records.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

mod common;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use common::Member;
use common::PROFILE_KEY;
use common::Profile;
use common::User;
use neptune_core::Cell;
use neptune_core::ColumnKind;
use neptune_core::Entity;
use neptune_core::NeptuneError;
use neptune_core::Record;
use neptune_core::RelationDirection;
use neptune_core::Value;

// ============================================================================
// SECTION: Cells
// ============================================================================

#[test]
fn cell_transitions_follow_the_tri_state() {
    let mut cell: Cell<i32> = Cell::default();
    assert!(cell.is_undefined());
    assert!(matches!(cell.get(), Err(NeptuneError::Runtime(_))));

    cell.set_null();
    assert!(cell.is_null());
    assert_eq!(cell.get().unwrap(), None);

    cell.set(4);
    assert!(cell.is_present());
    assert_eq!(cell.get().unwrap(), Some(&4));

    cell.set_undefined();
    assert!(cell.is_undefined());
}

#[test]
fn option_converts_to_null_or_present() {
    assert_eq!(Cell::from(None::<u32>), Cell::Null);
    assert_eq!(Cell::from(Some(3_u32)), Cell::Present(3));
}

// ============================================================================
// SECTION: Records
// ============================================================================

#[test]
fn record_starts_fully_undefined() {
    let record = Record::new(Member::schema());
    for name in ["id", "name", "rank"] {
        assert!(record.is_undefined(name).unwrap());
        assert!(!record.is_null(name).unwrap());
    }
    assert!(record.instance_key().is_undefined());
}

#[test]
fn record_get_distinguishes_null_from_undefined() {
    let mut record = Record::new(Member::schema());
    let err = record.get("rank").unwrap_err();
    assert!(matches!(err, NeptuneError::Runtime(_)), "{err}");
    record.set_null("rank").unwrap();
    assert_eq!(record.get("rank").unwrap(), None);
    record.set("rank", 9_u32).unwrap();
    assert_eq!(record.get("rank").unwrap(), Some(&Value::UInt32(9)));
}

#[test]
fn record_rejects_wrong_type_and_overlong_text() {
    let mut record = Record::new(Member::schema());
    assert!(matches!(record.set("rank", -1), Err(NeptuneError::InvalidArgument(_))));
    assert!(matches!(record.set("name", 5_u32), Err(NeptuneError::InvalidArgument(_))));
    assert!(matches!(
        record.set("name", "x".repeat(17)),
        Err(NeptuneError::InvalidArgument(_))
    ));
    record.set("name", "x".repeat(16)).unwrap();
}

#[test]
fn text_bound_counts_characters_not_bytes() {
    let mut record = Record::new(Member::schema());
    record.set("name", "é".repeat(16)).unwrap();
}

#[test]
fn unknown_names_are_invalid_arguments() {
    let mut record = Record::new(Member::schema());
    assert!(matches!(record.set("nope", 1), Err(NeptuneError::InvalidArgument(_))));
    assert!(matches!(record.is_null("nope"), Err(NeptuneError::InvalidArgument(_))));
    assert!(matches!(record.relation("nope"), Err(NeptuneError::InvalidArgument(_))));
}

#[test]
fn set_value_from_string_parses_by_kind() {
    let mut record = Record::new(User::schema());
    record.set_value_from_string("id", Some("42")).unwrap();
    record.set_value_from_string("age", Some("-7")).unwrap();
    assert_eq!(record.get("id").unwrap(), Some(&Value::UInt32(42)));
    assert_eq!(record.get("age").unwrap(), Some(&Value::Int32(-7)));

    record.set_value_from_string("age", None).unwrap();
    assert!(record.is_null("age").unwrap());
}

#[test]
fn set_value_from_string_never_zeroes_bad_integers() {
    let mut record = Record::new(User::schema());
    for raw in ["", "abc", "4294967296"] {
        let err = record.set_value_from_string("id", Some(raw)).unwrap_err();
        assert!(matches!(err, NeptuneError::Runtime(_)), "{raw}: {err}");
    }
    assert!(record.is_undefined("id").unwrap());
}

#[test]
fn empty_text_stays_empty_text() {
    let mut record = Record::new(Profile::schema());
    record.set_value_from_string("bio", Some("")).unwrap();
    assert_eq!(record.get("bio").unwrap(), Some(&Value::Text(String::new())));
}

#[test]
fn relation_rejects_peer_from_other_table() {
    let mut record = Record::new(User::schema());
    let stranger = Arc::new(Record::new(Member::schema()));
    assert!(matches!(
        record.set_relation("profile", stranger),
        Err(NeptuneError::InvalidArgument(_))
    ));
    record.set_relation("profile", Arc::new(Record::new(Profile::schema()))).unwrap();
    assert!(record.relation("profile").unwrap().is_present());
}

#[test]
fn instance_key_must_have_fixed_length() {
    let mut record = Record::new(User::schema());
    assert!(matches!(record.set_instance_key("short"), Err(NeptuneError::InvalidArgument(_))));
    record.set_instance_key(PROFILE_KEY).unwrap();
}

#[test]
fn instance_key_must_be_hyphenated_hex() {
    let mut record = Record::new(User::schema());
    let bad = "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz";
    assert_eq!(bad.len(), 36);
    assert!(matches!(record.set_instance_key(bad), Err(NeptuneError::InvalidArgument(_))));
    assert!(matches!(
        record.set_instance_key("0123456789abcdef0123456789abcdef0123"),
        Err(NeptuneError::InvalidArgument(_))
    ));
    assert!(record.instance_key().is_undefined());
    record.set_instance_key(PROFILE_KEY).unwrap();
}

// ============================================================================
// SECTION: Entities
// ============================================================================

#[test]
fn entity_schema_is_built_once_and_shared() {
    assert!(Arc::ptr_eq(&User::schema(), &User::schema()));
    let schema = Member::schema();
    assert_eq!(schema.table(), Member::TABLE);
    let names: Vec<&str> = schema.columns().iter().map(|column| column.name.as_str()).collect();
    assert_eq!(names, ["id", "name", "rank"]);
    assert!(schema.primary_key().is_some_and(|column| column.name == "id"));
    assert_eq!(
        schema.column("name").map(|column| column.kind),
        Some(ColumnKind::Varchar {
            max_length: 16
        })
    );
    assert!(schema.column("rank").is_some_and(|column| column.is_nullable));
    assert!(schema.column("name").is_some_and(|column| !column.is_nullable));
}

#[test]
fn entity_relations_carry_direction() {
    let user = User::schema();
    let relation = user.relation("profile").unwrap();
    assert_eq!(relation.direction, RelationDirection::Left);
    assert_eq!(relation.target_table, "profile");
    assert_eq!(relation.target_key, "user");
    assert_eq!(
        Profile::schema().relation("user").map(|relation| relation.direction),
        Some(RelationDirection::Right)
    );
}

#[test]
fn entity_round_trips_through_record() {
    let mut profile = Profile::default();
    profile.bio = Cell::Present("hello".to_string());
    let mut user = User::default();
    user.age = Cell::Null;
    user.profile = Cell::Present(Arc::new(profile.clone()));

    let record = user.to_record().unwrap();
    assert!(record.is_undefined("id").unwrap());
    assert!(record.is_null("age").unwrap());
    let peer = record.relation("profile").unwrap().as_present().unwrap();
    assert_eq!(peer.get("bio").unwrap(), Some(&Value::from("hello")));

    let back = User::from_record(&record).unwrap();
    assert_eq!(back, user);
    assert_eq!(back.profile.as_present().map(|peer| peer.as_ref()), Some(&profile));
}

#[test]
fn entity_to_record_enforces_column_bounds() {
    let mut member = Member::default();
    member.name = Cell::Present("n".repeat(40));
    assert!(matches!(member.to_record(), Err(NeptuneError::InvalidArgument(_))));
}

#[test]
fn entity_from_record_rejects_other_tables() {
    let record = Record::new(Member::schema());
    assert!(matches!(User::from_record(&record), Err(NeptuneError::InvalidArgument(_))));
}
