// crates/neptune-core/tests/log_sinks.rs
// ============================================================================
// Module: Log Sink Tests
// Description: JSON-lines output and level filtering of the built-in sinks.
// Purpose: Ensure log files stay machine-readable and append-only.
// Dependencies: neptune-core, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Writes events through [`FileLogSink`] into a temporary directory and
//! parses every line back as JSON.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use neptune_core::FileLogSink;
use neptune_core::LogEvent;
use neptune_core::LogLevel;
use neptune_core::LogSink;
use serde_json::Value;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn file_sink_writes_one_json_object_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("neptune.jsonl");
    let sink = FileLogSink::new(&path, LogLevel::Debug).unwrap();
    sink.record(
        &LogEvent::new("statement_executed", LogLevel::Debug)
            .with_table("user")
            .with_sql("DELETE FROM `user` WHERE (`id` = 1)"),
    );
    sink.record(&LogEvent::new("connection_closed", LogLevel::Info));

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> =
        content.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "statement_executed");
    assert_eq!(lines[0]["level"], "debug");
    assert_eq!(lines[0]["table"], "user");
    assert_eq!(lines[0]["sql"], "DELETE FROM `user` WHERE (`id` = 1)");
    assert!(lines[0]["timestamp_ms"].is_u64());
    assert!(lines[1].get("table").is_none());
    assert!(lines[1].get("message").is_none());
}

#[test]
fn file_sink_drops_events_below_minimum_level() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("neptune.jsonl");
    let sink = FileLogSink::new(&path, LogLevel::Warn).unwrap();
    sink.record(&LogEvent::new("query_executed", LogLevel::Debug));
    sink.record(&LogEvent::new("registry_validated", LogLevel::Info));
    sink.record(&LogEvent::new("operation_failed", LogLevel::Error).with_message("boom"));

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("\"message\":\"boom\""));
}

#[test]
fn reopening_appends_instead_of_truncating() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("neptune.jsonl");
    for _ in 0 .. 2 {
        let sink = FileLogSink::new(&path, LogLevel::Info).unwrap();
        sink.record(&LogEvent::new("registry_validated", LogLevel::Info));
    }
    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
}
