// crates/neptune-core/tests/connection_concurrency.rs
// ============================================================================
// Module: Connection Concurrency Tests
// Description: Serialization of concurrent callers on one connection handle.
// Purpose: Ensure statements never interleave, nested lookups included.
// Dependencies: neptune-core
// ============================================================================

//! ## Overview
//! A timing executor records entry and exit instants for every call. Two
//! threads hammer one connection with relation-resolving selects; the
//! recorded intervals must never overlap and each select's nested lookup
//! must directly follow its parent query.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

mod common;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::ThreadId;
use std::time::Duration;
use std::time::Instant;

use common::PROFILE_KEY;
use common::USER_KEY;
use common::User;
use common::driver_with_sink;
use common::row;
use neptune_core::Executor;
use neptune_core::NeptuneError;
use neptune_core::Query;
use neptune_core::Row;
use neptune_core::StoreError;

// ============================================================================
// SECTION: Timing Executor
// ============================================================================

/// One observed executor call.
#[derive(Debug, Clone, Copy)]
struct Span {
    thread: ThreadId,
    entered: Instant,
    exited: Instant,
}

/// Executor that sleeps inside every call and records its span.
struct TimingExecutor {
    spans: Arc<Mutex<Vec<Span>>>,
}

impl TimingExecutor {
    fn observe<T>(&self, result: T) -> T {
        let entered = Instant::now();
        thread::sleep(Duration::from_millis(2));
        let exited = Instant::now();
        self.spans.lock().unwrap().push(Span {
            thread: thread::current().id(),
            entered,
            exited,
        });
        result
    }
}

impl Executor for TimingExecutor {
    fn execute(&mut self, _sql: &str) -> Result<(), StoreError> {
        self.observe(Ok(()))
    }

    fn execute_query(&mut self, sql: &str) -> Result<Vec<Row>, StoreError> {
        let rows = if sql.contains("FROM `profile`") {
            vec![row(&[("id", Some("2")), ("bio", None), ("__instance_key", Some(PROFILE_KEY))])]
        } else {
            vec![row(&[
                ("id", Some("1")),
                ("age", Some("40")),
                ("__instance_key", Some(USER_KEY)),
                ("profile", Some(PROFILE_KEY)),
            ])]
        };
        self.observe(Ok(rows))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn concurrent_callers_never_interleave_statements() {
    let (driver, _sink) = driver_with_sink();
    let spans = Arc::new(Mutex::new(Vec::new()));
    let connection = Arc::new(driver.connect(Box::new(TimingExecutor {
        spans: Arc::clone(&spans),
    })));

    let workers: Vec<_> = (0 .. 2)
        .map(|_| {
            let connection = Arc::clone(&connection);
            thread::spawn(move || {
                for _ in 0 .. 10 {
                    let users: Vec<User> =
                        connection.select(&Query::new().relation("profile")).unwrap();
                    assert!(users[0].profile.is_present());
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let mut spans = spans.lock().unwrap().clone();
    assert_eq!(spans.len(), 40);
    spans.sort_by_key(|span| span.entered);
    for pair in spans.windows(2) {
        assert!(pair[1].entered >= pair[0].exited, "overlapping calls: {pair:?}");
    }
    for select in spans.chunks(2) {
        assert_eq!(select[0].thread, select[1].thread, "nested lookup split from its parent");
    }
}

#[test]
fn close_waits_for_in_flight_operation() {
    let (driver, _sink) = driver_with_sink();
    let spans = Arc::new(Mutex::new(Vec::new()));
    let connection = Arc::new(driver.connect(Box::new(TimingExecutor {
        spans: Arc::clone(&spans),
    })));

    let reader = {
        let connection = Arc::clone(&connection);
        thread::spawn(move || connection.select::<User>(&Query::new().relation("profile")))
    };
    thread::sleep(Duration::from_millis(1));
    connection.close().unwrap();
    let closed_at = Instant::now();

    match reader.join().unwrap() {
        Ok(users) => {
            assert_eq!(users.len(), 1);
            let spans = spans.lock().unwrap();
            assert!(spans.iter().all(|span| span.exited <= closed_at));
        }
        Err(err) => assert!(matches!(err, NeptuneError::Runtime(_)), "{err}"),
    }
    assert!(matches!(
        connection.select::<User>(&Query::new()),
        Err(NeptuneError::Runtime(_))
    ));
}
