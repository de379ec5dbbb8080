// crates/neptune-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Scripted executors, sample entities, and a collecting log sink.
// Purpose: Drive the connection and fetch engine without a real database.
// Dependencies: neptune-core
// ============================================================================

//! ## Overview
//! [`ScriptedExecutor`] records every statement it receives and answers
//! queries through a caller-supplied responder. The sample entities form one
//! `user`/`profile` relation pair plus a `member` table with a required
//! column.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use neptune_core::Dialect;
use neptune_core::Driver;
use neptune_core::Executor;
use neptune_core::LogEvent;
use neptune_core::LogSink;
use neptune_core::Row;
use neptune_core::SchemaRegistry;
use neptune_core::StoreError;

// ============================================================================
// SECTION: Entities
// ============================================================================

neptune_core::entity! {
    /// Sample user with an optional profile.
    pub struct User("user") {
        columns {
            id: primary,
            age: int32 [nullable],
        }
        relations {
            profile: Profile => left("profile", "user"),
        }
    }
}

neptune_core::entity! {
    /// Sample profile owned by a user.
    pub struct Profile("profile") {
        columns {
            id: primary,
            bio: varchar(64) [nullable],
        }
        relations {
            user: User => right("user", "profile"),
        }
    }
}

neptune_core::entity! {
    /// Sample member with a required name.
    pub struct Member("member") {
        columns {
            id: primary,
            name: varchar(16),
            rank: uint32 [nullable],
        }
        relations {}
    }
}

/// Instance keys used in canned rows.
pub const USER_KEY: &str = "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa";
/// Instance key of the canned profile row.
pub const PROFILE_KEY: &str = "bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb";

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Boxed query responder.
pub type Responder = Box<dyn FnMut(&str) -> Result<Vec<Row>, StoreError> + Send>;

/// Everything a scripted executor observed.
#[derive(Debug, Default)]
pub struct ExecutorLog {
    /// Statements passed to `execute`.
    pub statements: Vec<String>,
    /// Statements passed to `execute_query`.
    pub queries: Vec<String>,
    /// Whether `close` was called.
    pub closed: bool,
}

impl ExecutorLog {
    /// Total number of calls into the executor.
    pub fn calls(&self) -> usize {
        self.statements.len() + self.queries.len()
    }
}

/// Executor answering queries from a closure.
pub struct ScriptedExecutor {
    /// Shared observation log.
    log: Arc<Mutex<ExecutorLog>>,
    /// Produces rows for each query.
    responder: Responder,
    /// When set, every `execute` fails with this message.
    statement_error: Option<String>,
}

impl ScriptedExecutor {
    /// Creates an executor with a responder and returns its log handle.
    pub fn new(
        responder: impl FnMut(&str) -> Result<Vec<Row>, StoreError> + Send + 'static,
    ) -> (Self, Arc<Mutex<ExecutorLog>>) {
        let log = Arc::new(Mutex::new(ExecutorLog::default()));
        (
            Self {
                log: Arc::clone(&log),
                responder: Box::new(responder),
                statement_error: None,
            },
            log,
        )
    }

    /// Creates an executor whose queries always return no rows.
    pub fn empty() -> (Self, Arc<Mutex<ExecutorLog>>) {
        Self::new(|_| Ok(Vec::new()))
    }

    /// Creates an executor that answers queries from a fixed sequence.
    pub fn queued(responses: Vec<Vec<Row>>) -> (Self, Arc<Mutex<ExecutorLog>>) {
        let mut responses = responses.into_iter();
        Self::new(move |_| Ok(responses.next().unwrap_or_default()))
    }

    /// Makes every `execute` call fail.
    pub fn failing_statements(mut self, message: &str) -> Self {
        self.statement_error = Some(message.to_string());
        self
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&mut self, sql: &str) -> Result<(), StoreError> {
        self.log.lock().unwrap().statements.push(sql.to_string());
        match &self.statement_error {
            Some(message) => Err(StoreError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn execute_query(&mut self, sql: &str) -> Result<Vec<Row>, StoreError> {
        self.log.lock().unwrap().queries.push(sql.to_string());
        (self.responder)(sql)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

// ============================================================================
// SECTION: Log Sink
// ============================================================================

/// Sink keeping every event in memory.
#[derive(Default)]
pub struct CollectingSink {
    /// Recorded events.
    events: Mutex<Vec<LogEvent>>,
}

impl CollectingSink {
    /// Returns the identifiers of every recorded event.
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|event| event.event).collect()
    }

    /// Returns a copy of every recorded event.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl LogSink for CollectingSink {
    fn record(&self, event: &LogEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Builds a row from `(column, value)` pairs.
pub fn row(pairs: &[(&str, Option<&str>)]) -> Row {
    Row::from_pairs(pairs.iter().map(|(column, value)| (*column, *value)))
}

/// Validates the sample entities into a driver.
pub fn driver(sink: Arc<dyn LogSink>) -> Arc<Driver> {
    let mut registry = SchemaRegistry::new(Dialect::MariaDb, sink);
    registry.register::<User>().register::<Profile>().register::<Member>();
    Arc::new(registry.validate().unwrap())
}

/// Validates the sample entities with a collecting sink.
pub fn driver_with_sink() -> (Arc<Driver>, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::default());
    (driver(Arc::clone(&sink) as Arc<dyn LogSink>), sink)
}
