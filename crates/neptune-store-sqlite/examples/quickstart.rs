// crates/neptune-store-sqlite/examples/quickstart.rs
// ============================================================================
// Module: Neptune Quickstart
// Description: Registers two related entities and round-trips them in SQLite.
// Purpose: Show the declare, validate, initialize, insert, select flow.
// Dependencies: neptune-core, neptune-store-sqlite
// ============================================================================

//! Run with `cargo run -p neptune-store-sqlite --example quickstart`.

#![allow(clippy::print_stdout, clippy::use_debug, reason = "Example prints its results.")]

use std::error::Error;
use std::sync::Arc;

use neptune_core::Cell;
use neptune_core::Dialect;
use neptune_core::LogLevel;
use neptune_core::Query;
use neptune_core::SchemaRegistry;
use neptune_core::StderrLogSink;
use neptune_store_sqlite::SqliteExecutor;

neptune_core::entity! {
    /// A user with an optional profile.
    pub struct User("user") {
        columns {
            id: primary,
            handle: varchar(32),
            age: int32 [nullable],
        }
        relations {
            profile: Profile => left("profile", "user"),
        }
    }
}

neptune_core::entity! {
    /// A profile owned by exactly one user.
    pub struct Profile("profile") {
        columns {
            id: primary,
            bio: varchar(140) [nullable],
        }
        relations {
            user: User => right("user", "profile"),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut registry =
        SchemaRegistry::new(Dialect::Sqlite, Arc::new(StderrLogSink::new(LogLevel::Info)));
    registry.register::<User>().register::<Profile>();
    let driver = Arc::new(registry.validate()?);

    let mut executor = SqliteExecutor::open_in_memory()?;
    driver.initialize(&mut executor)?;
    let connection = driver.connect(Box::new(executor));

    let mut profile = Profile::default();
    profile.bio.set("Counts things for a living.".to_string());
    let profile = connection.insert(&profile)?;

    let mut user = User::default();
    user.handle.set("ada".to_string());
    user.age.set(36);
    user.profile = Cell::Present(Arc::new(profile));
    let user = connection.insert(&user)?;
    println!("inserted user {:?} with id {:?}", user.handle.get()?, user.id.get()?);

    for found in connection.select::<User>(&Query::new().relation("profile"))? {
        let bio = found.profile.as_present().and_then(|peer| peer.bio.as_present().cloned());
        println!("{:?} -> {:?}", found.handle.get()?, bio);
    }

    connection.close()?;
    Ok(())
}
