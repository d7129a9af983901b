//! Local persistence and database migrations.
//!
//! QA Generator keeps a small `SQLite` file holding configuration values, the
//! append-only notification history, and a cache of Slack workspace members.
//! The schema is managed with Diesel migrations embedded in the binary.

mod error;
mod migrator;
mod store;

pub use error::PersistenceError;
pub use migrator::{INITIAL_SCHEMA_VERSION, SchemaVersion, migrate_database};
pub use store::{DispatchOutcome, LocalStore, NewNotification, NotificationRecord, SlackUser};
