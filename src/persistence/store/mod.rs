//! Local key/value configuration and notification history backed by `SQLite`.
//!
//! Every call opens a short-lived connection, runs a single statement (or a
//! single batch for the Slack user cache) and drops the connection again.
//! The notification history is append-only: nothing here updates or deletes
//! a past record, and reads always return rows in insertion order.

use std::fmt;

use diesel::Connection;
use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};

use super::PersistenceError;

const CONFIG_TABLE: &str = "config";
const HISTORY_TABLE: &str = "historial_envios";
const SLACK_USERS_TABLE: &str = "slack_users";

/// Outcome of a dispatch attempt as stored in the history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchOutcome {
    /// The provider accepted the message.
    Success,
    /// The provider rejected the message or the transport failed.
    Failure,
}

impl DispatchOutcome {
    /// Returns the value written to the `estado` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failure => "Failure",
        }
    }

    /// Parses a stored `estado` value, ignoring case and surrounding
    /// whitespace. Histories written by the desktop application use `Éxito`
    /// and `Error`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::MalformedRow`] for any other string.
    pub fn parse(value: &str) -> Result<Self, PersistenceError> {
        match value.trim().to_lowercase().as_str() {
            "success" | "éxito" | "exito" => Ok(Self::Success),
            "failure" | "error" => Ok(Self::Failure),
            _ => Err(PersistenceError::MalformedRow {
                message: format!("unknown dispatch outcome `{value}`"),
            }),
        }
    }
}

impl From<bool> for DispatchOutcome {
    fn from(succeeded: bool) -> Self {
        if succeeded {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A notification history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRecord {
    /// Auto-incremented identity.
    pub id: i64,
    /// Free-form timestamp recorded by the dispatcher.
    pub timestamp: String,
    /// Channel or user identifier.
    pub destination: String,
    /// Text that was (or would have been) sent.
    pub rendered_message: String,
    /// Whether the provider accepted the message.
    pub outcome: DispatchOutcome,
    /// Name of the person who triggered the dispatch.
    pub sent_by: String,
}

/// Data required to append a notification history row.
#[derive(Debug, Clone, Copy)]
pub struct NewNotification<'a> {
    /// Free-form timestamp.
    pub timestamp: &'a str,
    /// Channel or user identifier.
    pub destination: &'a str,
    /// Text that was (or would have been) sent.
    pub rendered_message: &'a str,
    /// Whether the provider accepted the message.
    pub outcome: DispatchOutcome,
    /// Name of the person who triggered the dispatch.
    pub sent_by: &'a str,
}

/// A Slack workspace member cached locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackUser {
    /// Slack member id (e.g. `U012AB3CD`).
    pub id: String,
    /// Handle shown in mentions.
    pub username: String,
    /// Display name; may be empty.
    pub real_name: String,
}

/// SQLite-backed store for configuration, history and the Slack user cache.
#[derive(Debug, Clone)]
pub struct LocalStore {
    database_url: String,
}

impl LocalStore {
    /// Creates a store targeting `database_url`.
    ///
    /// No connection is opened until the first operation.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] when the URL is blank.
    pub fn new(database_url: impl Into<String>) -> Result<Self, PersistenceError> {
        let database_url_string = database_url.into();
        if database_url_string.trim().is_empty() {
            return Err(PersistenceError::BlankDatabaseUrl);
        }
        Ok(Self {
            database_url: database_url_string,
        })
    }

    /// Inserts or replaces a configuration value.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened, the
    /// schema is missing, or the write fails.
    pub fn set_config(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut connection = self.establish_connection()?;

        sql_query(
            "INSERT INTO config (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
        )
        .bind::<Text, _>(key)
        .bind::<Text, _>(value)
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| Self::map_write_error(&mut connection, CONFIG_TABLE, &error))?;

        tracing::debug!(key, "configuration value stored");
        Ok(())
    }

    /// Looks up a configuration value; a missing key yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened, the
    /// schema is missing, or the query fails.
    pub fn get_config(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = Nullable<Text>)]
            value: Option<String>,
        }

        let mut connection = self.establish_connection()?;

        let row: Option<Row> = sql_query("SELECT value FROM config WHERE key = ? LIMIT 1;")
            .bind::<Text, _>(key)
            .get_result(&mut connection)
            .optional()
            .map_err(|error| Self::map_query_error(&mut connection, CONFIG_TABLE, &error))?;

        Ok(row.and_then(|found| found.value))
    }

    /// Appends a dispatch attempt to the history and returns its identity.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened, the
    /// schema is missing, or the insert fails.
    pub fn append_notification(
        &self,
        notification: NewNotification<'_>,
    ) -> Result<i64, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            id: i64,
        }

        let mut connection = self.establish_connection()?;

        sql_query(
            "INSERT INTO historial_envios (fecha, destino, mensaje, estado, usuario) \
             VALUES (?, ?, ?, ?, ?);",
        )
        .bind::<Text, _>(notification.timestamp)
        .bind::<Text, _>(notification.destination)
        .bind::<Text, _>(notification.rendered_message)
        .bind::<Text, _>(notification.outcome.as_str())
        .bind::<Text, _>(notification.sent_by)
        .execute(&mut connection)
        .map_err(|error| Self::map_write_error(&mut connection, HISTORY_TABLE, &error))?;

        let row: Row = sql_query("SELECT last_insert_rowid() AS id;")
            .get_result(&mut connection)
            .map_err(|error| PersistenceError::QueryFailed {
                message: error.to_string(),
            })?;

        tracing::debug!(
            id = row.id,
            destination = notification.destination,
            outcome = notification.outcome.as_str(),
            "notification appended to history"
        );
        Ok(row.id)
    }

    /// Returns the full notification history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened, the
    /// schema is missing or the query fails. Rows with an unrecognised
    /// outcome are read as [`DispatchOutcome::Failure`].
    pub fn list_notifications(&self) -> Result<Vec<NotificationRecord>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            id: i64,
            #[diesel(sql_type = Text)]
            fecha: String,
            #[diesel(sql_type = Text)]
            destino: String,
            #[diesel(sql_type = Text)]
            mensaje: String,
            #[diesel(sql_type = Text)]
            estado: String,
            #[diesel(sql_type = Text)]
            usuario: String,
        }

        let mut connection = self.establish_connection()?;

        let rows: Vec<Row> = sql_query(
            "SELECT id, fecha, destino, mensaje, estado, usuario \
             FROM historial_envios ORDER BY id ASC;",
        )
        .load(&mut connection)
        .map_err(|error| Self::map_query_error(&mut connection, HISTORY_TABLE, &error))?;

        Ok(rows
            .into_iter()
            .map(|row| NotificationRecord {
                    id: row.id,
                    timestamp: row.fecha,
                    destination: row.destino,
                    rendered_message: row.mensaje,
                    outcome: DispatchOutcome::parse(&row.estado).unwrap_or_else(|error| {
                        tracing::warn!(id = row.id, %error, "reading history row as a failure");
                        DispatchOutcome::Failure
                    }),
                    sent_by: row.usuario,
            })
            .collect())
    }

    /// Inserts or replaces cached Slack users in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened, the
    /// schema is missing, or any write fails (in which case nothing is
    /// stored).
    pub fn save_slack_users(&self, users: &[SlackUser]) -> Result<(), PersistenceError> {
        let mut connection = self.establish_connection()?;

        let outcome = connection.transaction::<_, diesel::result::Error, _>(|transaction| {
            for user in users {
                sql_query(
                    "INSERT INTO slack_users (id, username, real_name) VALUES (?, ?, ?) \
                     ON CONFLICT(id) DO UPDATE SET \
                       username = excluded.username, \
                       real_name = excluded.real_name;",
                )
                .bind::<Text, _>(user.id.as_str())
                .bind::<Text, _>(user.username.as_str())
                .bind::<Text, _>(user.real_name.as_str())
                .execute(transaction)?;
            }
            Ok(())
        });

        outcome
            .map_err(|error| Self::map_write_error(&mut connection, SLACK_USERS_TABLE, &error))?;
        tracing::debug!(count = users.len(), "slack users cached");
        Ok(())
    }

    /// Returns the cached Slack users ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened, the
    /// schema is missing, or the query fails.
    pub fn list_slack_users(&self) -> Result<Vec<SlackUser>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = Text)]
            id: String,
            #[diesel(sql_type = Nullable<Text>)]
            username: Option<String>,
            #[diesel(sql_type = Nullable<Text>)]
            real_name: Option<String>,
        }

        let mut connection = self.establish_connection()?;

        let rows: Vec<Row> =
            sql_query("SELECT id, username, real_name FROM slack_users ORDER BY id ASC;")
                .load(&mut connection)
                .map_err(|error| {
                    Self::map_query_error(&mut connection, SLACK_USERS_TABLE, &error)
                })?;

        Ok(rows
            .into_iter()
            .map(|row| SlackUser {
                id: row.id,
                username: row.username.unwrap_or_default(),
                real_name: row.real_name.unwrap_or_default(),
            })
            .collect())
    }

    fn establish_connection(&self) -> Result<SqliteConnection, PersistenceError> {
        SqliteConnection::establish(&self.database_url).map_err(|error| {
            PersistenceError::ConnectionFailed {
                message: error.to_string(),
            }
        })
    }

    fn table_exists(
        connection: &mut SqliteConnection,
        table: &str,
    ) -> Result<bool, diesel::result::Error> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            count: i64,
        }

        let row: Row = sql_query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?;",
        )
        .bind::<Text, _>(table)
        .get_result(connection)?;

        Ok(row.count > 0)
    }

    fn map_error_with_schema_check<F>(
        connection: &mut SqliteConnection,
        table: &str,
        error: &diesel::result::Error,
        create_error: F,
    ) -> PersistenceError
    where
        F: Fn(String) -> PersistenceError,
    {
        match Self::table_exists(connection, table) {
            Ok(false) => PersistenceError::SchemaNotInitialised,
            Ok(true) => create_error(error.to_string()),
            Err(check_error) => create_error(format!(
                "schema presence check failed: {check_error}; original error: {error}"
            )),
        }
    }

    fn map_query_error(
        connection: &mut SqliteConnection,
        table: &str,
        error: &diesel::result::Error,
    ) -> PersistenceError {
        Self::map_error_with_schema_check(connection, table, error, |message| {
            PersistenceError::QueryFailed { message }
        })
    }

    fn map_write_error(
        connection: &mut SqliteConnection,
        table: &str,
        error: &diesel::result::Error,
    ) -> PersistenceError {
        Self::map_error_with_schema_check(connection, table, error, |message| {
            PersistenceError::WriteFailed { message }
        })
    }
}

#[cfg(test)]
mod tests;
