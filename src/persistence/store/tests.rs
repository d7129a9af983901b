//! Tests for the local configuration and history store.

type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

use diesel::Connection;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sqlite::SqliteConnection;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::{DispatchOutcome, LocalStore, NewNotification, SlackUser};
use crate::persistence::{PersistenceError, migrate_database};
use crate::telemetry::NoopTelemetrySink;

#[fixture]
fn temp_db() -> FixtureResult<(TempDir, String)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("qa-generator.sqlite");
    Ok((temp_dir, db_path.to_string_lossy().to_string()))
}

#[fixture]
fn migrated_store(temp_db: FixtureResult<(TempDir, String)>) -> FixtureResult<(TempDir, LocalStore)> {
    let (temp_dir, database_url) = temp_db?;
    migrate_database(&database_url, &NoopTelemetrySink)?;

    let store = LocalStore::new(database_url)?;
    Ok((temp_dir, store))
}

fn notification<'a>(destination: &'a str, message: &'a str) -> NewNotification<'a> {
    NewNotification {
        timestamp: "2024-01-01 10:00",
        destination,
        rendered_message: message,
        outcome: DispatchOutcome::Success,
        sent_by: "alice",
    }
}

#[rstest]
fn new_rejects_blank_database_url() {
    let result = LocalStore::new("  ");

    assert!(
        matches!(result, Err(PersistenceError::BlankDatabaseUrl)),
        "expected BlankDatabaseUrl, got {result:?}"
    );
}

#[rstest]
fn set_config_then_get_config_returns_value(
    migrated_store: FixtureResult<(TempDir, LocalStore)>,
) {
    let (_temp_dir, store) = migrated_store.expect("fixture should succeed");

    store
        .set_config("slack_token", "abc")
        .expect("set should succeed");

    assert_eq!(
        store.get_config("slack_token").expect("get should succeed"),
        Some("abc".to_owned())
    );
}

#[rstest]
fn get_config_of_missing_key_is_absent(migrated_store: FixtureResult<(TempDir, LocalStore)>) {
    let (_temp_dir, store) = migrated_store.expect("fixture should succeed");

    let value = store
        .get_config("missing_key")
        .expect("missing key should not be an error");

    assert_eq!(value, None);
}

#[rstest]
fn set_config_upserts_existing_key(migrated_store: FixtureResult<(TempDir, LocalStore)>) {
    let (_temp_dir, store) = migrated_store.expect("fixture should succeed");

    store.set_config("workspace", "old").expect("first set");
    store.set_config("workspace", "new").expect("second set");

    assert_eq!(
        store.get_config("workspace").expect("get should succeed"),
        Some("new".to_owned())
    );
}

#[rstest]
fn empty_string_is_distinct_from_absent(migrated_store: FixtureResult<(TempDir, LocalStore)>) {
    let (_temp_dir, store) = migrated_store.expect("fixture should succeed");

    store.set_config("slack_user", "").expect("set should succeed");

    assert_eq!(
        store.get_config("slack_user").expect("get should succeed"),
        Some(String::new())
    );
}

#[rstest]
fn append_notification_then_list_returns_record(
    migrated_store: FixtureResult<(TempDir, LocalStore)>,
) {
    let (_temp_dir, store) = migrated_store.expect("fixture should succeed");

    store
        .append_notification(notification("#qa", "hello"))
        .expect("append should succeed");

    let records = store.list_notifications().expect("list should succeed");
    assert_eq!(records.len(), 1);
    let record = records.first().expect("one record");
    assert_eq!(record.timestamp, "2024-01-01 10:00");
    assert_eq!(record.destination, "#qa");
    assert_eq!(record.rendered_message, "hello");
    assert_eq!(record.outcome, DispatchOutcome::Success);
    assert_eq!(record.sent_by, "alice");
}

#[rstest]
fn list_notifications_preserves_insertion_order(
    migrated_store: FixtureResult<(TempDir, LocalStore)>,
) {
    let (_temp_dir, store) = migrated_store.expect("fixture should succeed");

    let first_id = store
        .append_notification(notification("#qa", "first"))
        .expect("first append");
    let second_id = store
        .append_notification(NewNotification {
            outcome: DispatchOutcome::Failure,
            ..notification("@bob", "second")
        })
        .expect("second append");

    assert!(second_id > first_id, "identities should increase");

    let records = store.list_notifications().expect("list should succeed");
    let messages: Vec<&str> = records
        .iter()
        .map(|record| record.rendered_message.as_str())
        .collect();
    assert_eq!(messages, vec!["first", "second"]);
    assert_eq!(
        records.last().map(|record| record.outcome),
        Some(DispatchOutcome::Failure)
    );
}

#[rstest]
fn save_slack_users_upserts_and_lists_by_id(
    migrated_store: FixtureResult<(TempDir, LocalStore)>,
) {
    let (_temp_dir, store) = migrated_store.expect("fixture should succeed");

    let users = vec![
        SlackUser {
            id: "U2".to_owned(),
            username: "bob".to_owned(),
            real_name: "Bob".to_owned(),
        },
        SlackUser {
            id: "U1".to_owned(),
            username: "alice".to_owned(),
            real_name: String::new(),
        },
    ];
    store.save_slack_users(&users).expect("save should succeed");
    store
        .save_slack_users(&[SlackUser {
            id: "U2".to_owned(),
            username: "bobby".to_owned(),
            real_name: "Bob B".to_owned(),
        }])
        .expect("upsert should succeed");

    let cached = store.list_slack_users().expect("list should succeed");
    let summary: Vec<(&str, &str)> = cached
        .iter()
        .map(|user| (user.id.as_str(), user.username.as_str()))
        .collect();
    assert_eq!(summary, vec![("U1", "alice"), ("U2", "bobby")]);
}

#[rstest]
fn operations_report_missing_schema_when_unmigrated(temp_db: FixtureResult<(TempDir, String)>) {
    let (_temp_dir, database_url) = temp_db.expect("fixture should succeed");
    let store = LocalStore::new(database_url).expect("store should build");

    assert_eq!(
        store.get_config("slack_token"),
        Err(PersistenceError::SchemaNotInitialised)
    );
    assert_eq!(
        store.list_notifications(),
        Err(PersistenceError::SchemaNotInitialised)
    );
    assert_eq!(
        store.append_notification(notification("#qa", "hello")),
        Err(PersistenceError::SchemaNotInitialised)
    );
}

#[rstest]
#[case::current_success("Success", DispatchOutcome::Success)]
#[case::current_failure("Failure", DispatchOutcome::Failure)]
#[case::desktop_success("Éxito", DispatchOutcome::Success)]
#[case::unaccented_success(" exito ", DispatchOutcome::Success)]
#[case::desktop_failure("Error", DispatchOutcome::Failure)]
fn outcome_parses_current_and_desktop_spellings(
    #[case] stored: &str,
    #[case] expected: DispatchOutcome,
) {
    assert_eq!(DispatchOutcome::parse(stored), Ok(expected));
}

#[rstest]
fn unknown_outcome_string_is_malformed() {
    let result = DispatchOutcome::parse("Pending");

    assert!(
        matches!(result, Err(PersistenceError::MalformedRow { .. })),
        "expected MalformedRow, got {result:?}"
    );
}

#[rstest]
fn history_stays_readable_with_foreign_outcomes(temp_db: FixtureResult<(TempDir, String)>) {
    let (_temp_dir, database_url) = temp_db.expect("fixture should succeed");
    migrate_database(&database_url, &NoopTelemetrySink).expect("migration should succeed");
    let store = LocalStore::new(database_url.as_str()).expect("store should build");
    store
        .append_notification(notification("#qa", "current"))
        .expect("append should succeed");

    let mut connection =
        SqliteConnection::establish(&database_url).expect("connection should succeed");
    sql_query(
        "INSERT INTO historial_envios (fecha, destino, mensaje, estado, usuario) \
         VALUES ('now', '#qa', 'desktop', 'Éxito', 'ana'), \
                ('now', '#qa', 'odd', 'Pending', 'ana');",
    )
    .execute(&mut connection)
    .expect("raw insert should succeed");

    let records = store
        .list_notifications()
        .expect("history should stay readable");

    let outcomes: Vec<_> = records.iter().map(|record| record.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            DispatchOutcome::Success,
            DispatchOutcome::Success,
            DispatchOutcome::Failure
        ]
    );
}

#[rstest]
fn connection_failure_is_reported() {
    let store = LocalStore::new("/nonexistent-dir/definitely/missing.sqlite")
        .expect("store should build");

    let error = store
        .get_config("anything")
        .expect_err("connection should fail");

    assert!(
        matches!(error, PersistenceError::ConnectionFailed { .. }),
        "expected ConnectionFailed, got {error:?}"
    );
}
