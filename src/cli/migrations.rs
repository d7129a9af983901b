//! Database migration operations.

use qa_generator::QaGeneratorConfig;
use qa_generator::persistence::migrate_database;
use qa_generator::telemetry::StderrJsonlTelemetrySink;

use super::error::CliError;
use super::output::{to_stdout, write_text};

/// Runs database migrations and reports the resulting schema version.
///
/// # Errors
///
/// Returns [`CliError::Storage`] if the database URL is missing or blank, or
/// the connection or a migration fails.
pub fn run(config: &QaGeneratorConfig) -> Result<(), CliError> {
    let database_url = config.require_database_url()?;

    let telemetry = StderrJsonlTelemetrySink;
    let version = migrate_database(database_url, &telemetry)?;
    to_stdout(|stdout| {
        write_text(
            stdout,
            &format!("Database ready at schema version {}", version.as_str()),
        )
    })
}
