//! Application telemetry events and sinks.
//!
//! Telemetry stays local: events describe operational facts (the schema
//! version after migrations, the outcome of each dispatch) and are either
//! dropped or written to stderr as JSON lines for debugging.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// Records the current database schema version after migrations apply.
    SchemaVersionRecorded {
        /// Diesel migration version string (e.g. `20250601000000`).
        schema_version: String,
    },
    /// A dispatch attempt was appended to the notification history.
    NotificationRecorded {
        /// Channel or user the message was addressed to.
        destination: String,
        /// `Success` or `Failure`.
        outcome: String,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Writes telemetry events to stderr as JSON lines.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        if let Err(error) = writeln_stderr(&serialised) {
            tracing::trace!("failed to write telemetry line: {error}");
        }
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}


#[cfg(test)]
mod tests {
    use super::TelemetryEvent;

    #[test]
    fn notification_event_serialises_with_snake_case_tag() {
        let event = TelemetryEvent::NotificationRecorded {
            destination: "#qa".to_owned(),
            outcome: "Success".to_owned(),
        };

        let json = serde_json::to_value(&event).expect("event should serialise");

        assert_eq!(
            json,
            serde_json::json!({
                "type": "notification_recorded",
                "destination": "#qa",
                "outcome": "Success"
            })
        );
    }
}
