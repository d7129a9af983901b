//! Report dispatch with an audit trail.
//!
//! Every attempt that reaches the provider is appended to the notification
//! history, whether it succeeded or not. Validation failures are rejected
//! before anything is sent and leave no history row. History writes run on
//! tokio's blocking pool so the `SQLite` call never stalls a runtime worker.

use chrono::Local;

use super::{DispatchError, MessagingProvider, build_report_blocks};
use crate::persistence::{DispatchOutcome, LocalStore, NewNotification, PersistenceError};
use crate::report::{QaReport, ValidationError};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

/// Sender name recorded when none is configured.
pub const UNKNOWN_SENDER: &str = "unknown";

const HISTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Sends reports and messages through a [`MessagingProvider`] and records
/// each attempt in a [`LocalStore`].
pub struct Dispatcher<'a> {
    provider: &'a dyn MessagingProvider,
    store: &'a LocalStore,
    telemetry: &'a dyn TelemetrySink,
    sent_by: String,
}

impl<'a> Dispatcher<'a> {
    /// Creates a dispatcher that records `sent_by` as the sender.
    ///
    /// A blank sender is recorded as [`UNKNOWN_SENDER`].
    #[must_use]
    pub fn new(provider: &'a dyn MessagingProvider, store: &'a LocalStore, sent_by: &str) -> Self {
        let sender = sent_by.trim();
        Self {
            provider,
            store,
            telemetry: &NoopTelemetrySink,
            sent_by: if sender.is_empty() {
                UNKNOWN_SENDER.to_owned()
            } else {
                sender.to_owned()
            },
        }
    }

    /// Emits a [`TelemetryEvent::NotificationRecorded`] per history row.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: &'a dyn TelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Posts `report` as structured blocks.
    ///
    /// The canonical text rendering is what gets recorded in the history.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Validation`] when the report is incomplete or
    /// the destination is blank, the provider's error when the send fails,
    /// or [`DispatchError::Storage`] when the attempt cannot be recorded.
    pub async fn send_report(
        &self,
        report: &QaReport,
        destination: &str,
    ) -> Result<bool, DispatchError> {
        report.ensure_complete()?;
        let target = require_destination(destination)?;

        let blocks = build_report_blocks(report);
        let result = self.provider.send_structured_message(&blocks, target).await;
        self.finish(target, &report.render_text(), result).await
    }

    /// Sends `preceding_text` on its own, then the report.
    ///
    /// The preceding send is best effort: its failure is recorded and logged
    /// but does not stop the report. Blank preceding text is skipped.
    ///
    /// # Errors
    ///
    /// As for [`Dispatcher::send_report`]; only the report send decides the
    /// result.
    pub async fn send_custom_message(
        &self,
        report: &QaReport,
        destination: &str,
        preceding_text: &str,
    ) -> Result<bool, DispatchError> {
        report.ensure_complete()?;
        let target = require_destination(destination)?;

        let preceding = preceding_text.trim();
        if !preceding.is_empty() {
            let result = self.provider.send_message(preceding, target).await;
            if let Err(error) = self.finish(target, preceding, result).await {
                tracing::warn!(destination = target, %error, "preceding message was not delivered");
            }
        }

        self.send_report(report, target).await
    }

    /// Posts plain text.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Validation`] for blank text or destination,
    /// the provider's error when the send fails, or
    /// [`DispatchError::Storage`] when the attempt cannot be recorded.
    pub async fn send_message(&self, text: &str, destination: &str) -> Result<bool, DispatchError> {
        let target = require_destination(destination)?;
        if text.trim().is_empty() {
            return Err(ValidationError::RequiredField { field: "message" }.into());
        }

        let result = self.provider.send_message(text, target).await;
        self.finish(target, text, result).await
    }

    async fn finish(
        &self,
        destination: &str,
        message: &str,
        result: Result<bool, DispatchError>,
    ) -> Result<bool, DispatchError> {
        let succeeded = matches!(result, Ok(true));
        let outcome = DispatchOutcome::from(succeeded);
        let recorded = self.record(destination, message, outcome).await;

        match (result, recorded) {
            (Ok(delivered), Ok(())) => {
                tracing::info!(destination, outcome = %outcome, "dispatch completed");
                Ok(delivered)
            }
            (Ok(_), Err(storage)) => Err(storage),
            (Err(error), recorded_result) => {
                if let Err(storage) = recorded_result {
                    tracing::warn!(destination, %storage, "failed dispatch could not be recorded");
                }
                tracing::warn!(destination, %error, "dispatch failed");
                Err(error)
            }
        }
    }

    async fn record(
        &self,
        destination: &str,
        message: &str,
        outcome: DispatchOutcome,
    ) -> Result<(), DispatchError> {
        let timestamp = Local::now().format(HISTORY_TIMESTAMP_FORMAT).to_string();
        let store = self.store.clone();
        let owned_destination = destination.to_owned();
        let owned_message = message.to_owned();
        let sent_by = self.sent_by.clone();

        tokio::task::spawn_blocking(move || {
            store.append_notification(NewNotification {
                timestamp: &timestamp,
                destination: &owned_destination,
                rendered_message: &owned_message,
                outcome,
                sent_by: &sent_by,
            })
        })
        .await
        .map_err(|error| PersistenceError::WriteFailed {
            message: format!("history writer did not complete: {error}"),
        })??;

        self.telemetry.record(TelemetryEvent::NotificationRecorded {
            destination: destination.to_owned(),
            outcome: outcome.as_str().to_owned(),
        });
        Ok(())
    }
}

fn require_destination(destination: &str) -> Result<&str, ValidationError> {
    let trimmed = destination.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "destination",
        });
    }
    Ok(trimmed)
}
