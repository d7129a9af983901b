//! QA Generator command-line entrypoint.

mod cli;

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use ortho_config::OrthoConfig;
use qa_generator::QaGeneratorConfig;
use qa_generator::tasks::TaskGroup;
use tokio::sync::oneshot;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::error::CliError;

/// Upper bound on waiting for the running operation after an interrupt.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(%error, "operation failed");
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CliError> {
    let config = load_config()?;

    let mut group = TaskGroup::new();
    let (sender, receiver) = oneshot::channel();
    group.spawn("operation", move |mut signal| async move {
        let outcome = tokio::select! {
            result = cli::run(&config) => result,
            () = signal.cancelled() => Err(CliError::Interrupted),
        };
        if sender.send(outcome).is_err() {
            tracing::debug!("operation result dropped");
        }
    });

    let outcome = tokio::select! {
        received = receiver => received.unwrap_or(Err(CliError::Interrupted)),
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupt received; cancelling");
            Err(CliError::Interrupted)
        }
    };

    let report = group.shutdown(SHUTDOWN_GRACE).await;
    tracing::debug!(?report, "background tasks stopped");
    outcome
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`CliError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<QaGeneratorConfig, CliError> {
    QaGeneratorConfig::load().map_err(|error| CliError::Configuration {
        message: error.to_string(),
    })
}

/// Logs go to stderr so stdout carries only operation output.
/// `QA_GENERATOR_LOG` takes an `EnvFilter` directive and
/// `QA_GENERATOR_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("QA_GENERATOR_LOG")
        .unwrap_or_else(|_| EnvFilter::new("qa_generator=info,warn"));
    let format = env::var("QA_GENERATOR_LOG_FORMAT").unwrap_or_default();

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(io::stderr))
            .init();
    }
}
