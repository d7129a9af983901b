//! Background tasks that share one cancellation signal.
//!
//! A [`TaskGroup`] owns every task it spawns. Tasks receive a
//! [`CancellationSignal`] and are expected to return promptly once it fires;
//! [`TaskGroup::shutdown`] raises the signal, waits a bounded time, then
//! aborts whatever is still running.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;

/// Cancellation flag handed to each spawned task.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    receiver: watch::Receiver<bool>,
}

impl CancellationSignal {
    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once cancellation is requested or the group is dropped.
    pub async fn cancelled(&mut self) {
        if self.receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            tracing::debug!("task group dropped before cancellation");
        }
    }
}

/// How a [`TaskGroup::shutdown`] ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Tasks that returned on their own.
    pub finished: usize,
    /// Tasks that panicked.
    pub failed: usize,
    /// Tasks still running at the deadline and aborted.
    pub aborted: usize,
}

/// A set of background tasks with structured cancellation.
#[derive(Debug)]
pub struct TaskGroup {
    cancel: watch::Sender<bool>,
    tasks: JoinSet<()>,
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            cancel,
            tasks: JoinSet::new(),
        }
    }

    /// Spawns `task` on the current runtime, passing it the group's
    /// cancellation signal.
    pub fn spawn<F, Fut>(&mut self, name: &'static str, task: F)
    where
        F: FnOnce(CancellationSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let signal = CancellationSignal {
            receiver: self.cancel.subscribe(),
        };
        let future = task(signal);
        self.tasks.spawn(async move {
            tracing::debug!(task = name, "background task started");
            future.await;
            tracing::debug!(task = name, "background task finished");
        });
    }

    /// Number of tasks not yet joined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether every task has been joined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Raises the cancellation signal without waiting.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Waits for the next task to complete. Returns `None` once the group is
    /// empty.
    pub async fn join_next(&mut self) -> Option<bool> {
        self.tasks.join_next().await.map(|result| {
            if let Err(error) = &result {
                tracing::warn!(%error, "background task failed");
            }
            result.is_ok()
        })
    }

    /// Cancels every task, waits up to `timeout` for them to return, then
    /// aborts stragglers.
    pub async fn shutdown(mut self, timeout: Duration) -> ShutdownReport {
        self.cancel();
        let mut report = ShutdownReport::default();

        let drained = tokio::time::timeout(timeout, async {
            while let Some(succeeded) = self.join_next().await {
                if succeeded {
                    report.finished += 1;
                } else {
                    report.failed += 1;
                }
            }
        })
        .await;

        if drained.is_err() {
            report.aborted = self.tasks.len();
            tracing::warn!(
                aborted = report.aborted,
                "background tasks ignored cancellation; aborting"
            );
            self.tasks.abort_all();
            while self.tasks.join_next().await.is_some() {}
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;
    use tokio::sync::oneshot;

    use super::{ShutdownReport, TaskGroup};

    #[rstest]
    #[tokio::test]
    async fn cooperative_tasks_finish_on_shutdown() {
        let mut group = TaskGroup::new();
        for _ in 0..3 {
            group.spawn("waiter", |mut signal| async move {
                signal.cancelled().await;
            });
        }

        let report = group.shutdown(Duration::from_secs(1)).await;

        assert_eq!(
            report,
            ShutdownReport {
                finished: 3,
                failed: 0,
                aborted: 0
            }
        );
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn stragglers_are_aborted_after_timeout() {
        let mut group = TaskGroup::new();
        group.spawn("stubborn", |_signal| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        group.spawn("polite", |mut signal| async move {
            signal.cancelled().await;
        });

        let report = group.shutdown(Duration::from_secs(5)).await;

        assert_eq!(report.finished, 1);
        assert_eq!(report.aborted, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn panicking_task_counts_as_failed() {
        let mut group = TaskGroup::new();
        group.spawn("broken", |_signal| async {
            panic!("boom");
        });

        let report = group.shutdown(Duration::from_secs(1)).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.finished, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn tasks_observe_cancellation_flag() {
        let mut group = TaskGroup::new();
        let (sender, receiver) = oneshot::channel();
        group.spawn("observer", |mut signal| async move {
            signal.cancelled().await;
            let observed = signal.is_cancelled();
            if sender.send(observed).is_err() {
                panic!("receiver dropped");
            }
        });

        group.cancel();
        let observed = receiver.await.expect("task should report");

        assert!(observed);
        assert_eq!(group.join_next().await, Some(true));
        assert!(group.is_empty());
    }
}
