use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use quizzora_core::{AttemptId, Rejection, TaskStatus};
use tokio_util::sync::CancellationToken;

use crate::client::BackendClient;
use crate::sink::{EventSink, ScopedSink};
use crate::EngineEvent;

pub const POLL_EXHAUSTED: &str = "The backend did not finish processing in time.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_polls: u32,
}

/// How a poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    /// A `Completed` or `Failed` status was emitted.
    Terminal,
    /// The token was cancelled; nothing further was emitted.
    Cancelled,
    /// The poll budget ran out and a transport failure was emitted.
    Exhausted,
}

/// Polls `task_id` until it reaches a terminal status.
///
/// Each round waits one interval and then issues one status request; the next
/// round starts only after that request has resolved, so requests never
/// overlap. A transport failure ends the loop as a failed status.
pub async fn run_poll_loop(
    backend: &dyn BackendClient,
    attempt: AttemptId,
    task_id: &str,
    settings: PollSettings,
    cancel: &CancellationToken,
    sink: &dyn EventSink,
) -> PollExit {
    let sink = ScopedSink::new(sink, cancel);
    engine_info!("Polling task {task_id} for attempt {attempt}");

    for round in 1..=settings.max_polls {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return cancelled(attempt),
            _ = tokio::time::sleep(settings.interval) => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return cancelled(attempt),
            result = backend.status(task_id) => result,
        };

        let status = match result {
            Ok(status) => status,
            Err(err) => {
                engine_warn!("Status poll {round} for task {task_id} failed: {err}");
                TaskStatus::Failed(err.into())
            }
        };
        engine_debug!("Poll {round} for task {task_id}: {status:?}");

        if cancel.is_cancelled() {
            return cancelled(attempt);
        }
        let terminal = status.is_terminal();
        sink.emit(EngineEvent::Status { attempt, status });
        if terminal {
            return PollExit::Terminal;
        }
    }

    engine_warn!(
        "Task {task_id} still running after {} polls; giving up",
        settings.max_polls
    );
    sink.emit(EngineEvent::Status {
        attempt,
        status: TaskStatus::Failed(Rejection::transport(POLL_EXHAUSTED)),
    });
    PollExit::Exhausted
}

fn cancelled(attempt: AttemptId) -> PollExit {
    engine_debug!("Poll loop for attempt {attempt} cancelled");
    PollExit::Cancelled
}
