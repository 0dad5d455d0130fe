use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use quizzora_core::{AttemptId, QuizOutcome, QuizRequestId, SubmissionOutcome, UploadInput};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::client::{BackendClient, ReqwestBackend};
use crate::poll::{run_poll_loop, PollSettings};
use crate::sink::{ChannelEventSink, EventSink, ScopedSink};
use crate::timers::{run_finalize_delay, run_progress_timer};
use crate::{EngineError, EngineEvent, EngineSettings};

enum EngineCommand {
    Submit { attempt: AttemptId, input: UploadInput },
    StartProgress { attempt: AttemptId },
    StartPolling { attempt: AttemptId, task_id: String },
    Finalize { attempt: AttemptId },
    Cancel { attempt: AttemptId },
    RequestQuiz {
        request: QuizRequestId,
        summary: String,
        topic: String,
    },
}

/// Owns the background thread that runs all backend IO and timers.
///
/// Commands go in through the handle's methods; results come back as
/// [`EngineEvent`]s via [`EngineHandle::try_recv`] or
/// [`EngineHandle::recv_timeout`]. Dropping the handle stops the thread and
/// cancels everything still running.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let backend = Arc::new(ReqwestBackend::new(settings.clone())?);
        engine_info!("Backend at {}", backend.base_url());
        Self::with_backend(backend, settings)
    }

    /// Runs the engine against any backend implementation.
    pub fn with_backend(
        backend: Arc<dyn BackendClient>,
        settings: EngineSettings,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(EngineError::Runtime)?;

        thread::Builder::new()
            .name("quizzora-engine".to_string())
            .spawn(move || {
                let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
                let mut scopes = AttemptScopes::default();
                while let Ok(command) = cmd_rx.recv() {
                    dispatch(&runtime, &backend, &settings, &sink, &mut scopes, command);
                }
                scopes.cancel_all();
                engine_debug!("Engine thread stopping");
            })
            .map_err(EngineError::Thread)?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, attempt: AttemptId, input: UploadInput) {
        self.send(EngineCommand::Submit { attempt, input });
    }

    pub fn start_progress(&self, attempt: AttemptId) {
        self.send(EngineCommand::StartProgress { attempt });
    }

    pub fn start_polling(&self, attempt: AttemptId, task_id: impl Into<String>) {
        self.send(EngineCommand::StartPolling {
            attempt,
            task_id: task_id.into(),
        });
    }

    /// Stops the attempt's timer and poll loop and emits `FinalizeElapsed`
    /// after the finalize delay.
    pub fn finalize(&self, attempt: AttemptId) {
        self.send(EngineCommand::Finalize { attempt });
    }

    pub fn cancel(&self, attempt: AttemptId) {
        self.send(EngineCommand::Cancel { attempt });
    }

    pub fn request_quiz(
        &self,
        request: QuizRequestId,
        summary: impl Into<String>,
        topic: impl Into<String>,
    ) {
        self.send(EngineCommand::RequestQuiz {
            request,
            summary: summary.into(),
            topic: topic.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.wait_event(timeout).ok().flatten()
    }

    /// Waits up to `timeout` for the next event. `Ok(None)` means nothing
    /// arrived in time; an error means the engine thread is gone.
    pub fn wait_event(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineError::Stopped),
        }
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

/// One cancellation token per live attempt. A token covers every task the
/// attempt started; cancelling it silences all of them.
#[derive(Default)]
struct AttemptScopes {
    tokens: HashMap<AttemptId, CancellationToken>,
}

impl AttemptScopes {
    fn token(&mut self, attempt: AttemptId) -> CancellationToken {
        self.tokens.entry(attempt).or_default().clone()
    }

    /// Cancels every attempt other than `attempt`.
    fn supersede(&mut self, attempt: AttemptId) {
        self.tokens.retain(|id, token| {
            if *id == attempt {
                return true;
            }
            engine_debug!("Attempt {id} superseded by {attempt}");
            token.cancel();
            false
        });
    }

    fn cancel(&mut self, attempt: AttemptId) {
        if let Some(token) = self.tokens.remove(&attempt) {
            token.cancel();
        }
    }

    /// Cancels the attempt's current work and hands out a fresh token for it.
    fn renew(&mut self, attempt: AttemptId) -> CancellationToken {
        self.cancel(attempt);
        self.token(attempt)
    }

    fn cancel_all(&mut self) {
        for (_, token) in self.tokens.drain() {
            token.cancel();
        }
    }
}

fn dispatch(
    runtime: &Runtime,
    backend: &Arc<dyn BackendClient>,
    settings: &EngineSettings,
    sink: &Arc<dyn EventSink>,
    scopes: &mut AttemptScopes,
    command: EngineCommand,
) {
    let backend = Arc::clone(backend);
    let sink = Arc::clone(sink);
    match command {
        EngineCommand::Submit { attempt, input } => {
            scopes.supersede(attempt);
            let token = scopes.token(attempt);
            runtime.spawn(async move {
                let result = tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    result = backend.submit(&input) => result,
                };
                let outcome = result.unwrap_or_else(|err| SubmissionOutcome::Rejected(err.into()));
                ScopedSink::new(sink.as_ref(), &token)
                    .emit(EngineEvent::Submission { attempt, outcome });
            });
        }
        EngineCommand::StartProgress { attempt } => {
            let token = scopes.token(attempt);
            let tick = settings.progress_tick;
            runtime.spawn(async move {
                run_progress_timer(attempt, tick, &token, sink.as_ref()).await;
            });
        }
        EngineCommand::StartPolling { attempt, task_id } => {
            let token = scopes.token(attempt);
            let poll = PollSettings {
                interval: settings.poll_interval,
                max_polls: settings.max_status_polls,
            };
            runtime.spawn(async move {
                run_poll_loop(backend.as_ref(), attempt, &task_id, poll, &token, sink.as_ref())
                    .await;
            });
        }
        EngineCommand::Finalize { attempt } => {
            let token = scopes.renew(attempt);
            let delay = settings.finalize_delay;
            runtime.spawn(async move {
                run_finalize_delay(attempt, delay, &token, sink.as_ref()).await;
            });
        }
        EngineCommand::Cancel { attempt } => {
            engine_debug!("Cancelling attempt {attempt}");
            scopes.cancel(attempt);
        }
        EngineCommand::RequestQuiz {
            request,
            summary,
            topic,
        } => {
            runtime.spawn(async move {
                let outcome = backend
                    .generate_quiz(&summary, &topic)
                    .await
                    .unwrap_or_else(|err| QuizOutcome::Rejected(err.into()));
                sink.emit(EngineEvent::Quiz { request, outcome });
            });
        }
    }
}
