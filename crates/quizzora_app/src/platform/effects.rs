use std::path::PathBuf;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error};
use quizzora_core::{Effect, ExportKind, Msg};
use quizzora_engine::{
    save_quiz, save_summary, today, EngineError, EngineEvent, EngineHandle, ExportError,
};

/// Executes effects produced by `update` and turns engine events back into
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
    output_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, output_dir: PathBuf) -> Self {
        Self { engine, output_dir }
    }

    /// Forwards IO effects to the engine. Exports run inline; their results
    /// come back as messages for the caller to dispatch.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::Submit { attempt, input } => {
                    engine_debug!("Submit attempt={} source={}", attempt, input.source_label());
                    self.engine.submit(attempt, input);
                }
                Effect::StartProgressTimer { attempt } => self.engine.start_progress(attempt),
                Effect::StartPolling { attempt, task_id } => {
                    self.engine.start_polling(attempt, task_id)
                }
                Effect::Finalize { attempt } => self.engine.finalize(attempt),
                Effect::CancelAttempt { attempt } => self.engine.cancel(attempt),
                Effect::RequestQuiz {
                    request,
                    summary,
                    topic,
                } => self.engine.request_quiz(request, summary, topic),
                Effect::SaveSummary { summary } => {
                    let result = save_summary(&self.output_dir, today(), &summary);
                    follow_ups.push(export_finished(ExportKind::Summary, result));
                }
                Effect::SaveQuiz { payload, source } => {
                    let result = save_quiz(&self.output_dir, today(), &payload, &source);
                    follow_ups.push(export_finished(ExportKind::Quiz, result));
                }
            }
        }
        follow_ups
    }

    /// Next engine event as a message, `None` when nothing arrived within
    /// `timeout`.
    pub fn next_msg(&self, timeout: Duration) -> Result<Option<Msg>, EngineError> {
        Ok(self.engine.wait_event(timeout)?.map(event_to_msg))
    }
}

fn export_finished(kind: ExportKind, result: Result<PathBuf, ExportError>) -> Msg {
    let result = result
        .map(|path| path.display().to_string())
        .map_err(|err| {
            engine_error!("Export of {kind:?} failed: {err}");
            err.to_string()
        });
    Msg::ExportFinished { kind, result }
}

pub fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ProgressTick { attempt, sample } => Msg::ProgressTick { attempt, sample },
        EngineEvent::Submission { attempt, outcome } => {
            Msg::SubmissionResolved { attempt, outcome }
        }
        EngineEvent::Status { attempt, status } => Msg::StatusPolled { attempt, status },
        EngineEvent::FinalizeElapsed { attempt } => Msg::FinalizeElapsed { attempt },
        EngineEvent::Quiz { request, outcome } => Msg::QuizResolved { request, outcome },
    }
}
