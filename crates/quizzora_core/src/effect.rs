use crate::input::UploadInput;
use crate::quiz::QuizPayload;
use crate::state::{AttemptId, QuizRequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send the input to the backend.
    Submit { attempt: AttemptId, input: UploadInput },
    /// Start the simulated progress timer for the attempt.
    StartProgressTimer { attempt: AttemptId },
    /// Poll the task until it is terminal.
    StartPolling { attempt: AttemptId, task_id: String },
    /// Stop the attempt's timer and poll loop, then report back after the
    /// finalize delay.
    Finalize { attempt: AttemptId },
    /// Tear down everything still running for the attempt.
    CancelAttempt { attempt: AttemptId },
    RequestQuiz {
        request: QuizRequestId,
        summary: String,
        topic: String,
    },
    SaveSummary { summary: String },
    SaveQuiz { payload: QuizPayload, source: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Summary,
    Quiz,
}
