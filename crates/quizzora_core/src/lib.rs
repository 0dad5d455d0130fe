//! Quizzora core: pure submission/polling state machine and view-model helpers.
mod effect;
mod input;
mod msg;
mod outcome;
mod progress;
mod quiz;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, ExportKind};
pub use input::{validate, validate_selection, FileInput, RejectReason, UploadInput, ValidationResult, MAX_UPLOAD_BYTES};
pub use msg::Msg;
pub use outcome::{ErrorKind, QuizOutcome, Rejection, SubmissionOutcome, TaskStatus, MALFORMED_RESPONSE, TOPIC_REQUIRED};
pub use progress::{ProgressPhase, ProgressState, ProgressTracker, MAX_SIMULATED_STEP, SIMULATED_CEILING};
pub use quiz::{option_letter, quiz_transcript, McqItem, QuizPayload, Score, ShortAnswerItem};
pub use state::{AppState, AttemptId, AttemptPhase, ExportRecord, QuizRequestId, QuizSession, SummaryDoc};
pub use update::update;
pub use view_model::{
    AppViewModel, McqRowView, ProgressView, QuizView, SelectionView, NO_MCQ_NOTICE,
    NO_SHORT_ANSWER_NOTICE,
};
