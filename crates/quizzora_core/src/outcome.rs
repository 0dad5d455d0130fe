use std::fmt;

use crate::input::RejectReason;
use crate::quiz::QuizPayload;

/// Message used when the backend answers with a shape outside its contract.
pub const MALFORMED_RESPONSE: &str = "malformed response";
/// Message used when a quiz is requested without a topic.
pub const TOPIC_REQUIRED: &str = "topic required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local, pre-network; the user edits the input and retries.
    Validation,
    /// The backend explicitly reported a failure.
    BackendRejection,
    /// The backend could not be reached (or did not finish in time).
    TransportFailure,
    /// The backend answered, but not in a shape the client understands.
    MalformedResponse,
}

/// A user-facing failure, shown inline and dismissible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: ErrorKind,
    pub message: String,
}

impl Rejection {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BackendRejection, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportFailure, message)
    }

    pub fn malformed() -> Self {
        Self::new(ErrorKind::MalformedResponse, MALFORMED_RESPONSE)
    }

    pub fn topic_required() -> Self {
        Self::new(ErrorKind::Validation, TOPIC_REQUIRED)
    }
}

impl From<RejectReason> for Rejection {
    fn from(reason: RejectReason) -> Self {
        Self::new(ErrorKind::Validation, reason.message())
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Interpretation of the first response to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    CachedSummary { text: String },
    TaskAccepted { task_id: String },
    Rejected(Rejection),
}

/// Interpretation of one status poll.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskStatus {
    /// Still running; `fraction` is the server-reported completion in 0.0..=1.0
    /// when the backend sent one.
    InProgress { fraction: Option<f64> },
    Completed { summary: String },
    Failed(Rejection),
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::InProgress { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizOutcome {
    Ready(QuizPayload),
    Rejected(Rejection),
}
