use std::fmt;
use std::io;

use quizzora_core::{
    AttemptId, QuizOutcome, QuizRequestId, Rejection, SubmissionOutcome, TaskStatus,
};
use thiserror::Error;

/// Events sent from the engine thread back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Simulated progress timer fired.
    ProgressTick { attempt: AttemptId, sample: f64 },
    /// First backend response for a submission.
    Submission {
        attempt: AttemptId,
        outcome: SubmissionOutcome,
    },
    /// One status poll finished.
    Status { attempt: AttemptId, status: TaskStatus },
    /// The finalize delay elapsed.
    FinalizeElapsed { attempt: AttemptId },
    Quiz {
        request: QuizRequestId,
        outcome: QuizOutcome,
    },
}

/// A round trip that never produced a usable backend answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<TransportError> for Rejection {
    fn from(err: TransportError) -> Self {
        Rejection::transport(err.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connect,
    Timeout,
    HttpStatus(u16),
    InvalidBody,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Connect => write!(f, "connection failed"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::InvalidBody => write!(f, "invalid body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Failures setting up the engine itself.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid backend url {url:?}: {source}")]
    InvalidBackendUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("backend url {0:?} cannot carry a path")]
    UnsupportedBackendUrl(String),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to spawn engine thread: {0}")]
    Thread(#[source] io::Error),
    #[error("engine thread stopped")]
    Stopped,
}
