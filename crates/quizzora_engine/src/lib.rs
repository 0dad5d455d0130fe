//! Quizzora engine: backend IO, timers and export writing.
mod client;
mod engine;
mod export;
mod poll;
mod settings;
mod sink;
mod timers;
mod types;
mod wire;

pub use client::{BackendClient, ReqwestBackend};
pub use engine::EngineHandle;
pub use export::{
    ensure_output_dir, quiz_filename, save_quiz, save_summary, summary_filename, today,
    AtomicFileWriter, ExportError,
};
pub use poll::{run_poll_loop, PollExit, PollSettings, POLL_EXHAUSTED};
pub use settings::{EngineSettings, DEFAULT_BACKEND_URL};
pub use sink::{ChannelEventSink, EventSink, ScopedSink};
pub use timers::{run_finalize_delay, run_progress_timer};
pub use types::{EngineError, EngineEvent, FailureKind, TransportError};
pub use wire::{decode_quiz, decode_status, decode_submission};
