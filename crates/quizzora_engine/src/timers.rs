use std::time::Duration;

use engine_logging::engine_trace;
use quizzora_core::AttemptId;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::sink::{EventSink, ScopedSink};
use crate::EngineEvent;

/// Emits a `ProgressTick` with a fresh sample in `0.0..1.0` every `tick` until
/// cancelled. The first tick fires one period after the start.
pub async fn run_progress_timer(
    attempt: AttemptId,
    tick: Duration,
    cancel: &CancellationToken,
    sink: &dyn EventSink,
) {
    let sink = ScopedSink::new(sink, cancel);
    let mut ticker = interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let sample = rand::random::<f64>();
        sink.emit(EngineEvent::ProgressTick { attempt, sample });
    }
    engine_trace!("Progress timer for attempt {attempt} stopped");
}

/// Emits `FinalizeElapsed` once `delay` has passed, unless cancelled first.
pub async fn run_finalize_delay(
    attempt: AttemptId,
    delay: Duration,
    cancel: &CancellationToken,
    sink: &dyn EventSink,
) {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {}
        _ = tokio::time::sleep(delay) => {
            ScopedSink::new(sink, cancel).emit(EngineEvent::FinalizeElapsed { attempt });
        }
    }
}
