use std::sync::mpsc;

use tokio_util::sync::CancellationToken;

use crate::EngineEvent;

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Forwards events only while `token` is live, so a cancelled attempt goes
/// silent even if a task is between its last await and its emit.
pub struct ScopedSink<'a> {
    inner: &'a dyn EventSink,
    token: &'a CancellationToken,
}

impl<'a> ScopedSink<'a> {
    pub fn new(inner: &'a dyn EventSink, token: &'a CancellationToken) -> Self {
        Self { inner, token }
    }
}

impl EventSink for ScopedSink<'_> {
    fn emit(&self, event: EngineEvent) {
        if !self.token.is_cancelled() {
            self.inner.emit(event);
        }
    }
}
