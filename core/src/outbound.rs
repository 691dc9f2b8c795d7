/// Outbound intent sinks: the injected transport seam
///
/// Components emit intents through this trait instead of holding a
/// transport handle, so every component can be unit-tested without a
/// live connection. Emission is fire-and-forget; delivery is the
/// transport's problem.
use crate::events::OutboundIntent;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

pub trait OutboundSink: Send + Sync {
    fn emit(&self, intent: OutboundIntent);
}

/// Forwards intents into an unbounded channel drained by the bridge.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<OutboundIntent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundIntent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl OutboundSink for ChannelSink {
    fn emit(&self, intent: OutboundIntent) {
        if self.tx.send(intent).is_err() {
            debug!("intent dropped: transport channel closed");
        }
    }
}

/// Captures intents for assertions in tests.
#[derive(Default)]
pub struct RecordingSink {
    intents: Mutex<Vec<OutboundIntent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<OutboundIntent> {
        let mut guard = self.intents.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *guard)
    }

    pub fn snapshot(&self) -> Vec<OutboundIntent> {
        self.intents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl OutboundSink for RecordingSink {
    fn emit(&self, intent: OutboundIntent) {
        self.intents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(intent);
    }
}
