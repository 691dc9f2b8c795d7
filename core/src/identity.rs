/// Connection identity: participant registration with the transport
///
/// The remote side is authoritative for the assigned id. Until the
/// acknowledgment arrives, dependent operations no-op rather than fail.
use crate::events::OutboundIntent;
use crate::outbound::OutboundSink;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
}

pub struct ConnectionIdentity {
    sink: Arc<dyn OutboundSink>,
    pending_name: Option<String>,
    participant: Option<Participant>,
}

impl ConnectionIdentity {
    pub fn new(sink: Arc<dyn OutboundSink>) -> Self {
        Self {
            sink,
            pending_name: None,
            participant: None,
        }
    }

    /// Emit a registration intent. Idempotent per connection: registering
    /// an already-acknowledged identity under the same name is a no-op.
    pub fn register(&mut self, display_name: &str) {
        if let Some(p) = &self.participant {
            if p.display_name == display_name {
                debug!("already registered as {}", display_name);
                return;
            }
        }
        self.pending_name = Some(display_name.to_string());
        self.sink.emit(OutboundIntent::Register {
            name: display_name.to_string(),
        });
    }

    /// Acknowledgment from the transport fixes the participant identity.
    pub fn on_connected(&mut self, id: &str) {
        let display_name = self
            .pending_name
            .clone()
            .unwrap_or_else(|| "Guest".to_string());
        info!("connection acknowledged, participant id {}", id);
        self.participant = Some(Participant {
            id: id.to_string(),
            display_name,
        });
    }

    /// Signal readiness to receive conversation events. No-ops until the
    /// registration has been acknowledged.
    pub fn join(&self) {
        if self.participant.is_none() {
            debug!("join before acknowledgment, skipping");
            return;
        }
        self.sink.emit(OutboundIntent::Join);
    }

    pub fn participant(&self) -> Option<&Participant> {
        self.participant.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.participant.is_some()
    }
}
