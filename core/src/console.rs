/// Agent console: identity plus the conversation multiplexer
///
/// Mirrors every end-user conversation live. The console validates user
/// intents and turns them into outbound events; all conversation state
/// lives in the registry.
use crate::events::{InboundEvent, OutboundIntent};
use crate::identity::{ConnectionIdentity, Participant};
use crate::message::{now_rfc3339, Message, MessageOrigin};
use crate::notify::Notifier;
use crate::outbound::OutboundSink;
use crate::registry::SessionRegistry;
use std::sync::Arc;
use tracing::debug;

pub struct AgentConsole {
    sink: Arc<dyn OutboundSink>,
    identity: ConnectionIdentity,
    registry: SessionRegistry,
}

impl AgentConsole {
    pub fn new(sink: Arc<dyn OutboundSink>, notifier: Notifier) -> Self {
        Self {
            identity: ConnectionIdentity::new(sink.clone()),
            registry: SessionRegistry::new(notifier),
            sink,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn participant(&self) -> Option<&Participant> {
        self.identity.participant()
    }

    /// Route one inbound transport event; handled to completion.
    pub fn handle_event(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Connected { user_id } => {
                self.identity.on_connected(&user_id);
                self.identity.join();
            }
            InboundEvent::UpdateChatList(entries) => self.registry.sync_roster(&entries),
            InboundEvent::NewClient { user_id, name } => {
                self.registry.upsert_participant(&user_id, &name);
            }
            InboundEvent::ClientDisconnected { user_id } => self.registry.remove(&user_id),
            InboundEvent::MessageAdmin { user_id, message } => {
                let message = Message::from_wire(message, MessageOrigin::Remote);
                self.registry.ingest(&user_id, message);
            }
            InboundEvent::ChatHistory(wires) => {
                // The history response carries no conversation id; it
                // answers the most recent selection.
                let Some(active) = self.registry.active_id().map(str::to_string) else {
                    debug!("history response with no active conversation, ignoring");
                    return;
                };
                let messages = wires
                    .into_iter()
                    .map(|w| Message::from_wire(w, MessageOrigin::Remote))
                    .collect();
                self.registry.replace_history(&active, messages);
            }
            other => debug!("event not relevant for an agent console: {:?}", other),
        }
    }

    // ─── Agent intents ───────────────────────────────────────────────────

    pub fn register(&mut self, display_name: &str) {
        self.identity.register(display_name);
    }

    /// Select a conversation. When the registry flags the history need,
    /// the selection intent is emitted so the collaborator re-sends it.
    pub fn select_conversation(&mut self, id: &str) -> bool {
        if !self.registry.select(id) {
            return false;
        }
        self.sink.emit(OutboundIntent::AdminSelectChat {
            user_id: id.to_string(),
        });
        true
    }

    /// Message the active conversation. The registry records the server's
    /// rebroadcast, not the local send.
    pub fn send_text(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let Some(active) = self.registry.active_id() else {
            debug!("send with no active conversation, dropping");
            return false;
        };
        self.sink.emit(OutboundIntent::AdminMessage {
            user_id: active.to_string(),
            text: text.to_string(),
            timestamp: now_rfc3339(),
        });
        true
    }
}
