/// End-user session: one conversation, guided flow, summary side-flow
///
/// Routes inbound transport events to the owning component and exposes
/// the user intents the renderer may trigger. Locally-sent text is not
/// echoed into the store; the server's rebroadcast is the single source
/// of truth, which keeps a message from rendering twice.
use crate::events::{InboundEvent, OutboundIntent};
use crate::identity::{ConnectionIdentity, Participant};
use crate::message::{now_rfc3339, Message, MessageOrigin, MessageStore};
use crate::navigator::MenuNavigator;
use crate::notify::{Notifier, StateChange};
use crate::outbound::OutboundSink;
use crate::summary::{SummaryRequestFlow, SummaryStatus};
use std::sync::Arc;
use tracing::debug;

pub struct UserSession {
    sink: Arc<dyn OutboundSink>,
    notifier: Notifier,
    identity: ConnectionIdentity,
    store: MessageStore,
    navigator: MenuNavigator,
    summary: SummaryRequestFlow,
}

impl UserSession {
    pub fn new(sink: Arc<dyn OutboundSink>, notifier: Notifier) -> Self {
        Self {
            identity: ConnectionIdentity::new(sink.clone()),
            store: MessageStore::new(),
            navigator: MenuNavigator::new(sink.clone(), notifier.clone()),
            summary: SummaryRequestFlow::new(sink.clone(), notifier.clone()),
            sink,
            notifier,
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn navigator(&self) -> &MenuNavigator {
        &self.navigator
    }

    pub fn summary_status(&self) -> SummaryStatus {
        self.summary.status()
    }

    pub fn participant(&self) -> Option<&Participant> {
        self.identity.participant()
    }

    /// Route one inbound transport event; handled to completion before the
    /// next event is processed.
    pub fn handle_event(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Connected { user_id } => {
                self.identity.on_connected(&user_id);
                self.identity.join();
            }
            InboundEvent::Message(wire) => {
                let message = Message::from_wire(wire, MessageOrigin::Remote);
                if self.store.append(message.clone()).accepted {
                    self.notifier.publish(StateChange::MessageAppended {
                        conversation_id: None,
                        message,
                    });
                } else {
                    debug!("duplicate message absorbed");
                }
            }
            InboundEvent::ChatHistory(wires) => {
                let messages = wires
                    .into_iter()
                    .map(|w| Message::from_wire(w, MessageOrigin::Remote))
                    .collect();
                self.store.replace(messages);
                self.notifier.publish(StateChange::HistoryReplaced {
                    conversation_id: None,
                });
            }
            InboundEvent::ShowMenu { menu } => self.navigator.show_menu(menu),
            InboundEvent::ShowSubmenu {
                submenu,
                parent_label,
            } => self.navigator.show_submenu(submenu, parent_label),
            InboundEvent::ShowInfo { label, text } => self.navigator.show_info(label, text),
            InboundEvent::ShowLink { label, link } => self.navigator.show_link(label, link),
            InboundEvent::ShowMap { label, image } => self.navigator.show_map(label, image),
            InboundEvent::SummaryProgress { step, detail } => {
                self.summary.on_progress(&step, detail.as_deref());
                let notice = match detail {
                    Some(detail) => format!("Progress: {} ({})", step, detail),
                    None => format!("Progress: {}", step),
                };
                self.append_system_notice(notice);
            }
            InboundEvent::SummaryResult { status, message } => {
                let Some((terminal, message)) =
                    self.summary.on_result(status.as_deref(), message.as_deref())
                else {
                    return;
                };
                let notice = match terminal {
                    SummaryStatus::Ok => match message {
                        Some(message) => format!("Report sent. {}", message),
                        None => "Report sent.".to_string(),
                    },
                    _ => message.unwrap_or_else(|| "Report generation failed.".to_string()),
                };
                self.append_system_notice(notice);
            }
            other => debug!("event not relevant for a user session: {:?}", other),
        }
    }

    fn append_system_notice(&mut self, text: String) {
        let message = Message::system(text);
        if self.store.append(message.clone()).accepted {
            self.notifier.publish(StateChange::MessageAppended {
                conversation_id: None,
                message,
            });
        }
    }

    // ─── User intents ────────────────────────────────────────────────────

    pub fn register(&mut self, display_name: &str) {
        self.identity.register(display_name);
    }

    /// Send a text line. The store is updated only by the server's
    /// rebroadcast, never by the local send.
    pub fn send_text(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        if !self.identity.is_ready() {
            debug!("send before registration acknowledged, dropping");
            return false;
        }
        self.sink.emit(OutboundIntent::Message {
            text: text.to_string(),
            timestamp: now_rfc3339(),
        });
        true
    }

    /// The guided flow is opened by sending the literal "menu" keyword.
    pub fn request_menu(&mut self) -> bool {
        self.send_text("menu")
    }

    pub fn pick_option(&mut self, node_id: &str) {
        self.navigator.select_option(node_id);
    }

    pub fn return_to_root(&mut self) {
        self.navigator.return_to_root();
    }

    /// Ask for the conversation report. Acceptance is surfaced
    /// synchronously; progress and the result arrive as events.
    pub fn request_summary(&mut self, email: &str) -> bool {
        let accepted = self.summary.request(email);
        if accepted {
            self.append_system_notice(format!(
                "Report requested for {}. You will be notified when it is ready.",
                email.trim()
            ));
        }
        accepted
    }
}
