/// Agent-side conversation multiplexer
///
/// One conversation per remote participant, each owning its own message
/// store. The registry is the single owner of the conversation map; all
/// mutation goes through its operations, in receipt order.
use crate::events::RosterEntry;
use crate::message::{Message, MessageStore};
use crate::notify::{Notifier, StateChange};
use tracing::{debug, info};

/// Display name for conversations created implicitly by an incoming
/// message whose sender was never listed.
pub const GUEST_NAME: &str = "Guest";

#[derive(Debug, Clone)]
pub struct Conversation {
    pub participant_id: String,
    pub display_name: String,
    pub store: MessageStore,
    pub unread: bool,
}

pub struct SessionRegistry {
    notifier: Notifier,
    conversations: Vec<Conversation>,
    active: Option<String>,
}

impl SessionRegistry {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            notifier,
            conversations: Vec::new(),
            active: None,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|c| c.participant_id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active_id()
            .map(str::to_string)
            .and_then(|id| self.get(&id))
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.conversations
            .iter()
            .position(|c| c.participant_id == id)
    }

    /// Create or rename a conversation. An existing conversation keeps its
    /// store, so a reconnection never loses history.
    pub fn upsert_participant(&mut self, id: &str, display_name: &str) {
        match self.index_of(id) {
            Some(i) => {
                if self.conversations[i].display_name != display_name {
                    self.conversations[i].display_name = display_name.to_string();
                    self.notifier.publish(StateChange::RosterChanged);
                }
            }
            None => {
                self.conversations.push(Conversation {
                    participant_id: id.to_string(),
                    display_name: display_name.to_string(),
                    store: MessageStore::new(),
                    unread: false,
                });
                self.notifier.publish(StateChange::RosterChanged);
            }
        }
    }

    /// Full roster listing: upsert every entry. Conversations are removed
    /// only by an explicit disconnect notice, never by omission.
    pub fn sync_roster(&mut self, entries: &[RosterEntry]) {
        for entry in entries {
            self.upsert_participant(&entry.user_id, &entry.name);
        }
    }

    /// Explicit disconnect: drop the conversation. Clears the active
    /// selection if it pointed there.
    pub fn remove(&mut self, id: &str) {
        let Some(i) = self.index_of(id) else {
            debug!("disconnect notice for unknown conversation {}", id);
            return;
        };
        self.conversations.remove(i);
        if self.active.as_deref() == Some(id) {
            self.active = None;
            self.notifier
                .publish(StateChange::ActiveConversationChanged {
                    conversation_id: None,
                });
        }
        self.notifier.publish(StateChange::RosterChanged);
    }

    /// Make `id` the active selection and clear its unread flag. Returns
    /// true when the caller should (re-)request history from the
    /// collaborator; the registry only flags the need, it never fetches.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(i) = self.index_of(id) else {
            debug!("select of unknown conversation {}", id);
            return false;
        };
        self.active = Some(id.to_string());
        if self.conversations[i].unread {
            self.conversations[i].unread = false;
            self.notifier.publish(StateChange::UnreadChanged {
                conversation_id: id.to_string(),
                unread: false,
            });
        }
        self.notifier
            .publish(StateChange::ActiveConversationChanged {
                conversation_id: Some(id.to_string()),
            });
        true
    }

    /// Route a live message into its conversation's store. An unknown
    /// sender gets an implicit placeholder conversation rather than losing
    /// the message. Duplicates are absorbed silently.
    pub fn ingest(&mut self, id: &str, message: Message) -> bool {
        if self.index_of(id).is_none() {
            info!(
                "message for unknown conversation {}, creating placeholder",
                id
            );
            self.upsert_participant(id, GUEST_NAME);
        }
        let Some(i) = self.index_of(id) else {
            return false;
        };

        let appended = self.conversations[i].store.append(message.clone());
        if !appended.accepted {
            debug!("duplicate message for {} absorbed", id);
            return false;
        }
        if self.active.as_deref() != Some(id) && !self.conversations[i].unread {
            self.conversations[i].unread = true;
            self.notifier.publish(StateChange::UnreadChanged {
                conversation_id: id.to_string(),
                unread: true,
            });
        }
        self.notifier.publish(StateChange::MessageAppended {
            conversation_id: Some(id.to_string()),
            message,
        });
        true
    }

    /// History-fetch response: the collaborator's list is authoritative
    /// for everything prior to now, so the store is replaced wholesale.
    pub fn replace_history(&mut self, id: &str, messages: Vec<Message>) {
        if self.index_of(id).is_none() {
            info!(
                "history for unknown conversation {}, creating placeholder",
                id
            );
            self.upsert_participant(id, GUEST_NAME);
        }
        let Some(i) = self.index_of(id) else {
            return;
        };
        self.conversations[i].store.replace(messages);
        self.notifier.publish(StateChange::HistoryReplaced {
            conversation_id: Some(id.to_string()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageBody, MessageOrigin};

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Notifier::default())
    }

    fn msg(id: &str, text: &str) -> Message {
        Message {
            id: Some(id.to_string()),
            sender: "Ana".to_string(),
            body: MessageBody::Text {
                text: text.to_string(),
            },
            timestamp: "2024-01-01T10:00:00Z".to_string(),
            origin: MessageOrigin::Remote,
        }
    }

    #[test]
    fn unread_follows_the_active_selection() {
        let mut reg = registry();
        reg.upsert_participant("u1", "Ana");
        reg.upsert_participant("u2", "Luis");
        reg.select("u1");

        // Message into the active conversation: no unread
        reg.ingest("u1", msg("a", "hi"));
        assert!(!reg.get("u1").unwrap().unread);

        // Message into another conversation: unread until selected
        reg.ingest("u2", msg("b", "hey"));
        assert!(reg.get("u2").unwrap().unread);

        assert!(reg.select("u2"));
        assert!(!reg.get("u2").unwrap().unread);
    }

    #[test]
    fn unknown_sender_gets_a_guest_placeholder() {
        let mut reg = registry();
        assert!(reg.ingest("stranger", msg("a", "hello?")));

        let conv = reg.get("stranger").unwrap();
        assert_eq!(conv.display_name, GUEST_NAME);
        assert_eq!(conv.store.len(), 1);
        assert!(conv.unread);

        // A later roster listing fills in the real name, keeping history
        reg.sync_roster(&[RosterEntry {
            user_id: "stranger".to_string(),
            name: "Carmen".to_string(),
        }]);
        let conv = reg.get("stranger").unwrap();
        assert_eq!(conv.display_name, "Carmen");
        assert_eq!(conv.store.len(), 1);
    }

    #[test]
    fn reconnection_preserves_history() {
        let mut reg = registry();
        reg.upsert_participant("u1", "Ana");
        reg.ingest("u1", msg("a", "before"));

        reg.upsert_participant("u1", "Ana");
        assert_eq!(reg.get("u1").unwrap().store.len(), 1);
    }

    #[test]
    fn remove_clears_the_active_selection() {
        let mut reg = registry();
        reg.upsert_participant("u1", "Ana");
        reg.select("u1");
        assert_eq!(reg.active_id(), Some("u1"));

        reg.remove("u1");
        assert!(reg.active_id().is_none());
        assert!(reg.get("u1").is_none());
    }

    #[test]
    fn history_and_live_messages_apply_in_receipt_order() {
        let mut reg = registry();
        reg.upsert_participant("u1", "Ana");

        // Live message first, then an authoritative history replacement
        reg.ingest("u1", msg("live", "early"));
        reg.replace_history("u1", vec![msg("h1", "one"), msg("h2", "two")]);
        let texts: Vec<_> = reg.get("u1").unwrap().store.all().iter().map(|m| m.text().to_string()).collect();
        assert_eq!(texts, vec!["one", "two"]);

        // A live message arriving after the replacement appends to it
        reg.ingest("u1", msg("live2", "three"));
        let texts: Vec<_> = reg.get("u1").unwrap().store.all().iter().map(|m| m.text().to_string()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn duplicate_ingest_does_not_flip_unread_twice() {
        let mut reg = registry();
        reg.upsert_participant("u1", "Ana");
        reg.upsert_participant("u2", "Luis");
        reg.select("u1");

        assert!(reg.ingest("u2", msg("a", "hi")));
        assert!(!reg.ingest("u2", msg("a", "hi")));
        assert_eq!(reg.get("u2").unwrap().store.len(), 1);
    }
}
