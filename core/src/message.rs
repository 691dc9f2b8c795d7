/// Per-conversation message log: ordered, deduplicated, in-memory
///
/// Arrival order is the only ordering. Timestamps are opaque strings kept
/// verbatim for display; a malformed timestamp never rejects a message.
use crate::events::WireMessage;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub const SYSTEM_SENDER: &str = "System";

/// RFC3339 without sub-second noise, matching the wire format.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    Text { text: String },
    Audio { media_ref: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<String>,
    pub sender: String,
    pub body: MessageBody,
    /// Raw wire timestamp, advisory only. Never used for ordering.
    pub timestamp: String,
    pub origin: MessageOrigin,
}

impl Message {
    pub fn from_wire(wire: WireMessage, origin: MessageOrigin) -> Self {
        let body = match wire.audio_url {
            Some(media_ref) => MessageBody::Audio { media_ref },
            None => MessageBody::Text {
                text: wire.text.unwrap_or_default(),
            },
        };
        Self {
            id: wire.message_id,
            sender: wire.sender,
            body,
            timestamp: wire.timestamp.unwrap_or_else(now_rfc3339),
            origin,
        }
    }

    /// Locally synthesized notice (summary progress, request receipts).
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: Some(Uuid::new_v4().simple().to_string()),
            sender: SYSTEM_SENDER.to_string(),
            body: MessageBody::Text { text: text.into() },
            timestamp: now_rfc3339(),
            origin: MessageOrigin::Local,
        }
    }

    pub fn text(&self) -> &str {
        match &self.body {
            MessageBody::Text { text } => text,
            MessageBody::Audio { .. } => "",
        }
    }

    /// Display form of the timestamp. Malformed values pass through verbatim.
    pub fn display_time(&self) -> String {
        chrono::DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|_| self.timestamp.clone())
    }
}

/// Identity of a message for dedup purposes: the explicit id when present,
/// otherwise the (sender, body, timestamp) triple. The whole body goes
/// into the key so id-less audio messages keep their media reference as
/// the distinguishing part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupKey {
    Id(String),
    Triple(String, MessageBody, String),
}

impl DedupKey {
    fn of(msg: &Message) -> Self {
        match &msg.id {
            Some(id) => DedupKey::Id(id.clone()),
            None => DedupKey::Triple(
                msg.sender.clone(),
                msg.body.clone(),
                msg.timestamp.clone(),
            ),
        }
    }
}

/// Outcome of an append. `position` points at the stored instance either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appended {
    pub accepted: bool,
    pub position: usize,
}

#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    messages: Vec<Message>,
    index: HashMap<DedupKey, usize>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert: a duplicate leaves the store unchanged.
    pub fn append(&mut self, candidate: Message) -> Appended {
        let key = DedupKey::of(&candidate);
        if let Some(&position) = self.index.get(&key) {
            return Appended {
                accepted: false,
                position,
            };
        }
        let position = self.messages.len();
        self.index.insert(key, position);
        self.messages.push(candidate);
        Appended {
            accepted: true,
            position,
        }
    }

    /// Read-only snapshot in arrival order.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Wholesale reconciliation: the replacement list is authoritative for
    /// everything prior to now. Dedup still applies within the replacement.
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages.clear();
        self.index.clear();
        for msg in messages {
            self.append(msg);
        }
    }
}
