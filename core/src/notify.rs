/// State-change notifications consumed by the projection layer
///
/// The core holds authoritative state; a renderer merely subscribes here
/// and redraws. Nothing in the core ever reads UI state back.
use crate::message::Message;
use crate::navigator::MenuView;
use crate::summary::SummaryStatus;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateChange {
    /// The conversation roster gained, lost or renamed an entry.
    RosterChanged,
    /// A message was accepted into a store. `conversation_id` is `None`
    /// for the end-user's own single conversation.
    MessageAppended {
        conversation_id: Option<String>,
        message: Message,
    },
    /// A history response replaced a store wholesale.
    HistoryReplaced { conversation_id: Option<String> },
    UnreadChanged {
        conversation_id: String,
        unread: bool,
    },
    ActiveConversationChanged { conversation_id: Option<String> },
    /// The guided-flow view was replaced.
    ViewChanged { view: MenuView },
    /// A link option was resolved locally; the renderer should open it.
    OpenLink { url: String },
    SummaryChanged {
        status: SummaryStatus,
        message: Option<String>,
    },
    SummaryProgress {
        step: String,
        detail: Option<String>,
    },
}

/// Broadcast fan-out of state changes. Cloning shares the channel.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<StateChange>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.tx.subscribe()
    }

    pub fn publish(&self, change: StateChange) {
        // No subscribers is fine: the projection is optional
        let _ = self.tx.send(change);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(256)
    }
}
