/// Wire model: inbound transport events and outbound user intents
///
/// Every payload that crosses the transport boundary is a tagged variant
/// here, validated by serde before it reaches any component. Field names
/// follow the wire protocol (`user_id`, `message_id`, `audio_url`, ...).
use crate::navigator::MenuNode;
use serde::{Deserialize, Serialize};

/// A message as it appears on the wire. `text` and `audio_url` are
/// mutually exclusive in practice; `audio_url` wins when both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default)]
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// One entry of the agent-side conversation roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
}

/// Inbound transport events consumed by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundEvent {
    Connected {
        user_id: String,
    },
    Message(WireMessage),
    /// Full reconciliation of the current conversation's history.
    ChatHistory(Vec<WireMessage>),
    /// Live message routed to an agent console.
    #[serde(alias = "client_message")]
    MessageAdmin {
        user_id: String,
        message: WireMessage,
    },
    /// Full roster listing.
    #[serde(alias = "connected_clients")]
    UpdateChatList(Vec<RosterEntry>),
    NewClient {
        user_id: String,
        #[serde(default)]
        name: String,
    },
    ClientDisconnected {
        user_id: String,
    },
    ShowMenu {
        #[serde(default)]
        menu: Vec<MenuNode>,
    },
    ShowSubmenu {
        #[serde(default)]
        submenu: Vec<MenuNode>,
        #[serde(default)]
        parent_label: Option<String>,
    },
    ShowInfo {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
    ShowLink {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        link: Option<String>,
    },
    ShowMap {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        image: Option<String>,
    },
    SummaryProgress {
        step: String,
        #[serde(default)]
        detail: Option<String>,
    },
    SummaryResult {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

/// Outbound intents emitted by the core toward the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundIntent {
    Register { name: String },
    Join,
    Message { text: String, timestamp: String },
    AdminSelectChat { user_id: String },
    AdminMessage { user_id: String, text: String, timestamp: String },
    MenuOptionSelected { id: String },
    SubmenuOptionSelected { id: String },
    ReturnToMainMenu,
    RequestSummary { email: String },
}
