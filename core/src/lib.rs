/// Guided-chat session and conversation-state core
///
/// Tracks conversational participants, reconciles message history against
/// live updates without duplication, walks the server-defined menu tree,
/// and coordinates the one-shot report side-flow. Transport and rendering
/// are external collaborators wired in through the event and intent types.

pub mod bridge;
pub mod config;
pub mod console;
pub mod error;
pub mod events;
pub mod identity;
pub mod message;
pub mod navigator;
pub mod notify;
pub mod outbound;
pub mod registry;
pub mod session;
pub mod summary;

pub use config::{Config, Role};
pub use console::AgentConsole;
pub use error::{ChatError, Result};
pub use session::UserSession;
