//! Gemchat Store - conversation state for the gemchat client
//!
//! This crate holds everything behind the dashboard and chatroom views.
//!
//! # Architecture
//!
//! - **MessageStore**: Append-only history with a visible window that grows
//!   one page at a time
//! - **ChatSession**: Async wrapper around one `MessageStore` with
//!   single-flight page loads and a busy-guarded send/reply cycle
//! - **ReplySimulator**: Backend that answers user messages (`SimulatedReply`
//!   is a scripted stand-in)
//! - **ChatroomRegistry**: The persisted list of chatrooms
//! - **SettingsManager**: SQLite key/value table the registry is stored in
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use gemchat_store::{ChatConfig, ChatSession, ChatroomRegistry, SettingsManager};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = SettingsManager::open("gemchat.db".as_ref()).await?;
//! let mut registry = ChatroomRegistry::new(settings);
//! registry.hydrate().await;
//! let room = registry.create("Trip planning").await?;
//!
//! let (session, _events) = ChatSession::with_simulated_replies(room.id, ChatConfig::default());
//! session.load_history().await;
//! session.load_more().await;
//! session.send(Some("hello"), None)?;
//! # Ok(())
//! # }
//! ```

pub mod chat_session;
pub mod chatroom_registry;
pub mod entities;
pub mod error;
pub mod image;
pub mod message_store;
pub mod migration;
pub mod reply;
pub mod settings_manager;

mod events;

pub use chat_session::{ChatSession, LoadOutcome, WindowSnapshot};
pub use chatroom_registry::{search, ChatroomRecord, ChatroomRegistry, CHATROOMS_KEY};
pub use error::{ChatError, RegistryError};
pub use events::{ChatEvent, Message, MessageContent, MessageId, Sender};
pub use image::ImageAttachment;
pub use message_store::MessageStore;
pub use reply::{ReplySimulator, SimulatedReply};
pub use settings_manager::{open_database, KeyValueStore, MemoryStore, SettingsManager};

use std::time::Duration;

/// Configuration for chat sessions
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Messages added to the window per page (default: 20)
    pub page_size: usize,

    /// Synthetic messages generated by `load_history` (default: 40)
    pub seed_count: usize,

    /// Delay before the initial history appears (default: 1200ms)
    pub initial_load_delay: Duration,

    /// Delay for loading one page of older messages (default: 700ms)
    pub load_delay: Duration,

    /// Delay before the simulated reply arrives (default: 1200ms)
    pub reply_delay: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            seed_count: 40,
            initial_load_delay: Duration::from_millis(1200),
            load_delay: Duration::from_millis(700),
            reply_delay: Duration::from_millis(1200),
        }
    }
}
