//! Chatroom registry - the dashboard's list of conversations
//!
//! The whole list lives under a single storage key as a JSON array of
//! `{id, title}` records. It is read once on [`ChatroomRegistry::hydrate`] and
//! rewritten in full after every mutation.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::RegistryError;
use crate::settings_manager::KeyValueStore;

/// Storage key holding the serialized chatroom list
pub const CHATROOMS_KEY: &str = "chatrooms";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatroomRecord {
    pub id: String,
    pub title: String,
}

impl ChatroomRecord {
    /// Creation time encoded in the id, if the id is a millisecond timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.id
            .parse::<i64>()
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}

/// Ordered set of chatrooms persisted through a [`KeyValueStore`]
pub struct ChatroomRegistry<S> {
    storage: S,
    chatrooms: Vec<ChatroomRecord>,
    hydrated: bool,
}

impl<S: KeyValueStore> ChatroomRegistry<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            chatrooms: Vec::new(),
            hydrated: false,
        }
    }

    /// Load the persisted list. Unreadable or malformed data yields an empty
    /// registry rather than an error.
    pub async fn hydrate(&mut self) -> &[ChatroomRecord] {
        self.chatrooms = match self.storage.load(CHATROOMS_KEY).await {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(chatrooms) => chatrooms,
                Err(e) => {
                    warn!("Discarding malformed chatroom list: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to load chatrooms: {:#}", e);
                Vec::new()
            }
        };
        self.hydrated = true;

        info!("Hydrated {} chatrooms", self.chatrooms.len());
        &self.chatrooms
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// All chatrooms in creation order
    pub fn list(&self) -> &[ChatroomRecord] {
        &self.chatrooms
    }

    pub fn get(&self, id: &str) -> Option<&ChatroomRecord> {
        self.chatrooms.iter().find(|r| r.id == id)
    }

    /// Create a chatroom with a trimmed, non-empty title
    pub async fn create(&mut self, title: &str) -> Result<ChatroomRecord, RegistryError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(RegistryError::EmptyTitle);
        }

        let record = ChatroomRecord {
            id: self.next_id(Utc::now()),
            title: title.to_string(),
        };

        let mut updated = self.chatrooms.clone();
        updated.push(record.clone());
        self.persist(&updated).await?;
        self.chatrooms = updated;

        info!("Created chatroom {} ({})", record.id, record.title);
        Ok(record)
    }

    /// Remove a chatroom; returns whether it existed
    pub async fn delete(&mut self, id: &str) -> Result<bool, RegistryError> {
        let updated: Vec<ChatroomRecord> = self
            .chatrooms
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        let removed = updated.len() != self.chatrooms.len();

        self.persist(&updated).await?;
        self.chatrooms = updated;

        if removed {
            info!("Deleted chatroom {}", id);
        }
        Ok(removed)
    }

    async fn persist(&self, chatrooms: &[ChatroomRecord]) -> Result<(), RegistryError> {
        let data = serde_json::to_string(chatrooms)?;
        self.storage.save(CHATROOMS_KEY, &data).await?;
        Ok(())
    }

    fn next_id(&self, now: DateTime<Utc>) -> String {
        let now_ms = now.timestamp_millis();
        let newest = self
            .chatrooms
            .iter()
            .filter_map(|r| r.id.parse::<i64>().ok())
            .max();

        match newest {
            Some(newest) if newest >= now_ms => (newest + 1).to_string(),
            _ => now_ms.to_string(),
        }
    }
}

/// Case-insensitive substring match on titles; an empty query matches all
pub fn search<'a>(records: &'a [ChatroomRecord], query: &str) -> Vec<&'a ChatroomRecord> {
    let query = query.to_lowercase();
    records
        .iter()
        .filter(|r| r.title.to_lowercase().contains(&query))
        .collect()
}
