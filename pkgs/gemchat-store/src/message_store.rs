//! Message store - windowed, append-only conversation history

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::events::{Message, MessageContent, MessageId, Sender};

/// Spacing between synthetic history messages
pub const SEED_INTERVAL_MS: i64 = 60_000;

/// Append-only history with a visible window that grows one page at a time
/// from the newest message backwards.
#[derive(Debug, Clone)]
pub struct MessageStore {
    history: Vec<Message>,
    page_count: usize,
    page_size: usize,
}

impl MessageStore {
    /// Create an empty store. A page size of 0 is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            history: Vec::new(),
            page_count: 1,
            page_size: page_size.max(1),
        }
    }

    /// Replace the history with `seed_count` synthetic messages ending one
    /// interval before `now`, oldest first, and reset the window to one page.
    pub fn initialize(&mut self, seed_count: usize, now: DateTime<Utc>) {
        let now_ms = now.timestamp_millis();

        self.history = (0..seed_count)
            .map(|i| {
                let idx = (seed_count - i) as i64;
                let id = MessageId(now_ms - idx * SEED_INTERVAL_MS);
                let (sender, text) = if idx % 2 == 0 {
                    (Sender::User, format!("Old user message #{}", idx))
                } else {
                    (Sender::Agent, format!("Old Gemini reply #{}", idx))
                };
                Message {
                    id,
                    sender,
                    content: MessageContent::Text { text },
                    created_at: id.timestamp(),
                }
            })
            .collect();
        self.page_count = 1;

        debug!("Seeded {} messages", seed_count);
    }

    /// The newest `page_count * page_size` messages, oldest first
    pub fn visible_window(&self) -> &[Message] {
        let start = self.history.len().saturating_sub(self.window_capacity());
        &self.history[start..]
    }

    /// Whether older messages exist beyond the window
    pub fn has_more(&self) -> bool {
        self.visible_window().len() < self.history.len()
    }

    /// Extend the window by one page. No-op when everything is visible.
    pub fn grow_window(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }

        self.page_count += 1;
        debug!(
            "Window grown to page {} ({} visible)",
            self.page_count,
            self.visible_window().len()
        );
        true
    }

    /// Append a message stamped no earlier than `now` with an id strictly
    /// greater than any existing one
    pub fn append(&mut self, sender: Sender, content: MessageContent, now: DateTime<Utc>) -> &Message {
        let id = self.next_id(now);

        self.history.push(Message {
            id,
            sender,
            content,
            created_at: id.timestamp(),
        });

        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn window_capacity(&self) -> usize {
        self.page_count.saturating_mul(self.page_size)
    }

    fn next_id(&self, now: DateTime<Utc>) -> MessageId {
        let now_ms = now.timestamp_millis();
        match self.history.last() {
            Some(last) if last.id.0 >= now_ms => MessageId(last.id.0 + 1),
            _ => MessageId(now_ms),
        }
    }
}
