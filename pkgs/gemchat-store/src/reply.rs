//! Reply simulation - stands in for a real inference backend

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::events::{Message, MessageContent};

/// Produces the agent's answer to a user message
#[async_trait]
pub trait ReplySimulator: Send + Sync {
    async fn reply(&self, input: &Message) -> MessageContent;
}

/// Scripted replies after a fixed delay
#[derive(Debug, Clone)]
pub struct SimulatedReply {
    delay: Duration,
}

impl SimulatedReply {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// The scripted answer for a message
    pub fn compose(input: &Message) -> MessageContent {
        let text = match input.content.text() {
            Some(text) if !input.content.has_image() => format!("Gemini: You said \"{}\"", text),
            _ => "Gemini: Nice image!".to_string(),
        };

        MessageContent::Text { text }
    }
}

#[async_trait]
impl ReplySimulator for SimulatedReply {
    async fn reply(&self, input: &Message) -> MessageContent {
        debug!("Simulating reply to {} in {:?}", input.id, self.delay);
        tokio::time::sleep(self.delay).await;
        Self::compose(input)
    }
}
