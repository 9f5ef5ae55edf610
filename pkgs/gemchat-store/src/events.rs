//! Message and session event types

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ChatError;
use crate::image::ImageAttachment;

/// Ordered message identifier derived from a millisecond timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl MessageId {
    /// Instant encoded by this id
    pub fn timestamp(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

/// Message content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum MessageContent {
    Text { text: String },
    Image { data_uri: String },
    TextWithImage { text: String, data_uri: String },
}

impl MessageContent {
    /// Build content from raw send input.
    ///
    /// Text is trimmed; whitespace-only text counts as absent. Fails with
    /// [`ChatError::EmptyMessage`] when neither text nor image remains.
    pub fn from_input(text: Option<&str>, image: Option<ImageAttachment>) -> Result<Self, ChatError> {
        let text = text.map(str::trim).filter(|t| !t.is_empty());

        match (text, image) {
            (Some(text), Some(image)) => Ok(Self::TextWithImage {
                text: text.to_string(),
                data_uri: image.into_data_uri(),
            }),
            (Some(text), None) => Ok(Self::Text {
                text: text.to_string(),
            }),
            (None, Some(image)) => Ok(Self::Image {
                data_uri: image.into_data_uri(),
            }),
            (None, None) => Err(ChatError::EmptyMessage),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text } | Self::TextWithImage { text, .. } => Some(text),
            Self::Image { .. } => None,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Image { data_uri } | Self::TextWithImage { data_uri, .. } => Some(data_uri),
            Self::Text { .. } => None,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image().is_some()
    }
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub content: MessageContent,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// What the "copy" action puts on the clipboard: the text, or the image
    /// data URI for image-only messages
    pub fn clipboard_text(&self) -> &str {
        self.content
            .text()
            .or_else(|| self.content.image())
            .unwrap_or_default()
    }
}

/// Events emitted by a [`crate::ChatSession`]
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Initial history is available
    HistoryLoaded { total: usize, visible: usize },
    /// A request for older messages was accepted
    OlderLoadStarted,
    /// The window grew by one page
    OlderLoaded { page_count: usize, visible: usize },
    /// A user message was appended
    MessageAppended(Message),
    /// The agent started "typing"
    ReplyStarted,
    /// The agent reply was appended
    ReplyReceived(Message),
}
