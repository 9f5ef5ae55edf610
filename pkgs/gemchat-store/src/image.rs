//! Image attachments encoded as embeddable data URIs

use base64::Engine;
use std::path::Path;
use tracing::debug;

use crate::error::ChatError;

/// An image ready to be embedded in a message
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    data_uri: String,
}

impl ImageAttachment {
    /// Encode raw image bytes with the given mime type
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Result<Self, ChatError> {
        if !mime.starts_with("image/") {
            return Err(ChatError::NotAnImage(mime.to_string()));
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(Self {
            data_uri: format!("data:{};base64,{}", mime, encoded),
        })
    }

    /// Read an image file, guessing its mime type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ChatError> {
        let path = path.as_ref();
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(ChatError::NotAnImage(path.display().to_string()));
        }

        let bytes = tokio::fs::read(path).await?;
        debug!("Read {} byte image from {}", bytes.len(), path.display());

        Self::from_bytes(mime.essence_str(), &bytes)
    }

    /// Accept an already encoded `data:image/...` URI
    pub fn from_data_uri(data_uri: &str) -> Result<Self, ChatError> {
        if !data_uri.starts_with("data:image/") {
            return Err(ChatError::NotAnImage(truncate(data_uri, 32).to_string()));
        }

        Ok(Self {
            data_uri: data_uri.to_string(),
        })
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn into_data_uri(self) -> String {
        self.data_uri
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
