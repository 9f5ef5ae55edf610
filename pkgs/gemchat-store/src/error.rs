use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message must contain text or an image")]
    EmptyMessage,

    #[error("Waiting for the previous reply")]
    ReplyPending,

    #[error("History is still loading")]
    HistoryLoading,

    #[error("No Tokio runtime to deliver the reply on")]
    NoRuntime,

    #[error("Not an image: {0}")]
    NotAnImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Chatroom title must not be empty")]
    EmptyTitle,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
