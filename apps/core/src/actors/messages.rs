use crate::brain::memory::Turn;
use serde::Serialize;
use tokio::sync::oneshot;

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Everything the completion backend needs for one reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub system_prompt: String,
    /// Prior turns of the session, oldest first
    pub history: Vec<Turn>,
    pub user_message: String,
    pub temperature: f32,
}

/// Reply to a processed user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub session_id: String,
    /// True when the static fallback was used (completion failed, session busy, deadline missed)
    #[serde(skip)]
    pub fallback: bool,
}

/// Messages that can be sent to the `SupervisorActor`.
#[derive(Debug)]
pub enum SupervisorMessage {
    /// A request to process a user's message, in a new session when `session_id` is `None`.
    ProcessUserMessage {
        session_id: Option<String>,
        content: String,
        /// Client-held history that replaces the session's memory.
        memory: Option<Vec<Turn>>,
        /// A channel to send the final assistant reply back.
        responder: oneshot::Sender<Result<ChatReply, AppError>>,
    },
    /// A command to stop accepting new messages.
    Shutdown,
}
