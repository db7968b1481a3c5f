//! Chatbot capability used by the shell's chat panel.
//!
//! Independent of recommendation: the shell forwards the user's text and shows
//! whatever comes back, or the error.

use crate::error::AppResult;

pub mod openai;

/// Produces a natural-language reply to free text
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChatResponder: Send + Sync {
    /// Reply to `user_text`
    ///
    /// Fails with `AppError::ChatService` when the upstream service is
    /// unreachable, rejects the request or replies with nothing.
    async fn respond(&self, user_text: &str) -> AppResult<String>;

    /// Responder name for logging and debugging
    fn name(&self) -> &'static str;
}
