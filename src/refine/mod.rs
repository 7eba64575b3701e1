//! Prompt refinement through an OpenAI-compatible chat-completions API.

pub mod openai;

pub use self::openai::{OpenAiConfig, OpenAiRefiner};

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Guides the model; sent as the system message.
pub const SYSTEM_PROMPT: &str = "You are a prompt refiner. Use advanced prompt engineering techniques to refine the user's prompt.";

#[derive(Debug, Error)]
pub enum RefineError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
}

#[async_trait]
pub trait PromptRefiner: Send + Sync {
    /// Return the refined prompt, or an empty string if the model produced
    /// nothing.
    async fn refine(&self, original_prompt: &str) -> Result<String, RefineError>;
}

/// Text sent as the user message for `original_prompt`.
#[must_use]
pub fn user_message(original_prompt: &str) -> String {
    format!("Refine this prompt to be clearer and more specific. Original: {original_prompt}")
}
