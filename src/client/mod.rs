//! Completion client abstraction.
//!
//! The rest of the crate only talks to the remote completion service through the
//! [`CompletionClient`] trait, so services can be exercised with mocks and the
//! HTTP details stay in [`openai`].

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use openai::OpenAiClient;

/// Role of a message in a chat-completion conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One request to the completion service
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Errors returned by a completion client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API key is required")]
    MissingApiKey,

    #[error("Authentication failed")]
    Auth,

    #[error("Rate limited by completion service")]
    RateLimited,

    #[error("Completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Completion response contained no choices")]
    NoChoices,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A remote text-completion service.
///
/// Implementations return the text of the first completion choice. An empty
/// string is a valid answer; interpreting it is up to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ClientError>;
}
