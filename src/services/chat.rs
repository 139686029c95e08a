use crate::client::{ChatMessage, ClientError, CompletionClient, CompletionRequest, Role};
use thiserror::Error;

/// System prompt for the general-purpose chat
pub const GENERAL_SYSTEM_PROMPT: &str = "You are a helpful chatbot assistant.";

/// System prompt for the chat shown next to file editing
pub const EDITING_SYSTEM_PROMPT: &str = "You are a helpful chatbot for file editing and code tasks.";

/// Sampling temperature for chat replies
pub const CHAT_TEMPERATURE: f32 = 0.3;

/// Number of file names listed in a [`FileContext`] description
const CONTEXT_NAMES: usize = 10;

/// Characters of the selected file included in a [`FileContext`] description
const CONTEXT_PREVIEW_CHARS: usize = 500;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("No API key configured")]
    NotConfigured,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Completion service error: {0}")]
    Remote(#[from] ClientError),
}

/// What the editing chat knows about the files being worked on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContext {
    None,
    Archive {
        members: Vec<String>,
    },
    Files {
        names: Vec<String>,
        /// Selected file name and its text
        selected: Option<(String, String)>,
    },
}

impl FileContext {
    /// Short description sent to the model alongside the instructions
    pub fn describe(&self) -> String {
        match self {
            FileContext::None => String::new(),
            FileContext::Archive { members } => format!(
                "ZIP file containing: {}...",
                first_names(members).join(", ")
            ),
            FileContext::Files { names, selected } => {
                let mut context = format!("Project files: {}...", first_names(names).join(", "));
                if let Some((name, text)) = selected {
                    let preview: String = text.chars().take(CONTEXT_PREVIEW_CHARS).collect();
                    context.push_str(&format!("\nPreview of {}:\n{}", name, preview));
                }
                context
            }
        }
    }
}

fn first_names(names: &[String]) -> &[String] {
    &names[..names.len().min(CONTEXT_NAMES)]
}

/// A caller-owned conversation with the completion service.
///
/// History starts with a system prompt. Replies are appended only when the
/// request succeeded with non-empty text.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_prompt: String,
    history: Vec<ChatMessage>,
    model: String,
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>, model: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        Self {
            history: vec![ChatMessage::system(system_prompt.clone())],
            system_prompt,
            model: model.into(),
        }
    }

    pub fn general(model: impl Into<String>) -> Self {
        Self::new(GENERAL_SYSTEM_PROMPT, model)
    }

    pub fn editing(model: impl Into<String>) -> Self {
        Self::new(EDITING_SYSTEM_PROMPT, model)
    }

    /// Full history including the system prompt
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Messages after the system prompt
    pub fn visible_messages(&self) -> &[ChatMessage] {
        &self.history[1..]
    }

    /// Drop everything but the system prompt
    pub fn reset(&mut self) {
        self.history = vec![ChatMessage::system(self.system_prompt.clone())];
        tracing::debug!("Chat session reset");
    }

    /// Send a user message and record the exchange.
    pub async fn send(
        &mut self,
        client: Option<&dyn CompletionClient>,
        message: &str,
    ) -> Result<String, ChatError> {
        self.send_inner(client, message, None).await
    }

    /// Send a user message with file context and the current instructions.
    ///
    /// The context goes in a message right after the system prompt and is not
    /// kept in history.
    pub async fn send_with_context(
        &mut self,
        client: Option<&dyn CompletionClient>,
        message: &str,
        context: &FileContext,
        instructions: &str,
    ) -> Result<String, ChatError> {
        let context_message = ChatMessage::user(format!(
            "Current file(s) preview:\n{}\n\nCurrent instructions:\n{}",
            context.describe(),
            instructions
        ));
        self.send_inner(client, message, Some(context_message)).await
    }

    async fn send_inner(
        &mut self,
        client: Option<&dyn CompletionClient>,
        message: &str,
        context: Option<ChatMessage>,
    ) -> Result<String, ChatError> {
        let Some(client) = client else {
            tracing::warn!("Chat requested but no API key is configured");
            return Err(ChatError::NotConfigured);
        };
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.history.push(ChatMessage::user(message));

        let mut messages = self.history.clone();
        if let Some(context) = context {
            messages.insert(1, context);
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: CHAT_TEMPERATURE,
        };

        let reply = client.complete(request).await.map_err(|e| {
            tracing::error!("Chat request failed: {}", e);
            ChatError::from(e)
        })?;

        if !reply.is_empty() {
            self.history.push(ChatMessage::assistant(reply.clone()));
        }
        Ok(reply)
    }

    /// Number of completed assistant replies
    pub fn reply_count(&self) -> usize {
        self.history
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }
}
