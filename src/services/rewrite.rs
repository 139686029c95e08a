use crate::client::{ChatMessage, CompletionClient, CompletionRequest};
use crate::models::{EditRequest, EditResult, RewriteError, Settings};
use std::sync::Arc;

/// System directive sent with every rewrite
pub const SYSTEM_DIRECTIVE: &str = "You are an expert editor. Given file content and user instructions, \
produce ONLY the fully edited file. Preserve the file's format and structure. \
Do not add explanations or extra text.";

/// Sampling temperature for rewrites
pub const REWRITE_TEMPERATURE: f32 = 0.2;

/// Build the `[system, user]` message pair for a rewrite.
///
/// The user message is the trimmed instruction followed by the source wrapped
/// in `<FILE>` / `</FILE>` markers.
pub fn build_messages(request: &EditRequest) -> Vec<ChatMessage> {
    let user_prompt = format!(
        "{}\n\nFile content between <FILE> and </FILE>:\n<FILE>\n{}\n</FILE>\nReturn only the edited file content.",
        request.instruction.trim(),
        request.source_text
    );

    vec![
        ChatMessage::system(SYSTEM_DIRECTIVE),
        ChatMessage::user(user_prompt),
    ]
}

/// Service that rewrites one text through the completion service.
///
/// Holds no per-call state. Every failure comes back as
/// [`EditResult::Failed`]; nothing is raised to the caller and nothing is
/// retried.
#[derive(Clone)]
pub struct RewriteService {
    client: Option<Arc<dyn CompletionClient>>,
    model: String,
    max_chars: usize,
}

impl RewriteService {
    /// Create a service. `client` is `None` when no credential is configured.
    pub fn new(client: Option<Arc<dyn CompletionClient>>, settings: &Settings) -> Self {
        Self {
            client,
            model: settings.effective_model().to_string(),
            max_chars: settings.max_chars,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Check a request without calling the completion service
    pub fn check(&self, request: &EditRequest) -> Result<(), RewriteError> {
        self.ready_client(request).map(|_| ())
    }

    fn ready_client(&self, request: &EditRequest) -> Result<&dyn CompletionClient, RewriteError> {
        let client = self.client.as_deref().ok_or(RewriteError::NotConfigured)?;
        if request.source_text.is_empty() {
            return Err(RewriteError::EmptySource);
        }
        let chars = request.source_chars();
        if chars > self.max_chars {
            return Err(RewriteError::SourceTooLarge {
                chars,
                max: self.max_chars,
            });
        }
        if request.instruction.trim().is_empty() {
            return Err(RewriteError::EmptyInstruction);
        }
        Ok(client)
    }

    /// Apply the request's instruction to its source text.
    ///
    /// Returns the first completion's text verbatim on success.
    pub async fn rewrite(&self, request: &EditRequest) -> EditResult {
        let client = match self.ready_client(request) {
            Ok(client) => client,
            Err(err) => {
                match &err {
                    RewriteError::NotConfigured => {
                        tracing::warn!("Rewrite requested but no API key is configured")
                    }
                    other => tracing::warn!("Rewrite rejected: {}", other),
                }
                return EditResult::Failed(err);
            }
        };

        let completion = CompletionRequest {
            model: self.model.clone(),
            messages: build_messages(request),
            temperature: REWRITE_TEMPERATURE,
        };

        tracing::debug!(
            "Requesting rewrite: model={}, chars={}",
            self.model,
            request.source_chars()
        );

        match client.complete(completion).await {
            Ok(text) => EditResult::Edited(text),
            Err(e) => {
                tracing::error!("Rewrite failed: {}", e);
                EditResult::Failed(RewriteError::Remote(e))
            }
        }
    }

    /// Convenience wrapper over [`rewrite`](Self::rewrite)
    pub async fn rewrite_text(&self, source_text: &str, instruction: &str) -> EditResult {
        self.rewrite(&EditRequest::new(source_text, instruction)).await
    }
}
