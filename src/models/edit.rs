use crate::client::ClientError;
use thiserror::Error;

/// One rewrite call: the text to edit and the instruction to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub source_text: String,
    pub instruction: String,
}

impl EditRequest {
    pub fn new(source_text: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            instruction: instruction.into(),
        }
    }

    /// Length of the source in Unicode scalar values
    pub fn source_chars(&self) -> usize {
        self.source_text.chars().count()
    }
}

/// Reasons a rewrite produced no text
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("No API key configured")]
    NotConfigured,

    #[error("No file content to edit")]
    EmptySource,

    #[error("File is too large ({chars} characters, limit {max}). Upload a smaller file or split it")]
    SourceTooLarge { chars: usize, max: usize },

    #[error("Editing instruction is empty")]
    EmptyInstruction,

    #[error("Completion service error: {0}")]
    Remote(#[from] ClientError),
}

/// Outcome of a single rewrite
#[derive(Debug)]
pub enum EditResult {
    /// First completion text, verbatim
    Edited(String),
    Failed(RewriteError),
}

impl EditResult {
    pub fn is_success(&self) -> bool {
        matches!(self, EditResult::Edited(_))
    }

    /// Edited text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            EditResult::Edited(text) => Some(text),
            EditResult::Failed(_) => None,
        }
    }

    /// Edited text when it is non-empty
    pub fn into_non_empty(self) -> Result<String, Option<RewriteError>> {
        match self {
            EditResult::Edited(text) if !text.is_empty() => Ok(text),
            EditResult::Edited(_) => Err(None),
            EditResult::Failed(err) => Err(Some(err)),
        }
    }

    pub fn error(&self) -> Option<&RewriteError> {
        match self {
            EditResult::Edited(_) => None,
            EditResult::Failed(err) => Some(err),
        }
    }
}
