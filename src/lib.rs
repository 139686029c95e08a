// redraft - Instruction-guided rewriting of text files and zip archives
//
// This is the library crate containing the rewrite and batch logic.
// The binary crate (main.rs) provides the command-line entry point.

pub mod client;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use client::{ChatMessage, ClientError, CompletionClient, CompletionRequest, OpenAiClient, Role};
pub use config::ConfigManager;
pub use models::{BatchResult, EditRequest, EditResult, RewriteError, Settings};
pub use services::{BatchProcessor, ChatSession, RewriteService};

use std::sync::Arc;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Build the completion client described by `settings`.
///
/// Returns `Ok(None)` when no API key is configured; rewrites then fail with
/// [`RewriteError::NotConfigured`] instead of erroring here.
pub fn client_from_settings(
    settings: &Settings,
) -> Result<Option<Arc<dyn CompletionClient>>, ClientError> {
    match settings.api_key() {
        Some(key) => {
            let client = OpenAiClient::with_base_url(key, settings.base_url.as_str())?;
            Ok(Some(Arc::new(client)))
        }
        None => {
            tracing::warn!("No API key configured; rewrites will be rejected");
            Ok(None)
        }
    }
}
