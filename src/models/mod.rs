//! Data models for redraft.
//!
//! - [`EditRequest`] / [`EditResult`]: one instruction-guided rewrite and its outcome
//! - [`ArchiveMember`]: a file entry read out of a zip archive
//! - [`BatchResult`]: ordered rewrites of a file set or archive, with per-member outcomes
//! - [`Settings`]: model selection and limits loaded by [`ConfigManager`](crate::config::ConfigManager)
//!
//! All of these are plain values owned by the caller. Nothing here is shared
//! between rewrite calls.

pub mod batch;
pub mod edit;
pub mod settings;

pub use batch::{ArchiveMember, BatchResult, BatchSummary, MemberOutcome, MemberStatus};
pub use edit::{EditRequest, EditResult, RewriteError};
pub use settings::{
    DEFAULT_INSTRUCTION, DEFAULT_MAX_CHARS, DEFAULT_MODEL, MODEL_OPTIONS, Settings, SettingsError,
};
