//! Services module - Pure business logic for instruction-guided rewriting.
//!
//! The services are framework-agnostic: they know nothing about the CLI and
//! talk to the completion service only through
//! [`CompletionClient`](crate::client::CompletionClient).
//!
//! # Components
//!
//! - [`RewriteService`]: rewrites one text. Validates the request (client
//!   configured, non-empty source under the character limit, non-empty
//!   instruction), wraps the source in `<FILE>` markers under a fixed system
//!   directive, and returns the first completion verbatim.
//!
//! - [`BatchProcessor`]: applies one instruction to every text member of a zip
//!   archive or to a set of loose files. Members are rewritten strictly one after
//!   another; a member that cannot be decoded or rewritten is recorded and
//!   skipped without stopping the batch.
//!
//! - [`archive`]: zip reading, previewing and packaging.
//!
//! - [`ChatSession`]: a caller-owned conversation, optionally primed with the
//!   files being edited.
//!
//! # Usage Example
//!
//! ```ignore
//! use redraft::services::{BatchProcessor, RewriteService};
//!
//! let rewriter = RewriteService::new(Some(client), &settings);
//! let processor = BatchProcessor::new(rewriter);
//!
//! let result = processor.process_archive(&zip_bytes, "Fix typos").await?;
//! std::fs::write("edited_project.zip", result.to_archive()?)?;
//! ```

pub mod archive;
pub mod batch;
pub mod chat;
pub mod files;
pub mod rewrite;

pub use archive::{
    ArchiveContents, ArchiveEntry, ArchiveError, MemberPreview, UnreadableMember, list_members,
    package, preview_archive, read_members, read_members_with_limit,
};
pub use batch::BatchProcessor;
pub use chat::{ChatError, ChatSession, FileContext};
pub use files::{decode_text, edited_file_name, load_text_file};
pub use rewrite::{RewriteService, build_messages};
