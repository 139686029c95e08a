use crate::services::archive::{self, ArchiveError};
use indexmap::IndexMap;

/// A non-directory entry read out of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Path within the archive
    pub name: String,
    pub raw_bytes: Vec<u8>,
}

/// What happened to one member of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Edited,
    Skipped,
    Failed,
}

/// Per-member diagnostics for a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberOutcome {
    pub name: String,
    pub status: MemberStatus,
    pub message: String,
}

/// Counts across a whole batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub edited: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.edited + self.skipped + self.failed
    }

    /// Get a summary string of the batch
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} edited", self.edited)];

        if self.skipped > 0 {
            parts.push(format!("{} skipped", self.skipped));
        }
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }

        parts.join(", ")
    }
}

/// Result of applying one instruction to many files.
///
/// `edited` holds only successful, non-empty rewrites keyed by the original
/// member path, in enumeration order. `outcomes` records every member that was
/// looked at, in the same order, including the ones dropped from `edited`.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub edited: IndexMap<String, String>,
    pub outcomes: Vec<MemberOutcome>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_edited(&mut self, name: &str, text: String) {
        self.edited.insert(name.to_string(), text);
        self.outcomes.push(MemberOutcome {
            name: name.to_string(),
            status: MemberStatus::Edited,
            message: String::new(),
        });
    }

    pub(crate) fn record_skipped(&mut self, name: &str, message: impl Into<String>) {
        self.outcomes.push(MemberOutcome {
            name: name.to_string(),
            status: MemberStatus::Skipped,
            message: message.into(),
        });
    }

    pub(crate) fn record_failed(&mut self, name: &str, message: impl Into<String>) {
        self.outcomes.push(MemberOutcome {
            name: name.to_string(),
            status: MemberStatus::Failed,
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.edited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edited.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.edited.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.edited.keys().map(String::as_str)
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for outcome in &self.outcomes {
            match outcome.status {
                MemberStatus::Edited => summary.edited += 1,
                MemberStatus::Skipped => summary.skipped += 1,
                MemberStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// Outcomes that did not produce edited text
    pub fn problems(&self) -> impl Iterator<Item = &MemberOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status != MemberStatus::Edited)
    }

    /// Package the edited files into a new zip archive
    pub fn to_archive(&self) -> Result<Vec<u8>, ArchiveError> {
        archive::package(&self.edited)
    }
}
