use crate::models::{ArchiveMember, DEFAULT_MAX_CHARS};
use crate::services::files::decode_text;
use indexmap::IndexMap;
use std::io::{Cursor, Read, Write};
use thiserror::Error;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Number of members shown by [`preview_archive`] by default
pub const PREVIEW_MEMBERS: usize = 10;

/// Characters of each member shown by [`preview_archive`] by default
pub const PREVIEW_CHARS: usize = 500;

/// Shown in place of a preview when a member has no usable text
pub const UNDECODABLE_MARKER: &str = "[Could not decode]";

/// Errors for the archive as a whole. Problems with single members are
/// reported as [`ArchiveEntry::Unreadable`] instead.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to read zip archive: {0}")]
    Read(#[source] ZipError),

    #[error("Failed to write zip archive: {0}")]
    Write(#[source] ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A member whose bytes could not be extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableMember {
    pub name: String,
    pub reason: String,
}

/// One non-directory entry of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEntry {
    Member(ArchiveMember),
    Unreadable(UnreadableMember),
}

/// Everything read out of an archive, in archive order
#[derive(Debug, Clone, Default)]
pub struct ArchiveContents {
    pub entries: Vec<ArchiveEntry>,
}

impl ArchiveContents {
    pub fn members(&self) -> impl Iterator<Item = &ArchiveMember> {
        self.entries.iter().filter_map(|entry| match entry {
            ArchiveEntry::Member(member) => Some(member),
            ArchiveEntry::Unreadable(_) => None,
        })
    }

    pub fn unreadable(&self) -> impl Iterator<Item = &UnreadableMember> {
        self.entries.iter().filter_map(|entry| match entry {
            ArchiveEntry::Unreadable(member) => Some(member),
            ArchiveEntry::Member(_) => None,
        })
    }

    pub fn into_members(self) -> Vec<ArchiveMember> {
        self.entries
            .into_iter()
            .filter_map(|entry| match entry {
                ArchiveEntry::Member(member) => Some(member),
                ArchiveEntry::Unreadable(_) => None,
            })
            .collect()
    }
}

/// Member name plus the start of its decoded text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPreview {
    pub name: String,
    pub text: String,
}

/// Bytes needed to hold `max_chars` characters of UTF-8 text
pub const fn member_byte_limit(max_chars: usize) -> u64 {
    (max_chars as u64).saturating_mul(4)
}

/// Largest member [`read_members`] extracts
pub const DEFAULT_MEMBER_BYTES: u64 = member_byte_limit(DEFAULT_MAX_CHARS);

type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

fn open(bytes: &[u8]) -> Result<Archive<'_>, ArchiveError> {
    ZipArchive::new(Cursor::new(bytes)).map_err(ArchiveError::Read)
}

/// Name, directory flag and declared size of an entry, read without decompressing
fn entry_header(archive: &mut Archive<'_>, index: usize) -> Result<(String, bool, u64), ZipError> {
    let file = archive.by_index_raw(index)?;
    Ok((file.name().to_string(), file.is_dir(), file.size()))
}

/// Decompress at most `limit` bytes of an entry.
///
/// The flag is true when the entry holds more than `limit` bytes.
fn read_capped(
    archive: &mut Archive<'_>,
    index: usize,
    limit: u64,
) -> Result<(Vec<u8>, bool), ZipError> {
    let file = archive.by_index(index)?;
    let mut raw_bytes = Vec::new();
    file.take(limit.saturating_add(1))
        .read_to_end(&mut raw_bytes)?;

    let truncated = raw_bytes.len() as u64 > limit;
    if truncated {
        raw_bytes.pop();
    }
    Ok((raw_bytes, truncated))
}

fn too_large(limit: u64) -> String {
    format!("larger than {} bytes", limit)
}

/// Read every non-directory entry of a zip archive, up to
/// [`DEFAULT_MEMBER_BYTES`] per entry.
pub fn read_members(bytes: &[u8]) -> Result<ArchiveContents, ArchiveError> {
    read_members_with_limit(bytes, DEFAULT_MEMBER_BYTES)
}

/// Read every non-directory entry of a zip archive.
///
/// Entries are returned in archive order. An entry that cannot be extracted
/// (unsupported compression, encryption, corrupt data) or that holds more than
/// `max_member_bytes` is listed as [`ArchiveEntry::Unreadable`] and the rest
/// are still read. Oversized entries are never decompressed past the limit.
pub fn read_members_with_limit(
    bytes: &[u8],
    max_member_bytes: u64,
) -> Result<ArchiveContents, ArchiveError> {
    let mut archive = open(bytes)?;
    let mut contents = ArchiveContents::default();

    for index in 0..archive.len() {
        let (name, is_dir, declared_size) = match entry_header(&mut archive, index) {
            Ok(header) => header,
            Err(e) => {
                tracing::warn!("Could not open archive entry #{}: {}", index, e);
                contents.entries.push(ArchiveEntry::Unreadable(UnreadableMember {
                    name: format!("#{}", index),
                    reason: e.to_string(),
                }));
                continue;
            }
        };

        if is_dir {
            continue;
        }

        let read = if declared_size > max_member_bytes {
            Err(too_large(max_member_bytes))
        } else {
            match read_capped(&mut archive, index, max_member_bytes) {
                Ok((_, true)) => Err(too_large(max_member_bytes)),
                Ok((raw_bytes, false)) => Ok(raw_bytes),
                Err(e) => Err(e.to_string()),
            }
        };

        let entry = match read {
            Ok(raw_bytes) => ArchiveEntry::Member(ArchiveMember { name, raw_bytes }),
            Err(reason) => {
                tracing::warn!("Could not read {}: {}", name, reason);
                ArchiveEntry::Unreadable(UnreadableMember { name, reason })
            }
        };
        contents.entries.push(entry);
    }

    tracing::debug!(
        "Read archive: {} entries, {} unreadable",
        contents.entries.len(),
        contents.unreadable().count()
    );

    Ok(contents)
}

/// Names of all non-directory entries, in archive order
pub fn list_members(bytes: &[u8]) -> Result<Vec<String>, ArchiveError> {
    let mut archive = open(bytes)?;
    let mut names = Vec::new();

    for index in 0..archive.len() {
        match entry_header(&mut archive, index) {
            Ok((name, false, _)) => names.push(name),
            Ok(_) => {}
            Err(e) => tracing::warn!("Could not open archive entry #{}: {}", index, e),
        }
    }

    Ok(names)
}

/// First `max_members` file entries with up to `max_chars` characters of text each.
///
/// Only the previewed entries are decompressed, and only as far as
/// `max_chars` characters can reach.
pub fn preview_archive(
    bytes: &[u8],
    max_members: usize,
    max_chars: usize,
) -> Result<Vec<MemberPreview>, ArchiveError> {
    let mut archive = open(bytes)?;
    let limit = member_byte_limit(max_chars);
    let mut previews = Vec::new();

    for index in 0..archive.len() {
        if previews.len() >= max_members {
            break;
        }

        let name = match entry_header(&mut archive, index) {
            Ok((_, true, _)) => continue,
            Ok((name, false, _)) => name,
            Err(e) => {
                tracing::warn!("Could not open archive entry #{}: {}", index, e);
                continue;
            }
        };

        let text = match read_capped(&mut archive, index, limit) {
            Ok((raw_bytes, _)) if raw_bytes.is_empty() => String::new(),
            Ok((raw_bytes, _)) => match decode_text(&raw_bytes) {
                Some(text) => text.chars().take(max_chars).collect(),
                None => UNDECODABLE_MARKER.to_string(),
            },
            Err(e) => {
                tracing::warn!("Could not read {}: {}", name, e);
                UNDECODABLE_MARKER.to_string()
            }
        };

        previews.push(MemberPreview { name, text });
    }

    Ok(previews)
}

/// Write `(name, text)` pairs into a new deflate-compressed zip archive.
///
/// Entries are written in mapping order. Names containing `/` become nested
/// paths inside the archive; no directory entries are added and no timestamps
/// or permissions are carried over.
pub fn package(entries: &IndexMap<String, String>) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, text) in entries {
        writer
            .start_file(name.as_str(), options)
            .map_err(ArchiveError::Write)?;
        writer.write_all(text.as_bytes())?;
    }

    let cursor = writer.finish().map_err(ArchiveError::Write)?;

    tracing::debug!("Packaged {} entries", entries.len());
    Ok(cursor.into_inner())
}
