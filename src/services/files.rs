//! Text decoding and loose-file helpers shared by the batch paths.

use camino::Utf8Path;
use std::fs;
use std::io;

/// Fraction of replacement characters above which decoded bytes are treated as binary
const MAX_REPLACEMENT_RATIO: f64 = 0.3;

/// Prefix given to rewritten single files
pub const EDITED_PREFIX: &str = "edited_";

/// Decode raw bytes as UTF-8, replacing invalid sequences.
///
/// Returns `None` when the result holds no usable text: empty or
/// whitespace-only, containing NUL, or mostly replacement characters.
pub fn decode_text(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);

    if text.trim().is_empty() || text.contains('\0') {
        return None;
    }

    let total = text.chars().count();
    let replaced = text
        .chars()
        .filter(|&c| c == char::REPLACEMENT_CHARACTER)
        .count();
    if replaced as f64 / total as f64 > MAX_REPLACEMENT_RATIO {
        return None;
    }

    Some(text.into_owned())
}

/// Read a loose file from disk with the same permissive decoding.
///
/// Unlike [`decode_text`] this never rejects content; the batch decides what
/// to skip.
pub fn load_text_file(path: &Utf8Path) -> io::Result<String> {
    let raw = fs::read(path)?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Name under which a single rewritten file is saved (`notes.md` -> `edited_notes.md`)
pub fn edited_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    format!("{}{}", EDITED_PREFIX, base)
}
