//! Storage path derivation and filename sanitization.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Media category an attachment is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Audio,
    Video,
    File,
}

impl MediaCategory {
    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Image => "image",
            MediaCategory::Audio => "audio",
            MediaCategory::Video => "video",
            MediaCategory::File => "file",
        }
    }

    /// Storage folder for the category.
    pub fn folder(&self) -> &'static str {
        match self {
            MediaCategory::Image => "images",
            MediaCategory::Audio => "audios",
            MediaCategory::Video => "videos",
            MediaCategory::File => "files",
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive a collision-resistant storage path for an uploaded file:
/// `<folder>/<epoch-ms>_<sanitized-name>`.
pub fn storage_path(category: MediaCategory, file_name: &str) -> String {
    let epoch_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    format!(
        "{}/{}_{}",
        category.folder(),
        epoch_ms,
        sanitize_file_name(file_name)
    )
}

/// Make a file name safe for storage paths.
///
/// Strips diacritics via NFD decomposition, replaces whitespace runs with a
/// single underscore, and drops any character outside `[A-Za-z0-9._-]`.
/// Falls back to `"file"` when nothing survives.
pub fn sanitize_file_name(file_name: &str) -> String {
    let mut sanitized = String::with_capacity(file_name.len());
    let mut last_was_space = false;

    for c in file_name.nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_whitespace() {
            if !last_was_space && !sanitized.is_empty() {
                sanitized.push('_');
            }
            last_was_space = true;
            continue;
        }
        last_was_space = false;

        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            sanitized.push(c);
        }
    }

    let trimmed = sanitized.trim_matches('_');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
