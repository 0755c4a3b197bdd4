//! Slash-path helpers for vault-relative paths.
//!
//! Vault paths are plain slash-separated strings relative to the vault root.
//! These helpers mirror what the rest of the engine needs: basename/stem
//! extraction for resolution and backlink matching, and a normalization that
//! refuses anything escaping the root.

use std::path::{Component, Path};

use crate::types::{Result, VaultError};

/// Convert an OS path into a slash-separated string.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalize a caller-supplied relative path: strip leading slashes, collapse
/// `.` segments, and reject `..` traversal so every path stays under the root.
pub fn normalize_rel(rel: &str) -> Result<String> {
    let trimmed = rel.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(VaultError::invalid_input("empty vault path"));
    }
    let mut parts = Vec::new();
    for part in trimmed.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(VaultError::invalid_input(format!(
                    "path escapes vault root: {rel}"
                )));
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return Err(VaultError::invalid_input("empty vault path"));
    }
    Ok(parts.join("/"))
}

/// Last path segment, e.g. `"Daily/note.md"` -> `"note.md"`.
pub fn basename(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

/// Basename with the final extension removed, e.g. `"Daily/note.md"` -> `"note"`.
pub fn stem(rel: &str) -> &str {
    let base = basename(rel);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(idx) => &base[..idx],
    }
}

/// Parent directory, empty for root-level paths.
pub fn parent_dir(rel: &str) -> &str {
    match rel.rfind('/') {
        Some(idx) => &rel[..idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_leading_slashes() {
        assert_eq!(normalize_rel("/Daily/note.md").unwrap(), "Daily/note.md");
        assert_eq!(normalize_rel("//a/./b").unwrap(), "a/b");
    }

    #[test]
    fn test_normalize_rejects_traversal() {
        assert!(normalize_rel("../outside.md").is_err());
        assert!(normalize_rel("a/../../b").is_err());
        assert!(normalize_rel("").is_err());
        assert!(normalize_rel("/").is_err());
    }

    #[test]
    fn test_basename_and_stem() {
        assert_eq!(basename("Daily/2025-01-01 DAILY.md"), "2025-01-01 DAILY.md");
        assert_eq!(stem("Daily/2025-01-01 DAILY.md"), "2025-01-01 DAILY");
        assert_eq!(stem("note"), "note");
        assert_eq!(stem(".hidden"), ".hidden");
        assert_eq!(parent_dir("a/b/c.md"), "a/b");
        assert_eq!(parent_dir("c.md"), "");
    }

    #[test]
    fn test_to_slash() {
        let p = Path::new("Daily").join("note.md");
        assert_eq!(to_slash(&p), "Daily/note.md");
    }
}
