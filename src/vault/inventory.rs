//! File inventory snapshots.
//!
//! The filesystem is authoritative: every operation that needs the inventory
//! walks the vault afresh. There is no cross-request caching, so concurrent
//! requests may observe different snapshots of a mutating vault.

use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use std::path::Path;

use crate::types::{FileKind, Result, VaultFile, to_slash};

/// Directories never considered part of the vault even when present.
const SKIP_DIRS: &[&str] = &["node_modules"];

/// Walk the vault and return a fresh snapshot of every visible file.
///
/// Hidden entries and [`SKIP_DIRS`] are excluded. Symlinks are not followed.
/// The returned order is the walk order, which resolution tie-breaks rely on.
pub fn snapshot(root: &Path) -> Result<Vec<VaultFile>> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .is_none_or(|name| !SKIP_DIRS.contains(&name))
        })
        .build();

    let mut files = Vec::new();
    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        let relative_path = to_slash(rel);
        if relative_path.is_empty() {
            continue;
        }

        let metadata = match path.metadata() {
            Ok(m) => m,
            Err(err) => {
                // Raced deletions between walk and stat are skipped, not fatal.
                tracing::debug!("skipping {relative_path}: {err}");
                continue;
            }
        };
        let modified: DateTime<Utc> = metadata
            .modified()
            .map(Into::into)
            .unwrap_or_else(|_| Utc::now());
        let created: DateTime<Utc> = metadata.created().map(Into::into).unwrap_or(modified);

        files.push(VaultFile {
            kind: FileKind::from_name(&relative_path),
            relative_path,
            modified,
            created,
        });
    }

    Ok(files)
}

/// Fresh snapshot filtered to markdown notes.
pub fn markdown_files(root: &Path) -> Result<Vec<VaultFile>> {
    Ok(snapshot(root)?
        .into_iter()
        .filter(|f| f.kind.is_markdown())
        .collect())
}
