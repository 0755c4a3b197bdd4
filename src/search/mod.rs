//! Vault search.
//!
//! Two passes over the markdown corpus, names first: a filename substring
//! match wins over a content match, and the combined result count is bounded
//! by the settings limit. Content hits carry a whitespace-normalized snippet
//! window around the first occurrence.

use regex::RegexBuilder;
use std::path::Path;

use tracing::debug;

use crate::constants::search::{DEFAULT_RESULT_LIMIT, SNIPPET_AFTER, SNIPPET_BEFORE};
use crate::types::{Result, SearchHit, VaultError, basename};
use crate::vault::{VaultStore, inventory};

/// Search markdown notes by filename, then by content.
pub fn search(root: &Path, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(VaultError::invalid_input("empty search query"));
    }
    let limit = if limit == 0 { DEFAULT_RESULT_LIMIT } else { limit };
    let needle = query.to_lowercase();
    let content_re = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .map_err(|e| VaultError::invalid_input(format!("unusable query: {e}")))?;

    let store = VaultStore::open(root)?;
    let files = inventory::markdown_files(root)?;
    let mut hits = Vec::new();

    // pass 1: filenames
    for file in &files {
        if hits.len() >= limit {
            return Ok(hits);
        }
        if basename(&file.relative_path).to_lowercase().contains(&needle) {
            hits.push(SearchHit {
                path: file.relative_path.clone(),
                snippet: "filename match".to_string(),
            });
        }
    }

    // pass 2: contents
    for file in &files {
        if hits.len() >= limit {
            break;
        }
        if hits.iter().any(|h| h.path == file.relative_path) {
            continue;
        }
        let text = match store.read(&file.relative_path) {
            Ok(text) => text,
            Err(err) => {
                debug!("search skipping {}: {err}", file.relative_path);
                continue;
            }
        };
        if let Some(m) = content_re.find(&text) {
            hits.push(SearchHit {
                path: file.relative_path.clone(),
                snippet: snippet_around(&text, m.start(), m.end()),
            });
        }
    }

    Ok(hits)
}

/// Context window around a match, clamped to char boundaries and collapsed to
/// a single line of whitespace-normalized text.
fn snippet_around(text: &str, start: usize, end: usize) -> String {
    let from = floor_char_boundary(text, start.saturating_sub(SNIPPET_BEFORE));
    let to = ceil_char_boundary(text, (end + SNIPPET_AFTER).min(text.len()));
    text[from..to].split_whitespace().collect::<Vec<_>>().join(" ")
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let full = root.join(rel);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[test]
    fn test_filename_match_wins_over_content() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "roadmap.md", "nothing relevant");
        write(temp.path(), "other.md", "the roadmap is long");

        let hits = search(temp.path(), "roadmap", 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].path, "roadmap.md");
        assert_eq!(hits[0].snippet, "filename match");
        assert_eq!(hits[1].path, "other.md");
        assert!(hits[1].snippet.contains("roadmap"));
    }

    #[test]
    fn test_case_insensitive_content_match() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.md", "Nothing But UPPER things");

        let hits = search(temp.path(), "upper", 10).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_snippet_is_single_normalized_line() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.md", "before\n\n  the   needle\tvalue\nafter");

        let hits = search(temp.path(), "needle", 10).unwrap();
        assert!(hits[0].snippet.contains("the needle value"));
        assert!(!hits[0].snippet.contains('\n'));
    }

    #[test]
    fn test_limit_bounds_combined_results() {
        let temp = TempDir::new().unwrap();
        for i in 0..10 {
            write(temp.path(), &format!("note{i}.md"), "common word");
        }

        let hits = search(temp.path(), "common", 3).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_empty_query_rejected() {
        let temp = TempDir::new().unwrap();
        assert!(search(temp.path(), "   ", 10).is_err());
    }

    #[test]
    fn test_multibyte_text_never_panics() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.md", "héllo wörld ünïcode ◊◊◊ target ◊◊◊ done");

        let hits = search(temp.path(), "target", 10).unwrap();
        assert_eq!(hits.len(), 1);
    }
}
