//! On-demand backlink scans.
//!
//! For a queried note, every other markdown file is scanned line by line for
//! wiki references and standard markdown links whose basename (without
//! extension) matches the query, case-insensitively. The first hit in a file
//! records one entry and ends that file's scan. Results are recomputed per
//! query over a fresh inventory — there is no persistent inverted index.
//!
//! Matching is regex-based over raw lines: a reference inside a code fence or
//! inline code span counts like any other. Scan cost is O(vault size) per
//! query.

use percent_encoding::percent_decode_str;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use tracing::debug;

use crate::constants::backlinks::SNIPPET_MAX_CHARS;
use crate::types::{BacklinkEntry, Result, basename, stem};
use crate::vault::{VaultStore, inventory};

fn wiki_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!?\[\[([^\]]+)\]\]").expect("static regex"))
}

fn markdown_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]*\]\(([^)]+)\)").expect("static regex"))
}

/// Collect inbound references to `relative_path`, sorted by source path.
/// The queried note itself is never part of the result.
pub fn backlinks_for(root: &Path, relative_path: &str) -> Result<Vec<BacklinkEntry>> {
    let query_stem = stem(relative_path).to_lowercase();
    let store = VaultStore::open(root)?;

    let mut entries = Vec::new();
    for file in inventory::markdown_files(root)? {
        if file.relative_path == relative_path {
            continue;
        }
        let text = match store.read(&file.relative_path) {
            Ok(text) => text,
            Err(err) => {
                // a file deleted mid-scan is skipped, not fatal
                debug!("backlink scan skipping {}: {err}", file.relative_path);
                continue;
            }
        };
        if let Some(line) = first_referencing_line(&text, &query_stem) {
            entries.push(BacklinkEntry {
                path: file.relative_path,
                snippet: snippet_of(line),
            });
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// First line of `text` containing a reference whose normalized basename
/// matches `query_stem`.
fn first_referencing_line<'t>(text: &'t str, query_stem: &str) -> Option<&'t str> {
    text.lines().find(|line| {
        let wiki_hits = wiki_ref_re()
            .captures_iter(line)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str());
        let link_hits = markdown_link_re()
            .captures_iter(line)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str());
        wiki_hits
            .chain(link_hits)
            .any(|target| target_matches(target, query_stem))
    })
}

/// Normalize a reference target to its bare basename-without-extension and
/// compare case-insensitively. Targets leaving the vault never match.
fn target_matches(target: &str, query_stem: &str) -> bool {
    let target = target.split(['|', '#']).next().unwrap_or(target).trim();
    if target.is_empty() || target.contains("://") {
        return false;
    }
    let decoded = percent_decode_str(target).decode_utf8_lossy();
    stem(basename(&decoded)).eq_ignore_ascii_case(query_stem)
}

/// Trimmed single-line snippet, ellipsis-truncated past the fixed length.
fn snippet_of(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.chars().count() <= SNIPPET_MAX_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(SNIPPET_MAX_CHARS).collect();
    format!("{cut}...")
}
