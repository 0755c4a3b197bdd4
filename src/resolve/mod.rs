//! Wiki target resolution.
//!
//! Maps a bare wiki target string to a concrete vault-relative path against a
//! fresh inventory snapshot. Resolution is a deterministic function of
//! (target, inventory): the same pair always yields the same answer.
//!
//! ## Resolution order
//!
//! 1. exact relative-path match against the candidate
//! 2. any entry whose basename equals the candidate's basename
//! 3. any entry whose basename-without-extension equals the target's
//! 4. synthesized candidate with `existed = false`
//!
//! Steps 2 and 3 are loose matches broken by inventory walk order, not
//! alphabetically. With duplicate basenames in different directories this can
//! pick an unintended file; that looseness is part of the contract.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::{ResolvedTarget, Result, VaultError, VaultFile, basename, stem};

/// A target "already has an extension" when it ends in a dot-led
/// alphanumeric run, e.g. `image.webp` but not `v1.2 notes`.
fn extension_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.[a-z0-9]+$").expect("static regex"))
}

/// Resolve a raw wiki target against an inventory snapshot.
///
/// A `|label` suffix is split off and ignored; leading slashes are stripped.
/// An empty target after trimming fails with `InvalidInput` — there is
/// nothing sensible to synthesize.
pub fn resolve(raw_target: &str, inventory: &[VaultFile]) -> Result<ResolvedTarget> {
    let before_pipe = raw_target.split('|').next().unwrap_or(raw_target);
    let target = before_pipe.trim().trim_start_matches('/');
    if target.is_empty() {
        return Err(VaultError::invalid_input("empty wiki target"));
    }

    let has_extension = extension_re().is_match(target);
    let candidate = if has_extension {
        target.to_string()
    } else {
        format!("{target}.md")
    };

    // 1. exact relative-path match
    if let Some(file) = inventory.iter().find(|f| f.relative_path == candidate) {
        return Ok(ResolvedTarget {
            relative_path: file.relative_path.clone(),
            existed: true,
        });
    }

    // 2. loose basename match, first in walk order wins
    let candidate_base = basename(&candidate);
    if let Some(file) = inventory
        .iter()
        .find(|f| basename(&f.relative_path) == candidate_base)
    {
        return Ok(ResolvedTarget {
            relative_path: file.relative_path.clone(),
            existed: true,
        });
    }

    // 3. basename-without-extension match against the pre-candidate target
    let target_stem = stem(target);
    if let Some(file) = inventory
        .iter()
        .find(|f| stem(&f.relative_path) == target_stem)
    {
        return Ok(ResolvedTarget {
            relative_path: file.relative_path.clone(),
            existed: true,
        });
    }

    // 4. creation fallback: the candidate a caller could offer to create
    Ok(ResolvedTarget {
        relative_path: candidate,
        existed: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::types::FileKind;

    fn inventory(paths: &[&str]) -> Vec<VaultFile> {
        let now = Utc::now();
        paths
            .iter()
            .map(|p| VaultFile {
                relative_path: p.to_string(),
                kind: FileKind::from_name(p),
                modified: now,
                created: now,
            })
            .collect()
    }

    #[test]
    fn test_exact_match_wins() {
        let inv = inventory(&["note.md", "Daily/note.md"]);
        let hit = resolve("note", &inv).unwrap();
        assert!(hit.existed);
        assert_eq!(hit.relative_path, "note.md");
    }

    #[test]
    fn test_basename_match_in_subdirectory() {
        let inv = inventory(&["Daily/note.md", "assets/pic.png"]);
        let hit = resolve("note", &inv).unwrap();
        assert!(hit.existed);
        assert_eq!(hit.relative_path, "Daily/note.md");
    }

    #[test]
    fn test_explicit_extension_is_literal() {
        let inv = inventory(&["assets/image.webp"]);
        let hit = resolve("image.webp", &inv).unwrap();
        assert!(hit.existed);
        assert_eq!(hit.relative_path, "assets/image.webp");
    }

    #[test]
    fn test_stem_fallback_crosses_extensions() {
        // "chart" becomes candidate "chart.md", misses on basename, then
        // matches chart.png by stem.
        let inv = inventory(&["assets/chart.png"]);
        let hit = resolve("chart", &inv).unwrap();
        assert!(hit.existed);
        assert_eq!(hit.relative_path, "assets/chart.png");
    }

    #[test]
    fn test_miss_synthesizes_md_candidate() {
        let hit = resolve("Projects/Unwritten", &inventory(&[])).unwrap();
        assert!(!hit.existed);
        assert_eq!(hit.relative_path, "Projects/Unwritten.md");
    }

    #[test]
    fn test_miss_with_extension_keeps_it() {
        let hit = resolve("missing.webp", &inventory(&["other.md"])).unwrap();
        assert!(!hit.existed);
        assert_eq!(hit.relative_path, "missing.webp");
    }

    #[test]
    fn test_label_suffix_ignored_for_resolution() {
        let inv = inventory(&["Daily/note.md"]);
        let hit = resolve("note|the daily note", &inv).unwrap();
        assert_eq!(hit.relative_path, "Daily/note.md");
    }

    #[test]
    fn test_leading_slashes_stripped() {
        let inv = inventory(&["Daily/note.md"]);
        let hit = resolve("//Daily/note", &inv).unwrap();
        assert!(hit.existed);
        assert_eq!(hit.relative_path, "Daily/note.md");
    }

    #[test]
    fn test_empty_target_fails_outright() {
        assert!(resolve("   ", &inventory(&["a.md"])).is_err());
        assert!(resolve("|label only", &inventory(&["a.md"])).is_err());
        assert!(resolve("///", &inventory(&["a.md"])).is_err());
    }

    #[test]
    fn test_walk_order_breaks_basename_ties() {
        let inv = inventory(&["b/dup.md", "a/dup.md"]);
        let hit = resolve("dup", &inv).unwrap();
        // first inventory entry wins, not the alphabetically first
        assert_eq!(hit.relative_path, "b/dup.md");
    }

    #[test]
    fn test_trailing_dot_segment_counts_as_extension() {
        // ".2" matches the extension pattern, so no ".md" is appended
        let hit = resolve("release v1.2", &inventory(&[])).unwrap();
        assert_eq!(hit.relative_path, "release v1.2");
        assert!(!hit.existed);
    }
}
