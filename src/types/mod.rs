pub mod error;
pub mod path;

pub use error::{Result, VaultError};
pub use path::{basename, normalize_rel, parent_dir, stem, to_slash};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// File Inventory
// =============================================================================

/// What a vault entry is, judged by file name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Markdown,
    Image,
    Other,
}

impl FileKind {
    /// Classify by extension, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.ends_with(".md") || lower.ends_with(".markdown") {
            Self::Markdown
        } else if lower.ends_with(".png")
            || lower.ends_with(".jpg")
            || lower.ends_with(".jpeg")
            || lower.ends_with(".gif")
            || lower.ends_with(".webp")
            || lower.ends_with(".svg")
        {
            Self::Image
        } else {
            Self::Other
        }
    }

    pub fn is_markdown(self) -> bool {
        matches!(self, Self::Markdown)
    }

    pub fn is_image(self) -> bool {
        matches!(self, Self::Image)
    }
}

/// One entry of a fresh file-inventory snapshot.
///
/// The filesystem is authoritative: snapshots are walked per operation and
/// never cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultFile {
    /// Slash-separated path relative to the vault root. Unique per snapshot.
    pub relative_path: String,
    pub kind: FileKind,
    pub modified: DateTime<Utc>,
    pub created: DateTime<Utc>,
}

// =============================================================================
// Wiki References
// =============================================================================

/// A parsed `[[target|label]]` / `![[target]]` reference.
///
/// Ephemeral: parsed from source text and immediately consumed by the
/// expander or export pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiReference {
    pub raw_target: String,
    pub display_label: Option<String>,
    pub is_embed: bool,
}

impl WikiReference {
    /// Parse the bracket interior (`target` or `target|label`).
    pub fn parse(inner: &str, is_embed: bool) -> Self {
        match inner.split_once('|') {
            Some((target, label)) => Self {
                raw_target: target.trim().to_string(),
                display_label: Some(label.trim().to_string()),
                is_embed,
            },
            None => Self {
                raw_target: inner.trim().to_string(),
                display_label: None,
                is_embed,
            },
        }
    }

    /// Text shown to the reader: the label when present, else the bare target.
    pub fn display(&self) -> &str {
        self.display_label.as_deref().unwrap_or(&self.raw_target)
    }
}

/// Outcome of resolving a wiki target against an inventory snapshot.
///
/// A miss still carries a synthesized candidate path (`existed == false`) so
/// callers can offer to create the note instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    pub relative_path: String,
    pub existed: bool,
}

// =============================================================================
// Scan Results
// =============================================================================

/// One inbound reference found by the backlink scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklinkEntry {
    pub path: String,
    pub snippet: String,
}

/// One hit from the vault search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub path: String,
    pub snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_name() {
        assert_eq!(FileKind::from_name("note.md"), FileKind::Markdown);
        assert_eq!(FileKind::from_name("NOTE.MARKDOWN"), FileKind::Markdown);
        assert_eq!(FileKind::from_name("photo.WebP"), FileKind::Image);
        assert_eq!(FileKind::from_name("diagram.svg"), FileKind::Image);
        assert_eq!(FileKind::from_name("archive.tar.gz"), FileKind::Other);
    }

    #[test]
    fn test_wiki_reference_parse() {
        let plain = WikiReference::parse("Projects/Roadmap", false);
        assert_eq!(plain.raw_target, "Projects/Roadmap");
        assert_eq!(plain.display_label, None);
        assert_eq!(plain.display(), "Projects/Roadmap");

        let labeled = WikiReference::parse("Projects/Roadmap | the plan ", false);
        assert_eq!(labeled.raw_target, "Projects/Roadmap");
        assert_eq!(labeled.display(), "the plan");

        let embed = WikiReference::parse("assets/chart.png", true);
        assert!(embed.is_embed);
    }

    #[test]
    fn test_wiki_reference_keeps_first_pipe_split() {
        let r = WikiReference::parse("a|b|c", false);
        assert_eq!(r.raw_target, "a");
        assert_eq!(r.display(), "b|c");
    }
}
