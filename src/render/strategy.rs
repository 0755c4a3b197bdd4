//! Render strategies.
//!
//! The renderer core is context-free; the three behaviors that differ between
//! interactive preview and static export live behind [`RenderStrategy`]:
//! wiki-link anchors, asset URL resolution, and diagram containers.

use crate::render::{encode_path, escape_attr, escape_html, opens_new_context};
use crate::resolve;
use crate::types::VaultFile;

pub trait RenderStrategy: Send + Sync {
    /// Anchor markup for a wiki-scheme destination. `label_html` is already
    /// rendered inline HTML.
    fn wiki_link(&self, target: &str, label_html: &str, title: Option<&str>) -> String;

    /// Turn a vault-relative asset reference into the URL the output should
    /// carry. External URLs never reach this hook.
    fn asset_url(&self, href: &str, base_dir: &str) -> String;

    /// Container markup for a diagram fence. `source` is the raw fence body;
    /// `index` is the zero-based ordinal of the fence within the document.
    fn diagram_block(&self, source: &str, index: usize) -> String;
}

/// Join a relative href onto the directory of the containing note.
fn join_base(href: &str, base_dir: &str) -> String {
    let clean = href.trim_start_matches("./").trim_start_matches('/');
    if base_dir.is_empty() {
        clean.to_string()
    } else {
        format!("{base_dir}/{clean}")
    }
}

// =============================================================================
// Preview
// =============================================================================

/// Interactive preview: wiki anchors are intercepted client-side and routed
/// through the resolver, assets are served from the vault endpoint, diagram
/// fences get their export affordances.
#[derive(Debug, Default)]
pub struct PreviewStrategy {
    /// Path of the note being rendered, carried on diagram blocks so the
    /// per-diagram export actions know their source document.
    pub note_path: Option<String>,
}

impl PreviewStrategy {
    pub fn for_note(note_path: impl Into<String>) -> Self {
        Self {
            note_path: Some(note_path.into()),
        }
    }
}

impl RenderStrategy for PreviewStrategy {
    fn wiki_link(&self, target: &str, label_html: &str, title: Option<&str>) -> String {
        let title_attr = title
            .map(|t| format!(" title=\"{}\"", escape_attr(t)))
            .unwrap_or_default();
        format!(
            "<a href=\"#\" data-wiki=\"{}\"{title_attr} class=\"wiki-link\">{label_html}</a>",
            escape_attr(target)
        )
    }

    fn asset_url(&self, href: &str, base_dir: &str) -> String {
        format!("/vault/{}", encode_path(&join_base(href, base_dir)))
    }

    fn diagram_block(&self, source: &str, index: usize) -> String {
        let note_attr = self
            .note_path
            .as_deref()
            .map(|p| format!(" data-note-path=\"{}\"", escape_attr(p)))
            .unwrap_or_default();
        format!(
            "<div class=\"diagram-block\" data-diagram-index=\"{index}\"{note_attr}>\
             <div class=\"mermaid\">{}</div>\
             <div class=\"diagram-actions\">\
             <button type=\"button\" class=\"diagram-action\" data-format=\"png\">Save diagram as PNG</button>\
             <button type=\"button\" class=\"diagram-action\" data-format=\"svg\">Save diagram as SVG</button>\
             </div></div>",
            escape_html(source)
        )
    }
}

// =============================================================================
// Export
// =============================================================================

/// Static export: wiki links resolve synchronously against one inventory
/// snapshot and come out as vault-relative hrefs; assets stay vault-relative
/// for the inlining pass; diagram containers are bare engine mounts.
#[derive(Debug)]
pub struct ExportStrategy {
    inventory: Vec<VaultFile>,
}

impl ExportStrategy {
    pub fn new(inventory: Vec<VaultFile>) -> Self {
        Self { inventory }
    }
}

impl RenderStrategy for ExportStrategy {
    fn wiki_link(&self, target: &str, label_html: &str, title: Option<&str>) -> String {
        let title_attr = title
            .map(|t| format!(" title=\"{}\"", escape_attr(t)))
            .unwrap_or_default();
        match resolve::resolve(target, &self.inventory) {
            Ok(resolved) => format!(
                "<a href=\"{}\"{title_attr} class=\"wiki-link\">{label_html}</a>",
                escape_attr(&encode_path(&resolved.relative_path))
            ),
            // nothing to link: keep the label, drop the dead anchor
            Err(_) => label_html.to_string(),
        }
    }

    fn asset_url(&self, href: &str, base_dir: &str) -> String {
        encode_path(&join_base(href, base_dir))
    }

    fn diagram_block(&self, source: &str, _index: usize) -> String {
        format!("<div class=\"mermaid\">{}</div>", escape_html(source))
    }
}

/// Anchor attributes for ordinary (non-wiki) links; external destinations
/// open in a new context.
pub(crate) fn anchor_for(url: &str, label_html: &str, title: Option<&str>) -> String {
    let title_attr = title
        .map(|t| format!(" title=\"{}\"", escape_attr(t)))
        .unwrap_or_default();
    let target_attr = if opens_new_context(url) {
        " target=\"_blank\" rel=\"noopener\""
    } else {
        ""
    };
    format!(
        "<a href=\"{}\"{title_attr}{target_attr}>{label_html}</a>",
        escape_attr(url)
    )
}
