//! Markdown rendering.
//!
//! The render path is: raw text → wiki expander → markdown renderer → HTML.
//! The renderer core is shared by interactive preview and static export; the
//! behaviors that differ (wiki anchors, asset URLs, diagram containers) are
//! behind the [`RenderStrategy`] trait rather than context flags.

mod highlight;
mod hydrate;
mod markdown;
mod preview;
mod strategy;
mod wiki;

pub use highlight::highlight_fence;
pub use hydrate::hydrate_embeds;
pub use markdown::MarkdownRenderer;
pub use preview::PreviewDebouncer;
pub use strategy::{ExportStrategy, PreviewStrategy, RenderStrategy};
pub use wiki::expand;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Private scheme carrying raw wiki targets through the markdown parser.
pub const WIKI_SCHEME: &str = "vault-wiki://";

/// Characters escaped inside wiki-scheme destinations. Parentheses and pipes
/// would otherwise break the surrounding markdown link syntax.
const WIKI_TARGET_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'(')
    .add(b')')
    .add(b'|')
    .add(b'%')
    .add(b'#')
    .add(b'?');

/// Characters escaped inside asset URL path segments.
const ASSET_SEGMENT_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'%')
    .add(b'#')
    .add(b'?')
    .add(b'&');

/// Encode a raw wiki target into a `vault-wiki://` destination.
pub fn encode_wiki_target(target: &str) -> String {
    format!(
        "{WIKI_SCHEME}{}",
        utf8_percent_encode(target, WIKI_TARGET_SET)
    )
}

/// Recover the raw target from a `vault-wiki://` destination.
pub fn decode_wiki_target(dest: &str) -> Option<String> {
    let encoded = dest.strip_prefix(WIKI_SCHEME)?;
    Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned())
}

/// Percent-encode a slash path segment by segment, keeping the slashes.
pub fn encode_path(rel: &str) -> String {
    rel.split('/')
        .map(|seg| utf8_percent_encode(seg, ASSET_SEGMENT_SET).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Destinations that bypass asset resolution entirely.
pub fn is_external_url(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    ["http:", "https:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// External destinations that should open in a new context.
pub fn opens_new_context(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    ["http:", "https:", "mailto:", "tel:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

// =============================================================================
// HTML Escaping
// =============================================================================

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn escape_attr(text: &str) -> String {
    escape_html(text)
}

/// Inverse of [`escape_attr`] for values read back out of generated markup.
pub fn unescape_attr(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
