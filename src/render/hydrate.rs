//! Asynchronous embed hydration (preview only).
//!
//! Each embed placeholder in rendered HTML resolves independently: image
//! targets inline as `<img>`, note targets are fetched and rendered with
//! embeds disabled so nesting cannot recurse. Every placeholder gets its own
//! task and its own pre-allocated output slot; sibling ordering is
//! unspecified and a failed embed renders an inline marker without touching
//! the rest of the document.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::debug;

use crate::render::{
    MarkdownRenderer, PreviewStrategy, encode_path, escape_attr, escape_html, unescape_attr,
};
use crate::resolve;
use crate::types::{FileKind, parent_dir};
use crate::vault::{VaultStore, inventory};

/// Matches the exact placeholder markup the expander emits; group 1 is the
/// attribute-escaped raw target.
fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            "<div class=\"embed-block\" data-embed-target=\"([^\"]*)\">\
             <div class=\"embed-meta\">Embedded: [^<]*</div>\
             <div class=\"embed-content\">Loading\\.\\.\\.</div></div>",
        )
        .expect("static regex")
    })
}

/// Hydrate every embed placeholder in `html`.
///
/// Each placeholder spawns an independent blocking task (resolution walks a
/// fresh inventory snapshot, then reads the target). Results are spliced back
/// in document order regardless of completion order.
pub async fn hydrate_embeds(html: &str, root: &Path) -> String {
    let spans: Vec<(usize, usize, String)> = placeholder_re()
        .captures_iter(html)
        .map(|caps| {
            let whole = caps.get(0).expect("group 0");
            (whole.start(), whole.end(), unescape_attr(&caps[1]))
        })
        .collect();
    if spans.is_empty() {
        return html.to_string();
    }

    let tasks: Vec<_> = spans
        .iter()
        .map(|(_, _, target)| {
            let root: PathBuf = root.to_path_buf();
            let target = target.clone();
            tokio::task::spawn_blocking(move || hydrate_one(&root, &target))
        })
        .collect();
    let joined = futures::future::join_all(tasks).await;

    let slots: Vec<String> = joined
        .into_iter()
        .zip(&spans)
        .map(|(result, (_, _, target))| {
            result.unwrap_or_else(|err| {
                debug!("embed task for '{target}' aborted: {err}");
                embed_block(target, &failure_fragment(target))
            })
        })
        .collect();

    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    for ((start, end, _), fragment) in spans.iter().zip(slots) {
        out.push_str(&html[cursor..*start]);
        out.push_str(&fragment);
        cursor = *end;
    }
    out.push_str(&html[cursor..]);
    out
}

/// Resolve and render one embed target into its replacement block.
fn hydrate_one(root: &Path, raw_target: &str) -> String {
    let resolved = inventory::snapshot(root)
        .map_err(|e| e.to_string())
        .and_then(|inv| resolve::resolve(raw_target, &inv).map_err(|e| e.to_string()));

    let content = match resolved {
        Ok(hit) if hit.existed => {
            if FileKind::from_name(&hit.relative_path).is_image() {
                format!(
                    "<img src=\"/vault/{}\" alt=\"{}\">",
                    encode_path(&hit.relative_path),
                    escape_attr(raw_target)
                )
            } else {
                match VaultStore::open(root).and_then(|store| store.read(&hit.relative_path)) {
                    Ok(text) => {
                        let strategy = PreviewStrategy::for_note(hit.relative_path.clone());
                        MarkdownRenderer::new(&strategy).render(
                            &text,
                            parent_dir(&hit.relative_path),
                            false,
                        )
                    }
                    Err(err) => {
                        debug!("embed read failed for '{raw_target}': {err}");
                        failure_fragment(raw_target)
                    }
                }
            }
        }
        _ => not_found_fragment(raw_target),
    };

    embed_block(raw_target, &content)
}

fn embed_block(raw_target: &str, content: &str) -> String {
    format!(
        "<div class=\"embed-block\" data-embed-target=\"{}\">\
         <div class=\"embed-meta\">Embedded: {}</div>\
         <div class=\"embed-content\">{content}</div></div>",
        escape_attr(raw_target),
        escape_html(raw_target)
    )
}

fn not_found_fragment(target: &str) -> String {
    format!(
        "<div class=\"embed-meta embed-error\">Not found: {}</div>",
        escape_html(target)
    )
}

fn failure_fragment(target: &str) -> String {
    format!(
        "<div class=\"embed-meta embed-error\">Failed to load: {}</div>",
        escape_html(target)
    )
}
