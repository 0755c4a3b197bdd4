//! Export document preparation.
//!
//! Builds the self-contained HTML document both static formats start from:
//! frontmatter stripped, every wiki reference resolved synchronously against
//! one inventory snapshot (no client round-trips), local images inlined as
//! data URIs, and the result wrapped in a themed shell. Note embeds become
//! plain hyperlinks rather than recursively inlined content.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use std::sync::OnceLock;

use tracing::warn;

use crate::config::Settings;
use crate::export::theme::Palette;
use crate::notes::strip_frontmatter;
use crate::render::{
    ExportStrategy, MarkdownRenderer, encode_wiki_target, escape_html, unescape_attr,
};
use crate::resolve;
use crate::types::{FileKind, Result, VaultFile, WikiReference, parent_dir, stem};
use crate::vault::{VaultStore, inventory};

/// Prepared export document, ready for conversion.
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub html: String,
    pub title: String,
    /// Number of diagram mounts in the document. Zero means the diagram
    /// engine is never involved in converting it.
    pub diagram_count: usize,
    pub theme_is_dark: bool,
}

fn wiki_syntax_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(!)?\[\[([^\]]+)\]\]").expect("static regex"))
}

fn img_src_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("<img src=\"([^\"]+)\"").expect("static regex"))
}

fn diagram_mount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("(?s)<div class=\"mermaid\">.*?</div>").expect("static regex"))
}

/// Build the themed, self-contained HTML document for a note.
pub fn build_document(store: &VaultStore, settings: &Settings, rel: &str) -> Result<ExportDocument> {
    let raw = store.read(rel)?;
    let body = strip_frontmatter(&raw);

    let snapshot = inventory::snapshot(store.root())?;
    let expanded = expand_for_export(body, &snapshot);

    let strategy = ExportStrategy::new(snapshot);
    let rendered = MarkdownRenderer::new(&strategy).render(&expanded, parent_dir(rel), false);
    let inlined = inline_images(&rendered, store);
    let diagram_count = diagram_mount_re().find_iter(&inlined).count();

    let palette = Palette::for_theme(&settings.theme);
    let title = stem(rel).to_string();
    let html = document_shell(&title, &inlined, palette);

    Ok(ExportDocument {
        html,
        title,
        diagram_count,
        theme_is_dark: palette.is_dark,
    })
}

/// Resolve every wiki reference up front: image embeds become inline image
/// references for the data-URI pass, note embeds and links become markdown
/// links under the private scheme for the export resolver.
fn expand_for_export(text: &str, snapshot: &[VaultFile]) -> String {
    wiki_syntax_re()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let is_embed = caps.get(1).is_some();
            let reference = WikiReference::parse(&caps[2], is_embed);
            if is_embed
                && let Ok(hit) = resolve::resolve(&reference.raw_target, snapshot)
                && FileKind::from_name(&hit.relative_path).is_image()
            {
                return format!("![{}]({})", reference.display(), hit.relative_path);
            }
            format!(
                "[{}]({})",
                reference.display(),
                encode_wiki_target(&reference.raw_target)
            )
        })
        .into_owned()
}

/// Inline every local `<img>` as a base64 data URI by direct byte read.
/// Unreadable images keep their original reference rather than failing the
/// export.
fn inline_images(html: &str, store: &VaultStore) -> String {
    img_src_re()
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let src = &caps[1];
            if src.starts_with("data:") || src.contains("://") {
                return caps[0].to_string();
            }
            let rel = percent_encoding::percent_decode_str(&unescape_attr(src))
                .decode_utf8_lossy()
                .into_owned();
            let Some(mime) = image_mime(&rel) else {
                return caps[0].to_string();
            };
            match store.read_bytes(&rel) {
                Ok(bytes) => {
                    format!("<img src=\"data:{mime};base64,{}\"", BASE64.encode(bytes))
                }
                Err(err) => {
                    warn!("leaving image reference '{rel}' un-inlined: {err}");
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

fn image_mime(rel: &str) -> Option<&'static str> {
    let lower = rel.to_lowercase();
    let ext = lower.rsplit('.').next()?;
    match ext {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Wrap rendered note HTML in a themed standalone document.
fn document_shell(title: &str, body: &str, palette: &Palette) -> String {
    let Palette {
        background,
        foreground,
        accent,
        border,
        code_background,
        ..
    } = palette;
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
@page {{ size: A4; }}
body {{
  margin: 0;
  background: {background};
  color: {foreground};
  font-family: -apple-system, "Segoe UI", Roboto, "Helvetica Neue", sans-serif;
  line-height: 1.6;
}}
main.note {{ max-width: 52rem; margin: 0 auto; padding: 2rem; }}
a {{ color: {accent}; }}
h1, h2, h3 {{ border-bottom: 1px solid {border}; padding-bottom: .2em; }}
blockquote {{ border-left: 3px solid {border}; margin-left: 0; padding-left: 1em; opacity: .85; }}
pre {{ background: {code_background}; border: 1px solid {border}; border-radius: 6px; padding: .8em; overflow-x: auto; }}
code {{ background: {code_background}; border-radius: 3px; padding: .1em .3em; }}
pre code {{ background: none; padding: 0; }}
table {{ border-collapse: collapse; }}
th, td {{ border: 1px solid {border}; padding: .3em .6em; }}
img {{ max-width: 100%; }}
.mermaid {{ text-align: center; }}
.mermaid svg {{ max-width: 100%; }}
</style>
</head>
<body>
<main class="note">
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// Extract diagram fence bodies in document order.
///
/// Returns `(1-based start line, source)` pairs, including an unterminated
/// trailing fence.
pub fn extract_diagram_sources(text: &str) -> Vec<(usize, String)> {
    let mut diagrams = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        match &mut current {
            None => {
                let tag = trimmed
                    .strip_prefix("```")
                    .map(|info| info.split_whitespace().next().unwrap_or(""));
                if tag.is_some_and(|t| t.eq_ignore_ascii_case("mermaid")) {
                    current = Some((idx + 1, String::new()));
                }
            }
            Some((start, source)) => {
                if trimmed == "```" {
                    let (start, mut source) = (*start, std::mem::take(source));
                    if source.ends_with('\n') {
                        source.pop();
                    }
                    diagrams.push((start, source));
                    current = None;
                } else {
                    source.push_str(line);
                    source.push('\n');
                }
            }
        }
    }

    if let Some((start, mut source)) = current {
        if source.ends_with('\n') {
            source.pop();
        }
        diagrams.push((start, source));
    }

    diagrams
}
