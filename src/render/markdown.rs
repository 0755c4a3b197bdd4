//! Markdown renderer core.
//!
//! CommonMark+GFM parsing with three overridden behaviors, all routed through
//! the injected [`RenderStrategy`]:
//!
//! - **link**: wiki-scheme destinations go to the strategy's wiki anchor;
//!   other destinations resolve relative to the base directory, with external
//!   schemes auto-detected and opened in a new context
//! - **image**: resolved relative to the base directory into an asset URL
//! - **code fence**: diagram-tagged fences become strategy containers; other
//!   fences get best-effort highlighting, falling back to escaped text
//!
//! Soft line breaks render hard, matching the editor's line-oriented writing
//! style. A leading frontmatter block is stripped before parsing. Malformed
//! markdown never raises — the worst case is degraded HTML.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::notes::strip_frontmatter;
use crate::render::strategy::anchor_for;
use crate::render::{
    RenderStrategy, decode_wiki_target, escape_attr, highlight_fence, is_external_url, wiki,
};

/// Fence language tag rendered as a diagram instead of highlighted text.
const DIAGRAM_TAG: &str = "mermaid";

pub struct MarkdownRenderer<'s> {
    strategy: &'s dyn RenderStrategy,
}

/// In-flight capture of a construct whose output the strategy controls.
enum Frame<'a> {
    Link {
        dest: String,
        title: String,
        inner: Vec<Event<'a>>,
    },
    Image {
        dest: String,
        title: String,
        alt: String,
    },
    Code {
        lang: Option<String>,
        text: String,
    },
}

impl<'s> MarkdownRenderer<'s> {
    pub fn new(strategy: &'s dyn RenderStrategy) -> Self {
        Self { strategy }
    }

    /// Render raw note text to HTML.
    ///
    /// `base_dir` anchors relative asset references; `allow_embeds` controls
    /// whether embeds become hydration placeholders or degrade to links (the
    /// form used inside already-embedded notes).
    pub fn render(&self, text: &str, base_dir: &str, allow_embeds: bool) -> String {
        let body = strip_frontmatter(text);
        let canonical = wiki::expand(body, allow_embeds);
        self.render_canonical(&canonical, base_dir)
    }

    fn render_canonical(&self, canonical: &str, base_dir: &str) -> String {
        let options =
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(canonical, options);

        let mut out: Vec<Event<'_>> = Vec::new();
        let mut stack: Vec<Frame<'_>> = Vec::new();
        let mut diagram_index = 0usize;

        for event in parser {
            match event {
                Event::Start(Tag::Link {
                    dest_url, title, ..
                }) => stack.push(Frame::Link {
                    dest: dest_url.into_string(),
                    title: title.into_string(),
                    inner: Vec::new(),
                }),
                Event::End(TagEnd::Link) => {
                    if let Some(Frame::Link { dest, title, inner }) = stack.pop() {
                        let markup = self.finish_link(&dest, &title, inner, base_dir);
                        emit(&mut stack, &mut out, Event::Html(CowStr::from(markup)));
                    }
                }

                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => stack.push(Frame::Image {
                    dest: dest_url.into_string(),
                    title: title.into_string(),
                    alt: String::new(),
                }),
                Event::End(TagEnd::Image) => {
                    if let Some(Frame::Image { dest, title, alt }) = stack.pop() {
                        let markup = self.finish_image(&dest, &title, &alt, base_dir);
                        emit(&mut stack, &mut out, Event::Html(CowStr::from(markup)));
                    }
                }

                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .filter(|tag| !tag.is_empty())
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    stack.push(Frame::Code {
                        lang,
                        text: String::new(),
                    });
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(Frame::Code { lang, text }) = stack.pop() {
                        let markup = self.finish_code(lang.as_deref(), &text, &mut diagram_index);
                        emit(&mut stack, &mut out, Event::Html(CowStr::from(markup)));
                    }
                }

                // hard line breaks on every newline, GFM-editor style
                Event::SoftBreak => emit(&mut stack, &mut out, Event::HardBreak),

                other => emit(&mut stack, &mut out, other),
            }
        }

        let mut rendered = String::with_capacity(canonical.len() * 2);
        html::push_html(&mut rendered, out.into_iter());
        rendered
    }

    fn finish_link(
        &self,
        dest: &str,
        title: &str,
        inner: Vec<Event<'_>>,
        base_dir: &str,
    ) -> String {
        let label_html = render_fragment(inner);
        let title = (!title.is_empty()).then_some(title);

        if let Some(target) = decode_wiki_target(dest) {
            return self.strategy.wiki_link(&target, &label_html, title);
        }
        let url = if is_external_url(dest) {
            dest.to_string()
        } else {
            self.strategy.asset_url(dest, base_dir)
        };
        anchor_for(&url, &label_html, title)
    }

    fn finish_image(&self, dest: &str, title: &str, alt: &str, base_dir: &str) -> String {
        let url = if is_external_url(dest) {
            dest.to_string()
        } else {
            self.strategy.asset_url(dest, base_dir)
        };
        let title_attr = (!title.is_empty())
            .then(|| format!(" title=\"{}\"", escape_attr(title)))
            .unwrap_or_default();
        format!(
            "<img src=\"{}\" alt=\"{}\"{title_attr}>",
            escape_attr(&url),
            escape_attr(alt)
        )
    }

    fn finish_code(&self, lang: Option<&str>, text: &str, diagram_index: &mut usize) -> String {
        if lang.is_some_and(|l| l.eq_ignore_ascii_case(DIAGRAM_TAG)) {
            let index = *diagram_index;
            *diagram_index += 1;
            return self.strategy.diagram_block(text.trim_end_matches('\n'), index);
        }
        let highlighted = highlight_fence(text, lang);
        let lang_class = lang
            .map(|l| format!(" language-{}", escape_attr(l)))
            .unwrap_or_default();
        format!("<pre><code class=\"hljs{lang_class}\">{highlighted}</code></pre>")
    }
}

/// Route an event into the innermost open capture, or the output stream.
fn emit<'a>(stack: &mut [Frame<'a>], out: &mut Vec<Event<'a>>, event: Event<'a>) {
    match stack.last_mut() {
        Some(Frame::Link { inner, .. }) => inner.push(event),
        Some(Frame::Image { alt, .. }) => match event {
            Event::Text(t) | Event::Code(t) => alt.push_str(&t),
            Event::HardBreak => alt.push(' '),
            _ => {}
        },
        Some(Frame::Code { text, .. }) => {
            if let Event::Text(t) = event {
                text.push_str(&t);
            }
        }
        None => out.push(event),
    }
}

fn render_fragment(events: Vec<Event<'_>>) -> String {
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PreviewStrategy;

    fn preview(text: &str) -> String {
        let strategy = PreviewStrategy::default();
        MarkdownRenderer::new(&strategy).render(text, "Daily", true)
    }

    #[test]
    fn test_basic_markdown() {
        let html = preview("# Title\n\nsome *emphasis*");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn test_frontmatter_stripped_before_parse() {
        let html = preview("---\ncreated: now\n---\n# Real heading");
        assert!(html.contains("<h1>Real heading</h1>"));
        assert!(!html.contains("created:"));
    }

    #[test]
    fn test_wiki_link_goes_through_strategy() {
        let html = preview("see [[Projects/Roadmap|the plan]]");
        assert!(html.contains("data-wiki=\"Projects/Roadmap\""));
        assert!(html.contains(">the plan</a>"));
    }

    #[test]
    fn test_relative_link_resolves_against_base_dir() {
        let html = preview("[att](files/a.pdf)");
        assert!(html.contains("href=\"/vault/Daily/files/a.pdf\""));
    }

    #[test]
    fn test_external_link_opens_new_context() {
        let html = preview("[site](https://example.com)");
        assert!(html.contains("href=\"https://example.com\""));
        assert!(html.contains("target=\"_blank\""));
    }

    #[test]
    fn test_image_resolves_against_base_dir() {
        let html = preview("![alt text](pic.png)");
        assert!(html.contains("<img src=\"/vault/Daily/pic.png\" alt=\"alt text\">"));
    }

    #[test]
    fn test_diagram_fence_becomes_container() {
        let html = preview("```mermaid\ngraph TD\nA-->B\n```");
        assert!(html.contains("class=\"diagram-block\""));
        assert!(html.contains("graph TD"));
        assert!(!html.contains("<pre>"));
    }

    #[test]
    fn test_diagram_indices_count_up() {
        let html = preview("```mermaid\ngraph TD\n```\n\n```mermaid\npie\n```");
        assert!(html.contains("data-diagram-index=\"0\""));
        assert!(html.contains("data-diagram-index=\"1\""));
    }

    #[test]
    fn test_plain_fence_highlighted_with_language_class() {
        let html = preview("```rust\nlet x = 1;\n```");
        assert!(html.contains("<pre><code class=\"hljs language-rust\">"));
    }

    #[test]
    fn test_unknown_fence_language_escapes() {
        let html = preview("```nosuchlang\na < b\n```");
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn test_soft_breaks_render_hard() {
        let html = preview("line one\nline two");
        assert!(html.contains("<br"));
    }

    #[test]
    fn test_gfm_table() {
        let html = preview("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_embed_placeholder_survives_parsing() {
        let html = preview("![[assets/chart.png]]");
        assert!(html.contains("data-embed-target=\"assets/chart.png\""));
    }

    #[test]
    fn test_malformed_markdown_degrades() {
        // unclosed constructs must yield *some* HTML, not an error
        let html = preview("[unclosed [[weird ``` \n> *");
        assert!(!html.is_empty());
    }
}
