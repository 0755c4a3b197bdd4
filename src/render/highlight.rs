//! Best-effort fence highlighting.
//!
//! An explicit language tag is honored when the syntax set knows it;
//! untagged fences go through first-line heuristic detection restricted to a
//! fixed language set. Anything else — unknown tags, detection misses,
//! highlighting failures — falls back to escaped plain text. This path never
//! returns an error.

use std::collections::HashSet;
use std::sync::OnceLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::debug;

use crate::constants::highlight::AUTO_DETECT_LANGUAGES;
use crate::render::escape_html;

fn syntax_set() -> &'static SyntaxSet {
    static SET: OnceLock<SyntaxSet> = OnceLock::new();
    SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Syntax names reachable from the fixed auto-detect language list.
fn auto_detect_names() -> &'static HashSet<String> {
    static NAMES: OnceLock<HashSet<String>> = OnceLock::new();
    NAMES.get_or_init(|| {
        let ss = syntax_set();
        AUTO_DETECT_LANGUAGES
            .iter()
            .filter_map(|token| ss.find_syntax_by_token(token))
            .map(|syntax| syntax.name.clone())
            .collect()
    })
}

/// Highlight fenced code into inner HTML (`<span>`-classed, hljs-compatible
/// container classes are the renderer's concern).
pub fn highlight_fence(code: &str, lang: Option<&str>) -> String {
    let ss = syntax_set();

    let syntax = match lang.map(str::trim).filter(|l| !l.is_empty()) {
        Some(tag) => ss.find_syntax_by_token(tag),
        None => ss
            .find_syntax_by_first_line(code)
            .filter(|s| auto_detect_names().contains(&s.name)),
    };

    match syntax {
        Some(syntax) => classed_html(ss, syntax, code).unwrap_or_else(|err| {
            debug!("highlighting failed, falling back to plain text: {err}");
            escape_html(code)
        }),
        None => escape_html(code),
    }
}

fn classed_html(
    ss: &SyntaxSet,
    syntax: &SyntaxReference,
    code: &str,
) -> std::result::Result<String, syntect::Error> {
    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, ss, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_language_highlights() {
        let out = highlight_fence("let x = 1;\n", Some("rust"));
        assert!(out.contains("<span"));
    }

    #[test]
    fn test_unknown_language_escapes() {
        let out = highlight_fence("<tag> & text\n", Some("nosuchlang"));
        assert_eq!(out, "&lt;tag&gt; &amp; text\n");
        assert!(!out.contains("<span"));
    }

    #[test]
    fn test_heuristic_detects_shebang() {
        let out = highlight_fence("#!/bin/bash\necho hi\n", None);
        assert!(out.contains("<span"));
    }

    #[test]
    fn test_untagged_prose_stays_plain() {
        let out = highlight_fence("just some plain prose\n", None);
        assert_eq!(out, "just some plain prose\n");
    }

    #[test]
    fn test_never_panics_on_weird_input() {
        let _ = highlight_fence("", Some("rust"));
        let _ = highlight_fence("\u{0000}\u{fffd}", None);
        let _ = highlight_fence("no trailing newline", Some("json"));
    }
}
