//! Note text utilities: frontmatter handling and note templates.
//!
//! Frontmatter is a leading block delimited by `---` lines. The strip used by
//! rendering and export removes it wholesale; `touch_updated` rewrites just
//! the `updated:` field while leaving the body byte-for-byte intact.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// `{{ key }}` placeholders in note templates.
fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([a-zA-Z0-9_]+)\s*\}\}").expect("static regex"))
}

// =============================================================================
// Frontmatter
// =============================================================================

/// Strip a leading frontmatter block, returning the body that follows.
/// Text without a complete leading block is returned unchanged.
pub fn strip_frontmatter(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("---\n") else {
        return text;
    };
    match rest.find("\n---") {
        Some(idx) => {
            let after = &rest[idx + 4..];
            after.strip_prefix('\n').unwrap_or(after)
        }
        None => text,
    }
}

/// Rewrite (or append) the `updated:` field inside an existing leading
/// frontmatter block. Content without frontmatter is returned untouched.
///
/// Returns the adjusted content and the timestamp written, if any.
pub fn touch_updated(content: &str, now: DateTime<Utc>) -> (String, Option<String>) {
    let Some(rest) = content.strip_prefix("---\n") else {
        return (content.to_string(), None);
    };
    let Some(idx) = rest.find("\n---") else {
        return (content.to_string(), None);
    };
    let block = &rest[..idx];
    let after = &rest[idx + 4..];
    let body = after.strip_prefix('\n').unwrap_or(after);

    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut found = false;
    let mut lines: Vec<String> = block
        .split('\n')
        .map(|line| {
            if line.trim_start().starts_with("updated:") {
                found = true;
                format!("updated: {stamp}")
            } else {
                line.to_string()
            }
        })
        .collect();
    if !found {
        lines.push(format!("updated: {stamp}"));
    }

    let next = format!("---\n{}\n---\n{body}", lines.join("\n"));
    (next, Some(stamp))
}

// =============================================================================
// Note Templates
// =============================================================================

/// Substitution context for note templates. Unknown placeholders resolve to
/// the empty string.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: HashMap<String, String>,
}

impl TemplateContext {
    /// Context stamped with creation/update timestamps.
    pub fn at(now: DateTime<Utc>) -> Self {
        let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut values = HashMap::new();
        values.insert("created".to_string(), stamp.clone());
        values.insert("updated".to_string(), stamp);
        Self { values }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Apply a note template: every `{{ key }}` placeholder is replaced with the
/// context value, or removed when the context has none. Total — any template
/// string yields a result.
pub fn apply_note_template(template: &str, ctx: &TemplateContext) -> String {
    placeholder_re()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            ctx.get(&caps[1]).to_string()
        })
        .into_owned()
}
