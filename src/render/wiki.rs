//! Wiki link/embed expansion.
//!
//! Rewrites `[[target|label]]` and `![[target]]` syntax into canonical markup
//! a standard markdown parser can consume. Pure and I/O-free: targets are
//! carried through verbatim (under the private scheme or a placeholder
//! attribute) and resolved later by whoever renders the result.

use regex::Regex;
use std::sync::OnceLock;

use crate::render::{encode_wiki_target, escape_attr, escape_html};
use crate::types::WikiReference;

/// Matches `[[...]]` and `![[...]]` in one scan; group 1 is the optional
/// embed bang, group 2 the bracket interior.
fn wiki_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(!)?\[\[([^\]]+)\]\]").expect("static regex"))
}

/// Expand wiki syntax in a single order-preserving pass.
///
/// Links always become `[label](vault-wiki://target)`. Embeds become tagged
/// placeholder blocks when `allow_embeds` is set (content substitution is
/// deferred to hydration), else plain links — the form used inside embedded
/// notes so nesting cannot recurse.
pub fn expand(text: &str, allow_embeds: bool) -> String {
    wiki_re()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let is_embed = caps.get(1).is_some();
            let reference = WikiReference::parse(&caps[2], is_embed);
            if is_embed && allow_embeds {
                embed_placeholder(&reference)
            } else {
                wiki_link(&reference)
            }
        })
        .into_owned()
}

fn embed_placeholder(reference: &WikiReference) -> String {
    let attr = escape_attr(&reference.raw_target);
    let label = escape_html(&reference.raw_target);
    format!(
        "<div class=\"embed-block\" data-embed-target=\"{attr}\">\
         <div class=\"embed-meta\">Embedded: {label}</div>\
         <div class=\"embed-content\">Loading...</div></div>"
    )
}

fn wiki_link(reference: &WikiReference) -> String {
    format!(
        "[{}]({})",
        reference.display(),
        encode_wiki_target(&reference.raw_target)
    )
}
