//! Deterministic, idempotent text normalization.
//!
//! Rules run in a fixed order (later rules rely on earlier normalization)
//! regardless of the order callers list them in:
//!
//! 1. collapse runs of blank lines to one
//! 2. strip trailing whitespace per line
//! 3. delete a lone blank line strictly between two list items
//! 4. demote headings that skip levels
//!
//! Every rule is pure and I/O-free, and the pass as a whole is idempotent:
//! linting already-linted text changes nothing and reports no issues.

use regex::Regex;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// One applied correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintIssue {
    /// 1-based line number in the text as it stood when the rule fired.
    pub line: usize,
    pub rule: LintRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LintRule {
    CollapseBlankRuns,
    TrimTrailing,
    NoBlankInList,
    HeadingLevels,
}

impl LintRule {
    /// Canonical application order.
    pub const ORDERED: [LintRule; 4] = [
        LintRule::CollapseBlankRuns,
        LintRule::TrimTrailing,
        LintRule::NoBlankInList,
        LintRule::HeadingLevels,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::CollapseBlankRuns => "max-blank-lines",
            Self::TrimTrailing => "trim-trailing",
            Self::NoBlankInList => "no-blank-list",
            Self::HeadingLevels => "heading-levels",
        }
    }
}

/// Corrected text plus the corrections applied to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOutcome {
    pub text: String,
    pub issues: Vec<LintIssue>,
}

fn list_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+").expect("static regex"))
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+").expect("static regex"))
}

fn is_list_item(line: &str) -> bool {
    list_item_re().is_match(line)
}

/// Apply the enabled rules to `text`.
pub fn lint(text: &str, enabled: &[LintRule]) -> LintOutcome {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let mut issues = Vec::new();

    for rule in LintRule::ORDERED {
        if !enabled.contains(&rule) {
            continue;
        }
        match rule {
            LintRule::CollapseBlankRuns => collapse_blank_runs(&mut lines, &mut issues),
            LintRule::TrimTrailing => trim_trailing(&mut lines, &mut issues),
            LintRule::NoBlankInList => no_blank_in_list(&mut lines, &mut issues),
            LintRule::HeadingLevels => heading_levels(&mut lines, &mut issues),
        }
    }

    LintOutcome {
        text: lines.join("\n"),
        issues,
    }
}

/// Reduce every run of two or more blank lines to a single blank line.
/// One issue per removed line.
fn collapse_blank_runs(lines: &mut Vec<String>, issues: &mut Vec<LintIssue>) {
    let mut out = Vec::with_capacity(lines.len());
    let mut blank_run = 0usize;
    for line in lines.drain(..) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                issues.push(LintIssue {
                    line: out.len() + 1,
                    rule: LintRule::CollapseBlankRuns,
                });
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push(line);
    }
    *lines = out;
}

/// Strip trailing whitespace; one issue per changed line.
fn trim_trailing(lines: &mut [String], issues: &mut Vec<LintIssue>) {
    for (idx, line) in lines.iter_mut().enumerate() {
        let trimmed = line.trim_end();
        if trimmed.len() != line.len() {
            *line = trimmed.to_string();
            issues.push(LintIssue {
                line: idx + 1,
                rule: LintRule::TrimTrailing,
            });
        }
    }
}

/// Delete a lone blank line strictly between two list-item lines.
fn no_blank_in_list(lines: &mut Vec<String>, issues: &mut Vec<LintIssue>) {
    let snapshot = std::mem::take(lines);
    let mut out: Vec<String> = Vec::with_capacity(snapshot.len());
    for (idx, line) in snapshot.iter().enumerate() {
        let prev_is_item = out.last().is_some_and(|p| is_list_item(p));
        let next_is_item = snapshot.get(idx + 1).is_some_and(|n| is_list_item(n));
        if line.trim().is_empty() && prev_is_item && next_is_item {
            issues.push(LintIssue {
                line: out.len() + 1,
                rule: LintRule::NoBlankInList,
            });
            continue;
        }
        out.push(line.clone());
    }
    *lines = out;
}

/// Demote headings that jump more than one level past the previous heading.
/// The effective level tracks already-applied demotions so a deep run settles
/// one level at a time instead of drifting.
fn heading_levels(lines: &mut [String], issues: &mut Vec<LintIssue>) {
    let mut last_level = 0usize;
    for (idx, line) in lines.iter_mut().enumerate() {
        let Some(caps) = heading_re().captures(line) else {
            continue;
        };
        let level = caps[1].len();
        if last_level > 0 && level > last_level + 1 {
            let next_level = last_level + 1;
            let rest = line[caps[0].len()..].to_string();
            *line = format!("{} {rest}", "#".repeat(next_level));
            issues.push(LintIssue {
                line: idx + 1,
                rule: LintRule::HeadingLevels,
            });
            last_level = next_level;
        } else {
            last_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lint_all(text: &str) -> LintOutcome {
        lint(text, &LintRule::ORDERED)
    }

    #[test]
    fn test_collapse_blank_runs() {
        let out = lint_all("a\n\n\n\nb");
        assert_eq!(out.text, "a\n\nb");
        assert_eq!(out.issues.len(), 2);
        assert!(out
            .issues
            .iter()
            .all(|i| i.rule == LintRule::CollapseBlankRuns));
    }

    #[test]
    fn test_whitespace_only_lines_count_as_blank() {
        let out = lint_all("a\n\n   \nb");
        assert_eq!(out.text, "a\n\nb");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        let out = lint("code  \nclean\nmore\t", &[LintRule::TrimTrailing]);
        assert_eq!(out.text, "code\nclean\nmore");
        let lines: Vec<usize> = out.issues.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn test_blank_inside_list_removed() {
        let out = lint("- one\n\n- two", &[LintRule::NoBlankInList]);
        assert_eq!(out.text, "- one\n- two");
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].line, 2);
    }

    #[test]
    fn test_double_blank_in_list_untouched_without_collapse() {
        // two consecutive blanks are not a *lone* blank; only the collapse
        // rule may reduce them first
        let out = lint("- one\n\n\n- two", &[LintRule::NoBlankInList]);
        assert_eq!(out.text, "- one\n\n\n- two");
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_full_pass_clears_list_gap() {
        let out = lint_all("- one\n\n\n- two");
        assert_eq!(out.text, "- one\n- two");
    }

    #[test]
    fn test_ordered_list_markers_recognized() {
        let out = lint("1. one\n\n2) two", &[LintRule::NoBlankInList]);
        assert_eq!(out.text, "1. one\n2) two");
    }

    #[test]
    fn test_blank_between_list_and_prose_kept() {
        let out = lint("- item\n\nprose", &[LintRule::NoBlankInList]);
        assert_eq!(out.text, "- item\n\nprose");
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_heading_demotion() {
        let out = lint("# A\n### B", &[LintRule::HeadingLevels]);
        assert_eq!(out.text, "# A\n## B");
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].line, 2);
    }

    #[test]
    fn test_heading_effective_level_prevents_drift() {
        // B demotes to ##; C at ### is then a legal +1 step from B
        let out = lint("# A\n#### B\n### C", &[LintRule::HeadingLevels]);
        assert_eq!(out.text, "# A\n## B\n### C");
        assert_eq!(out.issues.len(), 1);
    }

    #[test]
    fn test_first_heading_never_demoted() {
        let out = lint("### deep start\ntext", &[LintRule::HeadingLevels]);
        assert_eq!(out.text, "### deep start\ntext");
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_disabled_rules_do_nothing() {
        let messy = "a  \n\n\n\nb";
        let out = lint(messy, &[]);
        assert_eq!(out.text, messy);
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_rule_ids() {
        assert_eq!(LintRule::CollapseBlankRuns.id(), "max-blank-lines");
        assert_eq!(LintRule::TrimTrailing.id(), "trim-trailing");
        assert_eq!(LintRule::NoBlankInList.id(), "no-blank-list");
        assert_eq!(LintRule::HeadingLevels.id(), "heading-levels");
    }

    proptest! {
        #[test]
        fn prop_lint_is_idempotent(text in "[ -~\n\t]{0,400}") {
            let once = lint_all(&text);
            let twice = lint_all(&once.text);
            prop_assert_eq!(&twice.text, &once.text);
            prop_assert!(twice.issues.is_empty());
        }

        #[test]
        fn prop_single_rules_are_idempotent(
            text in "[ -~\n]{0,300}",
            rule_idx in 0usize..4,
        ) {
            let rule = LintRule::ORDERED[rule_idx];
            let once = lint(&text, &[rule]);
            let twice = lint(&once.text, &[rule]);
            prop_assert_eq!(&twice.text, &once.text);
            prop_assert!(twice.issues.is_empty());
        }
    }
}
