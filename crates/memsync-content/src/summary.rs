//! Diff summarization
//!
//! Condenses a pair of whole-file snapshots into a short description of what
//! changed: which sections appeared or disappeared, which added lines read
//! like decisions, fixes, or completions, and one representative added line.
//!
//! The output is a pure function of the two inputs.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use similar::{ChangeTag, TextDiff};

use crate::markdown::extract_headings;
use crate::text::truncate_chars;

/// Lines of unchanged context around each hunk
const CONTEXT_RADIUS: usize = 2;

/// Named sections listed in the "Added sections" clause
const MAX_ADDED_SECTIONS: usize = 3;

/// Named sections listed in the "Removed sections" clause
const MAX_REMOVED_SECTIONS: usize = 2;

/// Keyword categories reported in the summary
const MAX_FINDING_CLAUSES: usize = 2;

/// Matched lines retained per keyword category
const MAX_LINES_PER_CATEGORY: usize = 2;

/// Added lines this short or shorter never count as keyword matches
const MIN_KEYWORD_LINE: usize = 10;

/// Keyword lines longer than this are cut to `FINDING_CUT` plus "..."
const MAX_FINDING_LINE: usize = 80;
const FINDING_CUT: usize = 77;

/// Context candidates must be longer than this
const MIN_CONTEXT_LINE: usize = 15;
const MAX_CONTEXT_LINE: usize = 120;

/// Informational clauses kept in the rendered summary
const MAX_CLAUSES: usize = 3;

/// A family of action words searched for in added lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    Decisions,
    NewItems,
    Updates,
    Fixes,
    Configuration,
    Completions,
}

impl KeywordCategory {
    /// All categories in reporting priority order
    pub const ALL: [KeywordCategory; 6] = [
        KeywordCategory::Decisions,
        KeywordCategory::NewItems,
        KeywordCategory::Updates,
        KeywordCategory::Fixes,
        KeywordCategory::Configuration,
        KeywordCategory::Completions,
    ];

    /// Label used in the rendered clause
    pub fn label(self) -> &'static str {
        match self {
            Self::Decisions => "decisions",
            Self::NewItems => "new items",
            Self::Updates => "updates",
            Self::Fixes => "fixes",
            Self::Configuration => "configuration",
            Self::Completions => "completions",
        }
    }

    fn pattern(self) -> &'static Regex {
        static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
            [
                r"(?i)\b(decided|decision)\b",
                r"(?i)\b(created|added|implemented|built)\b",
                r"(?i)\b(updated|changed|modified)\b",
                r"(?i)\b(fixed|resolved|solved)\b",
                r"(?i)\b(configured|setup|installed)\b",
                r"(?i)\b(completed|finished|done)\b",
            ]
            .iter()
            .map(|p| Regex::new(p).unwrap())
            .collect()
        });

        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        &PATTERNS[idx]
    }

    /// Whether `line` qualifies as a match for this category.
    pub fn matches(self, line: &str) -> bool {
        line.chars().count() > MIN_KEYWORD_LINE && self.pattern().is_match(line)
    }
}

impl fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Added lines matching one keyword category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFinding {
    pub category: KeywordCategory,
    /// Up to two matching lines, verbatim
    pub lines: Vec<String>,
}

impl KeywordFinding {
    /// `<label>: <first line>`, trimmed, trailing periods removed, capped at 80 chars.
    pub fn clause(&self) -> Option<String> {
        let line = self.lines.first()?;
        let clean = line.trim().trim_end_matches('.');
        let clean = if clean.chars().count() > MAX_FINDING_LINE {
            format!("{}...", truncate_chars(clean, FINDING_CUT))
        } else {
            clean.to_string()
        };
        Some(format!("{}: {}", self.category.label(), clean))
    }
}

/// What changed between two snapshots of a markdown file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffSummary {
    /// Headings present in the new text only, in new-text order
    pub added_sections: Vec<String>,
    /// Headings present in the old text only, in old-text order
    pub removed_sections: Vec<String>,
    /// Keyword categories that matched at least one added line
    pub findings: Vec<KeywordFinding>,
    pub added_lines: usize,
    pub removed_lines: usize,
    /// First substantial non-heading added line
    pub context: Option<String>,
}

impl DiffSummary {
    /// Informational clauses in priority order, before the 3-clause cap.
    pub fn clauses(&self) -> Vec<String> {
        let mut clauses = Vec::new();

        if !self.added_sections.is_empty() {
            let mut listed = quote_list(&self.added_sections, MAX_ADDED_SECTIONS);
            if self.added_sections.len() > MAX_ADDED_SECTIONS {
                listed.push_str(&format!(
                    " and {} more",
                    self.added_sections.len() - MAX_ADDED_SECTIONS
                ));
            }
            clauses.push(format!("Added sections: {}", listed));
        }

        if !self.removed_sections.is_empty() {
            clauses.push(format!(
                "Removed sections: {}",
                quote_list(&self.removed_sections, MAX_REMOVED_SECTIONS)
            ));
        }

        clauses.extend(
            self.findings
                .iter()
                .take(MAX_FINDING_CLAUSES)
                .filter_map(KeywordFinding::clause),
        );

        if clauses.is_empty() {
            if self.added_lines > 0 {
                clauses.push(format!("Added {} lines", self.added_lines));
            }
            if self.removed_lines > 0 {
                clauses.push(format!("Removed {} lines", self.removed_lines));
            }
        }

        clauses
    }

    /// Render the summary for `file_name`.
    ///
    /// `File updated: <name> — <clause>; <clause>; <clause>` followed by a
    /// `Context:` line when one was found.
    pub fn render(&self, file_name: &str) -> String {
        let mut out = format!("File updated: {}", file_name);

        let clauses = self.clauses();
        if !clauses.is_empty() {
            let kept: Vec<&str> = clauses.iter().take(MAX_CLAUSES).map(String::as_str).collect();
            out.push_str(" — ");
            out.push_str(&kept.join("; "));
        }

        if let Some(context) = &self.context {
            out.push_str("\nContext: ");
            out.push_str(context);
        }

        out
    }
}

fn quote_list(items: &[String], max: usize) -> String {
    items
        .iter()
        .take(max)
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Summarize the change from `old` to `new`.
///
/// Returns `None` when the line diff is empty, including when both inputs
/// are equal.
pub fn summarize(old: &str, new: &str) -> Option<DiffSummary> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let diff = TextDiff::configure().diff_slices(&old_lines, &new_lines);
    let mut unified = diff.unified_diff();
    unified.context_radius(CONTEXT_RADIUS);

    let mut added: Vec<String> = Vec::new();
    let mut removed: Vec<String> = Vec::new();
    let mut hunks = 0usize;

    for hunk in unified.iter_hunks() {
        hunks += 1;
        for change in hunk.iter_changes() {
            match change.tag() {
                ChangeTag::Insert => added.push(change.value().to_string()),
                ChangeTag::Delete => removed.push(change.value().to_string()),
                ChangeTag::Equal => {}
            }
        }
    }

    if hunks == 0 {
        return None;
    }

    let old_headings = extract_headings(old);
    let new_headings = extract_headings(new);
    let old_set: HashSet<&str> = old_headings.iter().map(String::as_str).collect();
    let new_set: HashSet<&str> = new_headings.iter().map(String::as_str).collect();

    let added_sections = new_headings
        .iter()
        .filter(|h| !old_set.contains(h.as_str()))
        .cloned()
        .collect();
    let removed_sections = old_headings
        .iter()
        .filter(|h| !new_set.contains(h.as_str()))
        .cloned()
        .collect();

    let findings = KeywordCategory::ALL
        .iter()
        .filter_map(|&category| {
            let lines: Vec<String> = added
                .iter()
                .filter(|line| category.matches(line))
                .take(MAX_LINES_PER_CATEGORY)
                .cloned()
                .collect();
            (!lines.is_empty()).then_some(KeywordFinding { category, lines })
        })
        .collect();

    let context = added.iter().find_map(|line| {
        let stripped = line.trim();
        if stripped.is_empty()
            || stripped.starts_with('#')
            || stripped.chars().count() <= MIN_CONTEXT_LINE
        {
            return None;
        }
        let mut context = truncate_chars(stripped, MAX_CONTEXT_LINE).to_string();
        if stripped.chars().count() > MAX_CONTEXT_LINE {
            context.push_str("...");
        }
        Some(context)
    });

    Some(DiffSummary {
        added_sections,
        removed_sections,
        findings,
        added_lines: added.len(),
        removed_lines: removed.len(),
        context,
    })
}

/// Summary text for a change to `file_name`, falling back to a generic
/// "minor changes" message when the diff is empty.
pub fn summarize_change(old: &str, new: &str, file_name: &str) -> String {
    match summarize(old, new) {
        Some(summary) => summary.render(file_name),
        None => format!("File updated: {} (minor changes)", file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn equal_inputs_have_no_summary() {
        assert_eq!(summarize("# A\nbody\n", "# A\nbody\n"), None);
        assert_eq!(summarize("", ""), None);
    }

    #[test]
    fn trailing_newline_only_is_not_a_change() {
        assert_eq!(summarize("line one", "line one\n"), None);
    }

    #[test]
    fn setup_section_example() {
        let summary = summarize("# Title\nfoo", "# Title\n## Setup\nbar baz qux quux").unwrap();

        assert_eq!(summary.added_sections, vec!["Setup"]);
        assert!(summary.removed_sections.is_empty());
        assert!(summary.findings.is_empty());
        assert_eq!(summary.context.as_deref(), Some("bar baz qux quux"));

        let rendered = summary.render("MEMORY.md");
        assert_eq!(
            rendered,
            "File updated: MEMORY.md — Added sections: \"Setup\"\nContext: bar baz qux quux"
        );
    }

    #[test]
    fn added_sections_capped_with_more_suffix() {
        let new = "# A\n# B\n# C\n# D\n# E\n";
        let summary = summarize("", new).unwrap();
        assert_eq!(
            summary.clauses()[0],
            "Added sections: \"A\", \"B\", \"C\" and 2 more"
        );
    }

    #[test]
    fn removed_sections_capped_at_two() {
        let old = "# A\n# B\n# C\n";
        let summary = summarize(old, "plain\n").unwrap();
        assert_eq!(summary.removed_sections, vec!["A", "B", "C"]);
        assert_eq!(summary.clauses()[0], "Removed sections: \"A\", \"B\"");
    }

    #[test]
    fn keyword_findings_in_category_order() {
        let old = "# Log\n";
        let new = "# Log\nFixed the broken cron trigger.\nWe decided to keep SQLite.\nok done\n";
        let summary = summarize(old, new).unwrap();

        let categories: Vec<KeywordCategory> =
            summary.findings.iter().map(|f| f.category).collect();
        assert_eq!(
            categories,
            vec![KeywordCategory::Decisions, KeywordCategory::Fixes]
        );
        assert_eq!(
            summary.clauses(),
            vec![
                "decisions: We decided to keep SQLite".to_string(),
                "fixes: Fixed the broken cron trigger".to_string(),
            ]
        );
    }

    #[test]
    fn keyword_requires_word_boundary() {
        assert!(!KeywordCategory::Completions.matches("the condoned abandonment"));
        assert!(KeywordCategory::Completions.matches("Migration is DONE now"));
    }

    #[test]
    fn short_lines_never_match_keywords() {
        assert!(!KeywordCategory::Fixes.matches("fixed it"));
    }

    #[test]
    fn long_keyword_line_is_truncated() {
        let line = format!("Implemented {}", "x".repeat(100));
        let summary = summarize("", &line).unwrap();
        let clause = &summary.clauses()[0];
        assert!(clause.starts_with("new items: Implemented "));
        assert!(clause.ends_with("..."));
        assert_eq!(clause.chars().count(), "new items: ".len() + 80);
    }

    #[test]
    fn falls_back_to_line_counts() {
        let summary = summarize("alpha\nbeta\n", "alpha\ngamma\ndelta\n").unwrap();
        assert_eq!(
            summary.clauses(),
            vec!["Added 2 lines".to_string(), "Removed 1 lines".to_string()]
        );
    }

    #[test]
    fn context_skips_headings_and_short_lines() {
        let new = "## Heading that is long enough\nshort\nThis line is the real context.\n";
        let summary = summarize("", new).unwrap();
        assert_eq!(
            summary.context.as_deref(),
            Some("This line is the real context.")
        );
    }

    #[test]
    fn context_truncated_at_120_chars() {
        let long = "y".repeat(150);
        let summary = summarize("", &long).unwrap();
        let context = summary.context.unwrap();
        assert_eq!(context.chars().count(), 123);
        assert!(context.ends_with("..."));
    }

    #[test]
    fn render_keeps_three_clauses() {
        let old = "# Gone\n";
        let new = "# New\nWe decided on Rust for this.\nResolved the flaky test today.\n";
        let rendered = summarize(old, new).unwrap().render("USER.md");
        let head = rendered.lines().next().unwrap();
        assert_eq!(
            head,
            "File updated: USER.md — Added sections: \"New\"; Removed sections: \"Gone\"; decisions: We decided on Rust for this"
        );
    }

    #[test]
    fn summarize_change_falls_back_to_minor_changes() {
        assert_eq!(
            summarize_change("same", "same", "IDENTITY.md"),
            "File updated: IDENTITY.md (minor changes)"
        );
    }
}
