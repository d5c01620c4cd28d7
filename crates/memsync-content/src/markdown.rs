//! Markdown structure extraction
//!
//! Headings feed the diff summarizer; daily-log sectioning and project-doc
//! titles feed the bulk importer.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

/// Any ATX heading, levels 1 through 6
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.+)$").unwrap());

/// Top-level `# Title` heading only
static TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").unwrap());

/// Embedded `YYYY-MM-DD` date in a daily-log file name
static LOG_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap());

/// Boundary between daily-log sections
static SECTION_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n##[ \t]+").unwrap());

/// Parenthetical clock time in a section title, e.g. `Setup (10:30 AST)`
static SECTION_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{1,2}):(\d{2})").unwrap());

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Minimum body length (exclusive) for a daily-log section to be imported
const MIN_SECTION_BODY: usize = 20;

/// Extract heading titles in document order.
pub fn extract_headings(text: &str) -> Vec<String> {
    HEADING
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim_end().to_string())
        .collect()
}

/// Title of a document: its first `# ` heading.
pub fn document_title(text: &str) -> Option<String> {
    TITLE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end().to_string())
}

/// Date embedded in a daily-log file name such as `2024-03-05.md`.
pub fn log_date_from_file_name(file_name: &str) -> Option<NaiveDate> {
    let captures = LOG_DATE.captures(file_name)?;
    NaiveDate::parse_from_str(captures.get(1)?.as_str(), "%Y-%m-%d").ok()
}

/// A timestamped section of a daily log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSection {
    /// Section title with heading markers removed
    pub title: String,
    /// Section body, trimmed
    pub body: String,
    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub timestamp: String,
}

impl LogSection {
    /// Message text sent for this section.
    pub fn render(&self, date: NaiveDate) -> String {
        format!(
            "Daily log {} - {}:\n{}",
            date.format("%Y-%m-%d"),
            self.title,
            self.body
        )
    }
}

/// Timestamp for a section on `date`.
///
/// Uses the first `(HH:MM` found in the title; otherwise, or if the time is
/// not a valid clock time, noon on that date.
pub fn section_timestamp(date: NaiveDate, title: &str) -> String {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
    let time = SECTION_TIME
        .captures(title)
        .and_then(|c| {
            let hour = c.get(1)?.as_str().parse::<u32>().ok()?;
            let minute = c.get(2)?.as_str().parse::<u32>().ok()?;
            NaiveTime::from_hms_opt(hour, minute, 0)
        })
        .unwrap_or(noon);
    date.and_time(time).format(TIMESTAMP_FORMAT).to_string()
}

/// Split a daily log into `## ` sections.
///
/// The text before the first `## ` heading counts as a section too (its
/// title is usually the `# date` heading). Sections whose body is 20
/// characters or shorter are dropped.
pub fn parse_daily_log(date: NaiveDate, content: &str) -> Vec<LogSection> {
    let mut sections = Vec::new();

    for chunk in SECTION_BREAK.split(content) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }

        let (first, rest) = chunk.split_once('\n').unwrap_or((chunk, ""));
        let title = first.trim_matches(|c| c == '#' || c == ' ').to_string();
        let body = rest.trim().to_string();

        if body.chars().count() <= MIN_SECTION_BODY {
            continue;
        }

        let timestamp = section_timestamp(date, &title);
        sections.push(LogSection {
            title,
            body,
            timestamp,
        });
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn march_5() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn headings_in_order_across_levels() {
        let text = "# Title\nintro\n## Setup\n###### Deep\n####### too deep\n#nospace\n";
        assert_eq!(extract_headings(text), vec!["Title", "Setup", "Deep"]);
    }

    #[test]
    fn headings_strip_carriage_return() {
        assert_eq!(extract_headings("# Title\r\nbody\r\n"), vec!["Title"]);
    }

    #[test]
    fn document_title_ignores_subheadings() {
        assert_eq!(document_title("## Sub\n# Real\n"), Some("Real".to_string()));
        assert_eq!(document_title("no headings"), None);
    }

    #[test]
    fn log_date_parsed_from_file_name() {
        assert_eq!(log_date_from_file_name("2024-03-05.md"), Some(march_5()));
        assert_eq!(log_date_from_file_name("notes-2024-03-05-am.md"), Some(march_5()));
        assert_eq!(log_date_from_file_name("readme.md"), None);
        assert_eq!(log_date_from_file_name("2024-13-40.md"), None);
    }

    #[test]
    fn section_time_from_title() {
        assert_eq!(
            section_timestamp(march_5(), "Setup (10:30 AST)"),
            "2024-03-05T10:30:00Z"
        );
        assert_eq!(
            section_timestamp(march_5(), "Early (7:05)"),
            "2024-03-05T07:05:00Z"
        );
    }

    #[test]
    fn section_without_time_defaults_to_noon() {
        assert_eq!(section_timestamp(march_5(), "Lunch"), "2024-03-05T12:00:00Z");
        assert_eq!(
            section_timestamp(march_5(), "Broken (27:99)"),
            "2024-03-05T12:00:00Z"
        );
    }

    #[test]
    fn daily_log_sections_each_get_their_own_timestamp() {
        let content = "# 2024-03-05\n\n## Setup (10:30 AST)\nInstalled the new graph service locally.\n\n## Afternoon\nReviewed the ingestion logs for errors.\n";
        let sections = parse_daily_log(march_5(), content);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Setup (10:30 AST)");
        assert_eq!(sections[0].timestamp, "2024-03-05T10:30:00Z");
        assert_eq!(sections[1].title, "Afternoon");
        assert_eq!(sections[1].timestamp, "2024-03-05T12:00:00Z");
    }

    #[test]
    fn daily_log_drops_short_sections() {
        let content = "## Tiny\nshort\n## Long enough\nThis body is comfortably over twenty characters.\n";
        let sections = parse_daily_log(march_5(), content);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Long enough");
    }

    #[test]
    fn log_section_render() {
        let section = LogSection {
            title: "Setup".to_string(),
            body: "Configured everything".to_string(),
            timestamp: "2024-03-05T12:00:00Z".to_string(),
        };
        assert_eq!(
            section.render(march_5()),
            "Daily log 2024-03-05 - Setup:\nConfigured everything"
        );
    }
}
