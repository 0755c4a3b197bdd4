//! Calendar-derived note paths.
//!
//! Daily and weekly note paths are pure functions of a date (or ISO week) and
//! a configurable template. A template result that carries no path separator
//! is prefixed with the configured directory; leading slashes are stripped.
//!
//! Week membership follows ISO-8601: a week belongs to the year containing
//! its Thursday.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

use crate::types::{Result, VaultError};

/// Token replaced by the full date in daily templates.
const DATE_TOKEN: &str = "YYYY-MM-DD";

fn date_stamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4})-?(\d{2})-?(\d{2})").expect("static regex"))
}

/// Build the daily-note path for an ISO `YYYY-MM-DD` date.
///
/// Rejects dates that do not name a real calendar day before any template
/// work happens.
pub fn daily_path(date_iso: &str, template: &str, dir: &str) -> Result<String> {
    NaiveDate::parse_from_str(date_iso, "%Y-%m-%d")
        .map_err(|_| VaultError::invalid_input(format!("not an ISO date: {date_iso}")))?;
    let applied = template.replace(DATE_TOKEN, date_iso);
    Ok(apply_dir_fallback(&applied, dir))
}

/// Build the weekly-note path for an ISO year/week pair.
///
/// Tokens are substituted longest first so `WWW` is never half-eaten by `WW`:
/// `{W}` becomes a literal `W`, `YYYY` the ISO year, `WWW` a `W`-prefixed
/// zero-padded week, `WW` the zero-padded week alone.
pub fn weekly_path(iso_year: i32, iso_week: u32, template: &str, dir: &str) -> Result<String> {
    if iso_week == 0 || iso_week > 53 {
        return Err(VaultError::invalid_input(format!(
            "ISO week out of range: {iso_week}"
        )));
    }
    let week = format!("{iso_week:02}");
    let applied = template
        .replace("{W}", "W")
        .replace("YYYY", &iso_year.to_string())
        .replace("WWW", &format!("W{week}"))
        .replace("WW", &week);
    Ok(apply_dir_fallback(&applied, dir))
}

/// The ISO year and week a date belongs to.
pub fn iso_week_of(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

fn apply_dir_fallback(applied: &str, dir: &str) -> String {
    let rel = if !applied.contains('/') && !dir.is_empty() {
        format!("{dir}/{applied}")
    } else {
        applied.to_string()
    };
    rel.trim_start_matches('/').to_string()
}

// =============================================================================
// Date Harvest
// =============================================================================

/// Pull every date stamped into a file basename, `YYYY-MM-DD` or `YYYYMMDD`.
/// Only stamps naming a real calendar day count.
pub fn dates_in_name(name: &str) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = date_stamp_re()
        .captures_iter(name)
        .filter_map(|caps| {
            let year = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let day = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

/// Sorted, deduplicated dates harvested from a set of note basenames.
pub fn harvest_dates<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = names.into_iter().flat_map(dates_in_name).collect();
    dates.sort();
    dates.dedup();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_path_substitutes_every_token() {
        assert_eq!(
            daily_path("2025-01-01", "Daily/YYYY-MM-DD DAILY.md", "Daily").unwrap(),
            "Daily/2025-01-01 DAILY.md"
        );
        assert_eq!(
            daily_path("2025-03-09", "YYYY-MM-DD/YYYY-MM-DD.md", "").unwrap(),
            "2025-03-09/2025-03-09.md"
        );
    }

    #[test]
    fn test_daily_dir_fallback_only_without_separator() {
        assert_eq!(
            daily_path("2025-01-01", "YYYY-MM-DD.md", "Journal").unwrap(),
            "Journal/2025-01-01.md"
        );
        // template already carries a directory: the fallback stays out of it
        assert_eq!(
            daily_path("2025-01-01", "Inbox/YYYY-MM-DD.md", "Journal").unwrap(),
            "Inbox/2025-01-01.md"
        );
    }

    #[test]
    fn test_daily_rejects_malformed_dates() {
        assert!(daily_path("2025-13-40", "x YYYY-MM-DD", "d").is_err());
        assert!(daily_path("not-a-date", "x", "d").is_err());
        assert!(daily_path("2025-02-30", "x", "d").is_err());
    }

    #[test]
    fn test_weekly_path_token_order() {
        assert_eq!(
            weekly_path(2025, 1, "Weekly notes/YYYY-{W}WW.md", "Weekly notes").unwrap(),
            "Weekly notes/2025-W01.md"
        );
        // WWW must win over WW
        assert_eq!(
            weekly_path(2025, 7, "YYYY WWW.md", "Weekly").unwrap(),
            "Weekly/2025 W07.md"
        );
    }

    #[test]
    fn test_weekly_rejects_out_of_range_weeks() {
        assert!(weekly_path(2025, 0, "WW", "d").is_err());
        assert!(weekly_path(2025, 54, "WW", "d").is_err());
    }

    #[test]
    fn test_iso_week_of_new_years_wednesday() {
        // 2025-01-01 is a Wednesday; its Thursday is in 2025, so week 1 of 2025
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(iso_week_of(date), (2025, 1));
    }

    #[test]
    fn test_iso_week_year_boundary() {
        // 2023-01-01 is a Sunday; its week's Thursday falls in 2022
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(iso_week_of(date), (2022, 52));
    }

    #[test]
    fn test_dates_in_name_both_forms() {
        let d = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(dates_in_name("2025-06-15 DAILY.md"), vec![d]);
        assert_eq!(dates_in_name("export-20250615.md"), vec![d]);
    }

    #[test]
    fn test_dates_in_name_rejects_impossible_dates() {
        assert!(dates_in_name("2025-99-99 broken.md").is_empty());
        assert!(dates_in_name("no dates here.md").is_empty());
    }

    #[test]
    fn test_harvest_sorted_and_deduplicated() {
        let dates = harvest_dates(["b 2025-02-01.md", "a 2025-01-01.md", "dup 20250201.md"]);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            ]
        );
    }
}
