//! Date normalization for the several encodings the raw files use.
//!
//! The OpenFootball `Mon/DD` form is season-relative: the files never
//! carry a year, so a May date near a season that started in August
//! belongs to the following calendar year. The cutover assumes seasons
//! run roughly August to May: months from July onward fall in the
//! season's first calendar year, earlier months in its second.

use chrono::{Datelike, NaiveDate};

fn month_number(abbrev: &str) -> Option<u32> {
    let n = match &abbrev.get(..3)?.to_ascii_lowercase()[..] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(n)
}

/// Normalize a raw date string to a calendar date.
///
/// Handles three grammars:
/// - `Fri Aug/11` or `Aug/11`, resolved against `season_year`
/// - `DD.MM.YYYY`
/// - ISO `YYYY-MM-DD`
///
/// Returns `None` (never panics) on anything else, logging a warning;
/// callers treat a missing date as "unknown", not fatal.
#[must_use]
pub fn normalize_date(raw: &str, season_year: Option<i32>) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(date) = parse_month_day(raw, season_year) {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d.%m.%Y") {
        return Some(date);
    }

    log::warn!("could not parse date: {raw:?}");
    None
}

/// `[Weekday] Mon/DD`, optionally with a trailing explicit year.
fn parse_month_day(raw: &str, season_year: Option<i32>) -> Option<NaiveDate> {
    let mut tokens = raw.split_whitespace().collect::<Vec<_>>();
    if tokens.is_empty() || tokens.len() > 3 {
        return None;
    }

    // An explicit trailing year overrides the season inference.
    let explicit_year = tokens
        .last()
        .and_then(|t| (t.len() == 4).then(|| t.parse::<i32>().ok()).flatten());
    if explicit_year.is_some() {
        tokens.pop();
    }

    let month_day = tokens.pop()?;
    let (month_str, day_str) = month_day.split_once('/')?;
    let month = month_number(month_str)?;
    let day = day_str.trim().parse::<u32>().ok()?;

    let year = explicit_year.unwrap_or_else(|| {
        let season = season_year.unwrap_or_else(|| chrono::Utc::now().date_naive().year());
        if month >= 7 {
            season
        } else {
            season + 1
        }
    });

    NaiveDate::from_ymd_opt(year, month, day)
}
