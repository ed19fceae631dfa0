use crate::extract::vocab::{self, MONTHS, MONTH_ABBREVIATIONS};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::Range;

const DEFAULT_MONTH: u32 = 12;

static MONTH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?P<word>{})|(?P<num>\d{{1,2}})[ \t]*月|(?:19|20)\d{{2}}[-/.](?P<iso>\d{{1,2}})\b|\b(?P<us>\d{{1,2}})/\d{{1,2}}/(?:19|20)\d{{2}}",
        vocab::alternation(MONTHS)
    );
    Regex::new(&pattern).expect("month token regex")
});

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit regex"));

static RANGE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-–—－~～至到]|(?i:\bto\b)").expect("range separator regex"));

static CJK_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<y>\d{4})[ \t]*年[ \t]*(?P<m>\d{1,2})[ \t]*月(?:[ \t]*(?P<d>\d{1,2})[ \t]*[日號]|(?P<end>底))?")
        .expect("cjk date regex")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpiryError {
    #[error("no year or month recognised in expiry phrase {0:?}")]
    Unparseable(String),

    #[error("unrecognised timestamp {0:?}")]
    InvalidTimestamp(String),
}

// Resolves an expiry phrase to the last calendar day of its month.
//
// - no month: December of the recognised year
// - no year: the first such month not before the post's month
// - a range of months: its chronological end. That is the highest month, unless
//   the range wraps (`Dec-Jan`) or spans two years, where it is the last month token.
pub fn resolve_expiry(phrase: &str, post_ts: DateTime<Utc>) -> Result<NaiveDate, ExpiryError> {
    let months = month_tokens(phrase);
    let years = years(phrase);

    if months.is_empty() && years.is_empty() {
        return Err(ExpiryError::Unparseable(phrase.trim().to_string()));
    }

    let range = match (months.first(), months.last()) {
        (Some(first), Some(last)) if months.len() >= 2 => {
            RANGE_SEPARATOR.is_match(&phrase[first.0.end..last.0.start]).then_some((first, last))
        }
        _ => None,
    };

    let (month, year) = match range {
        Some((_, last)) if distinct(&years) > 1 => (last.1, years.last().map(|y| y.1)),
        Some((first, last)) if last.1 < first.1 => {
            // A single year written before the closing month belongs to the opening one.
            let year = years.first().map(|&(at, y)| if at < last.0.start { y + 1 } else { y });
            (last.1, year)
        }
        Some(_) => {
            let latest = months.iter().map(|m| m.1).max().unwrap_or(DEFAULT_MONTH);
            (latest, years.first().map(|y| y.1))
        }
        None => (months.first().map_or(DEFAULT_MONTH, |m| m.1), years.first().map(|y| y.1)),
    };

    let year = year.unwrap_or_else(|| infer_year(month, post_ts));
    last_day_of_month(year, month).ok_or_else(|| ExpiryError::Unparseable(phrase.trim().to_string()))
}

pub fn expiry_instant(date: NaiveDate) -> DateTime<Utc> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
    Utc.from_utc_datetime(&date.and_time(end_of_day))
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

// English rendering of a CJK expiry phrase for display, e.g. `2026年1月底` →
// `Jan 31, 2026`. Phrases without a CJK date are returned trimmed.
pub fn display_label(phrase: &str) -> String {
    let cleaned = phrase.replace("到期", "");
    let cleaned = cleaned.trim();

    let Some(caps) = CJK_DATE.captures(cleaned) else {
        return cleaned.to_string();
    };
    let year = caps.name("y").and_then(|m| m.as_str().parse::<i32>().ok());
    let month = caps
        .name("m")
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m));
    let (Some(year), Some(month)) = (year, month) else {
        return cleaned.to_string();
    };
    let name = MONTH_ABBREVIATIONS[(month - 1) as usize];

    if caps.name("end").is_some() {
        if let Some(last) = last_day_of_month(year, month) {
            return format!("{name} {}, {year}", last.day());
        }
    }
    if let Some(day) = caps.name("d") {
        return format!("{name} {}, {year}", day.as_str().trim_start_matches('0'));
    }
    format!("{name} {year}")
}

fn month_tokens(phrase: &str) -> Vec<(Range<usize>, u32)> {
    MONTH_TOKEN
        .captures_iter(phrase)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let month = if let Some(word) = caps.name("word") {
                vocab::lookup(MONTHS, word.as_str())?
            } else {
                caps.name("num")
                    .or_else(|| caps.name("iso"))
                    .or_else(|| caps.name("us"))?
                    .as_str()
                    .parse::<u32>()
                    .ok()?
            };
            (1..=12).contains(&month).then_some((whole.range(), month))
        })
        .collect()
}

// Four-digit years with their byte offsets.
fn years(phrase: &str) -> Vec<(usize, i32)> {
    DIGIT_RUN
        .find_iter(phrase)
        .filter(|m| m.as_str().len() == 4)
        .filter_map(|m| Some((m.start(), m.as_str().parse::<i32>().ok()?)))
        .filter(|(_, y)| (1900..=2099).contains(y))
        .collect()
}

fn distinct(years: &[(usize, i32)]) -> usize {
    years.iter().map(|y| y.1).collect::<BTreeSet<_>>().len()
}

fn infer_year(month: u32, post_ts: DateTime<Utc>) -> i32 {
    let post_date = post_ts.date_naive();
    if month >= post_date.month() {
        post_date.year()
    } else {
        post_date.year() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 20, 14, 0, 0).unwrap()
    }

    fn resolve(phrase: &str) -> Result<NaiveDate, ExpiryError> {
        resolve_expiry(phrase, post())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_range_resolves_to_later_month() {
        assert_eq!(resolve("Feb-Mar 2026"), Ok(date(2026, 3, 31)));
        assert_eq!(resolve("Jan to Mar 2026"), Ok(date(2026, 3, 31)));
        assert_eq!(resolve("2026年1月至3月"), Ok(date(2026, 3, 31)));
    }

    #[test]
    fn range_across_years_takes_last_month() {
        assert_eq!(resolve("Dec 2026-Jan 2027"), Ok(date(2027, 1, 31)));
    }

    #[test]
    fn wrapping_range_ends_in_the_closing_month() {
        assert_eq!(resolve("Dec-Jan 2027"), Ok(date(2027, 1, 31)));
        assert_eq!(resolve("Dec 2026 - Jan"), Ok(date(2027, 1, 31)));
        assert_eq!(resolve("Nov–Feb"), Ok(date(2026, 2, 28)));
    }

    #[test]
    fn resolves_common_formats() {
        assert_eq!(resolve("Feb 2026"), Ok(date(2026, 2, 28)));
        assert_eq!(resolve("February 2028"), Ok(date(2028, 2, 29)));
        assert_eq!(resolve("2026-01-15"), Ok(date(2026, 1, 31)));
        assert_eq!(resolve("4/17/2026"), Ok(date(2026, 4, 30)));
        assert_eq!(resolve("2026年1月底"), Ok(date(2026, 1, 31)));
        assert_eq!(resolve("2026年十一月"), Ok(date(2026, 11, 30)));
    }

    #[test]
    fn missing_month_defaults_to_december() {
        assert_eq!(resolve("Q1 2026"), Ok(date(2026, 12, 31)));
    }

    #[test]
    fn missing_year_is_inferred_from_post() {
        assert_eq!(resolve("Jan"), Ok(date(2026, 1, 31)));
        assert_eq!(resolve("December"), Ok(date(2025, 12, 31)));
    }

    #[test]
    fn unrecognised_phrase_is_an_error() {
        assert_eq!(
            resolve("  soon "),
            Err(ExpiryError::Unparseable("soon".to_string()))
        );
        assert!(resolve("").is_err());
    }

    #[test]
    fn last_day_handles_year_end() {
        assert_eq!(last_day_of_month(2026, 12), Some(date(2026, 12, 31)));
        assert_eq!(last_day_of_month(2026, 13), None);
    }

    #[test]
    fn display_label_converts_cjk_dates() {
        assert_eq!(display_label("2026年1月底到期"), "Jan 31, 2026");
        assert_eq!(display_label("2026年2月"), "Feb 2026");
        assert_eq!(display_label("2026年1月09日"), "Jan 9, 2026");
        assert_eq!(display_label(" Feb-Mar 2026 "), "Feb-Mar 2026");
    }
}
