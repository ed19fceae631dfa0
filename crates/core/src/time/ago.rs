use crate::extract::LanguageTag;
use chrono::{DateTime, Utc};

pub fn time_ago(analysis_ts: DateTime<Utc>, now: DateTime<Utc>, lang: LanguageTag) -> Option<String> {
    let elapsed = now - analysis_ts;
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return None;
    }

    let hours = elapsed.num_hours();
    let days = elapsed.num_days();
    let label = match lang {
        LanguageTag::Chinese if hours < 1 => format!("{minutes}分鐘前"),
        LanguageTag::Chinese if days < 1 => format!("{hours}小時前"),
        LanguageTag::Chinese => format!("{days}日前"),
        LanguageTag::English if hours < 1 => english(minutes, "minute"),
        LanguageTag::English if days < 1 => english(hours, "hour"),
        LanguageTag::English => english(days, "day"),
    };
    Some(label)
}

fn english(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap()
    }

    #[test]
    fn under_a_minute_has_no_tag() {
        let now = base() + Duration::seconds(59);
        assert_eq!(time_ago(base(), now, LanguageTag::Chinese), None);
        assert_eq!(time_ago(base() + Duration::hours(1), base(), LanguageTag::English), None);
    }

    #[test]
    fn chinese_units() {
        let zh = |d: Duration| time_ago(base(), base() + d, LanguageTag::Chinese);
        assert_eq!(zh(Duration::minutes(5)).as_deref(), Some("5分鐘前"));
        assert_eq!(zh(Duration::minutes(59)).as_deref(), Some("59分鐘前"));
        assert_eq!(zh(Duration::minutes(60)).as_deref(), Some("1小時前"));
        assert_eq!(zh(Duration::hours(23) + Duration::minutes(59)).as_deref(), Some("23小時前"));
        assert_eq!(zh(Duration::days(3) + Duration::hours(5)).as_deref(), Some("3日前"));
    }

    #[test]
    fn english_units() {
        let en = |d: Duration| time_ago(base(), base() + d, LanguageTag::English);
        assert_eq!(en(Duration::minutes(5)).as_deref(), Some("5 minutes ago"));
        assert_eq!(en(Duration::minutes(61)).as_deref(), Some("1 hour ago"));
        assert_eq!(en(Duration::days(2)).as_deref(), Some("2 days ago"));
    }
}
