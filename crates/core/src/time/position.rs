use crate::time::expiry::{expiry_instant, resolve_expiry, ExpiryError};
use crate::time::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Inclusive lower bounds of each zone, in percent.
pub const MODERATE_FROM: f64 = 50.0;
pub const CAUTION_FROM: f64 = 75.0;
pub const DANGER_FROM: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Safe,
    Moderate,
    Caution,
    Danger,
}

impl Zone {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= DANGER_FROM {
            Zone::Danger
        } else if percent >= CAUTION_FROM {
            Zone::Caution
        } else if percent >= MODERATE_FROM {
            Zone::Moderate
        } else {
            Zone::Safe
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalPosition {
    pub percent: f64,
    pub zone: Zone,
}

impl TemporalPosition {
    pub fn from_percent(percent: f64) -> Self {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        Self {
            percent,
            zone: Zone::from_percent(percent),
        }
    }
}

pub fn is_degenerate(post_ts: DateTime<Utc>, expiry_ts: DateTime<Utc>) -> bool {
    (expiry_ts - post_ts).num_milliseconds() <= 0
}

pub fn position_between(
    post_ts: DateTime<Utc>,
    expiry_ts: DateTime<Utc>,
    now: DateTime<Utc>,
) -> TemporalPosition {
    if is_degenerate(post_ts, expiry_ts) {
        tracing::warn!(%post_ts, %expiry_ts, "expiry not after post timestamp; clamping position to zero");
        return TemporalPosition::from_percent(0.0);
    }

    let span = (expiry_ts - post_ts).num_milliseconds() as f64;
    let elapsed = (now - post_ts).num_milliseconds() as f64;
    TemporalPosition::from_percent((elapsed / span).clamp(0.0, 1.0) * 100.0)
}

pub fn position(
    post_ts: DateTime<Utc>,
    expiry_phrase: &str,
    now: DateTime<Utc>,
) -> Result<TemporalPosition, ExpiryError> {
    let expiry = resolve_expiry(expiry_phrase, post_ts)?;
    Ok(position_between(post_ts, expiry_instant(expiry), now))
}

pub fn position_from_attributes(
    post_date: &str,
    expiry_phrase: &str,
    now: DateTime<Utc>,
) -> Result<TemporalPosition, ExpiryError> {
    let post_ts = parse_timestamp(post_date)
        .ok_or_else(|| ExpiryError::InvalidTimestamp(post_date.to_string()))?;
    position(post_ts, expiry_phrase, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn zone_boundaries_are_inclusive_lower_bounds() {
        assert_eq!(Zone::from_percent(0.0), Zone::Safe);
        assert_eq!(Zone::from_percent(49.999), Zone::Safe);
        assert_ne!(Zone::from_percent(49.999), Zone::Moderate);
        assert_eq!(Zone::from_percent(50.0), Zone::Moderate);
        assert_eq!(Zone::from_percent(74.999), Zone::Moderate);
        assert_eq!(Zone::from_percent(75.0), Zone::Caution);
        assert_eq!(Zone::from_percent(89.999), Zone::Caution);
        assert_eq!(Zone::from_percent(90.0), Zone::Danger);
        assert_eq!(Zone::from_percent(100.0), Zone::Danger);
    }

    #[test]
    fn expiry_not_after_post_yields_zero() {
        let post = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let now = post + Duration::days(30);
        let p = position_between(post, post, now);
        assert_eq!(p.percent, 0.0);
        assert_eq!(p.zone, Zone::Safe);

        let p = position_between(post, post - Duration::days(1), now);
        assert_eq!(p, TemporalPosition::from_percent(0.0));
    }

    #[test]
    fn percent_is_linear_and_clamped() {
        let post = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let expiry = post + Duration::days(100);

        let p = position_between(post, expiry, post + Duration::days(60));
        assert!((p.percent - 60.0).abs() < 1e-9);
        assert_eq!(p.zone, Zone::Moderate);

        assert_eq!(position_between(post, expiry, post - Duration::days(5)).percent, 0.0);
        let late = position_between(post, expiry, expiry + Duration::days(5));
        assert_eq!(late.percent, 100.0);
        assert_eq!(late.zone, Zone::Danger);
    }

    #[test]
    fn position_resolves_phrase_first() {
        let post = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap();
        let p = position(post, "Feb-Mar 2026", now).unwrap();
        assert_eq!(p.percent, 100.0);

        assert!(matches!(
            position(post, "whenever", now),
            Err(ExpiryError::Unparseable(_))
        ));
    }

    #[test]
    fn phrase_expiring_before_post_clamps_to_zero() {
        let post = Utc.with_ymd_and_hms(2026, 5, 10, 0, 0, 0).unwrap();
        let now = post + Duration::days(3);
        let p = position(post, "Jan 2026", now).unwrap();
        assert_eq!(p.percent, 0.0);
        assert_eq!(p.zone, Zone::Safe);
    }

    #[test]
    fn attributes_are_parsed_as_the_view_provides_them() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let p = position_from_attributes("2026-01-01T00:00:00", "2026年1月底", now).unwrap();
        assert!(p.percent > 45.0 && p.percent < 48.0, "{p:?}");
        assert_eq!(p.zone, Zone::Safe);

        assert_eq!(
            position_from_attributes("not a date", "Mar 2026", now),
            Err(ExpiryError::InvalidTimestamp("not a date".to_string()))
        );
    }
}
