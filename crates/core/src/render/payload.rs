use crate::config::Settings;
use crate::domain::degradation::{Degradation, SectionKind};
use crate::domain::pick::{OptionPick, StockPick};
use crate::domain::record::AdvisorRecord;
use crate::extract::{self, DetectorConfig, ExtractConfig, LanguageTag};
use crate::render::header::{select_header, HeaderSummary};
use crate::render::markdown::{render, Markup};
use crate::time::expiry::{display_label, expiry_instant, resolve_expiry, ExpiryError};
use crate::time::position::{is_degenerate, position_between, TemporalPosition};
use crate::time::{ago::time_ago, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub extract: ExtractConfig,
}

impl PipelineConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            detector: DetectorConfig::default(),
            extract: ExtractConfig {
                max_picks: settings.max_picks.max(1),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineAttributes {
    pub post_date: String,
    pub expiry: String,
    pub expiry_label: String,
    pub strike: f64,
    pub target_label: String,
    pub current_label: String,
    // Position at render time. Views recompute it from the two string attributes.
    pub position: Option<TemporalPosition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderPayload {
    pub post_id: i64,
    pub post_date: String,
    pub is_pinned: bool,
    pub language: LanguageTag,
    pub analysis_age: Option<String>,
    pub stock_picks: Vec<StockPick>,
    pub option_picks: Vec<OptionPick>,
    pub stocks_markup: Markup,
    pub options_markup: Markup,
    pub verdict_markup: Markup,
    pub primary_stock: Option<StockPick>,
    pub primary_option: Option<OptionPick>,
    pub header: HeaderSummary,
    pub option_timeline: Option<TimelineAttributes>,
    pub degradations: Vec<Degradation>,
}

// Derives the full presentation payload from one raw record. Never fails: every
// malformed part is replaced by its fallback and listed in `degradations`.
pub fn build_payload(record: &AdvisorRecord, config: &PipelineConfig, now: DateTime<Utc>) -> RenderPayload {
    let mut degradations = Vec::new();

    let language = extract::detect(&record.text, &config.detector);
    if let Some(flag) = record.language_flag.as_deref() {
        let flagged_chinese = flag.trim().to_ascii_lowercase().starts_with("zh");
        if flagged_chinese != language.is_chinese() {
            tracing::debug!(post_id = record.post_id, flag, ?language, "language flag disagrees with detected language");
        }
    }

    let sections = extract::split(&record.text);
    if !sections.markers_found {
        degradations.push(Degradation::MalformedSection);
    }

    let stock_picks = extract::extract_stocks(&sections.stocks, &config.extract);
    if stock_picks.is_empty() {
        degradations.push(Degradation::NoPicksFound {
            section: SectionKind::Stocks,
        });
    }
    let option_picks = extract::extract_options(&sections.options, &config.extract);
    if option_picks.is_empty() {
        degradations.push(Degradation::NoPicksFound {
            section: SectionKind::Options,
        });
    }

    let (primary_stock, primary_option) = select_header(&stock_picks, &option_picks);
    let header = HeaderSummary::new(primary_stock.as_ref(), primary_option.as_ref(), language);

    let option_timeline = primary_option
        .as_ref()
        .and_then(|pick| timeline(record, pick, language, now, &mut degradations));

    let analysis_age = record
        .analysis_date
        .as_deref()
        .and_then(parse_timestamp)
        .and_then(|ts| time_ago(ts, now, language));

    for d in &degradations {
        tracing::debug!(post_id = record.post_id, degradation = %d, "payload degraded");
    }

    RenderPayload {
        post_id: record.post_id,
        post_date: record.post_date.clone(),
        is_pinned: record.is_pinned,
        language,
        analysis_age,
        stocks_markup: render(&sections.stocks),
        options_markup: render(&sections.options),
        verdict_markup: render(&sections.verdict),
        stock_picks,
        option_picks,
        primary_stock,
        primary_option,
        header,
        option_timeline,
        degradations,
    }
}

fn timeline(
    record: &AdvisorRecord,
    pick: &OptionPick,
    language: LanguageTag,
    now: DateTime<Utc>,
    degradations: &mut Vec<Degradation>,
) -> Option<TimelineAttributes> {
    let strike = pick.strike?;
    let expiry = pick.expiry_phrase.as_deref()?.trim();
    if expiry.is_empty() {
        return None;
    }

    let position = match parse_timestamp(&record.post_date) {
        None => {
            tracing::warn!(post_id = record.post_id, post_date = %record.post_date, "unparseable post timestamp; gauge position omitted");
            None
        }
        Some(post_ts) => match resolve_expiry(expiry, post_ts) {
            Err(ExpiryError::Unparseable(phrase)) | Err(ExpiryError::InvalidTimestamp(phrase)) => {
                degradations.push(Degradation::UnparseableExpiry { phrase });
                None
            }
            Ok(date) => {
                let expiry_ts = expiry_instant(date);
                if is_degenerate(post_ts, expiry_ts) {
                    degradations.push(Degradation::DegenerateInterval);
                }
                Some(position_between(post_ts, expiry_ts, now))
            }
        },
    };

    let (target, current) = match language {
        LanguageTag::Chinese => ("目標", "最佳時機"),
        LanguageTag::English => ("Target", "Best Buy"),
    };

    Some(TimelineAttributes {
        post_date: record.post_date.clone(),
        expiry: expiry.to_string(),
        expiry_label: display_label(expiry),
        strike,
        target_label: format!("{target}: ${strike}"),
        current_label: current.to_string(),
        position,
    })
}
