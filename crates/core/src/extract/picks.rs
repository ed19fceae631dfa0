use crate::domain::pick::{OptionPick, OptionType, Ranked, StockAction, StockPick};
use crate::extract::vocab::{self, MONTHS, NO_OPPORTUNITY_MARKERS, OPTION_TYPES, STOCK_ACTIONS};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeSet;

const DEFAULT_MAX_PICKS: usize = 3;

const RANK_AND_TICKER: &str = concat!(
    r"(?:(?i:\btop)[ \t]*(?P<rank>\d{1,2})|^[ \t]*(?:\*\*)?[ \t]*(?P<num>\d{1,2})[.)、])",
    r"[ \t]*[:：.]?[ \t]*(?:\*\*)?[ \t]*",
    r"(?P<ticker>[A-Z]{2,5})\b",
    r"(?:[ \t]*[（(](?P<name>[^()（）\n]{1,80})[)）])?",
    r"[ \t]*(?:\*\*)?",
    r"(?:[ \t]*[-–—－:：][ \t]*|[ \t]+)(?:\*\*)?[ \t]*",
);

static STOCK_LINE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?m){RANK_AND_TICKER}(?P<action>{})",
        vocab::alternation(STOCK_ACTIONS)
    );
    Regex::new(&pattern).expect("stock pick regex")
});

static OPTION_LINE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?m){RANK_AND_TICKER}(?P<kind>{})(?P<rest>[^\n]*)",
        vocab::alternation(OPTION_TYPES)
    );
    Regex::new(&pattern).expect("option pick regex")
});

// Strike needs its lead word; a bare `$` figure may be a premium or a target.
static STRIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?i:\bat)|行使價)[ \t]*\$[ \t]*(?P<value>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)")
        .expect("strike regex")
});

static EXPIRY_LEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[\s*,，:：\-–—]|期權)+").expect("expiry lead regex"));

static EXPIRY_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?i:\bexp(?:ir(?:y|es|ing|ation))?\b\.?)|到期日?)[ \t]*[:：]?[ \t]*")
        .expect("expiry keyword regex")
});

static CLAUSE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*|\s[-–—]\s|[。；;(（]").expect("clause end regex"));

// Text that opens with a calendar expression.
static DATE_START: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"^[ \t]*(?:{}|\d{{4}}|\d{{1,2}}[ \t]*月|\d{{1,2}}/\d{{1,2}}/\d{{4}})",
        vocab::alternation(MONTHS)
    );
    Regex::new(&pattern).expect("date start regex")
});

static NO_OPPORTUNITY: Lazy<Regex> = Lazy::new(|| {
    let parts: Vec<String> = NO_OPPORTUNITY_MARKERS
        .iter()
        .map(|m| {
            if m.is_ascii() {
                format!(r"\b{}\b", regex::escape(m))
            } else {
                regex::escape(m)
            }
        })
        .collect();
    Regex::new(&parts.join("|")).expect("no-opportunity regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractConfig {
    pub max_picks: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_picks: DEFAULT_MAX_PICKS,
        }
    }
}

pub fn extract_stocks(section: &str, config: &ExtractConfig) -> Vec<StockPick> {
    let picks: Vec<StockPick> = STOCK_LINE
        .captures_iter(section)
        .filter_map(|caps| {
            let (rank, ticker, company_name) = rank_and_ticker(&caps)?;
            let action = vocab::lookup(STOCK_ACTIONS, caps.name("action")?.as_str())?;
            Some(StockPick {
                rank,
                ticker: Some(ticker),
                action,
                company_name,
            })
        })
        .collect();

    if picks.is_empty() && says_no_opportunity(section) {
        return vec![StockPick::no_opportunity()];
    }
    finalize(picks, config)
}

pub fn extract_options(section: &str, config: &ExtractConfig) -> Vec<OptionPick> {
    let picks: Vec<OptionPick> = OPTION_LINE
        .captures_iter(section)
        .filter_map(|caps| {
            let (rank, ticker, _) = rank_and_ticker(&caps)?;
            let option_type = vocab::lookup(OPTION_TYPES, caps.name("kind")?.as_str())?;
            let rest = caps.name("rest").map_or("", |m| m.as_str());
            let (strike, expiry_phrase) = strike_and_expiry(rest);
            Some(OptionPick {
                rank,
                ticker: Some(ticker),
                option_type,
                strike,
                expiry_phrase,
            })
        })
        .collect();

    if picks.is_empty() && says_no_opportunity(section) {
        return vec![OptionPick::no_opportunity()];
    }
    finalize(picks, config)
}

fn rank_and_ticker(caps: &Captures<'_>) -> Option<(u32, String, Option<String>)> {
    let rank = caps
        .name("rank")
        .or_else(|| caps.name("num"))?
        .as_str()
        .parse::<u32>()
        .ok()
        .filter(|r| *r >= 1)?;

    let ticker = caps.name("ticker")?.as_str();
    if vocab::is_reserved(ticker) {
        return None;
    }

    let company_name = caps
        .name("name")
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());

    Some((rank, ticker.to_string(), company_name))
}

fn strike_and_expiry(rest: &str) -> (Option<f64>, Option<String>) {
    let strike_match = STRIKE.captures(rest);
    let strike = strike_match
        .as_ref()
        .and_then(|caps| caps.name("value"))
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .filter(|v| *v > 0.0);

    // The expiry may sit on either side of the strike.
    let remainder = match strike_match.as_ref().and_then(|caps| caps.get(0)) {
        Some(m) => format!("{} {}", &rest[..m.start()], &rest[m.end()..]),
        None => rest.to_string(),
    };

    (strike, expiry_phrase(&remainder))
}

fn expiry_phrase(text: &str) -> Option<String> {
    // After an expiry keyword anything goes; otherwise the clause must open with a date.
    let keyed = EXPIRY_KEYWORD
        .find(text)
        .and_then(|m| clauses(&text[m.end()..]).first().and_then(|c| clean_phrase(c)));
    keyed.or_else(|| {
        clauses(text)
            .into_iter()
            .filter_map(clean_phrase)
            .find(|phrase| DATE_START.is_match(phrase))
    })
}

// Splits on clause boundaries. A spaced dash followed by a date is a range
// separator, not a boundary.
fn clauses(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in CLAUSE_END.find_iter(text) {
        let is_dash = matches!(m.as_str().trim(), "-" | "–" | "—");
        if is_dash && DATE_START.is_match(&text[m.end()..]) {
            continue;
        }
        out.push(&text[start..m.start()]);
        start = m.end();
    }
    out.push(&text[start..]);
    out
}

fn clean_phrase(clause: &str) -> Option<String> {
    let phrase = EXPIRY_LEAD.replace(clause.trim(), "");
    let phrase = phrase
        .trim()
        .trim_end_matches("到期")
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | '，' | '*'));
    (!phrase.is_empty()).then(|| phrase.to_string())
}

fn says_no_opportunity(section: &str) -> bool {
    NO_OPPORTUNITY.is_match(section)
}

// Orders by the advisor's rank, keeps the first pick seen for each rank, then caps.
// Rank gaps (e.g. only "Top 2" and "Top 3") are kept as-is.
fn finalize<T: Ranked>(mut picks: Vec<T>, config: &ExtractConfig) -> Vec<T> {
    let mut seen = BTreeSet::new();
    picks.retain(|p| seen.insert(p.rank()));
    picks.sort_by_key(|p| p.rank());
    picks.truncate(config.max_picks);
    picks
}
