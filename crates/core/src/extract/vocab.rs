use crate::domain::pick::{OptionType, StockAction};

pub const STOCK_ACTIONS: &[(&str, StockAction)] = &[
    ("BUY", StockAction::Buy),
    ("買入", StockAction::Buy),
    ("SELL", StockAction::Sell),
    ("賣出", StockAction::Sell),
    ("PASS", StockAction::Pass),
];

pub const OPTION_TYPES: &[(&str, OptionType)] = &[
    ("CALL", OptionType::Call),
    ("認購", OptionType::Call),
    ("PUT", OptionType::Put),
    ("認沽", OptionType::Put),
    ("PASS", OptionType::Pass),
];

pub const MONTHS: &[(&str, u32)] = &[
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
    ("一月", 1),
    ("二月", 2),
    ("三月", 3),
    ("四月", 4),
    ("五月", 5),
    ("六月", 6),
    ("七月", 7),
    ("八月", 8),
    ("九月", 9),
    ("十月", 10),
    ("十一月", 11),
    ("十二月", 12),
];

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// Phrases meaning "no recommendation" when no ranked pick is present.
// English entries are matched case-sensitively as whole words.
pub const NO_OPPORTUNITY_MARKERS: &[&str] = &["PASS", "無推薦", "沒有推薦"];

// Uppercase words that fit the ticker shape but are never tickers.
pub const RESERVED_WORDS: &[&str] = &["BUY", "SELL", "CALL", "PUT", "PASS", "TOP", "HOLD"];

pub fn lookup<T: Copy>(table: &[(&str, T)], token: &str) -> Option<T> {
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(token))
        .map(|(_, value)| *value)
}

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

// Regex alternation over a table's tokens, longest first so that e.g. `十二月`
// wins over `二月`. ASCII tokens only match as whole words and ignore case.
pub fn alternation<T>(table: &[(&str, T)]) -> String {
    let mut keys: Vec<&str> = table.iter().map(|(key, _)| *key).collect();
    keys.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    keys.dedup();
    let parts: Vec<String> = keys
        .into_iter()
        .map(|key| {
            if key.is_ascii() {
                format!(r"(?i:\b{}\b)", regex::escape(key))
            } else {
                regex::escape(key)
            }
        })
        .collect();
    format!("(?:{})", parts.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn lookup_is_case_insensitive_for_ascii() {
        assert_eq!(lookup(STOCK_ACTIONS, "buy"), Some(StockAction::Buy));
        assert_eq!(lookup(STOCK_ACTIONS, "賣出"), Some(StockAction::Sell));
        assert_eq!(lookup(OPTION_TYPES, "認沽"), Some(OptionType::Put));
        assert_eq!(lookup(STOCK_ACTIONS, "HOLD"), None);
    }

    #[test]
    fn alternation_prefers_longest_token() {
        let re = Regex::new(&alternation(MONTHS)).unwrap();
        let m = re.find("2026年十二月").unwrap();
        assert_eq!(lookup(MONTHS, m.as_str()), Some(12));
        let m = re.find("exp March 2026").unwrap();
        assert_eq!(m.as_str(), "March");
    }

    #[test]
    fn alternation_respects_word_boundaries() {
        let re = Regex::new(&alternation(MONTHS)).unwrap();
        assert!(re.find("market outlook").is_none());
        let re = Regex::new(&alternation(STOCK_ACTIONS)).unwrap();
        assert!(re.find("BUYING pressure").is_none());
    }
}
