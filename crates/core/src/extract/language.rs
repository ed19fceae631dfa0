use serde::{Deserialize, Serialize};

// Share of CJK code points among non-whitespace characters at which a text is
// considered Chinese. Fixed so that detection stays deterministic.
pub const CJK_THRESHOLD: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageTag {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh")]
    Chinese,
}

impl LanguageTag {
    pub fn is_chinese(self) -> bool {
        matches!(self, LanguageTag::Chinese)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: CJK_THRESHOLD,
        }
    }
}

pub fn detect(text: &str, config: &DetectorConfig) -> LanguageTag {
    let mut total = 0usize;
    let mut cjk = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if is_cjk(c) {
            cjk += 1;
        }
    }

    // Empty input has no meaningful ratio.
    if total == 0 {
        return LanguageTag::English;
    }

    if cjk as f64 / total as f64 >= config.threshold {
        LanguageTag::Chinese
    } else {
        LanguageTag::English
    }
}

pub fn is_cjk(c: char) -> bool {
    matches!(c as u32, 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_default(text: &str) -> LanguageTag {
        detect(text, &DetectorConfig::default())
    }

    #[test]
    fn empty_and_blank_text_is_english() {
        assert_eq!(detect_default(""), LanguageTag::English);
        assert_eq!(detect_default("  \n\t "), LanguageTag::English);
    }

    #[test]
    fn threshold_boundary() {
        // 3 CJK out of 10 non-whitespace characters: exactly 30%.
        assert_eq!(detect_default("買入賣 ABCDEFG"), LanguageTag::Chinese);
        assert_eq!(detect_default("買入 ABCDEFGH"), LanguageTag::English);
        let below = format!("{}{}", "買".repeat(29), "a".repeat(71));
        assert_eq!(detect_default(&below), LanguageTag::English);
        let exact = format!("{}{}", "買".repeat(30), "a".repeat(70));
        assert_eq!(detect_default(&exact), LanguageTag::Chinese);
    }

    #[test]
    fn whitespace_is_not_counted() {
        let text = format!("買買買 {}", " ".repeat(50) + "abcdefg");
        assert_eq!(detect_default(&text), LanguageTag::Chinese);
    }

    #[test]
    fn threshold_is_taken_from_config() {
        let text = "買 abcdefghi";
        assert_eq!(detect(text, &DetectorConfig { threshold: 0.05 }), LanguageTag::Chinese);
        assert_eq!(detect(text, &DetectorConfig { threshold: 0.5 }), LanguageTag::English);
    }

    #[test]
    fn typical_outputs() {
        assert_eq!(
            detect_default("**股票建議：**\n**Top 1: XOM** - 買入\n能源板塊受惠於政策"),
            LanguageTag::Chinese
        );
        assert_eq!(
            detect_default("**STOCK PICKS:**\n**Top 1: XOM (ExxonMobil)** - BUY"),
            LanguageTag::English
        );
    }
}
