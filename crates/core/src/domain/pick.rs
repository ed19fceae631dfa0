use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StockAction {
    Buy,
    Sell,
    Pass,
}

impl StockAction {
    pub fn as_str(self) -> &'static str {
        match self {
            StockAction::Buy => "BUY",
            StockAction::Sell => "SELL",
            StockAction::Pass => "PASS",
        }
    }
}

impl fmt::Display for StockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
    Pass,
}

impl OptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::Call => "CALL",
            OptionType::Put => "PUT",
            OptionType::Pass => "PASS",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Ranked {
    fn rank(&self) -> u32;
}

// `ticker` is `None` only for the "no opportunity" sentinel, which records that
// the advisor explicitly passed rather than that nothing could be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPick {
    pub rank: u32,
    pub ticker: Option<String>,
    pub action: StockAction,
    pub company_name: Option<String>,
}

impl StockPick {
    pub fn no_opportunity() -> Self {
        Self {
            rank: 1,
            ticker: None,
            action: StockAction::Pass,
            company_name: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.ticker.is_none()
    }
}

impl Ranked for StockPick {
    fn rank(&self) -> u32 {
        self.rank
    }
}

// Serializes back into the advisor convention, so the output can be fed to the
// extractor again.
impl fmt::Display for StockPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(ticker) = &self.ticker else {
            return f.write_str("PASS");
        };
        write!(f, "Top {}: {ticker}", self.rank)?;
        if let Some(name) = &self.company_name {
            write!(f, " ({name})")?;
        }
        write!(f, " - {}", self.action)
    }
}

// A ranked option recommendation. The expiry phrase is kept verbatim; it is only
// resolved to a date when a view asks for a temporal position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionPick {
    pub rank: u32,
    pub ticker: Option<String>,
    pub option_type: OptionType,
    pub strike: Option<f64>,
    pub expiry_phrase: Option<String>,
}

impl OptionPick {
    pub fn no_opportunity() -> Self {
        Self {
            rank: 1,
            ticker: None,
            option_type: OptionType::Pass,
            strike: None,
            expiry_phrase: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.ticker.is_none()
    }
}

impl Ranked for OptionPick {
    fn rank(&self) -> u32 {
        self.rank
    }
}

impl fmt::Display for OptionPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(ticker) = &self.ticker else {
            return f.write_str("PASS");
        };
        write!(f, "Top {}: {ticker} {}", self.rank, self.option_type)?;
        if let Some(strike) = self.strike {
            write!(f, " at ${strike}")?;
        }
        if let Some(expiry) = &self.expiry_phrase {
            write!(f, " exp {expiry}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_pick_serializes_in_advisor_convention() {
        let pick = StockPick {
            rank: 2,
            ticker: Some("XOM".to_string()),
            action: StockAction::Sell,
            company_name: Some("ExxonMobil".to_string()),
        };
        assert_eq!(pick.to_string(), "Top 2: XOM (ExxonMobil) - SELL");
        assert_eq!(StockPick::no_opportunity().to_string(), "PASS");
    }

    #[test]
    fn option_pick_omits_absent_fields() {
        let pick = OptionPick {
            rank: 1,
            ticker: Some("LMT".to_string()),
            option_type: OptionType::Call,
            strike: Some(512.5),
            expiry_phrase: None,
        };
        assert_eq!(pick.to_string(), "Top 1: LMT CALL at $512.5");
    }

    #[test]
    fn actions_serialize_uppercase() {
        let v = serde_json::to_value(StockAction::Buy).unwrap();
        assert_eq!(v, serde_json::json!("BUY"));
        let v = serde_json::to_value(OptionType::Put).unwrap();
        assert_eq!(v, serde_json::json!("PUT"));
    }
}
