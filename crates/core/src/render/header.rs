use crate::domain::pick::{OptionPick, OptionType, StockAction, StockPick};
use crate::extract::LanguageTag;
use serde::Serialize;

pub fn select_header(
    stocks: &[StockPick],
    options: &[OptionPick],
) -> (Option<StockPick>, Option<OptionPick>) {
    (stocks.first().cloned(), options.first().cloned())
}

pub fn no_recommendation_label(lang: LanguageTag) -> &'static str {
    match lang {
        LanguageTag::Chinese => "無",
        LanguageTag::English => "NIL",
    }
}

pub fn action_label(action: StockAction, lang: LanguageTag) -> &'static str {
    match (action, lang) {
        (StockAction::Buy, LanguageTag::Chinese) => "買入 (BUY)",
        (StockAction::Sell, LanguageTag::Chinese) => "賣出 (SELL)",
        (StockAction::Pass, LanguageTag::Chinese) => "觀望 (PASS)",
        (action, LanguageTag::English) => action.as_str(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCard {
    // Ticker, `PASS` for the no-opportunity sentinel, otherwise the NIL label.
    pub title: String,
    pub label: Option<String>,
    pub empty: bool,
}

impl HeaderCard {
    fn empty(lang: LanguageTag) -> Self {
        Self {
            title: no_recommendation_label(lang).to_string(),
            label: None,
            empty: true,
        }
    }

    fn pass() -> Self {
        Self {
            title: "PASS".to_string(),
            label: None,
            empty: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderSummary {
    pub stock: HeaderCard,
    pub option: HeaderCard,
}

impl HeaderSummary {
    pub fn new(stock: Option<&StockPick>, option: Option<&OptionPick>, lang: LanguageTag) -> Self {
        let stock = match stock {
            None => HeaderCard::empty(lang),
            Some(pick) => match &pick.ticker {
                None => HeaderCard::pass(),
                Some(ticker) => HeaderCard {
                    title: ticker.clone(),
                    label: Some(action_label(pick.action, lang).to_string()),
                    empty: false,
                },
            },
        };

        let option = match option {
            None => HeaderCard::empty(lang),
            Some(pick) => match &pick.ticker {
                None => HeaderCard::pass(),
                Some(ticker) => HeaderCard {
                    title: ticker.clone(),
                    label: (pick.option_type != OptionType::Pass)
                        .then(|| pick.option_type.as_str().to_string()),
                    empty: false,
                },
            },
        };

        Self { stock, option }
    }
}
