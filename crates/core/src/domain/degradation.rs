use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Stocks,
    Options,
    Verdict,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SectionKind::Stocks => "stock",
            SectionKind::Options => "option",
            SectionKind::Verdict => "verdict",
        })
    }
}

// A non-fatal condition met while deriving a payload. Each one has a defined
// fallback; they are reported alongside the payload, never raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    #[error("no section markers found; whole text rendered as verdict")]
    MalformedSection,

    #[error("no {section} picks could be extracted")]
    NoPicksFound { section: SectionKind },

    #[error("expiry phrase {phrase:?} has no recognisable year or month")]
    UnparseableExpiry { phrase: String },

    #[error("expiry is not after the post timestamp; position clamped to zero")]
    DegenerateInterval,
}
