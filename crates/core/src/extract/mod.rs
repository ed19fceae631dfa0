pub mod language;
pub mod picks;
pub mod sections;
pub mod vocab;

pub use language::{detect, DetectorConfig, LanguageTag};
pub use picks::{extract_options, extract_stocks, ExtractConfig};
pub use sections::{split, Sections};
