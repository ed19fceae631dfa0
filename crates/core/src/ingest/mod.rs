pub mod provider;

pub use provider::{JsonFileProvider, RecordProvider};
