use crate::domain::record::AdvisorRecord;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[async_trait::async_trait]
pub trait RecordProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_records(&self, limit: usize) -> Result<Vec<AdvisorRecord>>;
}

#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl RecordProvider for JsonFileProvider {
    fn provider_name(&self) -> &'static str {
        "json_file"
    }

    async fn fetch_records(&self, limit: usize) -> Result<Vec<AdvisorRecord>> {
        let raw = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let mut records: Vec<AdvisorRecord> = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse records in {}", self.path.display()))?;

        records.truncate(limit);
        tracing::info!(
            provider = self.provider_name(),
            path = %self.path.display(),
            count = records.len(),
            "records loaded"
        );
        Ok(records)
    }
}
