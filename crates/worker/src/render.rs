use anyhow::Context;
use pickboard_core::config::Settings;
use pickboard_core::ingest::{JsonFileProvider, RecordProvider};
use pickboard_core::render::{build_payload, PipelineConfig, RenderPayload};
use pickboard_core::storage::PgRecordProvider;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum Source {
    File(PathBuf),
    Database,
}

pub async fn run(
    settings: &Settings,
    source: Source,
    output: Option<&Path>,
    limit: usize,
) -> anyhow::Result<()> {
    let provider: Box<dyn RecordProvider> = match source {
        Source::File(path) => Box::new(JsonFileProvider::new(path)),
        Source::Database => {
            let db_url = settings.require_database_url()?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(2)
                .connect(db_url)
                .await
                .context("connect DATABASE_URL failed")?;
            Box::new(PgRecordProvider::new(pool))
        }
    };

    let records = provider.fetch_records(limit).await?;
    let pipeline = PipelineConfig::from_settings(settings);
    let now = chrono::Utc::now();

    let payloads: Vec<RenderPayload> = records
        .iter()
        .map(|record| build_payload(record, &pipeline, now))
        .collect();

    let degraded = payloads.iter().filter(|p| !p.degradations.is_empty()).count();
    tracing::info!(
        provider = provider.provider_name(),
        rendered = payloads.len(),
        degraded,
        "render run finished"
    );

    let json = serde_json::to_string_pretty(&payloads).context("serialize payloads failed")?;
    match output {
        Some(path) => tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> Settings {
        Settings {
            database_url: None,
            sentry_dsn: None,
            port: None,
            position_refresh_secs: 3600,
            max_posts: 50,
            max_picks: 3,
        }
    }

    #[tokio::test]
    async fn renders_file_records_to_output() {
        let dir = std::env::temp_dir();
        let input = dir.join(format!("pickboard-worker-in-{}.json", std::process::id()));
        let output = dir.join(format!("pickboard-worker-out-{}.json", std::process::id()));
        let records = json!([
            {"post_id": 9, "post_date": "2026-01-02T00:00:00Z", "text": "**STOCK PICKS:**\nTop 1: XOM - BUY"},
            {"post_id": 8, "post_date": "2026-01-01T00:00:00Z", "text": "no structure here"}
        ]);
        std::fs::write(&input, serde_json::to_vec(&records).unwrap()).unwrap();

        run(&settings(), Source::File(input.clone()), Some(&output), 1)
            .await
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
        let payloads = written.as_array().unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["post_id"], 9);
        assert_eq!(payloads[0]["stock_picks"][0]["ticker"], "XOM");

        std::fs::remove_file(input).ok();
        std::fs::remove_file(output).ok();
    }

    #[tokio::test]
    async fn database_source_requires_url() {
        let err = run(&settings(), Source::Database, None, 1).await.unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }
}
