use crate::domain::record::AdvisorRecord;
use crate::ingest::RecordProvider;
use anyhow::Context;

// Name under which the upstream orchestrator stores the final, unified advice.
pub const EVALUATOR_NAME: &str = "TradeEvaluator";

// Newest evaluator output per post; pinned posts first, then newest post first.
const LATEST_EVALUATIONS: &str = "\
SELECT p.id, p.post_date::text, COALESCE(p.is_pinned, FALSE), latest.created_at::text, latest.output_content \
FROM posts p \
JOIN LATERAL ( \
    SELECT ao.output_content, ao.created_at \
    FROM ai_outputs ao \
    WHERE ao.post_id = p.id AND ao.ai_name = $1 \
    ORDER BY ao.created_at DESC \
    LIMIT 1 \
) latest ON TRUE \
ORDER BY COALESCE(p.is_pinned, FALSE) DESC, p.post_date DESC \
LIMIT $2";

type EvaluationRow = (i64, String, bool, Option<String>, String);

pub async fn latest_evaluations(pool: &sqlx::PgPool, limit: usize) -> anyhow::Result<Vec<AdvisorRecord>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = sqlx::query_as::<_, EvaluationRow>(LATEST_EVALUATIONS)
        .bind(EVALUATOR_NAME)
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("select latest evaluator outputs failed")?;

    Ok(rows.into_iter().map(record_from_row).collect())
}

fn record_from_row((post_id, post_date, is_pinned, analysis_date, text): EvaluationRow) -> AdvisorRecord {
    AdvisorRecord {
        post_id,
        post_date,
        analysis_date,
        language_flag: None,
        is_pinned,
        text,
    }
}

#[derive(Debug, Clone)]
pub struct PgRecordProvider {
    pool: sqlx::PgPool,
}

impl PgRecordProvider {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RecordProvider for PgRecordProvider {
    fn provider_name(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_records(&self, limit: usize) -> anyhow::Result<Vec<AdvisorRecord>> {
        latest_evaluations(&self.pool, limit).await
    }
}
