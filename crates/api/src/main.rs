use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pickboard_core::domain::record::AdvisorRecord;
use pickboard_core::render::{build_payload, PipelineConfig, RenderPayload};
use pickboard_core::time::{position_from_attributes, TemporalPosition};

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = pickboard_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();
    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    };

    let state = AppState {
        pool,
        pipeline: PipelineConfig::from_settings(&settings),
        max_posts: settings.max_posts,
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/render", post(render_record))
        .route("/position", get(get_position))
        .route("/posts/latest", get(get_latest_posts))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = settings.port.unwrap_or(DEFAULT_PORT);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    pool: Option<PgPool>,
    pipeline: PipelineConfig,
    max_posts: usize,
}

async fn render_record(
    State(state): State<AppState>,
    Json(record): Json<AdvisorRecord>,
) -> Json<RenderPayload> {
    Json(build_payload(&record, &state.pipeline, Utc::now()))
}

#[derive(Debug, Deserialize)]
struct PositionQuery {
    post_date: String,
    expiry: String,
}

async fn get_position(
    Query(query): Query<PositionQuery>,
) -> Result<Json<TemporalPosition>, StatusCode> {
    position_from_attributes(&query.post_date, &query.expiry, Utc::now())
        .map(Json)
        .map_err(|e| {
            tracing::debug!(error = %e, "position request rejected");
            StatusCode::UNPROCESSABLE_ENTITY
        })
}

#[derive(Debug, Deserialize)]
struct LatestQuery {
    limit: Option<usize>,
}

async fn get_latest_posts(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<Vec<RenderPayload>>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let limit = query.limit.unwrap_or(state.max_posts).clamp(1, state.max_posts.max(1));
    let records = pickboard_core::storage::advisor_outputs::latest_evaluations(pool, limit)
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let now = Utc::now();
    let payloads = records
        .iter()
        .map(|record| build_payload(record, &state.pipeline, now))
        .collect();
    Ok(Json(payloads))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &pickboard_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degraded_state() -> AppState {
        AppState {
            pool: None,
            pipeline: PipelineConfig::default(),
            max_posts: 50,
        }
    }

    #[tokio::test]
    async fn position_rejects_unparseable_expiry() {
        let query = PositionQuery {
            post_date: "2026-01-01T00:00:00Z".to_string(),
            expiry: "whenever".to_string(),
        };
        let err = get_position(Query(query)).await.unwrap_err();
        assert_eq!(err, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn position_accepts_view_attributes() {
        let query = PositionQuery {
            post_date: "2026-01-01T00:00:00".to_string(),
            expiry: "Dec 2099".to_string(),
        };
        let Json(position) = get_position(Query(query)).await.unwrap();
        assert!(position.percent >= 0.0 && position.percent <= 100.0);
    }

    #[tokio::test]
    async fn latest_posts_unavailable_without_db() {
        let err = get_latest_posts(State(degraded_state()), Query(LatestQuery { limit: None }))
            .await
            .unwrap_err();
        assert_eq!(err, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn render_endpoint_builds_payload() {
        let record: AdvisorRecord = serde_json::from_value(serde_json::json!({
            "post_id": 1,
            "post_date": "2026-01-01T00:00:00Z",
            "text": "**STOCK PICKS:**\nTop 1: XOM - BUY"
        }))
        .unwrap();
        let Json(payload) = render_record(State(degraded_state()), Json(record)).await;
        assert_eq!(payload.post_id, 1);
        assert_eq!(payload.header.stock.title, "XOM");
    }
}
