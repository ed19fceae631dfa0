pub mod domain;
pub mod extract;
pub mod ingest;
pub mod render;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;

    const DEFAULT_POSITION_REFRESH_SECS: u64 = 3600;
    const DEFAULT_MAX_POSTS: usize = 50;
    const DEFAULT_MAX_PICKS: usize = 3;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub port: Option<u16>,
        pub position_refresh_secs: u64,
        pub max_posts: usize,
        pub max_picks: usize,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                port: parse_env("PORT")?,
                position_refresh_secs: parse_env("POSITION_REFRESH_SECS")?
                    .unwrap_or(DEFAULT_POSITION_REFRESH_SECS),
                max_posts: parse_env("MAX_POSTS")?.unwrap_or(DEFAULT_MAX_POSTS),
                max_picks: parse_env("MAX_PICKS")?.unwrap_or(DEFAULT_MAX_PICKS),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }
    }

    fn parse_env<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match std::env::var(key) {
            Ok(s) if !s.trim().is_empty() => {
                let v = s
                    .trim()
                    .parse::<T>()
                    .with_context(|| format!("{key} has an invalid value: {s}"))?;
                Ok(Some(v))
            }
            _ => Ok(None),
        }
    }
}
