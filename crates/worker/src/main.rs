use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;
mod watch;

#[derive(Debug, Parser)]
#[command(name = "pickboard_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render advisor records into display payloads (JSON).
    Render {
        /// JSON file holding an array of advisor records.
        #[arg(long, required_unless_present = "from_db")]
        input: Option<PathBuf>,

        /// Read records from DATABASE_URL instead of a file.
        #[arg(long, conflicts_with = "input")]
        from_db: bool,

        /// Write payloads here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Maximum number of records. Defaults to MAX_POSTS.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Periodically recompute the expiry-gauge position of one option pick.
    Watch {
        /// Post timestamp (ISO 8601).
        #[arg(long)]
        post_date: String,

        /// Expiry phrase as written by the advisor, e.g. "Feb-Mar 2026".
        #[arg(long)]
        expiry: String,

        /// Refresh interval. Defaults to POSITION_REFRESH_SECS.
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Stop after this many refreshes; runs until Ctrl-C otherwise.
        #[arg(long)]
        ticks: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = pickboard_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = match args.command {
        Command::Render {
            input,
            from_db,
            output,
            limit,
        } => {
            let source = if from_db {
                render::Source::Database
            } else {
                match input {
                    Some(path) => render::Source::File(path),
                    None => anyhow::bail!("either --input or --from-db is required"),
                }
            };
            let limit = limit.unwrap_or(settings.max_posts);
            render::run(&settings, source, output.as_deref(), limit).await
        }
        Command::Watch {
            post_date,
            expiry,
            interval_secs,
            ticks,
        } => {
            let interval = std::time::Duration::from_secs(
                interval_secs.unwrap_or(settings.position_refresh_secs),
            );
            watch::run(&post_date, &expiry, interval, ticks).await
        }
    };

    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "worker run failed");
    }
    result
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
