use anyhow::Context;
use pickboard_core::time::expiry::{expiry_instant, resolve_expiry};
use pickboard_core::time::parse_timestamp;
use pickboard_core::time::refresh::PositionWatch;
use std::time::Duration;

pub async fn run(post_date: &str, expiry: &str, interval: Duration, ticks: Option<u32>) -> anyhow::Result<()> {
    let post_ts = parse_timestamp(post_date)
        .with_context(|| format!("unrecognised --post-date {post_date:?}"))?;
    let expiry_date = resolve_expiry(expiry, post_ts)?;

    let watch = PositionWatch::spawn(post_ts, expiry_instant(expiry_date), interval);
    let mut rx = watch.subscribe();

    let initial = watch.current();
    tracing::info!(%expiry_date, percent = initial.percent, zone = ?initial.zone, "watching position");

    let mut seen = 0u32;
    while ticks.map_or(true, |max| seen < max) {
        tokio::select! {
            changed = rx.changed() => {
                changed.context("position task stopped")?;
                let current = *rx.borrow_and_update();
                seen += 1;
                tracing::info!(tick = seen, percent = current.percent, zone = ?current.zone, "position");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    watch.stop();
    Ok(())
}
