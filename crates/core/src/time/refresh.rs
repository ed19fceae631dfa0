use crate::time::position::{position_between, TemporalPosition};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const DEFAULT_REFRESH: Duration = Duration::from_secs(60 * 60);

pub struct PositionWatch {
    rx: watch::Receiver<TemporalPosition>,
    handle: JoinHandle<()>,
}

impl PositionWatch {
    pub fn spawn(post_ts: DateTime<Utc>, expiry_ts: DateTime<Utc>, period: Duration) -> Self {
        Self::spawn_with_clock(post_ts, expiry_ts, period, Utc::now)
    }

    pub fn spawn_with_clock<F>(
        post_ts: DateTime<Utc>,
        expiry_ts: DateTime<Utc>,
        period: Duration,
        clock: F,
    ) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + 'static,
    {
        // interval panics on a zero period
        let period = period.max(Duration::from_millis(1));
        let (tx, rx) = watch::channel(position_between(post_ts, expiry_ts, clock()));

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let current = position_between(post_ts, expiry_ts, clock());
                tracing::debug!(percent = current.percent, zone = ?current.zone, "position refreshed");
                if tx.send(current).is_err() {
                    break;
                }
            }
        });

        Self { rx, handle }
    }

    pub fn subscribe(&self) -> watch::Receiver<TemporalPosition> {
        self.rx.clone()
    }

    pub fn current(&self) -> TemporalPosition {
        *self.rx.borrow()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for PositionWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
