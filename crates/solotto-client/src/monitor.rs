//! Periodic season refresh.
//!
//! Drives [`Reconciler::season_state`] on a repeating interval and on
//! external "tickets updated" nudges, publishing each result to a shared
//! snapshot handle. Refreshes are idempotent and last-write-wins: a stale
//! cycle that lands after a newer one is harmlessly overwritten on the
//! next pass, so in-flight refreshes are never force-cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};

use crate::reconcile::Reconciler;
use crate::state::SeasonSnapshot;

pub struct SeasonMonitor {
    reconciler: Reconciler,
    season_id: u32,
    period: Duration,
    snapshot: Arc<RwLock<SeasonSnapshot>>,
    nudge: watch::Receiver<u64>,
    stop: watch::Receiver<bool>,
}

/// Consumer-side handle: read the latest snapshot, nudge an immediate
/// refresh after a purchase, or stop the loop.
#[derive(Clone)]
pub struct MonitorHandle {
    snapshot: Arc<RwLock<SeasonSnapshot>>,
    nudge: watch::Sender<u64>,
    stop: watch::Sender<bool>,
}

impl MonitorHandle {
    pub async fn latest(&self) -> SeasonSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Requests an immediate refresh, e.g. right after a confirmed
    /// purchase.
    pub fn notify_tickets_updated(&self) {
        self.nudge.send_modify(|generation| *generation += 1);
    }

    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }
}

/// Builds a monitor for one season. The loop starts on [`SeasonMonitor::run`];
/// until the first refresh completes the handle serves the default snapshot.
pub fn season_monitor(
    reconciler: Reconciler,
    season_id: u32,
    period: Duration,
) -> (SeasonMonitor, MonitorHandle) {
    let snapshot = Arc::new(RwLock::new(reconciler.default_snapshot(season_id)));
    let (nudge_tx, nudge_rx) = watch::channel(0u64);
    let (stop_tx, stop_rx) = watch::channel(false);
    let monitor = SeasonMonitor {
        reconciler,
        season_id,
        period,
        snapshot: Arc::clone(&snapshot),
        nudge: nudge_rx,
        stop: stop_rx,
    };
    let handle = MonitorHandle {
        snapshot,
        nudge: nudge_tx,
        stop: stop_tx,
    };
    (monitor, handle)
}

impl SeasonMonitor {
    /// Runs until stopped or until every handle is dropped. The first
    /// interval tick fires immediately, so consumers see real state as
    /// soon as the first reconciliation completes.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut nudge = self.nudge.clone();
        let mut stop = self.stop.clone();
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = nudge.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                    continue;
                }
            }
            self.refresh_once().await;
        }
        tracing::debug!(season_id = self.season_id, "season monitor stopped");
    }

    /// One reconciliation pass, publishing the result.
    pub async fn refresh_once(&self) {
        let snapshot = self.reconciler.season_state(self.season_id).await;
        *self.snapshot.write().await = snapshot;
    }
}
