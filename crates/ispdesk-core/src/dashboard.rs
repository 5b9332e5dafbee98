// ── Dashboard feed ──
//
// Fetches dashboard stats and the portal overview concurrently. Each half
// that succeeds is applied even if the other fails; failures are folded
// into one warning. Every refresh takes a generation number and a result
// older than the newest applied one is dropped.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{DashboardStats, PortalOverview};

/// Shortest allowed poll period.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Where dashboard data comes from.
pub trait DashboardSource: Send + Sync + 'static {
    fn fetch_stats(&self) -> impl Future<Output = Result<DashboardStats, CoreError>> + Send;
    fn fetch_portal(&self) -> impl Future<Output = Result<PortalOverview, CoreError>> + Send;
}

impl DashboardSource for ispdesk_api::BackofficeClient {
    async fn fetch_stats(&self) -> Result<DashboardStats, CoreError> {
        Ok(self.dashboard().await?.into())
    }

    async fn fetch_portal(&self) -> Result<PortalOverview, CoreError> {
        Ok(self.portal_overview().await?.into())
    }
}

/// Last applied dashboard state. `generation` 0 means nothing loaded yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub stats: Option<DashboardStats>,
    pub portal: Option<PortalOverview>,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { generation: u64 },
    /// Some halves failed; the rest was applied.
    Partial { generation: u64, warning: String },
    /// Everything failed; prior state kept.
    Failed { warning: String },
    /// A newer refresh landed first; this result was dropped.
    Superseded { generation: u64 },
}

impl RefreshOutcome {
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Partial { warning, .. } | Self::Failed { warning } => Some(warning),
            Self::Applied { .. } | Self::Superseded { .. } => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. } | Self::Partial { .. })
    }
}

pub struct DashboardFeed<S> {
    source: S,
    tx: watch::Sender<DashboardSnapshot>,
    next_generation: AtomicU64,
}

impl<S: DashboardSource> DashboardFeed<S> {
    pub fn new(source: S) -> Self {
        let (tx, _) = watch::channel(DashboardSnapshot::default());
        Self {
            source,
            tx,
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.tx.borrow().clone()
    }

    /// One fan-out/fan-in pass.
    pub async fn refresh(&self) -> RefreshOutcome {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (stats, portal) = tokio::join!(self.source.fetch_stats(), self.source.fetch_portal());

        let mut failures = Vec::new();
        let stats = stats
            .map_err(|e| {
                warn!(error = %e, generation, "dashboard stats fetch failed");
                failures.push(format!("dashboard stats: {e}"));
            })
            .ok();
        let portal = portal
            .map_err(|e| {
                warn!(error = %e, generation, "portal overview fetch failed");
                failures.push(format!("portal overview: {e}"));
            })
            .ok();

        if stats.is_none() && portal.is_none() {
            return RefreshOutcome::Failed {
                warning: failures.join("; "),
            };
        }

        let applied = self.tx.send_if_modified(|snap| {
            if snap.generation > generation {
                return false;
            }
            if let Some(stats) = stats {
                snap.stats = Some(stats);
            }
            if let Some(portal) = portal {
                snap.portal = Some(portal);
            }
            snap.generation = generation;
            snap.refreshed_at = Some(Utc::now());
            true
        });

        if !applied {
            debug!(generation, "dropping superseded dashboard refresh");
            return RefreshOutcome::Superseded { generation };
        }
        if failures.is_empty() {
            RefreshOutcome::Applied { generation }
        } else {
            RefreshOutcome::Partial {
                generation,
                warning: failures.join("; "),
            }
        }
    }
}

// ── Poller ──────────────────────────────────────────────────────────

/// Background task re-running [`DashboardFeed::refresh`] on an interval.
pub struct Poller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn<S: DashboardSource>(
        feed: Arc<DashboardFeed<S>>,
        period: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let period = period.max(MIN_POLL_INTERVAL);
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = interval.tick() => {
                        tokio::select! {
                            biased;
                            () = token.cancelled() => break,
                            outcome = feed.refresh() => {
                                if let Some(warning) = outcome.warning() {
                                    warn!(warning, "dashboard poll degraded");
                                }
                            }
                        }
                    }
                }
            }
            debug!("dashboard poller stopped");
        });
        Self { cancel, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Cancel and wait for the task to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "dashboard poller panicked");
        }
    }
}
