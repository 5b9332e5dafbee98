// ── Back-office facade ──
//
// Session lifecycle, roster loads, committing bulk effects to the backend,
// and the dashboard feed with its poller. Cheaply cloneable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ispdesk_api::{BackofficeClient, NewClientDto, VoucherDto};

use crate::bulk::{BulkAction, BulkEffect};
use crate::config::BackofficeConfig;
use crate::convert::{meta_to_dto, overlay_from_dtos};
use crate::dashboard::{DashboardFeed, DashboardSnapshot, Poller, RefreshOutcome};
use crate::error::CoreError;
use crate::model::{ClientProfile, Connection, ConnectionId};
use crate::roster::{NewClient, RosterState};
use crate::session::{Session, SessionContext};
use crate::vouchers::Voucher;

/// Roster plus the generation of the load it came from.
struct RosterSlot {
    state: RosterState,
    generation: u64,
}

/// A bulk commit that stopped part way.
struct CommitFailure {
    /// Clients whose backend write went through, in write order.
    committed: Vec<ConnectionId>,
    error: CoreError,
}

impl CommitFailure {
    fn new(committed: Vec<ConnectionId>, error: impl Into<CoreError>) -> Self {
        Self {
            committed,
            error: error.into(),
        }
    }
}

#[derive(Clone)]
pub struct Backoffice {
    inner: Arc<BackofficeInner>,
}

struct BackofficeInner {
    config: BackofficeConfig,
    client: BackofficeClient,
    session: Mutex<Session>,
    roster: Mutex<RosterSlot>,
    roster_generation: AtomicU64,
    feed: Arc<DashboardFeed<BackofficeClient>>,
    poller: Mutex<Option<Poller>>,
    cancel: CancellationToken,
    warnings: Mutex<Vec<String>>,
}

impl Backoffice {
    /// Build the HTTP client. Does not contact the backend; call
    /// [`login()`](Self::login) next.
    pub fn new(config: BackofficeConfig) -> Result<Self, CoreError> {
        let client = BackofficeClient::new(config.url.as_str(), &config.transport())?;
        let mut roster = RosterState::new(String::new());
        roster.set_page_size(config.page_size);

        Ok(Self {
            inner: Arc::new(BackofficeInner {
                feed: Arc::new(DashboardFeed::new(client.clone())),
                client,
                session: Mutex::new(Session::new()),
                roster: Mutex::new(RosterSlot {
                    state: roster,
                    generation: 0,
                }),
                roster_generation: AtomicU64::new(0),
                poller: Mutex::new(None),
                cancel: CancellationToken::new(),
                warnings: Mutex::new(Vec::new()),
                config,
            }),
        })
    }

    pub fn config(&self) -> &BackofficeConfig {
        &self.inner.config
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Resolve the current user and start a session.
    pub async fn login(&self) -> Result<Arc<SessionContext>, CoreError> {
        let user = self.inner.client.me().await?;
        let ctx = SessionContext::from(user);
        self.inner
            .roster
            .lock()
            .await
            .state
            .set_tenant_slug(ctx.tenant.slug.clone());
        Ok(self.inner.session.lock().await.init(ctx))
    }

    /// Stop background work, end the backend session, drop local state.
    pub async fn logout(&self) {
        self.stop_polling().await;

        let had_session = self.inner.session.lock().await.is_active();
        if had_session {
            if let Err(e) = self.inner.client.logout().await {
                warn!(error = %e, "logout failed (non-fatal)");
            }
        }
        self.inner.session.lock().await.teardown();

        let mut slot = self.inner.roster.lock().await;
        let mut fresh = RosterState::new(String::new());
        fresh.set_page_size(self.inner.config.page_size);
        slot.state = fresh;
        // Loads still in flight belong to the old session.
        slot.generation = self.claim_roster_generation();
        debug!("logged out");
    }

    pub async fn session(&self) -> Result<Arc<SessionContext>, CoreError> {
        self.inner.session.lock().await.current()
    }

    // ── Roster ───────────────────────────────────────────────────────

    /// Fetch connections and client metadata concurrently and swap them in.
    /// On failure the previous roster is kept and the error returned.
    pub async fn refresh_roster(&self) -> Result<RefreshOutcome, CoreError> {
        self.session().await?;
        let generation = self.claim_roster_generation();

        let (conns, metas) = tokio::join!(
            self.inner.client.list_connections(),
            self.inner.client.list_clients()
        );
        let (conns, metas) = match (conns, metas) {
            (Ok(c), Ok(m)) => (c, m),
            (Err(e), _) | (_, Err(e)) => {
                let err = CoreError::from(e);
                warn!(error = %err, generation, "roster refresh failed, keeping prior data");
                self.push_warning(format!("Roster refresh failed: {err}")).await;
                return Err(err);
            }
        };

        let connections: Vec<Connection> = conns.into_iter().map(Connection::from).collect();
        let overlay = overlay_from_dtos(&connections, metas);

        let mut slot = self.inner.roster.lock().await;
        if slot.generation > generation {
            debug!(generation, "dropping superseded roster load");
            return Ok(RefreshOutcome::Superseded { generation });
        }
        if !self.inner.session.lock().await.is_active() {
            debug!(generation, "session ended during roster load, dropping it");
            return Err(CoreError::NotSignedIn);
        }
        info!(
            connections = connections.len(),
            with_metadata = overlay.len(),
            "roster loaded"
        );
        slot.state.replace_data(connections, overlay);
        slot.generation = generation;
        Ok(RefreshOutcome::Applied { generation })
    }

    /// Read the roster.
    pub async fn with_roster<R>(&self, f: impl FnOnce(&RosterState) -> R) -> R {
        f(&self.inner.roster.lock().await.state)
    }

    /// Edit local view state (filters, sort, page, selection).
    pub async fn update_roster<R>(&self, f: impl FnOnce(&mut RosterState) -> R) -> R {
        f(&mut self.inner.roster.lock().await.state)
    }

    /// Run a bulk action and write its changes back. The local roster takes
    /// exactly the writes the backend accepted: all of them, or on a
    /// mid-batch failure the ones before it (reported as
    /// [`CoreError::PartialBulk`]). Roster loads fetched before the swap
    /// are superseded by it.
    pub async fn run_bulk(
        &self,
        action: &BulkAction,
        today: NaiveDate,
    ) -> Result<BulkEffect, CoreError> {
        let ctx = self.session().await?;
        ctx.require_client_admin(action.name())?;

        let mut slot = self.inner.roster.lock().await;
        let mut next = slot.state.clone();
        let effect = next.execute(action, today)?;

        match self.commit(&effect, &next).await {
            Ok(()) => {
                slot.state = next;
                slot.generation = self.claim_roster_generation();
                Ok(effect)
            }
            Err(CommitFailure { committed, error }) if committed.is_empty() => {
                warn!(
                    action = action.name(),
                    error = %error,
                    "bulk commit failed, local roster unchanged"
                );
                Err(error)
            }
            Err(CommitFailure { committed, error }) => {
                let mut partial = slot.state.clone();
                partial.execute_on(action, &committed, today)?;
                slot.state = partial;
                slot.generation = self.claim_roster_generation();
                warn!(
                    action = action.name(),
                    committed = committed.len(),
                    total = effect.affected(),
                    error = %error,
                    "bulk commit stopped part way, applied the committed clients locally"
                );
                Err(CoreError::PartialBulk {
                    action: action.name().to_owned(),
                    committed: committed.iter().map(ToString::to_string).collect(),
                    reason: error.to_string(),
                })
            }
        }
    }

    /// Backend writes for `effect`, one client at a time.
    async fn commit(&self, effect: &BulkEffect, state: &RosterState) -> Result<(), CommitFailure> {
        let client = &self.inner.client;
        let mut committed = Vec::new();
        if let BulkEffect::StatusChanged { ids, status } = effect {
            let status = status.to_string();
            for id in ids {
                if let Err(e) = client.set_connection_status(id.as_str(), &status).await {
                    return Err(CommitFailure::new(committed, e));
                }
                committed.push(id.clone());
            }
        }
        for id in effect.meta_ids() {
            let Some(meta) = state.overlay().get(id.as_str()) else {
                continue;
            };
            if let Err(e) = client.upsert_client(&meta_to_dto(id, meta)).await {
                return Err(CommitFailure::new(committed, e));
            }
            committed.push(id.clone());
        }
        Ok(())
    }

    /// Register a client with the backend and append it to the roster.
    pub async fn add_client(&self, client: &NewClient) -> Result<ClientProfile, CoreError> {
        self.session().await?.require_client_admin("add clients")?;
        client.validate()?;

        let created = self
            .inner
            .client
            .create_client(&NewClientDto::from(client))
            .await?;
        let id = ConnectionId::new(created.id);

        let mut slot = self.inner.roster.lock().await;
        slot.state.add_client(id.clone(), client)?;
        info!(id = %id, name = %client.name, "client registered");
        slot.state
            .find(id.as_str())
            .cloned()
            .ok_or_else(|| CoreError::Internal(format!("client '{id}' missing after insert")))
    }

    // ── Dashboard ────────────────────────────────────────────────────

    pub fn dashboard(&self) -> watch::Receiver<DashboardSnapshot> {
        self.inner.feed.subscribe()
    }

    pub async fn refresh_dashboard(&self) -> Result<RefreshOutcome, CoreError> {
        self.session().await?;
        let outcome = self.inner.feed.refresh().await;
        if let Some(warning) = outcome.warning() {
            self.push_warning(format!("Dashboard: {warning}")).await;
        }
        Ok(outcome)
    }

    /// Start the background dashboard poller. No-op if already running.
    pub async fn start_polling(&self) -> Result<(), CoreError> {
        self.session().await?;
        let mut poller = self.inner.poller.lock().await;
        if poller.as_ref().is_some_and(Poller::is_running) {
            return Ok(());
        }
        *poller = Some(Poller::spawn(
            Arc::clone(&self.inner.feed),
            self.inner.config.poll_interval,
            self.inner.cancel.child_token(),
        ));
        debug!(interval = ?self.inner.config.poll_interval, "dashboard poller started");
        Ok(())
    }

    pub async fn stop_polling(&self) {
        let poller = self.inner.poller.lock().await.take();
        if let Some(poller) = poller {
            poller.shutdown().await;
        }
    }

    // ── Hotspot ──────────────────────────────────────────────────────

    pub async fn publish_vouchers(&self, vouchers: &[Voucher]) -> Result<(), CoreError> {
        self.session().await?.require_client_admin("publish vouchers")?;
        let dtos: Vec<VoucherDto> = vouchers.iter().map(VoucherDto::from).collect();
        self.inner.client.publish_vouchers(&dtos).await?;
        info!(count = dtos.len(), "vouchers published");
        Ok(())
    }

    // ── Warnings ─────────────────────────────────────────────────────

    /// Drain warnings accumulated by background or partial failures.
    pub async fn take_warnings(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.warnings.lock().await)
    }

    async fn push_warning(&self, warning: String) {
        self.inner.warnings.lock().await.push(warning);
    }

    /// Next roster generation. Any load holding an older one is stale.
    fn claim_roster_generation(&self) -> u64 {
        self.inner.roster_generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}
