// ── Roster state ──
//
// Owns the connection store, metadata overlay, filter/sort/page request
// and selection. Derived rows are recomputed in a fixed order
// (project → filter → sort → clamp page → prune selection) and memoized
// on (data version, filters, sort).

use chrono::NaiveDate;
use tracing::debug;

use crate::bulk::{self, BulkAction, BulkEffect};
use crate::error::CoreError;
use crate::model::{
    ClientMeta, ClientProfile, Connection, ConnectionId, ConnectionStatus, Plan, Zone,
};
use crate::overlay::MetadataOverlay;
use crate::page::{self, Page, PageRequest, Selection};
use crate::pipeline::{self, RosterFilters, SortSpec};
use crate::projector;
use crate::store::ConnectionStore;

/// Form input for registering a new client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewClient {
    pub name: String,
    pub ip: String,
    pub mac: String,
    pub plan: Plan,
    pub zone: Zone,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub plan_cost: Option<f64>,
}

impl NewClient {
    /// Reject blank required fields.
    pub fn validate(&self) -> Result<(), CoreError> {
        let blank: Vec<&str> = [("name", &self.name), ("ip", &self.ip), ("mac", &self.mac)]
            .into_iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| k)
            .collect();
        if blank.is_empty() {
            Ok(())
        } else {
            Err(CoreError::ValidationFailed {
                message: format!("required field(s) missing: {}", blank.join(", ")),
            })
        }
    }

    fn to_meta(&self) -> ClientMeta {
        ClientMeta {
            name: self.name.trim().to_owned(),
            plan: self.plan,
            zone: self.zone,
            debt: 0.0,
            tickets: 0,
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            router_id: None,
            plan_cost: self.plan_cost,
            lan_interface: None,
            cutoff_day: None,
            screen_notice: None,
            monthly_usage_gb: None,
            support_priority: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    data_version: u64,
    filters: RosterFilters,
    sort: SortSpec,
}

#[derive(Debug, Clone, Default)]
struct Derived {
    projected_version: Option<u64>,
    profiles: Vec<ClientProfile>,
    key: Option<CacheKey>,
    filtered: Vec<ClientProfile>,
}

#[derive(Debug, Clone)]
pub struct RosterState {
    tenant_slug: String,
    store: ConnectionStore,
    overlay: MetadataOverlay,
    filters: RosterFilters,
    sort: SortSpec,
    page: PageRequest,
    selection: Selection,
    data_version: u64,
    derived: Derived,
}

impl RosterState {
    pub fn new(tenant_slug: impl Into<String>) -> Self {
        let mut state = Self {
            tenant_slug: tenant_slug.into(),
            store: ConnectionStore::new(),
            overlay: MetadataOverlay::new(),
            filters: RosterFilters::default(),
            sort: SortSpec::default(),
            page: PageRequest::default(),
            selection: Selection::new(),
            data_version: 0,
            derived: Derived::default(),
        };
        state.recompute();
        state
    }

    pub fn with_data(
        tenant_slug: impl Into<String>,
        connections: Vec<Connection>,
        overlay: MetadataOverlay,
    ) -> Self {
        let mut state = Self::new(tenant_slug);
        state.replace_data(connections, overlay);
        state
    }

    // ── Data ─────────────────────────────────────────────────────────

    /// Swap in freshly fetched data.
    pub fn replace_data(&mut self, connections: Vec<Connection>, overlay: MetadataOverlay) {
        self.store.replace_all(connections);
        self.overlay = overlay;
        self.bump();
    }

    pub fn set_tenant_slug(&mut self, slug: impl Into<String>) {
        self.tenant_slug = slug.into();
        self.bump();
    }

    /// Register a provisioned connection with a full metadata record.
    pub fn add_client(&mut self, id: ConnectionId, client: &NewClient) -> Result<(), CoreError> {
        client.validate()?;
        let conn = Connection::new(
            id.clone(),
            client.ip.trim(),
            client.mac.trim(),
            ConnectionStatus::Active,
        );
        self.store.push(conn)?;
        self.overlay.insert(id, client.to_meta());
        self.bump();
        Ok(())
    }

    /// Run one bulk action against the current filtered set.
    pub fn execute(
        &mut self,
        action: &BulkAction,
        today: NaiveDate,
    ) -> Result<BulkEffect, CoreError> {
        let effect = bulk::execute(
            action,
            &self.selection,
            &self.derived.filtered,
            &mut self.store,
            &mut self.overlay,
            today,
        )?;
        if action.is_mutating() {
            self.bump();
        }
        Ok(effect)
    }

    /// [`execute`](Self::execute) against exactly `ids` instead of the
    /// selection. The selection is restored afterwards, pruned as usual.
    pub fn execute_on(
        &mut self,
        action: &BulkAction,
        ids: &[ConnectionId],
        today: NaiveDate,
    ) -> Result<BulkEffect, CoreError> {
        let mut only = Selection::new();
        for id in ids {
            only.insert(id.clone());
        }
        let saved = std::mem::replace(&mut self.selection, only);
        let result = self.execute(action, today);
        self.selection = saved;
        self.recompute();
        result
    }

    // ── Filter / sort / page ─────────────────────────────────────────

    /// Edit the filters in place. The page resets to 1 if anything changed.
    pub fn update_filters(&mut self, edit: impl FnOnce(&mut RosterFilters)) -> bool {
        let before = self.filters.clone();
        edit(&mut self.filters);
        let changed = self.filters != before;
        if changed {
            self.page.current_page = 1;
            self.recompute();
        }
        changed
    }

    pub fn set_filters(&mut self, filters: RosterFilters) -> bool {
        self.update_filters(|f| *f = filters)
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.recompute();
    }

    /// Zero counts as one. Always returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page = PageRequest::new(page_size, 1);
        self.recompute();
    }

    /// Clamped into the valid range.
    pub fn set_page(&mut self, page: usize) {
        self.page.current_page = page.max(1);
        self.page.current_page = self.page.clamped(self.derived.filtered.len());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page.current_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.current_page.saturating_sub(1));
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Flip one row. Only rows in the filtered set can be selected.
    pub fn toggle(&mut self, id: &str) -> Result<bool, CoreError> {
        let profile = self.filtered_profile(id)?;
        let id = profile.id.clone();
        Ok(self.selection.toggle(&id))
    }

    /// Select or deselect every row on the current page.
    pub fn toggle_current_page(&mut self) -> bool {
        let page = page::paginate(
            &self.derived.filtered,
            self.page.page_size,
            self.page.current_page,
        );
        let ids: Vec<ConnectionId> = page.items.iter().map(|p| p.id.clone()).collect();
        self.selection.toggle_page(&ids)
    }

    /// Select rows by id or code; fails on the first one not in the
    /// filtered set and leaves the selection untouched.
    pub fn select<S: AsRef<str>>(&mut self, identifiers: &[S]) -> Result<(), CoreError> {
        let ids = identifiers
            .iter()
            .map(|raw| self.filtered_profile(raw.as_ref()).map(|p| p.id.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        for id in ids {
            self.selection.insert(id);
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn page(&self) -> Page<'_, ClientProfile> {
        page::paginate(
            &self.derived.filtered,
            self.page.page_size,
            self.page.current_page,
        )
    }

    /// Filtered and sorted rows.
    pub fn filtered(&self) -> &[ClientProfile] {
        &self.derived.filtered
    }

    /// Every projected row, in store order.
    pub fn profiles(&self) -> &[ClientProfile] {
        &self.derived.profiles
    }

    /// Look up a row by connection id or display code.
    pub fn find(&self, identifier: &str) -> Option<&ClientProfile> {
        find_in(&self.derived.profiles, identifier)
    }

    pub fn filters(&self) -> &RosterFilters {
        &self.filters
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page_request(&self) -> PageRequest {
        self.page
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn store(&self) -> &ConnectionStore {
        &self.store
    }

    pub fn overlay(&self) -> &MetadataOverlay {
        &self.overlay
    }

    pub fn tenant_slug(&self) -> &str {
        &self.tenant_slug
    }

    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    // ── Internals ────────────────────────────────────────────────────

    fn filtered_profile(&self, identifier: &str) -> Result<&ClientProfile, CoreError> {
        find_in(&self.derived.filtered, identifier).ok_or_else(|| CoreError::ClientNotFound {
            identifier: identifier.to_owned(),
        })
    }

    fn bump(&mut self) {
        self.data_version += 1;
        self.recompute();
    }

    fn recompute(&mut self) {
        if self.derived.projected_version != Some(self.data_version) {
            self.derived.profiles =
                projector::project(self.store.as_slice(), &self.overlay, &self.tenant_slug);
            self.derived.projected_version = Some(self.data_version);
        }

        let key = CacheKey {
            data_version: self.data_version,
            filters: self.filters.clone(),
            sort: self.sort,
        };
        if self.derived.key.as_ref() != Some(&key) {
            self.derived.filtered =
                pipeline::apply(&self.derived.profiles, &self.filters, self.sort);
            self.derived.key = Some(key);
            debug!(
                total = self.derived.profiles.len(),
                filtered = self.derived.filtered.len(),
                "roster recomputed"
            );
        }

        self.page.current_page = self.page.clamped(self.derived.filtered.len());
        let pruned = self
            .selection
            .prune(self.derived.filtered.iter().map(|p| &p.id));
        if pruned > 0 {
            debug!(pruned, "selection pruned to filtered rows");
        }
    }
}

fn find_in<'a>(rows: &'a [ClientProfile], identifier: &str) -> Option<&'a ClientProfile> {
    let identifier = identifier.trim();
    rows.iter()
        .find(|p| p.id.as_str() == identifier)
        .or_else(|| rows.iter().find(|p| p.code.eq_ignore_ascii_case(identifier)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Risk;
    use crate::pipeline::Segment;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
    }

    fn roster(count: usize) -> RosterState {
        let conns = (0..count)
            .map(|i| {
                let status = match i % 3 {
                    0 => ConnectionStatus::Active,
                    1 => ConnectionStatus::Idle,
                    _ => ConnectionStatus::Offline,
                };
                Connection::new(
                    format!("c{i:02}"),
                    format!("10.0.0.{}", i + 1),
                    "aa:bb:cc:dd:ee:01",
                    status,
                )
            })
            .collect();
        RosterState::with_data("fibra", conns, MetadataOverlay::new())
    }

    #[test]
    fn filter_change_resets_page() {
        let mut r = roster(30);
        r.set_page(3);
        assert_eq!(r.page().current_page, 3);

        assert!(r.update_filters(|f| f.zone = Some(Zone::Centro)));
        assert_eq!(r.page_request().current_page, 1);
    }

    #[test]
    fn unchanged_filters_keep_page() {
        let mut r = roster(30);
        r.set_page(2);
        assert!(!r.update_filters(|f| f.search = String::new()));
        assert_eq!(r.page().current_page, 2);
    }

    #[test]
    fn shrinking_page_size_resets_and_set_page_clamps() {
        let mut r = roster(30);
        r.set_page(3);
        r.set_page_size(25);
        assert_eq!(r.page().current_page, 1);

        r.set_page(9);
        let page = r.page();
        assert_eq!(page.current_page, 2);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn data_shrink_clamps_page() {
        let mut r = roster(30);
        r.set_page(3);
        let fewer = r.store().as_slice()[..12].to_vec();
        r.replace_data(fewer, MetadataOverlay::new());
        assert_eq!(r.page().current_page, 2);
        assert_eq!(r.page().items.len(), 2);
    }

    #[test]
    fn selection_survives_paging_and_is_pruned_by_filters() {
        let mut r = roster(30);
        r.set_page(2);
        assert!(r.toggle_current_page());
        let page_two: Vec<ConnectionId> = r.page().items.iter().map(|p| p.id.clone()).collect();
        assert_eq!(r.selection().len(), 10);

        r.set_page(1);
        assert_eq!(r.selection().len(), 10);

        r.update_filters(|f| f.status = Some(ConnectionStatus::Offline));
        let filtered: Vec<&ConnectionId> = r.filtered().iter().map(|p| &p.id).collect();
        assert!(r.selection().iter().all(|id| filtered.contains(&id)));

        let survivors = page_two
            .iter()
            .filter(|id| r.find(id.as_str()).unwrap().status == ConnectionStatus::Offline)
            .count();
        assert_eq!(r.selection().len(), survivors);
    }

    #[test]
    fn toggle_rejects_rows_outside_filter() {
        let mut r = roster(6);
        r.update_filters(|f| f.status = Some(ConnectionStatus::Active));
        assert!(matches!(r.toggle("c01"), Err(CoreError::ClientNotFound { .. })));
        assert!(r.toggle("c00").unwrap());
        assert!(!r.toggle("CL-0001").unwrap());
    }

    #[test]
    fn reminder_bumps_version_and_rederives_risk() {
        let mut r = roster(3);
        r.select(&["c00"]).unwrap();
        let version = r.data_version();
        r.execute(&BulkAction::Reminder, today()).unwrap();
        assert_eq!(r.data_version(), version + 1);
        assert_eq!(r.find("c00").unwrap().tickets, 1);
        assert!(!r.find("c00").unwrap().synthetic);
    }

    #[test]
    fn suspend_with_status_filter_prunes_selection() {
        let mut r = roster(6);
        r.update_filters(|f| f.status = Some(ConnectionStatus::Idle));
        r.select(&["c01", "c04"]).unwrap();
        let effect = r.execute(&BulkAction::Suspend, today()).unwrap();
        assert_eq!(effect.affected(), 2);
        assert!(r.filtered().is_empty());
        assert!(r.selection().is_empty());
        assert_eq!(r.find("c04").unwrap().risk, Risk::High);
    }

    #[test]
    fn export_is_not_a_data_change() {
        let mut r = roster(5);
        let version = r.data_version();
        r.execute(&BulkAction::Export { columns: vec![] }, today())
            .unwrap();
        assert_eq!(r.data_version(), version);
    }

    #[test]
    fn add_client_validates_and_appends() {
        let mut r = roster(2);
        let blank = NewClient {
            name: " ".into(),
            ..NewClient::default()
        };
        let err = r.add_client(ConnectionId::from("new"), &blank).unwrap_err();
        assert!(err.to_string().contains("name, ip, mac"));
        assert_eq!(r.profiles().len(), 2);

        let client = NewClient {
            name: "Elena Paredes".into(),
            ip: "10.9.0.2".into(),
            mac: "AA-BB-CC-00-11-22".into(),
            plan: Plan::Mbps60,
            zone: Zone::Este,
            ..NewClient::default()
        };
        r.add_client(ConnectionId::from("new"), &client).unwrap();
        let row = r.find("CL-0003").unwrap();
        assert_eq!(row.username, "elena@fibra.net");
        assert_eq!(row.status, ConnectionStatus::Active);
        assert_eq!(row.mac.as_str(), "aa:bb:cc:00:11:22");
        assert!(!row.synthetic);

        assert!(r.add_client(ConnectionId::from("new"), &client).is_err());
    }

    #[test]
    fn segment_and_sort_compose() {
        let mut r = roster(9);
        r.update_filters(|f| f.segment = Segment::Delinquent);
        r.set_sort(SortSpec::new(
            crate::pipeline::SortField::Debt,
            crate::pipeline::SortDirection::Desc,
        ));
        let debts: Vec<f64> = r.filtered().iter().map(|p| p.debt).collect();
        assert!(debts.windows(2).all(|w| w[0] >= w[1]));
        assert!(debts.iter().all(|d| *d > 0.0));
    }
}
