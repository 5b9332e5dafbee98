// ── Bulk action dispatcher ──
//
// Resolves the target set for one action (explicit selection, or the
// action's default over the filtered rows) and applies it to the store
// and overlay. Nothing is mutated when there is nothing to act on.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::export::{CsvExport, ExportColumn, export_profiles};
use crate::model::{ClientProfile, ConnectionId, ConnectionStatus, Plan, Risk};
use crate::overlay::{MetaPatch, MetadataOverlay};
use crate::page::Selection;
use crate::store::ConnectionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    Activate,
    Suspend,
    Reminder,
    PrioritizeSupport,
    Export { columns: Vec<ExportColumn> },
    /// Needs an explicit selection.
    ApplyPlan(Plan),
}

impl BulkAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Suspend => "suspend",
            Self::Reminder => "reminder",
            Self::PrioritizeSupport => "prioritize_support",
            Self::Export { .. } => "export",
            Self::ApplyPlan(_) => "apply_plan",
        }
    }

    /// Whether the action changes client data.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Export { .. })
    }

    /// Default target when nothing is selected.
    fn default_target(&self, p: &ClientProfile) -> bool {
        match self {
            Self::Activate => p.status != ConnectionStatus::Active,
            Self::Suspend | Self::Reminder => p.debt > 0.0,
            Self::PrioritizeSupport => p.risk == Risk::High || p.tickets > 0,
            Self::Export { .. } => true,
            Self::ApplyPlan(_) => false,
        }
    }
}

/// What a bulk action did, for the caller to commit and report.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkEffect {
    StatusChanged {
        ids: Vec<ConnectionId>,
        status: ConnectionStatus,
    },
    RemindersQueued {
        ids: Vec<ConnectionId>,
    },
    SupportPrioritized {
        ids: Vec<ConnectionId>,
    },
    PlanApplied {
        ids: Vec<ConnectionId>,
        plan: Plan,
    },
    Exported(CsvExport),
}

impl BulkEffect {
    /// Ids whose overlay record changed and needs to be written back.
    pub fn meta_ids(&self) -> &[ConnectionId] {
        match self {
            Self::RemindersQueued { ids }
            | Self::SupportPrioritized { ids }
            | Self::PlanApplied { ids, .. } => ids,
            Self::StatusChanged { .. } | Self::Exported(_) => &[],
        }
    }

    pub fn affected(&self) -> usize {
        match self {
            Self::StatusChanged { ids, .. }
            | Self::RemindersQueued { ids }
            | Self::SupportPrioritized { ids }
            | Self::PlanApplied { ids, .. } => ids.len(),
            Self::Exported(export) => export.rows,
        }
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match self {
            Self::StatusChanged { ids, status } => {
                format!("{} client(s) set to {status}", ids.len())
            }
            Self::RemindersQueued { ids } => format!("Reminder queued for {} client(s)", ids.len()),
            Self::SupportPrioritized { ids } => {
                format!("{} client(s) moved to priority support", ids.len())
            }
            Self::PlanApplied { ids, plan } => format!("{plan} applied to {} client(s)", ids.len()),
            Self::Exported(export) => format!("{} row(s) exported to {}", export.rows, export.filename),
        }
    }
}

/// Selected rows in filtered order, else the action's default targets.
pub fn resolve_targets<'a>(
    action: &BulkAction,
    selection: &Selection,
    filtered: &'a [ClientProfile],
) -> Vec<&'a ClientProfile> {
    if selection.is_empty() {
        filtered.iter().filter(|p| action.default_target(p)).collect()
    } else {
        filtered
            .iter()
            .filter(|p| selection.contains(p.id.as_str()))
            .collect()
    }
}

/// Apply `action`. Overlay writes seed a full record from the visible
/// profile when none exists.
pub fn execute(
    action: &BulkAction,
    selection: &Selection,
    filtered: &[ClientProfile],
    store: &mut ConnectionStore,
    overlay: &mut MetadataOverlay,
    today: NaiveDate,
) -> Result<BulkEffect, CoreError> {
    let targets = resolve_targets(action, selection, filtered);
    if targets.is_empty() {
        debug!(action = action.name(), selected = selection.len(), "no bulk targets");
        return Err(CoreError::NoTargets {
            action: action.name().to_owned(),
        });
    }
    let ids: Vec<ConnectionId> = targets.iter().map(|p| p.id.clone()).collect();

    let effect = match action {
        BulkAction::Activate | BulkAction::Suspend => {
            let status = if matches!(action, BulkAction::Activate) {
                ConnectionStatus::Active
            } else {
                ConnectionStatus::Offline
            };
            for id in &ids {
                store.set_status(id.as_str(), status);
            }
            BulkEffect::StatusChanged { ids, status }
        }
        BulkAction::Reminder => {
            for p in &targets {
                let patch = MetaPatch {
                    tickets: Some(p.tickets.saturating_add(1)),
                    ..MetaPatch::default()
                };
                overlay.upsert(&p.id, patch, || p.to_meta());
            }
            BulkEffect::RemindersQueued { ids }
        }
        BulkAction::PrioritizeSupport => {
            for p in &targets {
                let patch = MetaPatch {
                    support_priority: Some(true),
                    ..MetaPatch::default()
                };
                overlay.upsert(&p.id, patch, || p.to_meta());
            }
            BulkEffect::SupportPrioritized { ids }
        }
        BulkAction::ApplyPlan(plan) => {
            for p in &targets {
                let patch = MetaPatch {
                    plan: Some(*plan),
                    ..MetaPatch::default()
                };
                overlay.upsert(&p.id, patch, || p.to_meta());
            }
            BulkEffect::PlanApplied { ids, plan: *plan }
        }
        BulkAction::Export { columns } => {
            BulkEffect::Exported(export_profiles(targets.iter().copied(), columns, today))
        }
    };

    info!(action = action.name(), targets = effect.affected(), "bulk action applied");
    Ok(effect)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Connection;
    use crate::pipeline::{self, RosterFilters, SortSpec};
    use crate::projector::{project, synthesize_meta};
    use pretty_assertions::assert_eq;

    struct Fixture {
        store: ConnectionStore,
        overlay: MetadataOverlay,
    }

    impl Fixture {
        fn new(statuses: &[ConnectionStatus]) -> Self {
            let conns = statuses
                .iter()
                .enumerate()
                .map(|(i, &s)| {
                    Connection::new(format!("c{i}"), format!("10.0.0.{i}"), "aa:bb:cc:00:00:01", s)
                })
                .collect();
            Self {
                store: ConnectionStore::from_connections(conns),
                overlay: MetadataOverlay::new(),
            }
        }

        fn filtered(&self) -> Vec<ClientProfile> {
            let rows = project(self.store.as_slice(), &self.overlay, "fibra");
            pipeline::apply(&rows, &RosterFilters::default(), SortSpec::default())
        }

        fn run(
            &mut self,
            action: &BulkAction,
            selection: &Selection,
        ) -> Result<BulkEffect, CoreError> {
            let filtered = self.filtered();
            let today = NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
            execute(action, selection, &filtered, &mut self.store, &mut self.overlay, today)
        }

        fn tickets(&self, id: &str) -> u32 {
            self.filtered().into_iter().find(|p| p.id.as_str() == id).unwrap().tickets
        }
    }

    fn select(ids: &[&str]) -> Selection {
        let mut sel = Selection::new();
        for id in ids {
            sel.insert(ConnectionId::from(*id));
        }
        sel
    }

    #[test]
    fn reminder_increments_only_selected_clients() {
        let mut fx = Fixture::new(&[
            ConnectionStatus::Offline,
            ConnectionStatus::Idle,
            ConnectionStatus::Offline,
            ConnectionStatus::Active,
        ]);
        let before: Vec<u32> = ["c0", "c1", "c2", "c3"].iter().map(|id| fx.tickets(id)).collect();

        let effect = fx.run(&BulkAction::Reminder, &select(&["c0", "c2"])).unwrap();
        assert_eq!(effect.meta_ids(), &[ConnectionId::from("c0"), ConnectionId::from("c2")]);

        assert_eq!(fx.tickets("c0"), before[0] + 1);
        assert_eq!(fx.tickets("c1"), before[1]);
        assert_eq!(fx.tickets("c2"), before[2] + 1);
        assert_eq!(fx.tickets("c3"), before[3]);
        assert!(!fx.overlay.contains("c1"));
    }

    #[test]
    fn export_without_selection_covers_filtered_set() {
        let mut fx = Fixture::new(&[ConnectionStatus::Active; 5]);
        let action = BulkAction::Export { columns: vec![] };
        let BulkEffect::Exported(export) = fx.run(&action, &Selection::new()).unwrap() else {
            panic!("expected an export");
        };
        assert_eq!(export.rows, 5);
        assert_eq!(export.content.lines().count(), 6);
        assert_eq!(export.filename, "clientes_2026-02-16.csv");
    }

    #[test]
    fn suspend_defaults_to_debtors() {
        let mut fx = Fixture::new(&[
            ConnectionStatus::Active,
            ConnectionStatus::Idle,
            ConnectionStatus::Active,
        ]);
        let effect = fx.run(&BulkAction::Suspend, &Selection::new()).unwrap();
        assert_eq!(
            effect,
            BulkEffect::StatusChanged {
                ids: vec![ConnectionId::from("c1")],
                status: ConnectionStatus::Offline,
            }
        );
        assert_eq!(fx.store.get("c1").unwrap().status, ConnectionStatus::Offline);
        assert_eq!(fx.store.get("c0").unwrap().status, ConnectionStatus::Active);
    }

    #[test]
    fn no_targets_is_an_error_and_mutates_nothing() {
        let mut fx = Fixture::new(&[ConnectionStatus::Active, ConnectionStatus::Active]);
        let err = fx.run(&BulkAction::Activate, &Selection::new()).unwrap_err();
        assert!(matches!(err, CoreError::NoTargets { ref action } if action == "activate"));

        let err = fx
            .run(&BulkAction::ApplyPlan(Plan::Mbps200), &Selection::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::NoTargets { .. }));
        assert!(fx.overlay.is_empty());
    }

    #[test]
    fn apply_plan_synthesizes_then_patches() {
        let mut fx = Fixture::new(&[ConnectionStatus::Active, ConnectionStatus::Idle]);
        let seeded = synthesize_meta(1, fx.store.get("c1").unwrap());

        fx.run(&BulkAction::ApplyPlan(Plan::Mbps200), &select(&["c1"]))
            .unwrap();

        let stored = fx.overlay.get("c1").unwrap();
        assert_eq!(stored.plan, Plan::Mbps200);
        assert_eq!(stored.name, seeded.name);
        assert_eq!(stored.tickets, seeded.tickets);
        assert!(!fx.overlay.contains("c0"));
    }

    #[test]
    fn prioritize_support_defaults_to_risky_or_ticketed() {
        let mut fx = Fixture::new(&[
            ConnectionStatus::Active,
            ConnectionStatus::Offline,
            ConnectionStatus::Active,
            ConnectionStatus::Active,
        ]);
        let effect = fx
            .run(&BulkAction::PrioritizeSupport, &Selection::new())
            .unwrap();
        // c1 offline (high risk), c3 has a synthesized ticket
        assert_eq!(
            effect.meta_ids(),
            &[ConnectionId::from("c1"), ConnectionId::from("c3")]
        );
        assert!(fx.overlay.get("c3").unwrap().support_priority);
    }
}
