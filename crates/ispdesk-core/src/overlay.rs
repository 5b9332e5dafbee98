// ── Client metadata overlay ──
//
// Sparse map of ClientMeta keyed by connection id. A missing entry is
// legal; the projector synthesizes a placeholder. Entries are merged in
// place and never removed.

use std::collections::HashMap;

use crate::model::{ClientMeta, ConnectionId, Plan, Zone};

/// Partial update for a metadata record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaPatch {
    pub name: Option<String>,
    pub plan: Option<Plan>,
    pub zone: Option<Zone>,
    pub debt: Option<f64>,
    pub tickets: Option<u32>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub router_id: Option<String>,
    pub plan_cost: Option<f64>,
    pub lan_interface: Option<String>,
    pub cutoff_day: Option<u8>,
    pub screen_notice: Option<bool>,
    pub monthly_usage_gb: Option<u32>,
    pub support_priority: Option<bool>,
}

impl MetaPatch {
    fn apply(self, meta: &mut ClientMeta) {
        if let Some(v) = self.name {
            meta.name = v;
        }
        if let Some(v) = self.plan {
            meta.plan = v;
        }
        if let Some(v) = self.zone {
            meta.zone = v;
        }
        if let Some(v) = self.debt {
            meta.debt = v.max(0.0);
        }
        if let Some(v) = self.tickets {
            meta.tickets = v;
        }
        if self.phone.is_some() {
            meta.phone = self.phone;
        }
        if self.email.is_some() {
            meta.email = self.email;
        }
        if self.address.is_some() {
            meta.address = self.address;
        }
        if self.router_id.is_some() {
            meta.router_id = self.router_id;
        }
        if self.plan_cost.is_some() {
            meta.plan_cost = self.plan_cost;
        }
        if self.lan_interface.is_some() {
            meta.lan_interface = self.lan_interface;
        }
        if self.cutoff_day.is_some() {
            meta.cutoff_day = self.cutoff_day;
        }
        if self.screen_notice.is_some() {
            meta.screen_notice = self.screen_notice;
        }
        if self.monthly_usage_gb.is_some() {
            meta.monthly_usage_gb = self.monthly_usage_gb;
        }
        if let Some(v) = self.support_priority {
            meta.support_priority = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataOverlay {
    entries: HashMap<ConnectionId, ClientMeta>,
}

impl MetadataOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&ClientMeta> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert a complete record, replacing any existing one.
    pub fn insert(&mut self, id: ConnectionId, meta: ClientMeta) {
        self.entries.insert(id, meta);
    }

    /// Merge `patch` into the record for `id`. When no record exists one is
    /// created from `seed` first, so the result is always complete.
    pub fn upsert(
        &mut self,
        id: &ConnectionId,
        patch: MetaPatch,
        seed: impl FnOnce() -> ClientMeta,
    ) -> &ClientMeta {
        let meta = self.entries.entry(id.clone()).or_insert_with(seed);
        patch.apply(meta);
        meta
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConnectionId, &ClientMeta)> {
        self.entries.iter()
    }
}
