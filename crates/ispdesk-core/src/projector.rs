// ── Client profile projector ──
//
// Joins the connection list with the metadata overlay into roster rows.
// Rows without metadata get a deterministic placeholder derived from their
// list position, and are flagged `synthetic` so they never pass as real.

use crate::model::{
    ClientMeta, ClientProfile, Connection, ConnectionStatus, Plan, Risk, Zone,
};
use crate::overlay::MetadataOverlay;

pub const NAME_POOL: &[&str] = &[
    "María Quispe",
    "José Mamani",
    "Rosa Huamán",
    "Luis Condori",
    "Carmen Flores",
    "Jorge Ramos",
    "Ana Torres",
    "Pedro Castillo",
    "Lucía Vargas",
    "Miguel Chávez",
];

pub const PLAN_POOL: &[Plan] = &[
    Plan::Mbps20,
    Plan::Mbps40,
    Plan::Mbps60,
    Plan::Mbps100,
    Plan::Mbps200,
];

pub const ZONE_POOL: &[Zone] = &[Zone::Centro, Zone::Norte, Zone::Sur, Zone::Este, Zone::Oeste];

pub const CUTOFF_POOL: &[u8] = &[5, 10, 15, 20];

/// Project every connection into a profile. Same length and order as the
/// input; total and deterministic.
pub fn project(
    connections: &[Connection],
    overlay: &MetadataOverlay,
    tenant_slug: &str,
) -> Vec<ClientProfile> {
    connections
        .iter()
        .enumerate()
        .map(|(index, conn)| match overlay.get(conn.id.as_str()) {
            Some(meta) => build_profile(index, conn, meta, tenant_slug, false),
            None => build_profile(index, conn, &synthesize_meta(index, conn), tenant_slug, true),
        })
        .collect()
}

/// Placeholder metadata for the connection at `index`.
pub fn synthesize_meta(index: usize, conn: &Connection) -> ClientMeta {
    let (debt, tickets) = match conn.status {
        ConnectionStatus::Offline => (120.0 + 7.0 * index_f64(index), small(index % 3) + 1),
        ConnectionStatus::Idle => (55.0 + 5.0 * index_f64(index), small(index % 2)),
        ConnectionStatus::Active => (0.0, u32::from(index % 4 == 3)),
    };

    ClientMeta {
        name: pick(NAME_POOL, index).to_string(),
        plan: pick(PLAN_POOL, index),
        zone: pick(ZONE_POOL, index),
        debt,
        tickets,
        phone: None,
        email: None,
        address: None,
        router_id: None,
        plan_cost: None,
        lan_interface: None,
        cutoff_day: None,
        screen_notice: None,
        monthly_usage_gb: None,
        support_priority: false,
    }
}

/// Usage estimate for rows whose metadata carries no measured value.
pub fn synthesize_usage(index: usize, status: ConnectionStatus) -> u32 {
    let base = 20 + small((index % 70) * 17 % 70);
    match status {
        ConnectionStatus::Active => base,
        ConnectionStatus::Idle => base / 2,
        ConnectionStatus::Offline => base / 4,
    }
}

/// Lowercase, dash-separated form of a tenant name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "tenant".to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// `first-name@tenant-slug.net`
pub fn username(name: &str, tenant_slug: &str) -> String {
    let first = name
        .split_whitespace()
        .next()
        .map_or_else(|| "cliente".to_owned(), str::to_lowercase);
    format!("{first}@{tenant_slug}.net")
}

/// Display code from 1-based list position.
pub fn client_code(index: usize) -> String {
    format!("CL-{:04}", index + 1)
}

fn build_profile(
    index: usize,
    conn: &Connection,
    meta: &ClientMeta,
    tenant_slug: &str,
    synthetic: bool,
) -> ClientProfile {
    let debt = meta.debt.max(0.0);
    ClientProfile {
        id: conn.id.clone(),
        code: client_code(index),
        ip: conn.ip.clone(),
        mac: conn.mac.clone(),
        status: conn.status,
        name: meta.name.clone(),
        username: username(&meta.name, tenant_slug),
        plan: meta.plan,
        zone: meta.zone,
        debt,
        tickets: meta.tickets,
        risk: Risk::assess(debt, conn.status, meta.tickets),
        monthly_usage_gb: meta
            .monthly_usage_gb
            .unwrap_or_else(|| synthesize_usage(index, conn.status)),
        phone: meta.phone.clone(),
        email: meta.email.clone(),
        address: meta.address.clone(),
        router_id: meta.router_id.clone(),
        plan_cost: meta.plan_cost.unwrap_or_else(|| meta.plan.monthly_fee()),
        lan_interface: meta
            .lan_interface
            .clone()
            .unwrap_or_else(|| format!("ether{}", index % 4 + 2)),
        cutoff_day: meta.cutoff_day.unwrap_or_else(|| pick(CUTOFF_POOL, index)),
        screen_notice: meta.screen_notice.unwrap_or(debt > 0.0),
        support_priority: meta.support_priority,
        synthetic,
    }
}

fn pick<T: Copy>(pool: &[T], index: usize) -> T {
    pool[index % pool.len()]
}

fn small(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn index_f64(index: usize) -> f64 {
    f64::from(small(index))
}
