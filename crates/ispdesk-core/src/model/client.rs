// ── Client domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::connection::ConnectionStatus;
use super::ids::{ConnectionId, MacAddress};

/// Debt above which a client is high risk regardless of anything else.
pub const HIGH_RISK_DEBT: f64 = 100.0;
/// Open tickets above which a debt-free client is still medium risk.
pub const MEDIUM_RISK_TICKETS: u32 = 2;

/// Bandwidth tier sold to the subscriber.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Plan {
    #[default]
    #[serde(rename = "20 Mbps")]
    #[strum(to_string = "20 Mbps", serialize = "20mbps", serialize = "20")]
    Mbps20,
    #[serde(rename = "40 Mbps")]
    #[strum(to_string = "40 Mbps", serialize = "40mbps", serialize = "40")]
    Mbps40,
    #[serde(rename = "60 Mbps")]
    #[strum(to_string = "60 Mbps", serialize = "60mbps", serialize = "60")]
    Mbps60,
    #[serde(rename = "100 Mbps")]
    #[strum(to_string = "100 Mbps", serialize = "100mbps", serialize = "100")]
    Mbps100,
    #[serde(rename = "200 Mbps")]
    #[strum(to_string = "200 Mbps", serialize = "200mbps", serialize = "200")]
    Mbps200,
}

impl Plan {
    /// List price per month, used when a client record carries no `plan_cost`.
    pub fn monthly_fee(self) -> f64 {
        match self {
            Self::Mbps20 => 50.0,
            Self::Mbps40 => 70.0,
            Self::Mbps60 => 90.0,
            Self::Mbps100 => 120.0,
            Self::Mbps200 => 180.0,
        }
    }
}

/// Service zone.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Zone {
    #[default]
    Centro,
    Norte,
    Sur,
    Este,
    Oeste,
}

/// Three-valued collection/support risk, derived and never stored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl Risk {
    /// `high` if debt > 100 or offline; else `medium` if any debt or more
    /// than two open tickets; else `low`.
    pub fn assess(debt: f64, status: ConnectionStatus, tickets: u32) -> Self {
        if debt > HIGH_RISK_DEBT || status == ConnectionStatus::Offline {
            Self::High
        } else if debt > 0.0 || tickets > MEDIUM_RISK_TICKETS {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Sparse per-connection enrichment. Required fields are always present
/// once a record exists; optional ones fall back to derived defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMeta {
    pub name: String,
    pub plan: Plan,
    pub zone: Zone,
    pub debt: f64,
    pub tickets: u32,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub router_id: Option<String>,
    pub plan_cost: Option<f64>,
    pub lan_interface: Option<String>,
    pub cutoff_day: Option<u8>,
    pub screen_notice: Option<bool>,
    pub monthly_usage_gb: Option<u32>,
    #[serde(default)]
    pub support_priority: bool,
}

/// One fully joined roster row: Connection + ClientMeta + computed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub id: ConnectionId,
    /// Display code from list position (`CL-0001`). Not stable across
    /// reorderings of the connection list; key on `id` instead.
    pub code: String,
    pub ip: String,
    pub mac: MacAddress,
    pub status: ConnectionStatus,
    pub name: String,
    pub username: String,
    pub plan: Plan,
    pub zone: Zone,
    pub debt: f64,
    pub tickets: u32,
    pub risk: Risk,
    pub monthly_usage_gb: u32,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub router_id: Option<String>,
    pub plan_cost: f64,
    pub lan_interface: String,
    pub cutoff_day: u8,
    pub screen_notice: bool,
    pub support_priority: bool,
    /// True when no metadata existed and the row was synthesized.
    pub synthetic: bool,
}

impl ClientProfile {
    /// A complete metadata record matching what this row shows, used to
    /// seed the overlay before a first write.
    pub fn to_meta(&self) -> ClientMeta {
        ClientMeta {
            name: self.name.clone(),
            plan: self.plan,
            zone: self.zone,
            debt: self.debt,
            tickets: self.tickets,
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            router_id: self.router_id.clone(),
            plan_cost: Some(self.plan_cost),
            lan_interface: Some(self.lan_interface.clone()),
            cutoff_day: Some(self.cutoff_day),
            screen_notice: Some(self.screen_notice),
            monthly_usage_gb: Some(self.monthly_usage_gb),
            support_priority: self.support_priority,
        }
    }
}
