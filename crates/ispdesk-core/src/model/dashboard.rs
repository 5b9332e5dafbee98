// ── Dashboard domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Headline numbers for the admin dashboard. Missing figures stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_clients: Option<u64>,
    pub active_connections: Option<u64>,
    pub monthly_revenue: Option<f64>,
    pub pending_debt: Option<f64>,
    pub open_tickets: Option<u64>,
}

/// Customer portal summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalOverview {
    pub announcements: Vec<String>,
    pub pending_invoices: Option<u32>,
    pub last_payment_at: Option<DateTime<Utc>>,
}
