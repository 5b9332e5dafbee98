// ── Wire types for the back-office REST API ──
//
// Every field the backend may omit is optional. Core decides how to fill
// the gaps; nothing here rejects a sparse payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A subscriber's network link as returned by `GET /connections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDto {
    pub id: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    /// `active`, `idle`, or `offline`. Anything else is left to core.
    #[serde(default)]
    pub status: Option<String>,
}

/// Sparse client enrichment keyed by connection id (`GET /clients`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetaDto {
    #[serde(alias = "id")]
    pub connection_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lan_interface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_day: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_notice: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_usage_gb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_priority: Option<bool>,
}

/// Body for `POST /connections/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeDto {
    pub status: String,
}

/// Body for `POST /clients` (new subscriber registration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClientDto {
    pub ip: String,
    pub mac: String,
    pub name: String,
    pub plan: String,
    pub zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Authenticated user returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
    pub tenant: TenantDto,
}

/// Headline numbers for the admin dashboard (`GET /dashboard`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsDto {
    #[serde(default)]
    pub total_clients: Option<u64>,
    #[serde(default)]
    pub active_connections: Option<u64>,
    #[serde(default)]
    pub monthly_revenue: Option<f64>,
    #[serde(default)]
    pub pending_debt: Option<f64>,
    #[serde(default)]
    pub open_tickets: Option<u64>,
}

/// Customer portal summary (`GET /portal/overview`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalOverviewDto {
    #[serde(default)]
    pub announcements: Vec<String>,
    #[serde(default)]
    pub pending_invoices: Option<u32>,
    #[serde(default)]
    pub last_payment_at: Option<DateTime<Utc>>,
}

/// A generated HotSpot voucher (`POST /hotspot/vouchers`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherDto {
    pub code: String,
    pub profile: String,
    pub duration_minutes: u32,
}

/// Optional `{"data": ...}` wrapper around any response body.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sparse_meta_deserializes() {
        let meta: ClientMetaDto = serde_json::from_str(r#"{"id":"c-1","debt":12.5}"#).unwrap();
        assert_eq!(meta.connection_id, "c-1");
        assert_eq!(meta.debt, Some(12.5));
        assert!(meta.name.is_none());
    }

    #[test]
    fn envelope_accepts_both_shapes() {
        let wrapped: Envelope<Vec<ConnectionDto>> =
            serde_json::from_str(r#"{"data":[{"id":"a"}]}"#).unwrap();
        let bare: Envelope<Vec<ConnectionDto>> = serde_json::from_str(r#"[{"id":"a"}]"#).unwrap();
        assert_eq!(wrapped.into_inner(), bare.into_inner());
    }

    #[test]
    fn meta_serializes_without_empty_fields() {
        let meta = ClientMetaDto {
            connection_id: "c-9".into(),
            tickets: Some(3),
            ..ClientMetaDto::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json, serde_json::json!({"connectionId": "c-9", "tickets": 3}));
    }
}
