// ── Domain model ──
//
// Canonical types shared by the roster pipeline, the bulk dispatcher,
// and the CLI. Wire DTOs live in ispdesk-api; `convert` bridges them.

pub mod client;
pub mod connection;
pub mod dashboard;
pub mod ids;

pub use client::{ClientMeta, ClientProfile, Plan, Risk, Zone};
pub use connection::{Connection, ConnectionStatus};
pub use dashboard::{DashboardStats, PortalOverview};
pub use ids::{ConnectionId, MacAddress};
