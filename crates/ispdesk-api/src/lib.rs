//! Async HTTP client for the ispdesk back-office REST API.
//!
//! Covers the endpoints the roster and dashboard consume: the session
//! identity (`/auth/me`), connections, sparse client metadata, dashboard
//! stats, the customer portal overview, and HotSpot voucher publishing.
//! Responses may arrive bare or wrapped in a `{"data": ...}` envelope; both
//! are accepted.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod endpoints;

pub use client::BackofficeClient;
pub use error::Error;
pub use models::{
    ClientMetaDto, ConnectionDto, DashboardStatsDto, NewClientDto, PortalOverviewDto,
    StatusChangeDto, TenantDto, UserDto, VoucherDto,
};
pub use transport::{TlsMode, TransportConfig};
