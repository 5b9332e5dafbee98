//! Client roster view-model and back-office session logic for ispdesk.
//!
//! The roster is a fixed, synchronous derivation pipeline:
//!
//! ```text
//! ConnectionStore + MetadataOverlay
//!     → project  (ClientProfile rows, synthesized where metadata is absent)
//!     → filter   (AND-fold of the active RosterPredicates)
//!     → sort     (stable, single field)
//!     → paginate (clamped page window)
//!     → prune    (selection ∩ filtered ids)
//! ```
//!
//! - **[`RosterState`]** owns the stores, the filter/sort/page request and the
//!   selection, and memoizes the derived rows keyed on their actual inputs.
//! - **[`bulk`]** resolves targets (selection or a per-action default) and
//!   applies one [`BulkAction`].
//! - **[`Backoffice`]** is the async facade: session lifecycle, roster loads,
//!   committing bulk effects to the backend, and the dashboard feed with its
//!   cancellable poller.
//! - **[`nav`]** parses query-string navigation into closed enums.

pub mod backoffice;
pub mod bulk;
pub mod config;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod model;
pub mod nav;
pub mod overlay;
pub mod page;
pub mod pipeline;
pub mod projector;
pub mod roster;
pub mod session;
pub mod store;
pub mod vouchers;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backoffice::Backoffice;
pub use bulk::{BulkAction, BulkEffect};
pub use config::{BackofficeConfig, TlsVerification};
pub use dashboard::{DashboardFeed, DashboardSnapshot, DashboardSource, Poller, RefreshOutcome};
pub use error::CoreError;
pub use export::{CsvExport, ExportColumn};
pub use nav::{AdminView, Navigation, PortalSection, RosterTab, TechnicianQueue};
pub use overlay::{MetaPatch, MetadataOverlay};
pub use page::{Page, PageRequest, Selection};
pub use pipeline::{
    ColumnFilters, RosterFilters, RosterPredicate, ScreenNotice, Segment, SortDirection,
    SortField, SortSpec,
};
pub use roster::{NewClient, RosterState};
pub use session::{Role, Session, SessionContext, SessionUser, Tenant};
pub use store::ConnectionStore;
pub use vouchers::{Voucher, VoucherSpec};

pub use model::{
    ClientMeta, ClientProfile, Connection, ConnectionId, ConnectionStatus, DashboardStats,
    MacAddress, Plan, PortalOverview, Risk, Zone,
};
