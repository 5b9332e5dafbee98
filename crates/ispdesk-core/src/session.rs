// ── Session context ──
//
// Built once on login, dropped on logout, and handed to whatever needs the
// current user or tenant. There is no ambient "current user".

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::error::CoreError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    Customer,
    Technician,
    CompanyAdmin,
    PlatformAdmin,
}

impl Role {
    /// Unknown role names get the least privilege.
    pub fn from_wire(raw: &str) -> Self {
        let normalized = raw.trim().replace(['-', ' '], "_");
        normalized.parse().unwrap_or_else(|_| {
            debug!(role = raw, "unknown role, treating as customer");
            Self::Customer
        })
    }

    pub fn can_manage_clients(self) -> bool {
        matches!(self, Self::CompanyAdmin | Self::PlatformAdmin)
    }

    pub fn can_triage_tickets(self) -> bool {
        matches!(
            self,
            Self::Technician | Self::CompanyAdmin | Self::PlatformAdmin
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Authenticated user plus tenant, valid for one login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user: SessionUser,
    pub tenant: Tenant,
    pub started_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(user: SessionUser, tenant: Tenant) -> Self {
        Self {
            user,
            tenant,
            started_at: Utc::now(),
        }
    }

    pub fn can_manage_clients(&self) -> bool {
        self.user.role.can_manage_clients()
    }

    pub fn can_triage_tickets(&self) -> bool {
        self.user.role.can_triage_tickets()
    }

    /// `PermissionDenied` unless the role may change client data.
    pub fn require_client_admin(&self, action: &str) -> Result<(), CoreError> {
        if self.can_manage_clients() {
            Ok(())
        } else {
            Err(CoreError::PermissionDenied {
                action: action.to_owned(),
                role: self.user.role.to_string(),
            })
        }
    }
}

/// Holder for the current session, if any.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<Arc<SessionContext>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session, replacing any previous one.
    pub fn init(&mut self, ctx: SessionContext) -> Arc<SessionContext> {
        info!(
            user = %ctx.user.name,
            role = %ctx.user.role,
            tenant = %ctx.tenant.slug,
            "session started"
        );
        let ctx = Arc::new(ctx);
        self.current = Some(Arc::clone(&ctx));
        ctx
    }

    /// End the session. Returns the context that was active.
    pub fn teardown(&mut self) -> Option<Arc<SessionContext>> {
        let prev = self.current.take();
        if let Some(ctx) = &prev {
            info!(user = %ctx.user.name, "session ended");
        }
        prev
    }

    pub fn current(&self) -> Result<Arc<SessionContext>, CoreError> {
        self.current.clone().ok_or(CoreError::NotSignedIn)
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> SessionContext {
        SessionContext::new(
            SessionUser {
                id: "u-1".into(),
                name: "Carla Rojas".into(),
                email: None,
                role,
            },
            Tenant {
                id: "t-1".into(),
                name: "Fibra Andina".into(),
                slug: "fibra-andina".into(),
            },
        )
    }

    #[test]
    fn role_parse_is_lenient() {
        assert_eq!(Role::from_wire("company_admin"), Role::CompanyAdmin);
        assert_eq!(Role::from_wire("Platform-Admin"), Role::PlatformAdmin);
        assert_eq!(Role::from_wire("technician"), Role::Technician);
        assert_eq!(Role::from_wire("superuser"), Role::Customer);
    }

    #[test]
    fn lifecycle() {
        let mut session = Session::new();
        assert!(matches!(session.current(), Err(CoreError::NotSignedIn)));

        session.init(ctx(Role::CompanyAdmin));
        assert!(session.current().unwrap().can_manage_clients());

        assert!(session.teardown().is_some());
        assert!(!session.is_active());
        assert!(session.teardown().is_none());
    }

    #[test]
    fn technicians_cannot_run_bulk_actions() {
        let tech = ctx(Role::Technician);
        assert!(tech.can_triage_tickets());
        let err = tech.require_client_admin("suspend").unwrap_err();
        assert!(matches!(err, CoreError::PermissionDenied { ref role, .. } if role == "technician"));
    }
}
