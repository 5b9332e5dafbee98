// ── API-to-domain conversions ──
//
// Bridges `ispdesk_api` DTOs into the domain model. Missing or malformed
// optional values are filled, never rejected.

use std::collections::HashMap;

use tracing::debug;

use ispdesk_api::{
    ClientMetaDto, ConnectionDto, DashboardStatsDto, NewClientDto, PortalOverviewDto, UserDto,
    VoucherDto,
};

use crate::model::{
    ClientMeta, Connection, ConnectionId, ConnectionStatus, DashboardStats, MacAddress, Plan,
    PortalOverview, Zone,
};
use crate::overlay::MetadataOverlay;
use crate::projector::{slugify, synthesize_meta};
use crate::roster::NewClient;
use crate::session::{Role, SessionContext, SessionUser, Tenant};
use crate::vouchers::Voucher;

// ── Connections ─────────────────────────────────────────────────────

fn parse_status(raw: Option<&str>) -> ConnectionStatus {
    raw.and_then(|s| s.trim().parse().ok())
        .unwrap_or(ConnectionStatus::Offline)
}

impl From<ConnectionDto> for Connection {
    fn from(dto: ConnectionDto) -> Self {
        let status = parse_status(dto.status.as_deref());
        if dto.status.is_none() {
            debug!(id = %dto.id, "connection without status, treating as offline");
        }
        Self {
            id: ConnectionId::new(dto.id),
            ip: dto.ip.unwrap_or_default(),
            mac: MacAddress::new(dto.mac.unwrap_or_default()),
            status,
        }
    }
}

// ── Client metadata ─────────────────────────────────────────────────

/// Fill a metadata record from `dto`, taking missing fields from `seed`.
pub fn meta_from_dto(dto: ClientMetaDto, seed: ClientMeta) -> ClientMeta {
    ClientMeta {
        name: dto
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(seed.name),
        plan: dto
            .plan
            .and_then(|p| p.parse::<Plan>().ok())
            .unwrap_or(seed.plan),
        zone: dto
            .zone
            .and_then(|z| z.parse::<Zone>().ok())
            .unwrap_or(seed.zone),
        debt: dto.debt.map_or(seed.debt, |d| d.max(0.0)),
        tickets: dto.tickets.unwrap_or(seed.tickets),
        phone: dto.phone.or(seed.phone),
        email: dto.email.or(seed.email),
        address: dto.address.or(seed.address),
        router_id: dto.router_id.or(seed.router_id),
        plan_cost: dto.plan_cost.or(seed.plan_cost),
        lan_interface: dto.lan_interface.or(seed.lan_interface),
        cutoff_day: dto.cutoff_day.or(seed.cutoff_day),
        screen_notice: dto.screen_notice.or(seed.screen_notice),
        monthly_usage_gb: dto.monthly_usage_gb.or(seed.monthly_usage_gb),
        support_priority: dto.support_priority.unwrap_or(seed.support_priority),
    }
}

/// Build the overlay for a freshly fetched connection list. Records for
/// unknown connections are skipped.
pub fn overlay_from_dtos(
    connections: &[Connection],
    metas: Vec<ClientMetaDto>,
) -> MetadataOverlay {
    let index: HashMap<&str, usize> = connections
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();

    let mut overlay = MetadataOverlay::new();
    for dto in metas {
        let Some((&i, conn)) = index
            .get(dto.connection_id.as_str())
            .and_then(|i| connections.get(*i).map(|c| (i, c)))
        else {
            debug!(id = %dto.connection_id, "metadata for unknown connection, skipping");
            continue;
        };
        let id = conn.id.clone();
        overlay.insert(id, meta_from_dto(dto, synthesize_meta(i, conn)));
    }
    overlay
}

pub fn meta_to_dto(id: &ConnectionId, meta: &ClientMeta) -> ClientMetaDto {
    ClientMetaDto {
        connection_id: id.to_string(),
        name: Some(meta.name.clone()),
        plan: Some(meta.plan.to_string()),
        zone: Some(meta.zone.to_string()),
        debt: Some(meta.debt),
        tickets: Some(meta.tickets),
        phone: meta.phone.clone(),
        email: meta.email.clone(),
        address: meta.address.clone(),
        router_id: meta.router_id.clone(),
        plan_cost: meta.plan_cost,
        lan_interface: meta.lan_interface.clone(),
        cutoff_day: meta.cutoff_day,
        screen_notice: meta.screen_notice,
        monthly_usage_gb: meta.monthly_usage_gb,
        support_priority: Some(meta.support_priority),
    }
}

impl From<&NewClient> for NewClientDto {
    fn from(client: &NewClient) -> Self {
        Self {
            ip: client.ip.trim().to_owned(),
            mac: MacAddress::new(client.mac.trim()).to_string(),
            name: client.name.trim().to_owned(),
            plan: client.plan.to_string(),
            zone: client.zone.to_string(),
            phone: client.phone.clone(),
            email: client.email.clone(),
            address: client.address.clone(),
            plan_cost: client.plan_cost,
        }
    }
}

// ── Session ─────────────────────────────────────────────────────────

impl From<UserDto> for SessionContext {
    fn from(dto: UserDto) -> Self {
        let slug = dto
            .tenant
            .slug
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| slugify(&dto.tenant.name));
        SessionContext::new(
            SessionUser {
                id: dto.id,
                name: dto.name,
                email: dto.email,
                role: Role::from_wire(&dto.role),
            },
            Tenant {
                id: dto.tenant.id,
                name: dto.tenant.name,
                slug,
            },
        )
    }
}

// ── Dashboard ───────────────────────────────────────────────────────

impl From<DashboardStatsDto> for DashboardStats {
    fn from(dto: DashboardStatsDto) -> Self {
        Self {
            total_clients: dto.total_clients,
            active_connections: dto.active_connections,
            monthly_revenue: dto.monthly_revenue,
            pending_debt: dto.pending_debt,
            open_tickets: dto.open_tickets,
        }
    }
}

impl From<PortalOverviewDto> for PortalOverview {
    fn from(dto: PortalOverviewDto) -> Self {
        Self {
            announcements: dto.announcements,
            pending_invoices: dto.pending_invoices,
            last_payment_at: dto.last_payment_at,
        }
    }
}

// ── Vouchers ────────────────────────────────────────────────────────

impl From<&Voucher> for VoucherDto {
    fn from(v: &Voucher) -> Self {
        Self {
            code: v.code.clone(),
            profile: v.profile.clone(),
            duration_minutes: v.duration_minutes,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use ispdesk_api::TenantDto;
    use pretty_assertions::assert_eq;

    fn conn_dto(id: &str, status: Option<&str>) -> ConnectionDto {
        ConnectionDto {
            id: id.into(),
            ip: Some("10.0.0.5".into()),
            mac: Some("AABBCCDDEEFF".into()),
            status: status.map(Into::into),
        }
    }

    #[test]
    fn unknown_or_missing_status_is_offline() {
        let a: Connection = conn_dto("a", Some("ACTIVE")).into();
        let b: Connection = conn_dto("b", Some("rebooting")).into();
        let c: Connection = conn_dto("c", None).into();
        assert_eq!(a.status, ConnectionStatus::Active);
        assert_eq!(b.status, ConnectionStatus::Offline);
        assert_eq!(c.status, ConnectionStatus::Offline);
        assert_eq!(a.mac.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn sparse_metadata_is_seeded_from_synthesis() {
        let conns: Vec<Connection> = vec![
            conn_dto("a", Some("active")).into(),
            conn_dto("b", Some("idle")).into(),
        ];
        let metas = vec![
            ClientMetaDto {
                connection_id: "b".into(),
                name: Some("Elena Paredes".into()),
                plan: Some("bogus".into()),
                ..ClientMetaDto::default()
            },
            ClientMetaDto {
                connection_id: "ghost".into(),
                ..ClientMetaDto::default()
            },
        ];
        let overlay = overlay_from_dtos(&conns, metas);
        assert_eq!(overlay.len(), 1);

        let seed = synthesize_meta(1, &conns[1]);
        let meta = overlay.get("b").unwrap();
        assert_eq!(meta.name, "Elena Paredes");
        assert_eq!(meta.plan, seed.plan);
        assert_eq!(meta.debt, seed.debt);
    }

    #[test]
    fn meta_survives_dto_round_trip() {
        let conn: Connection = conn_dto("a", Some("active")).into();
        let mut meta = synthesize_meta(0, &conn);
        meta.phone = Some("999111222".into());
        meta.support_priority = true;
        let dto = meta_to_dto(&conn.id, &meta);
        assert_eq!(dto.plan.as_deref(), Some("20 Mbps"));
        assert_eq!(meta_from_dto(dto, synthesize_meta(3, &conn)), meta);
    }

    #[test]
    fn tenant_slug_is_derived_when_missing() {
        let ctx: SessionContext = UserDto {
            id: "u".into(),
            name: "Carla".into(),
            email: None,
            role: "company_admin".into(),
            tenant: TenantDto {
                id: "t".into(),
                name: "Red Norte E.I.R.L.".into(),
                slug: None,
            },
        }
        .into();
        assert_eq!(ctx.tenant.slug, "red-norte-e-i-r-l");
        assert_eq!(ctx.user.role, Role::CompanyAdmin);
    }
}
