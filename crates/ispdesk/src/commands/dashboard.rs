//! Dashboard command handler: one-shot or `--watch`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use ispdesk_core::dashboard::MIN_POLL_INTERVAL;
use ispdesk_core::{
    Backoffice, DashboardSnapshot, DashboardStats, PortalOverview, RefreshOutcome,
};

use crate::cli::{DashboardArgs, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::sign_in;

/// Serializable view of a snapshot.
#[derive(Debug, Serialize)]
struct DashboardView<'a> {
    stats: Option<&'a DashboardStats>,
    portal: Option<&'a PortalOverview>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a DashboardSnapshot> for DashboardView<'a> {
    fn from(snap: &'a DashboardSnapshot) -> Self {
        Self {
            stats: snap.stats.as_ref(),
            portal: snap.portal.as_ref(),
            refreshed_at: snap.refreshed_at,
        }
    }
}

fn figure<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v:.2}"))
}

fn detail(view: &DashboardView<'_>) -> String {
    let stats = view.stats.cloned().unwrap_or_default();
    let mut fields = vec![
        ("Clients", figure(stats.total_clients)),
        ("Active", figure(stats.active_connections)),
        ("Revenue", money(stats.monthly_revenue)),
        ("Pending debt", money(stats.pending_debt)),
        ("Open tickets", figure(stats.open_tickets)),
    ];
    if let Some(portal) = view.portal {
        fields.push(("Invoices due", figure(portal.pending_invoices)));
        fields.push((
            "Last payment",
            figure(portal.last_payment_at.map(|t| t.format("%Y-%m-%d %H:%M"))),
        ));
        for note in &portal.announcements {
            fields.push(("Notice", note.clone()));
        }
    }
    fields.push((
        "Updated",
        figure(view.refreshed_at.map(|t| t.format("%H:%M:%S UTC"))),
    ));
    output::detail_block(&fields)
}

/// `key=value` lines for scripting.
fn plain(view: &DashboardView<'_>) -> String {
    let stats = view.stats.cloned().unwrap_or_default();
    [
        ("total_clients", figure(stats.total_clients)),
        ("active_connections", figure(stats.active_connections)),
        ("monthly_revenue", money(stats.monthly_revenue)),
        ("pending_debt", money(stats.pending_debt)),
        ("open_tickets", figure(stats.open_tickets)),
        (
            "pending_invoices",
            figure(view.portal.and_then(|p| p.pending_invoices)),
        ),
    ]
    .iter()
    .map(|(k, v)| format!("{k}={v}"))
    .collect::<Vec<_>>()
    .join("\n")
}

fn render(snap: &DashboardSnapshot, format: OutputFormat) -> Result<String, CliError> {
    output::render_single(format, &DashboardView::from(snap), detail, plain)
}

async fn flush_warnings(backoffice: &Backoffice) {
    for warning in backoffice.take_warnings().await {
        tracing::warn!("{warning}");
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: DashboardArgs,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    let mut backoffice_config = config::resolve_backoffice(global, cfg)?;
    if let Some(seconds) = args.interval {
        backoffice_config.poll_interval = Duration::from_secs(seconds).max(MIN_POLL_INTERVAL);
    }
    let backoffice = sign_in(backoffice_config).await?;

    let outcome = backoffice.refresh_dashboard().await?;
    flush_warnings(&backoffice).await;
    if let RefreshOutcome::Failed { warning } = outcome {
        return Err(CliError::ApiError {
            status: None,
            message: warning,
        });
    }

    let mut rx = backoffice.dashboard();
    let out = render(&rx.borrow_and_update(), global.format())?;
    output::print_output(&out, global.quiet);

    if !args.watch {
        return Ok(());
    }

    backoffice.start_polling().await?;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let out = render(&rx.borrow_and_update(), global.format())?;
                output::print_output(&out, global.quiet);
            }
        }
    }
    backoffice.stop_polling().await;
    Ok(())
}
