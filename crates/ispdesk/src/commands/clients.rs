//! Client roster command handlers.

use std::path::PathBuf;

use serde::Serialize;
use tabled::Tabled;

use ispdesk_core::bulk::resolve_targets;
use ispdesk_core::{
    Backoffice, BulkAction, BulkEffect, ClientProfile, ExportColumn, NewClient, Plan,
    SortDirection, SortField, SortSpec,
};

use crate::cli::{
    BulkActionArg, ClientsAddArgs, ClientsArgs, ClientsBulkArgs, ClientsCommand,
    ClientsExportArgs, ClientsListArgs, FilterArgs, GlobalOpts, OutputFormat, SortFieldArg,
};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::{connect_with_roster, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Debt")]
    debt: String,
    #[tabled(rename = "Tickets")]
    tickets: u32,
    #[tabled(rename = "Usage")]
    usage: String,
    #[tabled(rename = "Risk")]
    risk: String,
}

impl ClientRow {
    fn new(p: &ClientProfile, color: bool) -> Self {
        let name = if p.support_priority {
            format!("{} (!)", p.name)
        } else {
            p.name.clone()
        };
        Self {
            code: p.code.clone(),
            name,
            ip: p.ip.clone(),
            status: output::paint_status(p.status, color),
            plan: p.plan.to_string(),
            zone: p.zone.to_string(),
            debt: format!("{:.2}", p.debt),
            tickets: p.tickets,
            usage: format!("{} GB", p.monthly_usage_gb),
            risk: output::paint_risk(p.risk, color),
        }
    }
}

fn detail(p: &ClientProfile) -> String {
    let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
    output::detail_block(&[
        ("ID", p.id.to_string()),
        ("Code", p.code.clone()),
        ("Name", p.name.clone()),
        ("Username", p.username.clone()),
        ("IP", p.ip.clone()),
        ("MAC", p.mac.to_string()),
        ("Status", p.status.to_string()),
        ("Plan", format!("{} ({:.2}/month)", p.plan, p.plan_cost)),
        ("Zone", p.zone.to_string()),
        ("Debt", format!("{:.2}", p.debt)),
        ("Tickets", p.tickets.to_string()),
        ("Risk", p.risk.to_string()),
        ("Usage", format!("{} GB", p.monthly_usage_gb)),
        ("LAN", p.lan_interface.clone()),
        ("Cutoff day", p.cutoff_day.to_string()),
        ("Notice", p.screen_notice.to_string()),
        ("Priority", p.support_priority.to_string()),
        ("Phone", opt(&p.phone)),
        ("Email", opt(&p.email)),
        ("Address", opt(&p.address)),
        ("Router", opt(&p.router_id)),
        ("Synthetic", p.synthetic.to_string()),
    ])
}

/// Result of a bulk action, for structured output.
#[derive(Serialize)]
struct BulkReport {
    action: &'static str,
    affected: usize,
    ids: Vec<String>,
    summary: String,
}

impl BulkReport {
    fn new(action: &BulkAction, effect: &BulkEffect) -> Self {
        let ids = match effect {
            BulkEffect::StatusChanged { ids, .. }
            | BulkEffect::RemindersQueued { ids }
            | BulkEffect::SupportPrioritized { ids }
            | BulkEffect::PlanApplied { ids, .. } => ids.iter().map(ToString::to_string).collect(),
            BulkEffect::Exported(_) => Vec::new(),
        };
        Self {
            action: action.name(),
            affected: effect.affected(),
            ids,
            summary: effect.summary(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ClientsArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let backoffice = connect_with_roster(global, cfg).await?;
    match args.command {
        ClientsCommand::List(list) => list_clients(&backoffice, &list, global).await,
        ClientsCommand::Get { client } => get_client(&backoffice, &client, global).await,
        ClientsCommand::Export(export) => export_clients(&backoffice, export, global).await,
        ClientsCommand::Bulk(bulk) => bulk_action(&backoffice, &bulk, global).await,
        ClientsCommand::Add(add) => add_client(&backoffice, add, global).await,
    }?;

    for warning in backoffice.take_warnings().await {
        tracing::warn!("{warning}");
    }
    Ok(())
}

fn sort_spec(field: SortFieldArg, desc: bool) -> SortSpec {
    let field = match field {
        SortFieldArg::Name => SortField::Name,
        SortFieldArg::Usage => SortField::Usage,
        SortFieldArg::Debt => SortField::Debt,
        SortFieldArg::Tickets => SortField::Tickets,
    };
    let direction = if desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    SortSpec::new(field, direction)
}

/// Apply filters, then select `ids` within the filtered set.
async fn narrow(
    backoffice: &Backoffice,
    filters: &FilterArgs,
    ids: &[String],
) -> Result<(), CliError> {
    let filters = util::roster_filters(filters)?;
    backoffice
        .update_roster(|roster| {
            roster.set_filters(filters);
            roster.select(ids)
        })
        .await?;
    Ok(())
}

async fn list_clients(
    backoffice: &Backoffice,
    args: &ClientsListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let filters = util::roster_filters(&args.filters)?;
    backoffice
        .update_roster(|roster| {
            roster.set_filters(filters);
            roster.set_sort(sort_spec(args.sort, args.desc));
            if let Some(size) = args.page_size {
                roster.set_page_size(size);
            }
            roster.set_page(args.page);
        })
        .await;

    let format = global.format();
    let color = output::should_color(global.color_mode());
    let (out, footer) = backoffice
        .with_roster(|roster| -> Result<(String, String), CliError> {
            let (rows, footer) = if args.all {
                let rows = roster.filtered();
                (rows, format!("{} client(s)", rows.len()))
            } else {
                let page = roster.page();
                let footer = format!(
                    "Page {} of {} ({}-{} of {})",
                    page.current_page,
                    page.total_pages,
                    page.range_start,
                    page.range_end,
                    page.total_items
                );
                (page.items, footer)
            };
            let out = output::render_list(
                format,
                rows,
                |p| ClientRow::new(p, color),
                |p| p.id.to_string(),
            )?;
            Ok((out, footer))
        })
        .await?;

    output::print_output(&out, global.quiet);
    if format == OutputFormat::Table {
        output::notice(&output::dim(&footer, color), global.quiet);
    }
    Ok(())
}

async fn get_client(
    backoffice: &Backoffice,
    identifier: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = backoffice
        .with_roster(|roster| match roster.find(identifier) {
            Some(p) => output::render_single(global.format(), p, detail, |p| p.id.to_string()),
            None => Err(CliError::NotFound {
                resource_type: "client".into(),
                identifier: identifier.into(),
                list_command: "clients list".into(),
            }),
        })
        .await?;
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn export_clients(
    backoffice: &Backoffice,
    args: ClientsExportArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let columns = args
        .columns
        .iter()
        .map(|c| util::parse_value::<ExportColumn>("columns", c.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    narrow(backoffice, &args.filters, &args.ids).await?;

    let today = chrono::Local::now().date_naive();
    let effect = backoffice
        .run_bulk(&BulkAction::Export { columns }, today)
        .await?;
    let BulkEffect::Exported(export) = effect else {
        return Err(CliError::Internal("export produced no file".into()));
    };

    let path = args
        .file
        .unwrap_or_else(|| PathBuf::from(&export.filename));
    util::write_output_file(&path, &export.content)?;
    if path.as_os_str() != "-" {
        output::notice(
            &format!("✓ {} row(s) written to {}", export.rows, path.display()),
            global.quiet,
        );
    }
    Ok(())
}

async fn bulk_action(
    backoffice: &Backoffice,
    args: &ClientsBulkArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let action = match args.action {
        BulkActionArg::Activate => BulkAction::Activate,
        BulkActionArg::Suspend => BulkAction::Suspend,
        BulkActionArg::Reminder => BulkAction::Reminder,
        BulkActionArg::PrioritizeSupport => BulkAction::PrioritizeSupport,
        BulkActionArg::ApplyPlan => {
            let raw = args.to_plan.as_deref().ok_or_else(|| CliError::Validation {
                field: "to-plan".into(),
                reason: "apply-plan needs --to-plan".into(),
            })?;
            BulkAction::ApplyPlan(util::parse_value::<Plan>("to-plan", raw)?)
        }
    };
    narrow(backoffice, &args.filters, &args.ids).await?;

    let targets = backoffice
        .with_roster(|roster| resolve_targets(&action, roster.selection(), roster.filtered()).len())
        .await;
    if targets > 0 {
        let prompt = format!("Run '{}' on {targets} client(s)?", action.name());
        if !util::confirm(&prompt, action.name(), global.yes)? {
            output::notice("Aborted", global.quiet);
            return Ok(());
        }
    }

    let today = chrono::Local::now().date_naive();
    let effect = backoffice.run_bulk(&action, today).await?;
    let report = BulkReport::new(&action, &effect);

    if global.format() == OutputFormat::Table {
        output::notice(&format!("✓ {}", report.summary), global.quiet);
    } else {
        let out = output::render_single(global.format(), &report, |r| r.summary.clone(), |r| {
            r.ids.join("\n")
        })?;
        output::print_output(&out, global.quiet);
    }
    Ok(())
}

async fn add_client(
    backoffice: &Backoffice,
    args: ClientsAddArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = NewClient {
        name: args.name,
        ip: args.ip,
        mac: args.mac,
        plan: util::parse_value("plan", &args.plan)?,
        zone: util::parse_value("zone", &args.zone)?,
        phone: args.phone,
        email: args.email,
        address: args.address,
        plan_cost: args.plan_cost,
    };
    let profile = backoffice.add_client(&client).await?;

    let out = output::render_single(global.format(), &profile, detail, |p| p.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
