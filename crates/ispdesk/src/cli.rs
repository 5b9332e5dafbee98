//! Clap derive structures for the `ispdesk` CLI.
//!
//! Defines the command tree and global flags. Depends on clap only, so
//! build.rs can include it for man page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ispdesk -- back-office CLI for ISP client rosters
#[derive(Debug, Parser)]
#[command(
    name = "ispdesk",
    version,
    about = "Manage ISP client rosters from the command line",
    long_about = "Back-office tooling for an ISP tenant: browse and filter the client\n\
        roster, run bulk collection and support actions, export CSVs, watch\n\
        the dashboard, and generate HotSpot vouchers.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Back-office profile to use
    #[arg(long, short = 'p', env = "ISPDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Back-office API URL (overrides profile)
    #[arg(long, short = 'u', env = "ISPDESK_URL", global = true)]
    pub url: Option<String>,

    /// Bearer token (overrides profile and keyring)
    #[arg(long, env = "ISPDESK_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "ISPDESK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ISPDESK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: from profile, else 30]
    #[arg(long, env = "ISPDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or_default()
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse, export and act on the client roster
    #[command(alias = "cl", alias = "c")]
    Clients(ClientsArgs),

    /// Show tenant KPIs and the portal overview
    #[command(alias = "dash", alias = "d")]
    Dashboard(DashboardArgs),

    /// Generate HotSpot vouchers
    #[command(alias = "v")]
    Vouchers(VouchersArgs),

    /// Resolve a navigation query string (offline)
    Nav(NavArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Roster filters ───────────────────────────────────────────────────

/// Filter flags shared by every roster command. All given filters are
/// ANDed together.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Connection status
    #[arg(long, value_parser = ["active", "idle", "offline"])]
    pub status: Option<String>,

    /// Service zone
    #[arg(long, value_parser = ["centro", "norte", "sur", "este", "oeste"])]
    pub zone: Option<String>,

    /// Plan bandwidth in Mbps
    #[arg(long, value_parser = ["20", "40", "60", "100", "200"])]
    pub plan: Option<String>,

    /// Computed risk level
    #[arg(long, value_parser = ["low", "medium", "high"])]
    pub risk: Option<String>,

    /// Named segment
    #[arg(
        long,
        value_parser = ["all", "delinquent", "high_usage", "support", "healthy"]
    )]
    pub segment: Option<String>,

    /// Free-text search over name, IP, MAC, code and zone
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Name contains (case-insensitive)
    #[arg(long)]
    pub name: Option<String>,

    /// PPPoE username contains
    #[arg(long)]
    pub username: Option<String>,

    /// IP contains
    #[arg(long)]
    pub ip: Option<String>,

    /// LAN interface contains
    #[arg(long = "lan")]
    pub lan_interface: Option<String>,

    /// Billing cutoff day
    #[arg(long)]
    pub cutoff_day: Option<u8>,

    /// Suspension notice flag
    #[arg(long, value_parser = ["all", "yes", "no"])]
    pub screen_notice: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortFieldArg {
    #[default]
    Name,
    Usage,
    Debt,
    Tickets,
}

// ── Clients ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List clients, filtered, sorted and paginated
    #[command(alias = "ls")]
    List(ClientsListArgs),

    /// Show one client by connection id or code (CL-0001)
    Get {
        /// Connection id or client code
        client: String,
    },

    /// Export clients to CSV
    Export(ClientsExportArgs),

    /// Run a bulk action over selected or default targets
    Bulk(ClientsBulkArgs),

    /// Register a new client
    Add(ClientsAddArgs),
}

#[derive(Debug, Args)]
pub struct ClientsListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Sort field
    #[arg(long, value_enum, default_value = "name")]
    pub sort: SortFieldArg,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Page to show (clamped to the last page)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Rows per page [default: from config, else 10]
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Show every filtered row, ignoring pagination
    #[arg(long, short = 'a', conflicts_with_all = ["page", "page_size"])]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct ClientsExportArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Only these clients (ids or codes, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Columns to include (comma-separated) [default: code..risk]
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Output file, or `-` for stdout [default: clientes_<date>.csv]
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BulkActionArg {
    /// Set connections active (default: every non-active client)
    Activate,
    /// Cut connections off (default: clients with debt)
    Suspend,
    /// Queue a payment reminder (default: clients with debt)
    Reminder,
    /// Flag for priority support (default: high risk or open tickets)
    PrioritizeSupport,
    /// Move clients to another plan (requires --ids)
    ApplyPlan,
}

#[derive(Debug, Args)]
pub struct ClientsBulkArgs {
    /// Action to run
    #[arg(value_enum)]
    pub action: BulkActionArg,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Explicit targets (ids or codes, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Plan for apply-plan, in Mbps
    #[arg(
        long = "to-plan",
        value_parser = ["20", "40", "60", "100", "200"],
        required_if_eq("action", "apply-plan")
    )]
    pub to_plan: Option<String>,
}

#[derive(Debug, Args)]
pub struct ClientsAddArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Assigned IP address
    #[arg(long)]
    pub ip: String,

    /// Router MAC address
    #[arg(long)]
    pub mac: String,

    /// Plan bandwidth in Mbps
    #[arg(long, default_value = "20", value_parser = ["20", "40", "60", "100", "200"])]
    pub plan: String,

    /// Service zone
    #[arg(
        long,
        default_value = "centro",
        value_parser = ["centro", "norte", "sur", "este", "oeste"]
    )]
    pub zone: String,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// Monthly price, overriding the plan's list price
    #[arg(long)]
    pub plan_cost: Option<f64>,
}

// ── Dashboard ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Keep refreshing until interrupted
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Poll interval in seconds when watching [default: from config]
    #[arg(long, requires = "watch")]
    pub interval: Option<u64>,
}

// ── Vouchers ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct VouchersArgs {
    #[command(subcommand)]
    pub command: VouchersCommand,
}

#[derive(Debug, Subcommand)]
pub enum VouchersCommand {
    /// Generate a batch of unique voucher codes
    #[command(alias = "gen")]
    Generate(VouchersGenerateArgs),
}

#[derive(Debug, Args)]
pub struct VouchersGenerateArgs {
    /// Number of vouchers (1-1000)
    #[arg(long, short = 'n', default_value = "10")]
    pub count: usize,

    /// Random characters per code (4-16)
    #[arg(long, default_value = "8")]
    pub length: usize,

    /// Uppercase prefix prepended to every code
    #[arg(long)]
    pub prefix: Option<String>,

    /// HotSpot user profile the vouchers log in with
    #[arg(long, default_value = "default")]
    pub hotspot_profile: String,

    /// Session length in minutes
    #[arg(long, default_value = "60")]
    pub minutes: u32,

    /// Upload the batch to the back office
    #[arg(long)]
    pub publish: bool,

    /// Write a CSV of the batch, or `-` for stdout
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

// ── Nav ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NavArgs {
    /// Query string, e.g. `?view=clients&tab=bulk`
    #[arg(default_value = "")]
    pub query: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive profile setup
    Init,

    /// Print the effective configuration
    Show,

    /// Set a profile field
    Set {
        /// url, tenant, token_env, insecure, timeout, ca_cert
        key: String,
        value: String,
    },

    /// Store a token for the active profile in the system keyring
    SetToken,

    /// List configured profiles (`*` marks the default)
    Profiles,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
