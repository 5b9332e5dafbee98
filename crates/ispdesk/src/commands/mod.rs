//! Command dispatch: bridges CLI args -> core Backoffice -> output formatting.

pub mod clients;
pub mod config_cmd;
pub mod dashboard;
pub mod nav;
pub mod util;
pub mod vouchers;

use tracing::debug;

use ispdesk_core::{Backoffice, BackofficeConfig};

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;

/// Resolve the profile, build the facade and sign in.
pub async fn connect(global: &GlobalOpts, cfg: &Config) -> Result<Backoffice, CliError> {
    sign_in(config::resolve_backoffice(global, cfg)?).await
}

pub async fn sign_in(backoffice_config: BackofficeConfig) -> Result<Backoffice, CliError> {
    debug!(url = %backoffice_config.url, "connecting to back office");
    let backoffice = Backoffice::new(backoffice_config)?;
    let session = backoffice.login().await?;
    debug!(
        user = %session.user.name,
        role = %session.user.role,
        tenant = %session.tenant.slug,
        "signed in"
    );
    Ok(backoffice)
}

/// [`connect`], then load the roster.
pub async fn connect_with_roster(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<Backoffice, CliError> {
    let backoffice = connect(global, cfg).await?;
    backoffice.refresh_roster().await?;
    Ok(backoffice)
}

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    match cmd {
        Command::Clients(args) => clients::handle(args, global, cfg).await,
        Command::Dashboard(args) => dashboard::handle(args, global, cfg).await,
        Command::Vouchers(args) => vouchers::handle(args, global, cfg).await,
        Command::Nav(args) => nav::handle(&args, global),
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            use clap::CommandFactory;

            let mut cmd = crate::cli::Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "ispdesk", &mut std::io::stdout());
            Ok(())
        }
    }
}
