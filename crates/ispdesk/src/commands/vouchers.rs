//! HotSpot voucher command handlers. Generation is local; only
//! `--publish` needs a back office.

use tabled::Tabled;

use ispdesk_core::vouchers::{generate_batch, vouchers_csv};
use ispdesk_core::{Voucher, VoucherSpec};

use crate::cli::{GlobalOpts, VouchersArgs, VouchersCommand, VouchersGenerateArgs};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::{connect, util};

#[derive(Tabled)]
struct VoucherRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "Minutes")]
    minutes: u32,
}

impl From<&Voucher> for VoucherRow {
    fn from(v: &Voucher) -> Self {
        Self {
            code: v.code.clone(),
            profile: v.profile.clone(),
            minutes: v.duration_minutes,
        }
    }
}

fn spec_from(args: &VouchersGenerateArgs) -> VoucherSpec {
    VoucherSpec {
        length: args.length,
        prefix: args.prefix.as_ref().map(|p| p.trim().to_uppercase()),
        profile: args.hotspot_profile.clone(),
        duration_minutes: args.minutes,
    }
}

pub async fn handle(args: VouchersArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    match args.command {
        VouchersCommand::Generate(generate) => generate_vouchers(&generate, global, cfg).await,
    }
}

async fn generate_vouchers(
    args: &VouchersGenerateArgs,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    let vouchers = generate_batch(args.count, &spec_from(args))?;

    if args.publish {
        let backoffice = connect(global, cfg).await?;
        backoffice.publish_vouchers(&vouchers).await?;
        output::notice(
            &format!("✓ {} voucher(s) published", vouchers.len()),
            global.quiet,
        );
    }

    if let Some(ref path) = args.file {
        util::write_output_file(path, &vouchers_csv(&vouchers))?;
        if path.as_os_str() != "-" {
            output::notice(
                &format!("✓ {} voucher(s) written to {}", vouchers.len(), path.display()),
                global.quiet,
            );
        }
        return Ok(());
    }

    let out = output::render_list(global.format(), &vouchers, |v| VoucherRow::from(v), |v| {
        v.code.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn prefix_is_normalized() {
        let args = VouchersGenerateArgs {
            count: 1,
            length: 6,
            prefix: Some(" wifi ".into()),
            hotspot_profile: "1h".into(),
            minutes: 60,
            publish: false,
            file: Some(PathBuf::from("-")),
        };
        let spec = spec_from(&args);
        assert_eq!(spec.prefix.as_deref(), Some("WIFI"));
        assert_eq!(spec.length, 6);
        assert_eq!(spec.profile, "1h");
    }
}
