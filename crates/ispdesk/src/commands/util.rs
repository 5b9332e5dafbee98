//! Shared helpers for command handlers.

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::str::FromStr;

use ispdesk_core::{ColumnFilters, RosterFilters};

use crate::cli::FilterArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed. Without
/// a terminal to ask on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Parse a flag value into a domain enum.
pub fn parse_value<T>(field: &str, raw: &str) -> Result<T, CliError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| CliError::Validation {
        field: field.into(),
        reason: format!("'{raw}': {e}"),
    })
}

fn parse_opt<T>(field: &str, raw: Option<&str>) -> Result<Option<T>, CliError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|r| parse_value(field, r)).transpose()
}

/// Translate filter flags into roster filters.
pub fn roster_filters(args: &FilterArgs) -> Result<RosterFilters, CliError> {
    Ok(RosterFilters {
        status: parse_opt("status", args.status.as_deref())?,
        zone: parse_opt("zone", args.zone.as_deref())?,
        plan: parse_opt("plan", args.plan.as_deref())?,
        risk: parse_opt("risk", args.risk.as_deref())?,
        segment: parse_opt("segment", args.segment.as_deref())?.unwrap_or_default(),
        search: args.search.clone().unwrap_or_default(),
        columns: ColumnFilters {
            name: args.name.clone().unwrap_or_default(),
            username: args.username.clone().unwrap_or_default(),
            ip: args.ip.clone().unwrap_or_default(),
            lan_interface: args.lan_interface.clone().unwrap_or_default(),
            cutoff_day: args.cutoff_day,
            screen_notice: parse_opt("screen-notice", args.screen_notice.as_deref())?
                .unwrap_or_default(),
        },
    })
}

/// Write `content` to `path`, or to stdout for `-`.
pub fn write_output_file(path: &Path, content: &str) -> Result<(), CliError> {
    if path.as_os_str() == "-" {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{content}")?;
        return Ok(());
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ispdesk_core::{ConnectionStatus, Plan, ScreenNotice, Segment, Zone};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn filter_flags_map_onto_roster_filters() {
        let args = FilterArgs {
            status: Some("offline".into()),
            zone: Some("norte".into()),
            plan: Some("40".into()),
            segment: Some("high_usage".into()),
            search: Some("ana".into()),
            cutoff_day: Some(15),
            screen_notice: Some("yes".into()),
            ..FilterArgs::default()
        };
        let filters = roster_filters(&args).unwrap();
        assert_eq!(filters.status, Some(ConnectionStatus::Offline));
        assert_eq!(filters.zone, Some(Zone::Norte));
        assert_eq!(filters.plan, Some(Plan::Mbps40));
        assert_eq!(filters.risk, None);
        assert_eq!(filters.segment, Segment::HighUsage);
        assert_eq!(filters.search, "ana");
        assert_eq!(filters.columns.cutoff_day, Some(15));
        assert_eq!(filters.columns.screen_notice, ScreenNotice::Yes);
    }

    #[test]
    fn no_flags_means_no_filters() {
        let filters = roster_filters(&FilterArgs::default()).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn bad_value_names_the_field() {
        let err = parse_value::<Zone>("zone", "atlantis").unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "zone"));
    }
}
