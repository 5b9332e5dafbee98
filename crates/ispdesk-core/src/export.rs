// ── CSV export ──
//
// Every field quoted, embedded quotes doubled, LF between rows and no
// trailing newline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::ClientProfile;

/// A column of the client CSV export.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ExportColumn {
    Code,
    Name,
    Username,
    Ip,
    Mac,
    Status,
    Plan,
    Zone,
    Debt,
    Tickets,
    Risk,
    Usage,
    LanInterface,
    CutoffDay,
    Phone,
    Email,
    Address,
}

impl ExportColumn {
    pub const DEFAULTS: &'static [Self] = &[
        Self::Code,
        Self::Name,
        Self::Username,
        Self::Ip,
        Self::Mac,
        Self::Status,
        Self::Plan,
        Self::Zone,
        Self::Debt,
        Self::Tickets,
        Self::Risk,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Self::Code => "Code",
            Self::Name => "Name",
            Self::Username => "Username",
            Self::Ip => "IP",
            Self::Mac => "MAC",
            Self::Status => "Status",
            Self::Plan => "Plan",
            Self::Zone => "Zone",
            Self::Debt => "Debt",
            Self::Tickets => "Tickets",
            Self::Risk => "Risk",
            Self::Usage => "Usage (GB)",
            Self::LanInterface => "LAN Interface",
            Self::CutoffDay => "Cutoff Day",
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::Address => "Address",
        }
    }

    pub fn value(self, p: &ClientProfile) -> String {
        match self {
            Self::Code => p.code.clone(),
            Self::Name => p.name.clone(),
            Self::Username => p.username.clone(),
            Self::Ip => p.ip.clone(),
            Self::Mac => p.mac.to_string(),
            Self::Status => p.status.to_string(),
            Self::Plan => p.plan.to_string(),
            Self::Zone => p.zone.to_string(),
            Self::Debt => format!("{:.2}", p.debt),
            Self::Tickets => p.tickets.to_string(),
            Self::Risk => p.risk.to_string(),
            Self::Usage => p.monthly_usage_gb.to_string(),
            Self::LanInterface => p.lan_interface.clone(),
            Self::CutoffDay => p.cutoff_day.to_string(),
            Self::Phone => p.phone.clone().unwrap_or_default(),
            Self::Email => p.email.clone().unwrap_or_default(),
            Self::Address => p.address.clone().unwrap_or_default(),
        }
    }
}

/// A rendered export, ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
    /// Data rows, header excluded.
    pub rows: usize,
}

/// `clientes_YYYY-MM-DD.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("clientes_{}.csv", date.format("%Y-%m-%d"))
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header plus one line per row.
pub fn write_csv<H, R>(header: &[H], rows: impl IntoIterator<Item = Vec<R>>) -> String
where
    H: AsRef<str>,
    R: AsRef<str>,
{
    let mut lines = vec![csv_line(header)];
    lines.extend(rows.into_iter().map(|row| csv_line(&row)));
    lines.join("\n")
}

pub fn profiles_csv<'a>(
    profiles: impl IntoIterator<Item = &'a ClientProfile>,
    columns: &[ExportColumn],
) -> String {
    let header: Vec<&str> = columns.iter().map(|c| c.header()).collect();
    write_csv(
        &header,
        profiles
            .into_iter()
            .map(|p| columns.iter().map(|c| c.value(p)).collect::<Vec<_>>()),
    )
}

/// Export `profiles` with `columns` (the defaults when empty).
pub fn export_profiles<'a>(
    profiles: impl IntoIterator<Item = &'a ClientProfile>,
    columns: &[ExportColumn],
    today: NaiveDate,
) -> CsvExport {
    let columns = if columns.is_empty() {
        ExportColumn::DEFAULTS
    } else {
        columns
    };
    let profiles: Vec<&ClientProfile> = profiles.into_iter().collect();
    CsvExport {
        filename: export_filename(today),
        content: profiles_csv(profiles.iter().copied(), columns),
        rows: profiles.len(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Connection, ConnectionId, ConnectionStatus};
    use crate::overlay::MetadataOverlay;
    use crate::projector::{project, synthesize_meta};
    use pretty_assertions::assert_eq;

    /// Split on commas outside quotes and undo doubled quotes.
    fn parse_csv(doc: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = doc.chars().peekable();
        while let Some(ch) = chars.next() {
            match (ch, in_quotes) {
                ('"', true) if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                ('"', _) => in_quotes = !in_quotes,
                (',', false) => row.push(std::mem::take(&mut field)),
                ('\n', false) => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                _ => field.push(ch),
            }
        }
        row.push(field);
        rows.push(row);
        rows
    }

    fn awkward_profiles() -> Vec<ClientProfile> {
        let names = [
            "Ana \"La Jefa\" Torres",
            "Quispe, María",
            "Luis\nCondori",
            "Plain Name",
        ];
        let conns: Vec<_> = (0..names.len())
            .map(|i| {
                Connection::new(
                    format!("c{i}"),
                    format!("10.1.0.{i}"),
                    "aa:bb:cc:dd:ee:ff",
                    ConnectionStatus::Active,
                )
            })
            .collect();
        let mut overlay = MetadataOverlay::new();
        for (i, (conn, name)) in conns.iter().zip(names).enumerate() {
            let mut meta = synthesize_meta(i, conn);
            meta.name = name.to_owned();
            overlay.insert(ConnectionId::from(conn.id.as_str()), meta);
        }
        project(&conns, &overlay, "fibra")
    }

    #[test]
    fn round_trip_recovers_every_row_and_value() {
        let profiles = awkward_profiles();
        let columns = [ExportColumn::Code, ExportColumn::Name, ExportColumn::Ip];
        let doc = profiles_csv(&profiles, &columns);
        let parsed = parse_csv(&doc);

        assert_eq!(parsed.len(), profiles.len() + 1);
        assert_eq!(parsed[0], vec!["Code", "Name", "IP"]);
        for (row, profile) in parsed[1..].iter().zip(&profiles) {
            assert_eq!(row, &vec![profile.code.clone(), profile.name.clone(), profile.ip.clone()]);
        }
    }

    #[test]
    fn no_trailing_newline() {
        let doc = profiles_csv(&awkward_profiles(), ExportColumn::DEFAULTS);
        assert!(!doc.ends_with('\n'));
    }

    #[test]
    fn byte_exact_layout() {
        let doc = write_csv(&["id", "note"], vec![vec!["1", "say \"hi\", ok"], vec!["2", ""]]);
        insta::assert_snapshot!(doc, @r#"
        "id","note"
        "1","say ""hi"", ok"
        "2",""
        "#);
    }

    #[test]
    fn filename_carries_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
        assert_eq!(export_filename(date), "clientes_2026-02-16.csv");
    }

    #[test]
    fn empty_columns_fall_back_to_defaults() {
        let profiles = awkward_profiles();
        let date = NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
        let export = export_profiles(&profiles, &[], date);
        assert_eq!(export.rows, 4);
        assert!(export.content.starts_with("\"Code\",\"Name\",\"Username\""));
    }
}
