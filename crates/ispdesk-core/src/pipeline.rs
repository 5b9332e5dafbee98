// ── Filter / segment / sort pipeline ──
//
// Each active filter dimension becomes one `RosterPredicate`; the filtered
// set is the AND-fold of the list. Adding a dimension means adding a
// variant, nothing else changes.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::{ClientProfile, ConnectionStatus, Plan, Risk, Zone};

/// Usage at or above which a client falls in the high-usage segment (GB).
pub const HIGH_USAGE_GB: u32 = 80;

// ── Segments ────────────────────────────────────────────────────────

/// Named composite filter over derived profile fields.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum Segment {
    #[default]
    All,
    Delinquent,
    #[strum(to_string = "high_usage", serialize = "highusage")]
    HighUsage,
    Support,
    Healthy,
}

impl Segment {
    pub fn matches(self, profile: &ClientProfile) -> bool {
        match self {
            Self::All => true,
            Self::Delinquent => profile.debt > 0.0,
            Self::HighUsage => profile.monthly_usage_gb >= HIGH_USAGE_GB,
            Self::Support => profile.tickets > 0 || profile.risk == Risk::High,
            Self::Healthy => {
                profile.debt <= 0.0 && profile.tickets == 0 && profile.risk == Risk::Low
            }
        }
    }
}

/// Tri-state filter on the screen-notice flag.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScreenNotice {
    #[default]
    All,
    Yes,
    No,
}

// ── Filter state ────────────────────────────────────────────────────

/// Per-column filters. Empty strings and `None` are inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnFilters {
    pub name: String,
    pub username: String,
    pub ip: String,
    pub lan_interface: String,
    pub cutoff_day: Option<u8>,
    pub screen_notice: ScreenNotice,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterFilters {
    pub status: Option<ConnectionStatus>,
    pub zone: Option<Zone>,
    pub plan: Option<Plan>,
    pub risk: Option<Risk>,
    pub segment: Segment,
    pub search: String,
    pub columns: ColumnFilters,
}

impl RosterFilters {
    /// The active predicates, in a fixed order.
    pub fn predicates(&self) -> Vec<RosterPredicate> {
        let mut out = Vec::new();
        if let Some(status) = self.status {
            out.push(RosterPredicate::Status(status));
        }
        if let Some(zone) = self.zone {
            out.push(RosterPredicate::Zone(zone));
        }
        if let Some(plan) = self.plan {
            out.push(RosterPredicate::Plan(plan));
        }
        if let Some(risk) = self.risk {
            out.push(RosterPredicate::Risk(risk));
        }
        if self.segment != Segment::All {
            out.push(RosterPredicate::Segment(self.segment));
        }
        if let Some(needle) = needle(&self.search) {
            out.push(RosterPredicate::Search(needle));
        }

        let cols = &self.columns;
        if let Some(needle) = needle(&cols.name) {
            out.push(RosterPredicate::NameContains(needle));
        }
        if let Some(needle) = needle(&cols.username) {
            out.push(RosterPredicate::UsernameContains(needle));
        }
        if let Some(needle) = needle(&cols.ip) {
            out.push(RosterPredicate::IpContains(needle));
        }
        if let Some(needle) = needle(&cols.lan_interface) {
            out.push(RosterPredicate::LanInterfaceContains(needle));
        }
        if let Some(day) = cols.cutoff_day {
            out.push(RosterPredicate::CutoffDay(day));
        }
        match cols.screen_notice {
            ScreenNotice::All => {}
            ScreenNotice::Yes => out.push(RosterPredicate::ScreenNotice(true)),
            ScreenNotice::No => out.push(RosterPredicate::ScreenNotice(false)),
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }
}

/// Trimmed, lowercased needle; `None` when blank.
fn needle(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

// ── Predicates ──────────────────────────────────────────────────────

/// One filter dimension. Text needles are stored already lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterPredicate {
    Status(ConnectionStatus),
    Zone(Zone),
    Plan(Plan),
    Risk(Risk),
    Segment(Segment),
    /// Matches name, ip, mac, code or zone.
    Search(String),
    NameContains(String),
    UsernameContains(String),
    IpContains(String),
    LanInterfaceContains(String),
    CutoffDay(u8),
    ScreenNotice(bool),
}

impl RosterPredicate {
    pub fn matches(&self, profile: &ClientProfile) -> bool {
        match self {
            Self::Status(status) => profile.status == *status,
            Self::Zone(zone) => profile.zone == *zone,
            Self::Plan(plan) => profile.plan == *plan,
            Self::Risk(risk) => profile.risk == *risk,
            Self::Segment(segment) => segment.matches(profile),
            Self::Search(needle) => {
                contains_ci(&profile.name, needle)
                    || contains_ci(&profile.ip, needle)
                    || contains_ci(profile.mac.as_str(), needle)
                    || contains_ci(&profile.code, needle)
                    || contains_ci(&profile.zone.to_string(), needle)
            }
            Self::NameContains(needle) => contains_ci(&profile.name, needle),
            Self::UsernameContains(needle) => contains_ci(&profile.username, needle),
            Self::IpContains(needle) => contains_ci(&profile.ip, needle),
            Self::LanInterfaceContains(needle) => contains_ci(&profile.lan_interface, needle),
            Self::CutoffDay(day) => profile.cutoff_day == *day,
            Self::ScreenNotice(wanted) => profile.screen_notice == *wanted,
        }
    }
}

/// Keep the profiles every predicate accepts, preserving order.
pub fn apply_filters(
    profiles: &[ClientProfile],
    predicates: &[RosterPredicate],
) -> Vec<ClientProfile> {
    profiles
        .iter()
        .filter(|p| predicates.iter().all(|pred| pred.matches(p)))
        .cloned()
        .collect()
}

// ── Sorting ─────────────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum SortField {
    #[default]
    Name,
    Usage,
    Debt,
    Tickets,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn compare(self, a: &ClientProfile, b: &ClientProfile) -> Ordering {
        let ord = match self.field {
            SortField::Name => compare_names(&a.name, &b.name),
            SortField::Usage => a.monthly_usage_gb.cmp(&b.monthly_usage_gb),
            SortField::Debt => a.debt.total_cmp(&b.debt),
            SortField::Tickets => a.tickets.cmp(&b.tickets),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Dictionary order: base letters first, so "Álvaro" files under A and
/// "ana" sits next to "Ana". Accents, then case, break ties.
fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Decomposed, marks dropped, lowercased.
fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Stable in place: ties keep their input order.
pub fn sort_profiles(profiles: &mut [ClientProfile], sort: SortSpec) {
    profiles.sort_by(|a, b| sort.compare(a, b));
}

/// Filter then sort.
pub fn apply(
    profiles: &[ClientProfile],
    filters: &RosterFilters,
    sort: SortSpec,
) -> Vec<ClientProfile> {
    let mut out = apply_filters(profiles, &filters.predicates());
    sort_profiles(&mut out, sort);
    out
}
