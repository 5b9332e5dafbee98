// ── Query-string navigation ──
//
// Each navigation category is a closed enum parsed once at the boundary.
// Absent or unknown values fall back to the category's first option.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A navigation category addressed by one query parameter.
pub trait NavParam: FromStr + Default + fmt::Display + Copy {
    const PARAM: &'static str;

    /// Total parse: anything unrecognized becomes the default.
    fn from_param(raw: Option<&str>) -> Self {
        raw.and_then(|v| v.trim().parse().ok()).unwrap_or_default()
    }
}

macro_rules! nav_enum {
    ($(#[$meta:meta])* $name:ident, $param:literal { $first:ident $(, $rest:ident)* $(,)? }) => {
        $(#[$meta])*
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
        pub enum $name {
            #[default]
            $first,
            $($rest,)*
        }

        impl NavParam for $name {
            const PARAM: &'static str = $param;
        }
    };
}

nav_enum!(
    /// Back-office admin module.
    AdminView, "view" {
        Dashboard, Clients, Finance, Routers, Olt, Warehouse, Hotspot, Settings
    }
);

nav_enum!(
    /// Sub-tab of the client roster.
    RosterTab, "tab" { List, Segments, Bulk }
);

nav_enum!(
    /// Customer portal section.
    PortalSection, "portal" { Usage, Billing, Tickets }
);

nav_enum!(
    /// Technician work queue.
    TechnicianQueue, "queue" { Open, Assigned, Resolved }
);

/// Every navigation category, resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub view: AdminView,
    pub tab: RosterTab,
    pub portal: PortalSection,
    pub queue: TechnicianQueue,
}

impl Navigation {
    /// Parse a query string (with or without the leading `?`). The first
    /// occurrence of a parameter wins.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let lookup = |param: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == param)
                .map(|(_, v)| v.as_str())
        };

        Self {
            view: AdminView::from_param(lookup(AdminView::PARAM)),
            tab: RosterTab::from_param(lookup(RosterTab::PARAM)),
            portal: PortalSection::from_param(lookup(PortalSection::PARAM)),
            queue: TechnicianQueue::from_param(lookup(TechnicianQueue::PARAM)),
        }
    }

    /// Canonical query string, every category spelled out.
    pub fn to_query(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair(AdminView::PARAM, &self.view.to_string())
            .append_pair(RosterTab::PARAM, &self.tab.to_string())
            .append_pair(PortalSection::PARAM, &self.portal.to_string())
            .append_pair(TechnicianQueue::PARAM, &self.queue.to_string())
            .finish()
    }
}
