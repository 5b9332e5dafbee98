// ── Connection domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ids::{ConnectionId, MacAddress};

/// Link state of a subscriber connection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ConnectionStatus {
    Active,
    Idle,
    Offline,
}

/// A subscriber's network link, as provisioned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub ip: String,
    pub mac: MacAddress,
    pub status: ConnectionStatus,
}

impl Connection {
    pub fn new(
        id: impl Into<ConnectionId>,
        ip: impl Into<String>,
        mac: impl AsRef<str>,
        status: ConnectionStatus,
    ) -> Self {
        Self {
            id: id.into(),
            ip: ip.into(),
            mac: MacAddress::new(mac),
            status,
        }
    }
}
