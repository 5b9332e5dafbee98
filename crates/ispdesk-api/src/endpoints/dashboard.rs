use crate::client::BackofficeClient;
use crate::error::Error;
use crate::models::{DashboardStatsDto, PortalOverviewDto};

impl BackofficeClient {
    pub async fn dashboard(&self) -> Result<DashboardStatsDto, Error> {
        self.get("dashboard").await
    }

    pub async fn portal_overview(&self) -> Result<PortalOverviewDto, Error> {
        self.get("portal/overview").await
    }
}
