use crate::client::{BackofficeClient, resource_path};
use crate::error::Error;
use crate::models::{ConnectionDto, StatusChangeDto};

impl BackofficeClient {
    /// List every connection for the tenant.
    pub async fn list_connections(&self) -> Result<Vec<ConnectionDto>, Error> {
        self.get("connections").await
    }

    /// Change the service status of one connection.
    pub async fn set_connection_status(&self, id: &str, status: &str) -> Result<(), Error> {
        let body = StatusChangeDto {
            status: status.to_owned(),
        };
        self.post_no_response(&resource_path("connections", id, "/status")?, &body)
            .await
    }
}
