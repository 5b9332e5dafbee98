use crate::client::{BackofficeClient, resource_path};
use crate::error::Error;
use crate::models::{ClientMetaDto, ConnectionDto, NewClientDto};

impl BackofficeClient {
    /// List client metadata. Connections without an entry are simply absent.
    pub async fn list_clients(&self) -> Result<Vec<ClientMetaDto>, Error> {
        self.get("clients").await
    }

    /// Create or replace the metadata record for a connection.
    pub async fn upsert_client(&self, meta: &ClientMetaDto) -> Result<(), Error> {
        self.put_no_response(&resource_path("clients", &meta.connection_id, "")?, meta)
            .await
    }

    /// Register a new subscriber. The backend provisions the connection and
    /// returns it with its assigned id.
    pub async fn create_client(&self, client: &NewClientDto) -> Result<ConnectionDto, Error> {
        self.post("clients", client).await
    }
}
