use crate::client::BackofficeClient;
use crate::error::Error;
use crate::models::VoucherDto;

impl BackofficeClient {
    /// Publish a batch of generated vouchers to the HotSpot backend.
    pub async fn publish_vouchers(&self, vouchers: &[VoucherDto]) -> Result<(), Error> {
        self.post_no_response("hotspot/vouchers", &vouchers).await
    }
}
