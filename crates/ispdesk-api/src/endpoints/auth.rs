use crate::client::BackofficeClient;
use crate::error::Error;
use crate::models::UserDto;

impl BackofficeClient {
    /// Identity behind the configured bearer token.
    pub async fn me(&self) -> Result<UserDto, Error> {
        self.get("auth/me").await
    }

    /// Invalidate the current token server-side.
    pub async fn logout(&self) -> Result<(), Error> {
        self.post_no_response("auth/logout", &serde_json::json!({}))
            .await
    }
}
