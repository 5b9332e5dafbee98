// Back-office HTTP client
//
// Wraps `reqwest::Client` with base-URL handling, envelope unwrapping, and
// status-to-error mapping. Endpoint methods live in `endpoints/` as
// inherent impls so this module stays focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::Envelope;
use crate::transport::TransportConfig;

const BODY_PREVIEW_CHARS: usize = 200;

/// Error body shape the backend uses for non-2xx responses.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "error")]
    message: Option<String>,
}

/// Async client for the back-office REST API.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct BackofficeClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackofficeClient {
    /// Build a client from a base URL and transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"connections"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_empty(resp).await
    }

    pub(crate) async fn put_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        handle_empty(resp).await
    }
}

/// Ensure the base path ends with `/` so relative joins append instead of
/// replacing the last segment.
fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    Ok(url)
}

/// Relative path `{collection}/{id}{suffix}` with `id` percent-encoded as
/// one segment. Dot segments would be collapsed by the URL parser even
/// when encoded, so they are refused.
pub(crate) fn resource_path(collection: &str, id: &str, suffix: &str) -> Result<String, Error> {
    if matches!(id, "" | "." | "..") {
        return Err(Error::InvalidId { id: id.to_owned() });
    }
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    let encoded = encoded.replace('+', "%20");
    Ok(format!("{collection}/{encoded}{suffix}"))
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(parse_error(status, resp).await);
    }

    let body = resp.text().await?;
    serde_json::from_str::<Envelope<T>>(&body)
        .map(Envelope::into_inner)
        .map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let path = resp.url().path().to_owned();
    let raw = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&raw)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            if raw.is_empty() {
                status.to_string()
            } else {
                preview(&raw)
            }
        });

    match status {
        reqwest::StatusCode::UNAUTHORIZED => Error::Authentication { message },
        reqwest::StatusCode::FORBIDDEN => Error::Forbidden { message },
        reqwest::StatusCode::NOT_FOUND => Error::NotFound { path },
        _ => Error::Http {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = normalize_base_url("https://api.example.net/v2").unwrap();
        assert_eq!(url.as_str(), "https://api.example.net/v2/");
    }

    #[test]
    fn relative_paths_append_to_base() {
        let client =
            BackofficeClient::with_client("https://api.example.net/v2", reqwest::Client::new())
                .unwrap();
        assert_eq!(
            client.url("/connections").unwrap().as_str(),
            "https://api.example.net/v2/connections"
        );
    }

    #[test]
    fn resource_ids_stay_one_segment() {
        let client =
            BackofficeClient::with_client("https://api.example.net/v2", reqwest::Client::new())
                .unwrap();
        let path = resource_path("connections", "a/b c?#", "/status").unwrap();
        assert_eq!(path, "connections/a%2Fb%20c%3F%23/status");
        assert_eq!(
            client.url(&path).unwrap().as_str(),
            "https://api.example.net/v2/connections/a%2Fb%20c%3F%23/status"
        );
    }

    #[test]
    fn dot_ids_are_refused() {
        for id in ["", ".", ".."] {
            assert!(matches!(
                resource_path("clients", id, ""),
                Err(Error::InvalidId { .. })
            ));
        }
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "ñ".repeat(300);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }
}
