use super::uri::RequestUri;
use crate::error::NetworkError;
use reqwest::blocking::Client;

/// Blocking fetch of a markup payload
pub trait Transport {
    /// GET the URI and return the response body.
    ///
    /// Implementations must map every failure into a `NetworkError`.
    fn get(&self, uri: &RequestUri) -> Result<String, NetworkError>;
}

/// reqwest-backed transport with the client's default timeouts
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get(&self, uri: &RequestUri) -> Result<String, NetworkError> {
        let response = self
            .client
            .get(uri.as_str())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                let err = NetworkError::from(e);
                log::warn!("GET {} failed: {}", uri.redacted(), err.message());
                err
            })?;

        log::debug!("GET {} -> {}", uri.redacted(), response.status());

        response.text().map_err(NetworkError::from)
    }
}
