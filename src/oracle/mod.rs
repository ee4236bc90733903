//! Oracle of Bacon client: build the request, fetch it, classify the reply.

pub mod params;
pub mod response;
pub mod transport;
pub mod uri;

pub use params::QueryParameters;
pub use response::{parse, QueryResponse};
pub use transport::{HttpTransport, Transport};
pub use uri::{build_request_uri, build_request_uri_for, RequestUri, ORACLE_HOST, ORACLE_PATH};

use crate::error::NetworkError;
use url::Url;

/// Synchronous client for the connection query endpoint.
///
/// Each `query` call is independent: one GET, no retry, no shared state.
pub struct OracleClient<T: Transport = HttpTransport> {
    transport: T,
    endpoint: Option<Url>,
}

impl OracleClient<HttpTransport> {
    /// Client against the public endpoint using reqwest
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new())
    }
}

impl Default for OracleClient<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> OracleClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            endpoint: None,
        }
    }

    /// Send queries to `endpoint` instead of the public Oracle host
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// The URI a query for `params` will request
    pub fn request_uri(&self, params: &QueryParameters) -> RequestUri {
        match &self.endpoint {
            Some(endpoint) => build_request_uri_for(endpoint, params),
            None => build_request_uri(params),
        }
    }

    pub fn fetch(&self, uri: &RequestUri) -> Result<String, NetworkError> {
        self.transport.get(uri)
    }

    /// Build, fetch and classify one query
    pub fn query(&self, params: &QueryParameters) -> Result<QueryResponse, NetworkError> {
        let uri = self.request_uri(params);
        log::debug!("Querying {}", uri.redacted());
        let markup = self.fetch(&uri)?;
        let response = parse(&markup);
        log::debug!("Query {} => {}: {}", params.from(), params.to(), response.kind());
        Ok(response)
    }
}
