pub mod config;
pub mod error;
pub mod oracle;

pub use config::Config;
pub use error::{BaconError, FieldError, NetworkError, Result, ValidationErrors};
pub use oracle::{parse, OracleClient, QueryParameters, QueryResponse, RequestUri};

/// Validate inputs and run one connection query against `client`
pub fn find_connections<T: oracle::Transport>(
    client: &OracleClient<T>,
    from: &str,
    to: &str,
    api_key: &str,
) -> Result<QueryResponse> {
    let params = QueryParameters::configure(from, to, api_key)?;
    Ok(client.query(&params)?)
}
