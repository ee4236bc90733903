use super::params::QueryParameters;
use std::fmt;
use url::form_urlencoded::Serializer;
use url::Url;

/// Public Oracle of Bacon host
pub const ORACLE_HOST: &str = "oracleofbacon.org";

/// XML endpoint path on the Oracle host
pub const ORACLE_PATH: &str = "/cgi-bin/xml";

/// Fully encoded request URI for one query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestUri(pub(crate) String);

impl RequestUri {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The URI with the `p` (key) parameter masked, for logs
    pub fn redacted(&self) -> String {
        let Ok(mut url) = Url::parse(&self.0) else {
            return "<unparsable uri>".to_string();
        };
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "p" { "***".into() } else { v };
                (k.into_owned(), v.into_owned())
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

impl fmt::Display for RequestUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn encode_query(params: &QueryParameters) -> String {
    Serializer::new(String::new())
        .append_pair("p", params.api_key())
        .append_pair("a", params.from())
        .append_pair("b", params.to())
        .finish()
}

/// Build the request URI against the public Oracle endpoint.
///
/// Parameters are form-encoded in the fixed order `p`, `a`, `b`, so the same
/// inputs always produce the same string.
pub fn build_request_uri(params: &QueryParameters) -> RequestUri {
    RequestUri(format!(
        "http://{}{}?{}",
        ORACLE_HOST,
        ORACLE_PATH,
        encode_query(params)
    ))
}

/// Build the request URI against an arbitrary endpoint, replacing any query
/// string it already carries.
pub fn build_request_uri_for(endpoint: &Url, params: &QueryParameters) -> RequestUri {
    let mut url = endpoint.clone();
    url.set_query(Some(&encode_query(params)));
    RequestUri(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(from: &str, to: &str) -> QueryParameters {
        QueryParameters::configure(from, to, "38b99ce9ec87").unwrap()
    }

    #[test]
    fn test_build_request_uri_encodes_spaces() {
        let uri = build_request_uri(&params("Kevin Bacon", "Laurence Olivier"));
        assert_eq!(
            uri.as_str(),
            "http://oracleofbacon.org/cgi-bin/xml?p=38b99ce9ec87&a=Kevin+Bacon&b=Laurence+Olivier"
        );
    }

    #[test]
    fn test_build_request_uri_encodes_reserved() {
        let uri = build_request_uri(&params("Tom & Jerry", "a=b"));
        assert!(uri.as_str().ends_with("&a=Tom+%26+Jerry&b=a%3Db"));
    }

    #[test]
    fn test_build_request_uri_deterministic() {
        let p = params("Kevin Bacon", "Cate Blanchett");
        assert_eq!(build_request_uri(&p), build_request_uri(&p.clone()));
    }

    #[test]
    fn test_build_request_uri_for_endpoint() {
        let endpoint = Url::parse("http://127.0.0.1:8080/cgi-bin/xml?stale=1").unwrap();
        let uri = build_request_uri_for(&endpoint, &params("Kevin Bacon", "Laurence Olivier"));
        assert_eq!(
            uri.as_str(),
            "http://127.0.0.1:8080/cgi-bin/xml?p=38b99ce9ec87&a=Kevin+Bacon&b=Laurence+Olivier"
        );
    }

    #[test]
    fn test_public_endpoint_matches_builder() {
        let endpoint = Url::parse(&format!("http://{}{}", ORACLE_HOST, ORACLE_PATH)).unwrap();
        let p = params("Kevin Bacon", "Laurence Olivier");
        assert_eq!(build_request_uri(&p), build_request_uri_for(&endpoint, &p));
    }

    #[test]
    fn test_redacted_masks_key() {
        let uri = build_request_uri(&params("Kevin Bacon", "Laurence Olivier"));
        let redacted = uri.redacted();
        assert!(!redacted.contains("38b99ce9ec87"));
        assert!(redacted.contains("p=***") || redacted.contains("p=%2A%2A%2A"));
        assert!(redacted.contains("a=Kevin+Bacon"));
    }
}
