//! Clients for the two external services: the "echo my IP" endpoint and
//! the geolocation-by-IP lookup.
//!
//! Each call is a single direct request; there are no retries and no
//! timeout beyond what the config asks for.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{LookupError, NetworkError};
use crate::record::AddressInfoRecord;

#[derive(Debug, Deserialize)]
struct SelfAddress {
    ip: String,
}

/// HTTP client for address resolution and metadata lookup.
#[derive(Debug, Clone)]
pub struct LookupClient {
    http: Client,
    self_ip_url: String,
    lookup_url: Url,
}

impl LookupClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_endpoints(
            &config.self_ip_url,
            &config.lookup_url,
            config.request_timeout(),
        )
    }

    pub fn with_endpoints(
        self_ip_url: &str,
        lookup_url: &str,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let lookup_url = Url::parse(lookup_url)?;
        if lookup_url.cannot_be_a_base() {
            anyhow::bail!("lookup URL {} cannot take a path", lookup_url);
        }

        let mut builder =
            Client::builder().user_agent(concat!("ipform/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            self_ip_url: self_ip_url.to_string(),
            lookup_url,
        })
    }

    /// Ask the self-address service for the caller's public IP.
    pub async fn resolve_self(&self) -> Result<String, NetworkError> {
        let resp = self
            .http
            .get(&self.self_ip_url)
            .send()
            .await
            .map_err(NetworkError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            debug!(endpoint = %self.self_ip_url, status = %status, "self-address request failed");
            return Err(NetworkError::Status(status));
        }

        let body: SelfAddress = resp
            .json()
            .await
            .map_err(|e| NetworkError::Body(e.to_string()))?;
        // returned as sent; the form's confirm step judges the format
        if body.ip.trim().is_empty() {
            return Err(NetworkError::Body("empty `ip` field".into()));
        }

        info!(ip = %body.ip, source = %self.self_ip_url, "resolved own address");
        Ok(body.ip)
    }

    /// Fetch geolocation metadata for `address`.
    ///
    /// The address is not re-validated here; it is only escaped into the
    /// request path.
    pub async fn lookup(&self, address: &str) -> Result<AddressInfoRecord, LookupError> {
        let url = self.lookup_target(address);
        debug!(url = %url, "looking up address");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(LookupError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            debug!(address = %address, status = %status, "lookup failed");
            return Err(LookupError::Status(status));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| LookupError::Body(e.to_string()))?;
        let attrs = match body {
            Value::Object(attrs) => attrs,
            other => return Err(LookupError::Body(format!("got {}", json_kind(&other)))),
        };

        // ipapi-style in-band error, e.g. for reserved ranges
        if attrs.get("error").and_then(Value::as_bool) == Some(true) {
            let reason = attrs
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("unspecified")
                .to_string();
            return Err(LookupError::Rejected {
                address: address.to_string(),
                reason,
            });
        }

        info!(address = %address, fields = attrs.len(), "lookup succeeded");
        Ok(AddressInfoRecord::from_map(attrs))
    }

    /// `{lookup_url}/{address}/json/`
    fn lookup_target(&self, address: &str) -> Url {
        let mut url = self.lookup_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(address).push("json").push("");
        }
        url
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LookupClient {
        LookupClient::with_endpoints(
            &format!("{}/self", server.uri()),
            &server.uri(),
            Some(Duration::from_secs(5)),
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_target() {
        let client =
            LookupClient::with_endpoints("http://x/self", "https://ipapi.co", None).unwrap();
        assert_eq!(
            client.lookup_target("8.8.8.8").as_str(),
            "https://ipapi.co/8.8.8.8/json/"
        );

        let client =
            LookupClient::with_endpoints("http://x/self", "http://geo.local/api/", None).unwrap();
        assert_eq!(
            client.lookup_target("1.2.3.4").as_str(),
            "http://geo.local/api/1.2.3.4/json/"
        );
        // path separators in user input stay inside one segment
        assert_eq!(
            client.lookup_target("1.2/../x").as_str(),
            "http://geo.local/api/1.2%2F..%2Fx/json/"
        );
    }

    #[test]
    fn test_rejects_unusable_lookup_url() {
        assert!(LookupClient::with_endpoints("http://x", "not a url", None).is_err());
        assert!(LookupClient::with_endpoints("http://x", "mailto:geo@example.com", None).is_err());
    }

    #[tokio::test]
    async fn test_resolve_self() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": "203.0.113.7" })))
            .expect(1)
            .mount(&server)
            .await;

        let ip = client_for(&server).resolve_self().await.unwrap();
        assert_eq!(ip, "203.0.113.7");
    }

    #[tokio::test]
    async fn test_resolve_self_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/self"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).resolve_self().await.unwrap_err();
        assert!(matches!(err, NetworkError::Status(s) if s.as_u16() == 500));
    }

    #[tokio::test]
    async fn test_resolve_self_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/self"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7"))
            .mount(&server)
            .await;

        let err = client_for(&server).resolve_self().await.unwrap_err();
        assert!(matches!(err, NetworkError::Body(_)));
    }

    #[tokio::test]
    async fn test_resolve_self_empty_ip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": "  " })))
            .mount(&server)
            .await;

        let err = client_for(&server).resolve_self().await.unwrap_err();
        assert!(matches!(err, NetworkError::Body(_)));
    }

    #[tokio::test]
    async fn test_resolve_self_returns_ip_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": " 1.2.3.4\n" })))
            .mount(&server)
            .await;

        let ip = client_for(&server).resolve_self().await.unwrap();
        assert_eq!(ip, " 1.2.3.4\n");
    }

    #[tokio::test]
    async fn test_resolve_self_unreachable() {
        let client = LookupClient::with_endpoints(
            "http://127.0.0.1:1/self",
            "http://127.0.0.1:1",
            Some(Duration::from_secs(2)),
        )
        .unwrap();
        let err = client.resolve_self().await.unwrap_err();
        assert!(matches!(err, NetworkError::Transport(_)));
    }

    #[tokio::test]
    async fn test_lookup_passes_fields_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/8.8.8.8/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "8.8.8.8",
                "region": "California",
                "asn": "AS15169",
                "vendor_extra": [1, 2, 3],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = client_for(&server).lookup("8.8.8.8").await.unwrap();
        assert_eq!(record.text(Field::Asn).as_deref(), Some("AS15169"));
        assert!(record.text(Field::City).is_none());
        assert_eq!(record.attrs().get("vendor_extra"), Some(&json!([1, 2, 3])));
    }

    #[tokio::test]
    async fn test_lookup_in_band_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/10.0.0.1/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "10.0.0.1",
                "error": true,
                "reason": "Reserved IP Address",
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup("10.0.0.1").await.unwrap_err();
        match err {
            LookupError::Rejected { address, reason } => {
                assert_eq!(address, "10.0.0.1");
                assert_eq!(reason, "Reserved IP Address");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_lookup_non_object_and_non_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1.1.1/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["1.1.1.1"])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2.2.2.2/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("getIPInformation({})"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.lookup("1.1.1.1").await.unwrap_err();
        assert!(err.to_string().contains("an array"));
        assert!(matches!(
            client.lookup("2.2.2.2").await.unwrap_err(),
            LookupError::Body(_)
        ));
    }

    #[tokio::test]
    async fn test_lookup_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup("8.8.4.4").await.unwrap_err();
        assert!(matches!(err, LookupError::Status(s) if s.as_u16() == 429));
    }
}
