// SMC HTTP client
//
// Wraps `reqwest::Client` with base-URL construction from a bare target
// address, per-verb timeouts, Basic-auth on POSTs and uniform body handling.
// No retries happen here: retry cadence belongs to the caller's poll loop.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::BasicAuth;
use crate::error::Error;
use crate::transport::TransportConfig;

const BODY_PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for one System Management Controller.
///
/// Every call returns the parsed JSON body or a typed [`Error`]. An empty
/// body on a success status decodes to `{}`.
#[derive(Debug, Clone)]
pub struct SmcClient {
    http: reqwest::Client,
    base_url: Url,
    auth: BasicAuth,
    get_timeout: Duration,
    post_timeout: Duration,
}

impl SmcClient {
    /// Create a client for `target_address` (an IP, `host:port`, or full
    /// `http://` URL).
    pub fn new(
        target_address: &str,
        auth: BasicAuth,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(
            http,
            Self::base_url_for(target_address)?,
            auth,
            transport,
        ))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        auth: BasicAuth,
        transport: &TransportConfig,
    ) -> Self {
        Self {
            http,
            base_url,
            auth,
            get_timeout: transport.get_timeout,
            post_timeout: transport.post_timeout,
        }
    }

    /// Build `http://<target_address>` from a configured address.
    pub fn base_url_for(target_address: &str) -> Result<Url, Error> {
        let address = target_address.trim();
        let invalid = |reason: String| Error::InvalidAddress {
            address: target_address.to_owned(),
            reason,
        };

        if address.is_empty() {
            return Err(invalid("address is empty".into()));
        }

        let raw = if address.contains("://") {
            address.to_owned()
        } else {
            format!("http://{address}")
        };

        let url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".into()));
        }
        Ok(url)
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &BasicAuth {
        &self.auth
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an absolute API path (e.g. `/api/session`) onto the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|e| Error::InvalidAddress {
                address: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// `GET path` with the fixed GET timeout.
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .timeout(self.get_timeout)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|e| self.classify(e, self.get_timeout))?;

        self.handle_response(resp, self.get_timeout).await
    }

    /// `POST path` with a JSON body and the Basic-auth header.
    pub async fn post(&self, path: &str, body: &(impl Serialize + Sync)) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .timeout(self.post_timeout)
            .header(AUTHORIZATION, self.auth.header_value()?)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e, self.post_timeout))?;

        self.handle_response(resp, self.post_timeout).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(
        &self,
        resp: reqwest::Response,
        timeout: Duration,
    ) -> Result<Value, Error> {
        let status = resp.status();
        trace!(%status, "response received");

        let body = resp.text().await.map_err(|e| self.classify(e, timeout))?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        parse_body(&body)
    }

    #[allow(clippy::unused_self)]
    fn classify(&self, err: reqwest::Error, timeout: Duration) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// Decode a success body. Empty (or whitespace-only) bodies mean `{}`.
pub fn parse_body(body: &str) -> Result<Value, Error> {
    if body.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn base_url_from_bare_ip() {
        let url = SmcClient::base_url_for("192.168.1.50").expect("valid");
        assert_eq!(url.as_str(), "http://192.168.1.50/");
    }

    #[test]
    fn base_url_keeps_port_and_scheme() {
        let url = SmcClient::base_url_for("smc.local:8080").expect("valid");
        assert_eq!(url.as_str(), "http://smc.local:8080/");
        let url = SmcClient::base_url_for("http://10.0.0.2:81").expect("valid");
        assert_eq!(url.as_str(), "http://10.0.0.2:81/");
    }

    #[test]
    fn base_url_rejects_empty_address() {
        let err = SmcClient::base_url_for("  ").expect_err("empty");
        assert!(err.is_configuration());
    }

    #[test]
    fn base_url_rejects_non_http_scheme() {
        for address in ["https://10.0.0.2", "ftp://smc.local", "file:///etc/hosts"] {
            let err = SmcClient::base_url_for(address).expect_err(address);
            assert!(err.is_configuration(), "{address}");
            assert!(err.to_string().contains("unsupported scheme"), "{err}");
        }
    }

    #[test]
    fn empty_body_is_empty_object() {
        assert_eq!(parse_body("").expect("empty ok"), json!({}));
        assert_eq!(parse_body(" \n").expect("blank ok"), json!({}));
    }

    #[test]
    fn malformed_body_is_protocol_error() {
        let err = parse_body("{not json").expect_err("malformed");
        assert!(err.is_protocol());
    }
}
