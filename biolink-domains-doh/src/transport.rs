//! DNS-over-HTTPS transport.
//!
//! The transport only moves a single question to a JSON resolver and back.
//! It never retries: retry and backoff policy belongs to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;

use crate::error::{DohError, DohResult};
use crate::log_sanitizer::truncate_for_log;
use crate::types::{DnsRecordType, DohResponse};

/// Public resolver used when none is configured.
pub const DEFAULT_DOH_ENDPOINT: &str = "https://cloudflare-dns.com/dns-query";

/// Upper bound for a single lookup.
pub const DEFAULT_DOH_TIMEOUT: Duration = Duration::from_secs(5);

const DNS_JSON_MEDIA_TYPE: &str = "application/dns-json";

/// Issues one DNS question over HTTPS.
#[async_trait]
pub trait DohTransport: Send + Sync {
    /// Query `name` for records of `record_type`.
    async fn query(&self, name: &str, record_type: DnsRecordType) -> DohResult<DohResponse>;
}

/// `reqwest`-backed transport speaking the JSON API
/// (`GET endpoint?name=<name>&type=<TYPE>`).
#[derive(Debug, Clone)]
pub struct ReqwestDohTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl ReqwestDohTransport {
    /// Build a transport with its own client bound to `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> DohResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DohError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Reuse an existing client. The caller is responsible for its timeout.
    #[must_use]
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DohTransport for ReqwestDohTransport {
    async fn query(&self, name: &str, record_type: DnsRecordType) -> DohResult<DohResponse> {
        log::debug!("[doh] GET {} name={name} type={record_type}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("name", name), ("type", record_type.as_str())])
            .header(ACCEPT, DNS_JSON_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DohError::Timeout(e.to_string())
                } else {
                    DohError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        log::debug!("[doh] Response Status: {}", status.as_u16());
        if !status.is_success() {
            log::warn!("[doh] Resolver returned HTTP {} for {name}", status.as_u16());
            return Err(DohError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DohError::Network(format!("Failed to read response body: {e}")))?;
        log::debug!("[doh] Response Body: {}", truncate_for_log(&body));

        DohResponse::from_json(&body).inspect_err(|e| {
            log::error!("[doh] {e}; raw response: {}", truncate_for_log(&body));
        })
    }
}
