//! CNAME verification of tenant custom domains.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain_name::normalize_domain;
use crate::transport::DohTransport;
use crate::types::{a_addresses, cname_target, DnsRecordType, DohResponse, VerificationResult};

/// Checks that a domain's DNS points at the platform.
///
/// Implementations never fail: every failure mode is folded into a
/// [`VerificationResult`] with `verified = false` and a diagnostic message.
#[async_trait]
pub trait DomainVerifier: Send + Sync {
    /// Verify that `domain` has a CNAME equal to `expected_target`.
    async fn verify(&self, domain: &str, expected_target: &str) -> VerificationResult;
}

/// Verifier backed by a DNS-over-HTTPS resolver.
///
/// Only a CNAME match counts as success. When no CNAME exists an optional
/// A query is issued purely to explain the situation to the user.
pub struct DohVerifier {
    transport: Arc<dyn DohTransport>,
    a_record_diagnostics: bool,
}

impl DohVerifier {
    #[must_use]
    pub fn new(transport: Arc<dyn DohTransport>) -> Self {
        Self {
            transport,
            a_record_diagnostics: true,
        }
    }

    /// Enable or disable the diagnostic A lookup.
    #[must_use]
    pub fn with_a_record_diagnostics(mut self, enabled: bool) -> Self {
        self.a_record_diagnostics = enabled;
        self
    }

    async fn diagnostic_a_records(&self, domain: &str) -> Vec<std::net::Ipv4Addr> {
        if !self.a_record_diagnostics {
            return Vec::new();
        }
        match self
            .transport
            .query(domain, DnsRecordType::A)
            .await
            .and_then(DohResponse::into_answers)
        {
            Ok(answers) => a_addresses(&answers),
            Err(e) => {
                log::debug!("[doh] Diagnostic A lookup for {domain} failed: {e}");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl DomainVerifier for DohVerifier {
    async fn verify(&self, domain: &str, expected_target: &str) -> VerificationResult {
        let domain = normalize_domain(domain);
        let expected = normalize_domain(expected_target);

        let answers = match self
            .transport
            .query(&domain, DnsRecordType::Cname)
            .await
            .and_then(DohResponse::into_answers)
        {
            Ok(answers) => answers,
            Err(e) => {
                log::warn!("[doh] CNAME lookup for {domain} failed: {e}");
                return VerificationResult::lookup_failed(&expected, &e);
            }
        };

        if let Some(found) = cname_target(&answers, &domain) {
            let found = normalize_domain(found);
            if found == expected {
                log::info!("[doh] {domain} verified (CNAME {found})");
                return VerificationResult::verified(&domain, &expected);
            }
            log::info!("[doh] {domain} CNAME mismatch: found {found}, expected {expected}");
            return VerificationResult::mismatch(&domain, &expected, &found);
        }

        let a_records = self.diagnostic_a_records(&domain).await;
        log::info!(
            "[doh] {domain} has no CNAME yet ({} A record(s) seen)",
            a_records.len()
        );
        VerificationResult::not_propagated(&domain, &expected, &a_records)
    }
}
