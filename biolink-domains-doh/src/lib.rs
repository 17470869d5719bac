//! DNS-over-HTTPS verification for tenant custom domains.
//!
//! Issues CNAME (and diagnostic A) queries against a public JSON resolver and
//! compares the answer with the platform's CNAME target. Stateless and safe
//! to share across any number of concurrent requests.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use biolink_domains_doh::{
//!     DohVerifier, DomainVerifier, ReqwestDohTransport, DEFAULT_DOH_ENDPOINT, DEFAULT_DOH_TIMEOUT,
//! };
//! # async fn demo() -> biolink_domains_doh::DohResult<()> {
//! let transport = ReqwestDohTransport::new(DEFAULT_DOH_ENDPOINT, DEFAULT_DOH_TIMEOUT)?;
//! let verifier = DohVerifier::new(Arc::new(transport));
//! let result = verifier.verify("links.acme.com", "cname.example.com").await;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

mod domain_name;
mod error;
mod log_sanitizer;
mod transport;
mod types;
mod verifier;

pub use domain_name::{normalize_domain, validate_domain_syntax};
pub use error::{DohError, DohResult};
pub use log_sanitizer::truncate_for_log;
pub use transport::{DohTransport, ReqwestDohTransport, DEFAULT_DOH_ENDPOINT, DEFAULT_DOH_TIMEOUT};
pub use types::{
    a_addresses, cname_target, DnsRecordType, DohAnswer, DohResponse, RecordCheck,
    VerificationResult, VerificationStatus,
};
pub use verifier::{DohVerifier, DomainVerifier};
