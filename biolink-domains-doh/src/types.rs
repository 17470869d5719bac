//! Public types returned by DoH lookups and verification.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::domain_name::normalize_domain;
use crate::error::{DohError, DohResult};

/// DNS RCODE for a successful answer.
const RCODE_NOERROR: u32 = 0;
/// DNS RCODE for a name that does not exist.
const RCODE_NXDOMAIN: u32 = 3;

/// Record types queried during verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// Canonical name (alias) record.
    Cname,
}

impl DnsRecordType {
    /// Numeric RR type as used on the wire and in the JSON API.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::A => 1,
            Self::Cname => 5,
        }
    }

    /// Mnemonic passed as the `type` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Cname => "CNAME",
        }
    }
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer entry exactly as the JSON API sends it.
#[derive(Deserialize)]
struct RawAnswer {
    name: String,
    #[serde(rename = "type")]
    record_type: u16,
    #[serde(rename = "TTL", default)]
    ttl: u32,
    data: String,
}

/// A single decoded answer.
///
/// Decoding validates the payload per type: an `A` answer must carry an IPv4
/// address and a `CNAME` answer a non-empty target. Other types are kept
/// opaque so that signatures or unrelated records in the answer section do
/// not fail the whole lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawAnswer")]
pub enum DohAnswer {
    A {
        name: String,
        addr: Ipv4Addr,
        ttl: u32,
    },
    Cname {
        name: String,
        target: String,
        ttl: u32,
    },
    Other {
        name: String,
        record_type: u16,
    },
}

impl TryFrom<RawAnswer> for DohAnswer {
    type Error = DohError;

    fn try_from(raw: RawAnswer) -> Result<Self, Self::Error> {
        match raw.record_type {
            1 => {
                let addr = raw.data.trim().parse::<Ipv4Addr>().map_err(|_| {
                    DohError::Decode(format!(
                        "A record for {} has invalid address '{}'",
                        raw.name, raw.data
                    ))
                })?;
                Ok(Self::A {
                    name: raw.name,
                    addr,
                    ttl: raw.ttl,
                })
            }
            5 => {
                let target = raw.data.trim();
                if target.is_empty() {
                    return Err(DohError::Decode(format!(
                        "CNAME record for {} has an empty target",
                        raw.name
                    )));
                }
                Ok(Self::Cname {
                    target: target.to_string(),
                    name: raw.name,
                    ttl: raw.ttl,
                })
            }
            record_type => Ok(Self::Other {
                name: raw.name,
                record_type,
            }),
        }
    }
}

impl DohAnswer {
    /// Owner name of the answer.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::A { name, .. } | Self::Cname { name, .. } | Self::Other { name, .. } => name,
        }
    }
}

/// Decoded DNS JSON response (`application/dns-json`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DohResponse {
    /// DNS RCODE.
    #[serde(rename = "Status")]
    pub status: u32,
    /// Answer section, absent when the name has no records of the type.
    #[serde(rename = "Answer", default)]
    pub answers: Vec<DohAnswer>,
}

impl DohResponse {
    /// Decode a response body.
    pub fn from_json(body: &str) -> DohResult<Self> {
        serde_json::from_str(body).map_err(|e| DohError::Decode(e.to_string()))
    }

    /// Return the answers if the RCODE is usable.
    ///
    /// NXDOMAIN is a definitive "no records" answer, not a failure.
    pub fn into_answers(self) -> DohResult<Vec<DohAnswer>> {
        match self.status {
            RCODE_NOERROR | RCODE_NXDOMAIN => Ok(self.answers),
            other => Err(DohError::ResolverStatus(other)),
        }
    }
}

/// Pick the CNAME target for `owner` out of an answer section.
///
/// Recursive resolvers may return the whole chain; the record owned by the
/// queried name wins, otherwise the first CNAME in the section.
#[must_use]
pub fn cname_target<'a>(answers: &'a [DohAnswer], owner: &str) -> Option<&'a str> {
    let owner = normalize_domain(owner);
    let mut first = None;
    for answer in answers {
        if let DohAnswer::Cname { name, target, .. } = answer {
            if normalize_domain(name) == owner {
                return Some(target);
            }
            first.get_or_insert(target.as_str());
        }
    }
    first
}

/// Collect all IPv4 addresses from an answer section.
#[must_use]
pub fn a_addresses(answers: &[DohAnswer]) -> Vec<Ipv4Addr> {
    answers
        .iter()
        .filter_map(|a| match a {
            DohAnswer::A { addr, .. } => Some(*addr),
            _ => None,
        })
        .collect()
}

/// Outcome category of a verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// The CNAME points at the expected target.
    Verified,
    /// A CNAME exists but points elsewhere.
    Mismatch,
    /// No CNAME was found; DNS may still be propagating.
    NotPropagated,
    /// The lookup itself failed; try again.
    LookupFailed,
}

/// One row of the record table shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCheck {
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub expected_value: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
}

/// Result of checking a domain's DNS against the platform target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    pub status: VerificationStatus,
    pub records: Vec<RecordCheck>,
    pub message: String,
}

impl VerificationResult {
    /// Whether checking again later may produce a different answer.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(
            self.status,
            VerificationStatus::NotPropagated | VerificationStatus::LookupFailed
        )
    }

    pub(crate) fn verified(domain: &str, expected: &str) -> Self {
        Self {
            verified: true,
            status: VerificationStatus::Verified,
            records: vec![RecordCheck {
                record_type: DnsRecordType::Cname,
                expected_value: expected.to_string(),
                found: true,
                current_value: Some(expected.to_string()),
            }],
            message: format!("DNS verified: {domain} points to {expected}."),
        }
    }

    pub(crate) fn mismatch(domain: &str, expected: &str, current: &str) -> Self {
        Self {
            verified: false,
            status: VerificationStatus::Mismatch,
            records: vec![RecordCheck {
                record_type: DnsRecordType::Cname,
                expected_value: expected.to_string(),
                found: false,
                current_value: Some(current.to_string()),
            }],
            message: format!(
                "The CNAME for {domain} points to {current}, expected {expected}. \
                 Update the record to {expected}; changes can take up to 48 hours to propagate."
            ),
        }
    }

    pub(crate) fn not_propagated(domain: &str, expected: &str, a_records: &[Ipv4Addr]) -> Self {
        let mut records = vec![RecordCheck {
            record_type: DnsRecordType::Cname,
            expected_value: expected.to_string(),
            found: false,
            current_value: None,
        }];

        let message = if a_records.is_empty() {
            format!(
                "No CNAME record found for {domain} yet. Add a CNAME record pointing to \
                 {expected}; DNS changes are not propagated yet and can take up to 48 hours."
            )
        } else {
            let joined = a_records
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            records.push(RecordCheck {
                record_type: DnsRecordType::A,
                expected_value: expected.to_string(),
                found: false,
                current_value: Some(joined.clone()),
            });
            format!(
                "{domain} has A record(s) ({joined}) but no CNAME. A records do not verify \
                 the domain; replace them with a CNAME pointing to {expected}. Apex domains \
                 need a DNS provider that supports CNAME flattening or ALIAS records."
            )
        };

        Self {
            verified: false,
            status: VerificationStatus::NotPropagated,
            records,
            message,
        }
    }

    pub(crate) fn lookup_failed(expected: &str, error: &DohError) -> Self {
        Self {
            verified: false,
            status: VerificationStatus::LookupFailed,
            records: vec![RecordCheck {
                record_type: DnsRecordType::Cname,
                expected_value: expected.to_string(),
                found: false,
                current_value: None,
            }],
            message: format!(
                "DNS lookup failed ({error}). This is usually temporary; try again in a \
                 moment, automatic checks will keep retrying."
            ),
        }
    }
}
