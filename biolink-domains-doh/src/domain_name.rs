//! Domain name normalization and syntax checks.

use crate::error::{DohError, DohResult};

/// Maximum length of a full domain name.
const MAX_DOMAIN_LEN: usize = 253;

/// Maximum length of a single label.
const MAX_LABEL_LEN: usize = 63;

/// Normalize a domain name for comparison and storage.
///
/// Trims whitespace, lowercases, and strips a single trailing root-label dot.
#[must_use]
pub fn normalize_domain(domain: &str) -> String {
    let lowered = domain.trim().to_ascii_lowercase();
    match lowered.strip_suffix('.') {
        Some(stripped) => stripped.to_string(),
        None => lowered,
    }
}

/// Validate the syntax of a tenant-supplied domain and return its normalized form.
///
/// Accepts dot-separated labels of `[a-z0-9-]` whose final label is alphabetic
/// and at least two characters long.
pub fn validate_domain_syntax(domain: &str) -> DohResult<String> {
    let domain = normalize_domain(domain);
    if domain.is_empty() {
        return Err(DohError::InvalidName(
            "Domain name is required. Enter a domain such as links.example.com".to_string(),
        ));
    }
    if domain.contains("://") || domain.contains('/') {
        return Err(DohError::InvalidName(format!(
            "'{domain}' looks like a URL. Enter the bare domain, e.g. links.example.com"
        )));
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(DohError::InvalidName(format!(
            "Domain name exceeds maximum length of {MAX_DOMAIN_LEN} characters (got {})",
            domain.len()
        )));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(DohError::InvalidName(format!(
            "'{domain}' is missing a top-level domain. Enter a full domain such as links.example.com"
        )));
    }

    for label in &labels {
        validate_label(&domain, label)?;
    }

    let tld = labels[labels.len() - 1];
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(DohError::InvalidName(format!(
            "'{tld}' is not a valid top-level domain. Check the spelling of '{domain}'"
        )));
    }

    Ok(domain)
}

fn validate_label(domain: &str, label: &str) -> DohResult<()> {
    if label.is_empty() {
        return Err(DohError::InvalidName(format!(
            "'{domain}' contains an empty label. Remove the extra dot"
        )));
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(DohError::InvalidName(format!(
            "Label '{label}' exceeds {MAX_LABEL_LEN} characters. Use a shorter subdomain"
        )));
    }
    if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(DohError::InvalidName(format!(
            "'{domain}' contains invalid characters. Use only letters, digits and hyphens"
        )));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(DohError::InvalidName(format!(
            "Label '{label}' cannot start or end with a hyphen"
        )));
    }
    Ok(())
}
