//! Request host classification

use biolink_domains_doh::normalize_domain;

use crate::types::{DomainSettings, HostnameClassification};

/// Classifies inbound request hosts. Pure, no I/O.
#[derive(Debug, Clone)]
pub struct HostnameResolver {
    app_domain: String,
    dev_hosts: Vec<String>,
    preview_host_suffixes: Vec<String>,
}

impl HostnameResolver {
    #[must_use]
    pub fn new(settings: &DomainSettings) -> Self {
        Self {
            app_domain: normalize_domain(&settings.app_domain),
            dev_hosts: settings
                .dev_hosts
                .iter()
                .map(|h| normalize_domain(h))
                .collect(),
            preview_host_suffixes: settings
                .preview_host_suffixes
                .iter()
                .map(|s| normalize_domain(s))
                .collect(),
        }
    }

    /// Resolver with default dev aliases and preview suffixes.
    #[must_use]
    pub fn for_app_domain(app_domain: &str) -> Self {
        Self::new(&DomainSettings {
            app_domain: app_domain.to_string(),
            ..DomainSettings::default()
        })
    }

    /// Classify `host` (a `Host` header value, port allowed).
    ///
    /// `Custom` is only a syntactic candidate; the owner still has to be
    /// looked up in the registry.
    #[must_use]
    pub fn classify(&self, host: &str) -> HostnameClassification {
        let host = normalize_domain(strip_port(host));

        if host.is_empty() || self.is_dev_or_preview(&host) {
            return HostnameClassification::Main;
        }
        if host == self.app_domain {
            return HostnameClassification::Main;
        }
        if let Some(label) = host
            .strip_suffix(self.app_domain.as_str())
            .and_then(|rest| rest.strip_suffix('.'))
        {
            // ".<app_domain>" has no label
            if label.is_empty() {
                return HostnameClassification::Main;
            }
            return HostnameClassification::Subdomain(label.to_string());
        }
        HostnameClassification::Custom(host)
    }

    fn is_dev_or_preview(&self, host: &str) -> bool {
        self.dev_hosts.iter().any(|h| h == host)
            || self
                .preview_host_suffixes
                .iter()
                .any(|suffix| host.ends_with(suffix.as_str()))
    }
}

/// Classify `host` against `app_domain` with default dev/preview aliases.
#[must_use]
pub fn classify(host: &str, app_domain: &str) -> HostnameClassification {
    HostnameResolver::for_app_domain(app_domain).classify(host)
}

/// Drop a `:port` suffix, keeping bracketed IPv6 literals intact.
fn strip_port(host: &str) -> &str {
    let host = host.trim();
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    match host.rsplit_once(':') {
        Some((name, port))
            if !name.contains(':') && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            name
        }
        _ => host,
    }
}
