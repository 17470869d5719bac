//! Per-account custom domain configuration

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use biolink_domains_doh::normalize_domain;

/// Deployment convergence of a verified domain on the edge platform.
///
/// Only ever advances `Pending -> Deploying -> Active`, and falls back to
/// `Pending` when the domain itself changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    #[default]
    Pending,
    Deploying,
    Active,
}

impl DeploymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Deploying => "deploying",
            Self::Active => "active",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Deploying => 1,
            Self::Active => 2,
        }
    }

    /// Whether moving to `next` is a forward step.
    #[must_use]
    pub const fn advances_to(self, next: Self) -> bool {
        next.rank() > self.rank()
    }

    /// The only status `self` may be entered from.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Pending => None,
            Self::Deploying => Some(Self::Pending),
            Self::Active => Some(Self::Deploying),
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "deploying" => Ok(Self::Deploying),
            "active" => Ok(Self::Active),
            _ => Err(format!("Unknown deployment status: {s}")),
        }
    }
}

/// What the root path of a custom domain does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootDomainMode {
    /// Serve the tenant's profile page
    #[default]
    Bio,
    /// Redirect to `root_domain_redirect_url`
    Redirect,
}

impl RootDomainMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bio => "bio",
            Self::Redirect => "redirect",
        }
    }
}

impl fmt::Display for RootDomainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootDomainMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bio" => Ok(Self::Bio),
            "redirect" => Ok(Self::Redirect),
            _ => Err(format!("Unknown root domain mode: {s}")),
        }
    }
}

/// Derived dashboard step. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    EnterDomain,
    Saved,
    ConfiguringDns,
    Active,
}

fn default_true() -> bool {
    true
}

/// Custom domain configuration, one per tenant account.
///
/// Invariant: no domain implies not verified and `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainConfig {
    pub custom_domain: Option<String>,

    #[serde(default)]
    pub domain_verified: bool,

    #[serde(default)]
    pub deployment_status: DeploymentStatus,

    #[serde(default = "default_true")]
    pub use_domain_for_shortlinks: bool,

    #[serde(default)]
    pub root_domain_mode: RootDomainMode,

    pub root_domain_redirect_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,

    /// When the status last moved to `Deploying`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploying_since: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,

    pub updated_at: DateTime<Utc>,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            custom_domain: None,
            domain_verified: false,
            deployment_status: DeploymentStatus::Pending,
            use_domain_for_shortlinks: true,
            root_domain_mode: RootDomainMode::Bio,
            root_domain_redirect_url: None,
            verified_at: None,
            deploying_since: None,
            activated_at: None,
            updated_at: Utc::now(),
        }
    }
}

impl DomainConfig {
    /// Refresh the update time
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Normalized form of the saved domain, used for uniqueness checks.
    #[must_use]
    pub fn normalized_domain(&self) -> Option<String> {
        self.custom_domain.as_deref().map(normalize_domain)
    }

    /// Replace the domain and drop all verification and deployment progress.
    pub fn replace_domain(&mut self, domain: Option<String>) {
        self.custom_domain = domain;
        self.domain_verified = false;
        self.deployment_status = DeploymentStatus::Pending;
        self.verified_at = None;
        self.deploying_since = None;
        self.activated_at = None;
        self.touch();
    }

    /// Record a successful verification. Returns `true` if anything changed.
    pub fn mark_verified(&mut self) -> bool {
        let mut changed = false;
        if !self.domain_verified {
            self.domain_verified = true;
            self.verified_at = Some(Utc::now());
            changed = true;
        }
        if self.deployment_status == DeploymentStatus::Pending {
            self.deployment_status = DeploymentStatus::Deploying;
            self.deploying_since = Some(Utc::now());
            changed = true;
        }
        if changed {
            self.touch();
        }
        changed
    }

    /// Only a saved and verified domain deploys, one step at a time.
    fn can_advance_to(&self, next: DeploymentStatus) -> bool {
        self.custom_domain.is_some()
            && self.domain_verified
            && next.previous() == Some(self.deployment_status)
    }

    /// Take one deployment step forward. Returns `true` if it moved.
    pub fn advance_deployment(&mut self, next: DeploymentStatus) -> bool {
        if !self.can_advance_to(next) {
            return false;
        }
        let now = Utc::now();
        match next {
            DeploymentStatus::Deploying => self.deploying_since = Some(now),
            DeploymentStatus::Active => {
                self.deploying_since.get_or_insert(now);
                self.activated_at = Some(now);
            }
            DeploymentStatus::Pending => {}
        }
        self.deployment_status = next;
        self.touch();
        true
    }

    /// The domain is verified and the edge reports it live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.custom_domain.is_some()
            && self.domain_verified
            && self.deployment_status == DeploymentStatus::Active
    }

    /// Dashboard step derived from persisted state.
    #[must_use]
    pub fn setup_step(&self) -> SetupStep {
        match (&self.custom_domain, self.domain_verified, self.deployment_status) {
            (None, _, _) => SetupStep::EnterDomain,
            (Some(_), false, _) => SetupStep::Saved,
            (Some(_), true, DeploymentStatus::Active) => SetupStep::Active,
            (Some(_), true, _) => SetupStep::ConfiguringDns,
        }
    }

    /// Base URL for generated short links.
    ///
    /// The custom domain is used only once it is live and the tenant opted in.
    #[must_use]
    pub fn shortlink_base_url(&self, app_domain: &str) -> String {
        match &self.custom_domain {
            Some(domain) if self.use_domain_for_shortlinks && self.is_live() => {
                format!("https://{domain}")
            }
            _ => format!("https://{app_domain}"),
        }
    }
}

/// Partial update of the independent config setters.
///
/// An empty `root_domain_redirect_url` clears the stored URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_domain_for_shortlinks: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_domain_mode: Option<RootDomainMode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_domain_redirect_url: Option<String>,
}

/// Validated column changes made by the independent setters.
///
/// Applied by the registry to those columns only, so a concurrent
/// verification or domain change is never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub use_domain_for_shortlinks: Option<bool>,
    pub root_domain_mode: Option<RootDomainMode>,
    /// `Some(None)` clears the URL
    pub root_domain_redirect_url: Option<Option<String>>,
}

impl SettingsPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.use_domain_for_shortlinks.is_none()
            && self.root_domain_mode.is_none()
            && self.root_domain_redirect_url.is_none()
    }

    /// Apply to an in-memory configuration.
    pub fn apply(&self, config: &mut DomainConfig) {
        if let Some(enabled) = self.use_domain_for_shortlinks {
            config.use_domain_for_shortlinks = enabled;
        }
        if let Some(mode) = self.root_domain_mode {
            config.root_domain_mode = mode;
        }
        if let Some(url) = &self.root_domain_redirect_url {
            config.root_domain_redirect_url.clone_from(url);
        }
        config.touch();
    }
}

/// The record a tenant has to create at their DNS provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsInstructions {
    pub record_type: String,
    /// Host/name field as most DNS providers expect it (`@` for the apex)
    pub host: String,
    pub value: String,
    pub is_apex: bool,
}

impl DnsInstructions {
    /// Build the CNAME instructions for `domain`.
    ///
    /// Without a public suffix list the registrable domain is approximated by
    /// the last two labels.
    #[must_use]
    pub fn cname(domain: &str, target: &str) -> Self {
        let domain = normalize_domain(domain);
        let labels: Vec<&str> = domain.split('.').collect();
        let is_apex = labels.len() <= 2;
        let host = if is_apex {
            "@".to_string()
        } else {
            labels[..labels.len() - 2].join(".")
        };
        Self {
            record_type: "CNAME".to_string(),
            host,
            value: normalize_domain(target),
            is_apex,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_domain(domain: &str) -> DomainConfig {
        let mut c = DomainConfig::default();
        c.replace_domain(Some(domain.to_string()));
        c
    }

    #[test]
    fn defaults() {
        let c = DomainConfig::default();
        assert!(c.custom_domain.is_none());
        assert!(!c.domain_verified);
        assert_eq!(c.deployment_status, DeploymentStatus::Pending);
        assert!(c.use_domain_for_shortlinks);
        assert_eq!(c.root_domain_mode, RootDomainMode::Bio);
        assert!(c.root_domain_redirect_url.is_none());
        assert_eq!(c.setup_step(), SetupStep::EnterDomain);
    }

    #[test]
    fn deployment_only_advances() {
        assert!(DeploymentStatus::Pending.advances_to(DeploymentStatus::Deploying));
        assert!(DeploymentStatus::Deploying.advances_to(DeploymentStatus::Active));
        assert!(!DeploymentStatus::Active.advances_to(DeploymentStatus::Deploying));
        assert!(!DeploymentStatus::Deploying.advances_to(DeploymentStatus::Deploying));
    }

    #[test]
    fn mark_verified_is_idempotent() {
        let mut c = with_domain("links.acme.com");
        assert!(c.mark_verified());
        assert_eq!(c.deployment_status, DeploymentStatus::Deploying);
        let since = c.deploying_since;
        assert!(!c.mark_verified());
        assert_eq!(c.deploying_since, since);
    }

    #[test]
    fn mark_verified_keeps_active() {
        let mut c = with_domain("links.acme.com");
        c.mark_verified();
        c.advance_deployment(DeploymentStatus::Active);
        assert!(!c.mark_verified());
        assert_eq!(c.deployment_status, DeploymentStatus::Active);
    }

    #[test]
    fn deployment_needs_verified_domain() {
        let mut c = DomainConfig::default();
        assert!(!c.advance_deployment(DeploymentStatus::Active));
        assert!(!c.advance_deployment(DeploymentStatus::Deploying));
        assert_eq!(c.deployment_status, DeploymentStatus::Pending);

        let mut c = with_domain("links.acme.com");
        assert!(!c.advance_deployment(DeploymentStatus::Active));
        assert_eq!(c.deployment_status, DeploymentStatus::Pending);

        c.mark_verified();
        assert!(c.advance_deployment(DeploymentStatus::Active));
        assert!(c.activated_at.is_some());
        assert!(!c.advance_deployment(DeploymentStatus::Active));
    }

    #[test]
    fn settings_patch_touches_only_its_fields() {
        let mut c = with_domain("links.acme.com");
        c.mark_verified();
        let patch = SettingsPatch {
            root_domain_mode: Some(RootDomainMode::Redirect),
            root_domain_redirect_url: Some(Some("https://x.com".to_string())),
            ..SettingsPatch::default()
        };
        patch.apply(&mut c);
        assert_eq!(c.root_domain_mode, RootDomainMode::Redirect);
        assert_eq!(c.root_domain_redirect_url.as_deref(), Some("https://x.com"));
        assert!(c.use_domain_for_shortlinks);
        assert!(c.domain_verified);
        assert_eq!(c.deployment_status, DeploymentStatus::Deploying);

        SettingsPatch {
            root_domain_redirect_url: Some(None),
            ..SettingsPatch::default()
        }
        .apply(&mut c);
        assert!(c.root_domain_redirect_url.is_none());
    }

    #[test]
    fn replace_domain_resets_progress() {
        let mut c = with_domain("links.acme.com");
        c.mark_verified();
        c.advance_deployment(DeploymentStatus::Active);
        c.replace_domain(Some("go.acme.com".to_string()));
        assert!(!c.domain_verified);
        assert_eq!(c.deployment_status, DeploymentStatus::Pending);
        assert!(c.verified_at.is_none());
        assert!(c.activated_at.is_none());
    }

    #[test]
    fn setup_steps() {
        let mut c = with_domain("links.acme.com");
        assert_eq!(c.setup_step(), SetupStep::Saved);
        c.mark_verified();
        assert_eq!(c.setup_step(), SetupStep::ConfiguringDns);
        c.advance_deployment(DeploymentStatus::Active);
        assert_eq!(c.setup_step(), SetupStep::Active);
    }

    #[test]
    fn shortlinks_use_custom_domain_only_when_live() {
        let mut c = with_domain("links.acme.com");
        assert_eq!(c.shortlink_base_url("example.com"), "https://example.com");
        c.mark_verified();
        c.advance_deployment(DeploymentStatus::Active);
        assert_eq!(c.shortlink_base_url("example.com"), "https://links.acme.com");
        c.use_domain_for_shortlinks = false;
        assert_eq!(c.shortlink_base_url("example.com"), "https://example.com");
    }

    #[test]
    fn instructions_for_subdomain_and_apex() {
        let sub = DnsInstructions::cname("links.acme.com", "cname.example.com.");
        assert_eq!(sub.host, "links");
        assert_eq!(sub.value, "cname.example.com");
        assert!(!sub.is_apex);

        let deep = DnsInstructions::cname("go.links.acme.com", "cname.example.com");
        assert_eq!(deep.host, "go.links");

        let apex = DnsInstructions::cname("acme.com", "cname.example.com");
        assert_eq!(apex.host, "@");
        assert!(apex.is_apex);
    }

    #[test]
    fn serde_defaults_for_missing_fields() {
        let json = r#"{"customDomain":null,"rootDomainRedirectUrl":null,"updatedAt":"2026-01-01T00:00:00Z"}"#;
        let c: DomainConfig = serde_json::from_str(json).unwrap();
        assert!(c.use_domain_for_shortlinks);
        assert_eq!(c.root_domain_mode, RootDomainMode::Bio);
        assert_eq!(c.deployment_status, DeploymentStatus::Pending);
    }

    #[test]
    fn status_strings_roundtrip() {
        for s in ["pending", "deploying", "active"] {
            assert_eq!(s.parse::<DeploymentStatus>().unwrap().as_str(), s);
        }
        assert!("live".parse::<DeploymentStatus>().is_err());
        assert_eq!("redirect".parse::<RootDomainMode>().unwrap(), RootDomainMode::Redirect);
    }
}
