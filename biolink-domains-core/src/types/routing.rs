//! Host classification and routing decisions

use serde::{Deserialize, Serialize};

/// Routing intent of a request host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HostnameClassification {
    /// The platform itself (app domain, dev aliases, preview hosts)
    Main,
    /// `<label>.<app_domain>`
    Subdomain(String),
    /// Any other host; still needs a registry lookup to find its owner
    Custom(String),
}

/// What the root path of a tenant domain does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "url", rename_all = "snake_case")]
pub enum RootRoute {
    ServeProfile,
    RedirectTo(String),
}

/// Full routing decision for an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteDecision {
    MainApp,
    Subdomain { label: String },
    Tenant { account_id: String, route: RootRoute },
    DomainNotFound { domain: String },
}
