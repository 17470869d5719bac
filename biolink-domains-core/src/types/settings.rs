//! Platform-level settings for custom domain handling

use serde::{Deserialize, Serialize};

/// Platform settings shared by the resolver, lifecycle and tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainSettings {
    /// Main application domain; `<label>.<app_domain>` are tenant subdomains
    pub app_domain: String,
    /// Hostname tenants must point their CNAME at
    pub cname_target: String,
    /// Loopback/dev aliases always treated as the main app
    pub dev_hosts: Vec<String>,
    /// Ephemeral preview deployments, matched by suffix
    pub preview_host_suffixes: Vec<String>,
    /// Minutes in `deploying` before the dashboard shows a stall warning
    pub stall_warning_minutes: u64,
    /// Hours in `deploying` after which the warning asks to contact support
    pub deployment_timeout_hours: u64,
    /// Path that always serves the profile, even in redirect mode
    pub profile_fallback_path: String,
}

impl Default for DomainSettings {
    fn default() -> Self {
        Self {
            app_domain: "example.com".to_string(),
            cname_target: "cname.example.com".to_string(),
            dev_hosts: vec![
                "localhost".to_string(),
                "127.0.0.1".to_string(),
                "0.0.0.0".to_string(),
                "[::1]".to_string(),
            ],
            preview_host_suffixes: vec![".vercel.app".to_string()],
            stall_warning_minutes: 30,
            deployment_timeout_hours: 48,
            profile_fallback_path: "/bio".to_string(),
        }
    }
}
