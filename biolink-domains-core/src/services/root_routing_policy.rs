//! Root path behavior of a tenant domain

use crate::types::{DomainConfig, DomainSettings, RootDomainMode, RootRoute};

/// Decides whether the root of a custom domain serves the profile or redirects.
#[derive(Debug, Clone)]
pub struct RootRoutingPolicy {
    fallback_path: String,
}

impl Default for RootRoutingPolicy {
    fn default() -> Self {
        Self::new("/bio")
    }
}

impl RootRoutingPolicy {
    /// `fallback_path` always serves the profile, whatever the mode.
    #[must_use]
    pub fn new(fallback_path: &str) -> Self {
        Self {
            fallback_path: normalize_path(fallback_path).to_string(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &DomainSettings) -> Self {
        Self::new(&settings.profile_fallback_path)
    }

    #[must_use]
    pub fn fallback_path(&self) -> &str {
        &self.fallback_path
    }

    /// Whether `path` is one of the paths this policy decides on.
    #[must_use]
    pub fn governs(&self, path: &str) -> bool {
        let path = normalize_path(path);
        path == "/" || path == self.fallback_path
    }

    /// Resolve the route for `path`.
    ///
    /// Redirect mode without a URL falls back to serving the profile.
    #[must_use]
    pub fn resolve(&self, config: &DomainConfig, path: &str) -> RootRoute {
        if normalize_path(path) == self.fallback_path {
            return RootRoute::ServeProfile;
        }
        match (config.root_domain_mode, config.root_domain_redirect_url.as_deref()) {
            (RootDomainMode::Redirect, Some(url)) if !url.is_empty() => {
                RootRoute::RedirectTo(url.to_string())
            }
            _ => RootRoute::ServeProfile,
        }
    }
}

/// Strip the query string and a trailing slash; empty becomes `/`.
fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}
