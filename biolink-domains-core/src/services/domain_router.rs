//! Inbound request routing

use std::sync::Arc;

use crate::error::CoreResult;
use crate::services::{HostnameResolver, RootRoutingPolicy, ServiceContext};
use crate::types::{HostnameClassification, RootRoute, RouteDecision};

/// Maps a request `(host, path)` to the tenant and behavior that serves it.
pub struct DomainRouter {
    ctx: Arc<ServiceContext>,
    resolver: HostnameResolver,
    policy: RootRoutingPolicy,
}

impl DomainRouter {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        let resolver = HostnameResolver::new(&ctx.settings);
        let policy = RootRoutingPolicy::from_settings(&ctx.settings);
        Self {
            ctx,
            resolver,
            policy,
        }
    }

    /// Route a request.
    ///
    /// Custom hosts resolve only through a verified claim. The root policy
    /// applies to `/` and the fallback path; other paths on a tenant domain
    /// (short links, assets) are served by the tenant.
    pub async fn route(&self, host: &str, path: &str) -> CoreResult<RouteDecision> {
        let domain = match self.resolver.classify(host) {
            HostnameClassification::Main => return Ok(RouteDecision::MainApp),
            HostnameClassification::Subdomain(label) => {
                return Ok(RouteDecision::Subdomain { label })
            }
            HostnameClassification::Custom(domain) => domain,
        };

        let Some((account_id, config)) = self
            .ctx
            .domain_config_repository
            .find_by_domain(&domain)
            .await?
        else {
            log::debug!("No verified owner for host {domain}");
            return Ok(RouteDecision::DomainNotFound { domain });
        };

        let route = if self.policy.governs(path) {
            self.policy.resolve(&config, path)
        } else {
            RootRoute::ServeProfile
        };
        Ok(RouteDecision::Tenant { account_id, route })
    }
}
