//! Business logic service layer

mod deployment_status_service;
mod domain_lifecycle_service;
mod domain_router;
mod hostname_resolver;
mod root_routing_policy;
mod verification_poller;

pub use deployment_status_service::{report_at, DeploymentStatusService};
pub use domain_lifecycle_service::{validate_redirect_url, DomainLifecycleService};
pub use domain_router::DomainRouter;
pub use hostname_resolver::{classify, HostnameResolver};
pub use root_routing_policy::RootRoutingPolicy;
pub use verification_poller::{PollHandle, PollOutcome, VerificationPoller};

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::traits::{DomainConfigRepository, DomainVerifier, SubscriptionGate};
use crate::types::{DomainConfig, DomainSettings};

/// Service context - holds all dependencies
///
/// The platform layer creates this once and injects its storage and
/// collaborator implementations.
pub struct ServiceContext {
    /// Domain configuration repository
    pub domain_config_repository: Arc<dyn DomainConfigRepository>,
    /// DNS verifier
    pub verifier: Arc<dyn DomainVerifier>,
    /// Subscription plan gate
    pub subscription_gate: Arc<dyn SubscriptionGate>,
    /// Platform settings
    pub settings: DomainSettings,
}

impl ServiceContext {
    /// Create a service context
    #[must_use]
    pub fn new(
        domain_config_repository: Arc<dyn DomainConfigRepository>,
        verifier: Arc<dyn DomainVerifier>,
        subscription_gate: Arc<dyn SubscriptionGate>,
        settings: DomainSettings,
    ) -> Self {
        Self {
            domain_config_repository,
            verifier,
            subscription_gate,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &DomainSettings {
        &self.settings
    }

    /// Load an account's configuration, defaulting when nothing is stored.
    pub async fn load_config(&self, account_id: &str) -> CoreResult<DomainConfig> {
        Ok(self
            .domain_config_repository
            .find_by_account(account_id)
            .await?
            .unwrap_or_default())
    }

    /// Fail with `FeatureUnavailable` unless the plan includes custom domains.
    pub async fn ensure_custom_domains_enabled(&self, account_id: &str) -> CoreResult<()> {
        if self
            .subscription_gate
            .custom_domains_enabled(account_id)
            .await?
        {
            Ok(())
        } else {
            log::warn!("Account {account_id} attempted a custom domain action without plan access");
            Err(CoreError::FeatureUnavailable(account_id.to_string()))
        }
    }
}
