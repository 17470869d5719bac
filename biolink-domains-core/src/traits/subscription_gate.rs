//! Subscription plan gate (read-only collaborator)

use async_trait::async_trait;

use crate::error::CoreResult;

/// Tells whether an account's plan includes custom domains.
#[async_trait]
pub trait SubscriptionGate: Send + Sync {
    async fn custom_domains_enabled(&self, account_id: &str) -> CoreResult<bool>;
}

/// Gate that allows every account.
///
/// Default implementation for self-hosted setups without billing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllSubscriptionGate;

#[async_trait]
impl SubscriptionGate for AllowAllSubscriptionGate {
    async fn custom_domains_enabled(&self, _account_id: &str) -> CoreResult<bool> {
        Ok(true)
    }
}
