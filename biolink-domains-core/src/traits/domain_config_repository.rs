//! Domain configuration persistence abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{DeploymentStatus, DomainConfig, SettingsPatch};

/// Domain configuration repository (the domain registry)
///
/// One row per account. Implementations must guarantee that at most one
/// account holds `domain_verified == true` for a given normalized domain,
/// and report a violation as `CoreError::DomainConflict`.
///
/// Every write except `save` changes only the columns it owns, and does so
/// atomically, so concurrent calls for the same account never lose an update.
///
/// Platform implementation:
/// - `SqliteStore` (`SeaORM`, partial unique index)
/// - In-memory mock for tests
#[async_trait]
pub trait DomainConfigRepository: Send + Sync {
    /// Get an account's configuration
    ///
    /// # Returns
    /// * `Some(config)` - a row exists
    /// * `None` - nothing stored yet (callers fall back to defaults)
    async fn find_by_account(&self, account_id: &str) -> CoreResult<Option<DomainConfig>>;

    /// Save the full row (insert or overwrite)
    ///
    /// # Arguments
    /// * `account_id` - Account ID
    /// * `config` - complete configuration
    async fn save(&self, account_id: &str, config: &DomainConfig) -> CoreResult<()>;

    /// Set the domain and reset verification and deployment progress.
    ///
    /// The setting columns are kept. Creates the row if missing.
    async fn replace_domain(
        &self,
        account_id: &str,
        domain: Option<&str>,
    ) -> CoreResult<DomainConfig>;

    /// Record a successful verification of `normalized_domain`.
    ///
    /// Sets `domain_verified` and moves `Pending` to `Deploying`, only while
    /// the row still holds that domain.
    ///
    /// # Returns
    /// * `true` - the row changed
    /// * `false` - already recorded, or the domain was replaced or removed
    async fn mark_verified(&self, account_id: &str, normalized_domain: &str) -> CoreResult<bool>;

    /// Apply `patch` to the setting columns only. Creates the row if missing.
    async fn update_settings(
        &self,
        account_id: &str,
        patch: &SettingsPatch,
    ) -> CoreResult<DomainConfig>;

    /// Account that holds a *verified* claim on `normalized_domain`, if any
    async fn find_verified_owner(&self, normalized_domain: &str) -> CoreResult<Option<String>>;

    /// Verified row for `normalized_domain`, used by the request router
    async fn find_by_domain(
        &self,
        normalized_domain: &str,
    ) -> CoreResult<Option<(String, DomainConfig)>>;

    /// Advance the deployment status out-of-band (deployment platform hook)
    ///
    /// Takes a single step (`Pending -> Deploying`, `Deploying -> Active`) and
    /// only for a row with a verified domain, checked in the same write.
    ///
    /// # Returns
    /// * the status after the call; unchanged if the row is already at or
    ///   past `status`
    ///
    /// # Errors
    /// * `AccountNotFound` if the account has no stored row
    /// * `ValidationError` if the row cannot take that step
    async fn update_deployment_status(
        &self,
        account_id: &str,
        status: DeploymentStatus,
    ) -> CoreResult<DeploymentStatus>;
}
