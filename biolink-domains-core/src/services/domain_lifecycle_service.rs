//! Custom domain lifecycle service
//!
//! Drives a tenant's domain through save -> verify -> deploy, and owns the
//! independent root/shortlink settings. Persisted state is only
//! `domain_verified` plus `deployment_status`; the dashboard's step view is
//! derived from them.

use std::sync::Arc;

use biolink_domains_doh::{normalize_domain, validate_domain_syntax};
use url::Url;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{
    AvailabilityResponse, DnsInstructions, DomainConfig, DomainConfigUpdate, RootDomainMode,
    SettingsPatch, VerificationResult,
};

/// Validate a redirect target: absolute URL with an http/https scheme and a host.
pub fn validate_redirect_url(raw: &str) -> CoreResult<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|e| {
        CoreError::ValidationError(format!(
            "'{trimmed}' is not a valid URL ({e}). Enter a full address such as https://example.com"
        ))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CoreError::ValidationError(format!(
            "Redirect URL must start with http:// or https:// (got '{}')",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(CoreError::ValidationError(
            "Redirect URL must include a host, e.g. https://example.com".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Custom domain lifecycle service
pub struct DomainLifecycleService {
    ctx: Arc<ServiceContext>,
}

impl DomainLifecycleService {
    /// Create a lifecycle service instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Current configuration (defaults if nothing stored yet)
    pub async fn get_domain_config(&self, account_id: &str) -> CoreResult<DomainConfig> {
        self.ctx.load_config(account_id).await
    }

    /// The CNAME record the tenant must create, if a domain is saved
    pub async fn dns_instructions(&self, account_id: &str) -> CoreResult<Option<DnsInstructions>> {
        let config = self.ctx.load_config(account_id).await?;
        Ok(config
            .custom_domain
            .as_deref()
            .map(|domain| DnsInstructions::cname(domain, &self.ctx.settings.cname_target)))
    }

    /// Whether `domain` can be claimed by `account_id`.
    ///
    /// Only a *verified* claim by another account blocks a domain.
    pub async fn check_domain_availability(
        &self,
        account_id: &str,
        domain: &str,
    ) -> CoreResult<AvailabilityResponse> {
        let normalized = validate_domain_syntax(domain)?;
        let owner = self
            .ctx
            .domain_config_repository
            .find_verified_owner(&normalized)
            .await?;
        Ok(AvailabilityResponse {
            available: owner.is_none_or(|owner| owner == account_id),
        })
    }

    /// Save (or replace) the account's custom domain.
    ///
    /// A changed domain restarts verification. Saving the domain the account
    /// already holds keeps its progress.
    pub async fn save_domain(&self, account_id: &str, domain: &str) -> CoreResult<DomainConfig> {
        self.ctx.ensure_custom_domains_enabled(account_id).await?;
        let normalized = validate_domain_syntax(domain)?;
        self.ensure_not_claimed_elsewhere(account_id, &normalized)
            .await?;

        let current = self.ctx.load_config(account_id).await?;
        if current.normalized_domain().as_deref() == Some(normalized.as_str()) {
            log::debug!("Account {account_id} re-saved {normalized}, keeping state");
            return Ok(current);
        }

        let config = self
            .ctx
            .domain_config_repository
            .replace_domain(account_id, Some(&normalized))
            .await?;
        log::info!("Account {account_id} saved custom domain {normalized}");
        Ok(config)
    }

    /// Check DNS for the saved domain and record a successful verification.
    ///
    /// A negative result is not an error: persisted state is left untouched
    /// and the diagnostic is returned for display. Repeating the call after
    /// success is a no-op. The write only applies while the row still holds
    /// the domain that was looked up.
    pub async fn verify_domain(&self, account_id: &str) -> CoreResult<VerificationResult> {
        self.ctx.ensure_custom_domains_enabled(account_id).await?;
        let config = self.ctx.load_config(account_id).await?;
        let domain = config
            .normalized_domain()
            .ok_or_else(|| CoreError::DomainNotConfigured(account_id.to_string()))?;

        let result = self
            .ctx
            .verifier
            .verify(&domain, &self.ctx.settings.cname_target)
            .await;

        if !result.verified {
            log::debug!(
                "Verification of {domain} for account {account_id}: {:?}",
                result.status
            );
            return Ok(result);
        }

        self.ensure_not_claimed_elsewhere(account_id, &domain).await?;

        let recorded = self
            .ctx
            .domain_config_repository
            .mark_verified(account_id, &domain)
            .await?;
        if recorded {
            log::info!("Account {account_id} verified {domain}, deployment started");
        } else {
            log::debug!("Verification of {domain} for account {account_id} changed nothing");
        }
        Ok(result)
    }

    pub async fn set_use_domain_for_shortlinks(
        &self,
        account_id: &str,
        enabled: bool,
    ) -> CoreResult<DomainConfig> {
        self.update_domain_config(
            account_id,
            DomainConfigUpdate {
                use_domain_for_shortlinks: Some(enabled),
                ..DomainConfigUpdate::default()
            },
        )
        .await
    }

    /// Switch the root mode. `Redirect` may be saved before its URL.
    pub async fn set_root_domain_mode(
        &self,
        account_id: &str,
        mode: RootDomainMode,
    ) -> CoreResult<DomainConfig> {
        self.update_domain_config(
            account_id,
            DomainConfigUpdate {
                root_domain_mode: Some(mode),
                ..DomainConfigUpdate::default()
            },
        )
        .await
    }

    /// Set or clear (`None`) the redirect target.
    pub async fn set_root_domain_redirect_url(
        &self,
        account_id: &str,
        url: Option<&str>,
    ) -> CoreResult<DomainConfig> {
        self.update_domain_config(
            account_id,
            DomainConfigUpdate {
                root_domain_redirect_url: Some(url.unwrap_or_default().to_string()),
                ..DomainConfigUpdate::default()
            },
        )
        .await
    }

    /// Apply several setters at once; nothing is written if any value is invalid.
    pub async fn update_domain_config(
        &self,
        account_id: &str,
        update: DomainConfigUpdate,
    ) -> CoreResult<DomainConfig> {
        self.ctx.ensure_custom_domains_enabled(account_id).await?;

        let root_domain_redirect_url = match update.root_domain_redirect_url.as_deref() {
            Some(raw) if raw.trim().is_empty() => Some(None),
            Some(raw) => Some(Some(validate_redirect_url(raw)?)),
            None => None,
        };
        let patch = SettingsPatch {
            use_domain_for_shortlinks: update.use_domain_for_shortlinks,
            root_domain_mode: update.root_domain_mode,
            root_domain_redirect_url,
        };
        if patch.is_empty() {
            return self.ctx.load_config(account_id).await;
        }

        let config = self
            .ctx
            .domain_config_repository
            .update_settings(account_id, &patch)
            .await?;
        log::debug!("Account {account_id} updated domain settings");
        Ok(config)
    }

    /// Reset every field to its default. The row itself is kept.
    pub async fn delete_domain(&self, account_id: &str) -> CoreResult<DomainConfig> {
        let previous = self.ctx.load_config(account_id).await?;
        let config = DomainConfig::default();
        self.ctx
            .domain_config_repository
            .save(account_id, &config)
            .await?;
        if let Some(domain) = previous.custom_domain {
            log::info!("Account {account_id} removed custom domain {domain}");
        }
        Ok(config)
    }

    async fn ensure_not_claimed_elsewhere(&self, account_id: &str, domain: &str) -> CoreResult<()> {
        let owner = self
            .ctx
            .domain_config_repository
            .find_verified_owner(&normalize_domain(domain))
            .await?;
        match owner {
            Some(owner) if owner != account_id => {
                log::warn!("Account {account_id} tried to claim {domain}, verified by {owner}");
                Err(CoreError::DomainConflict {
                    domain: domain.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}
