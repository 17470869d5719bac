//! Deployment status tracking
//!
//! The edge platform moves a verified domain from `deploying` to `active` on
//! its own schedule. This service only reads what that collaborator reported
//! and turns long waits into warnings.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{DeploymentStatus, DeploymentStatusReport, DomainConfig, DomainSettings};

/// Deployment status service
pub struct DeploymentStatusService {
    ctx: Arc<ServiceContext>,
}

impl DeploymentStatusService {
    /// Create a deployment status service instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Re-read the persisted status and describe it.
    ///
    /// A long `deploying` phase is reported as stalled, never as failed.
    pub async fn refresh_status(&self, account_id: &str) -> CoreResult<DeploymentStatusReport> {
        let config = self.ctx.load_config(account_id).await?;
        let report = report_at(&config, &self.ctx.settings, Utc::now());
        if report.stalled {
            log::warn!(
                "Deployment for account {account_id} stalled for {} minutes",
                report.elapsed_minutes.unwrap_or_default()
            );
        }
        Ok(report)
    }

    /// Record that the edge platform finished deploying the domain.
    ///
    /// Idempotent once active. A domain that was never verified cannot go live.
    pub async fn mark_active(&self, account_id: &str) -> CoreResult<DeploymentStatus> {
        let config = self
            .ctx
            .domain_config_repository
            .find_by_account(account_id)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))?;

        if config.custom_domain.is_none() {
            return Err(CoreError::DomainNotConfigured(account_id.to_string()));
        }
        if !config.domain_verified || config.deployment_status == DeploymentStatus::Pending {
            return Err(CoreError::ValidationError(format!(
                "Domain for account {account_id} is not verified yet. Verify DNS before activating"
            )));
        }
        if config.deployment_status == DeploymentStatus::Active {
            return Ok(DeploymentStatus::Active);
        }

        let status = self
            .ctx
            .domain_config_repository
            .update_deployment_status(account_id, DeploymentStatus::Active)
            .await?;
        log::info!("Account {account_id} deployment is now {status}");
        Ok(status)
    }
}

/// Build the status report for `config` as seen at `now`.
#[must_use]
pub fn report_at(
    config: &DomainConfig,
    settings: &DomainSettings,
    now: DateTime<Utc>,
) -> DeploymentStatusReport {
    let status = config.deployment_status;
    if status != DeploymentStatus::Deploying {
        return DeploymentStatusReport {
            status,
            stalled: false,
            deploying_since: config.deploying_since,
            elapsed_minutes: None,
            warning: None,
        };
    }

    let elapsed_minutes = config
        .deploying_since
        .map(|since| (now - since).num_minutes().max(0));
    let stall_after = i64::try_from(settings.stall_warning_minutes).unwrap_or(i64::MAX);
    let timeout_after = i64::try_from(settings.deployment_timeout_hours)
        .unwrap_or(i64::MAX)
        .saturating_mul(60);

    let warning = match elapsed_minutes {
        Some(minutes) if minutes >= timeout_after => Some(format!(
            "Deployment has been running for over {} hours. Contact support so we can check the domain on our side",
            settings.deployment_timeout_hours
        )),
        Some(minutes) if minutes >= stall_after => Some(format!(
            "Deployment is taking longer than usual ({minutes} minutes). It can take up to {} hours, no action is needed yet",
            settings.deployment_timeout_hours
        )),
        _ => None,
    };

    DeploymentStatusReport {
        status,
        stalled: warning.is_some(),
        deploying_since: config.deploying_since,
        elapsed_minutes,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::test_utils::{
        create_interleaved_lifecycle_service, create_test_lifecycle_service, verified_result,
        ConcurrentWrite,
    };
    use crate::traits::DomainConfigRepository;

    fn deploying_since(minutes_ago: i64, now: DateTime<Utc>) -> DomainConfig {
        DomainConfig {
            custom_domain: Some("links.acme.com".to_string()),
            domain_verified: true,
            deployment_status: DeploymentStatus::Deploying,
            deploying_since: Some(now - Duration::minutes(minutes_ago)),
            ..DomainConfig::default()
        }
    }

    #[test]
    fn fresh_deployment_has_no_warning() {
        let now = Utc::now();
        let report = report_at(&deploying_since(5, now), &DomainSettings::default(), now);
        assert_eq!(report.status, DeploymentStatus::Deploying);
        assert!(!report.stalled);
        assert_eq!(report.elapsed_minutes, Some(5));
        assert!(report.warning.is_none());
    }

    #[test]
    fn long_deployment_is_stalled_not_failed() {
        let now = Utc::now();
        let report = report_at(&deploying_since(45, now), &DomainSettings::default(), now);
        assert!(report.stalled);
        assert_eq!(report.status, DeploymentStatus::Deploying);
        let warning = report.warning.unwrap();
        assert!(warning.contains("48 hours"));
        assert!(!warning.contains("Contact support"));
    }

    #[test]
    fn past_timeout_asks_for_support() {
        let now = Utc::now();
        let report = report_at(
            &deploying_since(49 * 60, now),
            &DomainSettings::default(),
            now,
        );
        assert!(report.stalled);
        assert!(report.warning.unwrap().contains("Contact support"));
    }

    #[test]
    fn active_and_pending_never_stall() {
        let now = Utc::now();
        let mut config = deploying_since(49 * 60, now);
        config.deployment_status = DeploymentStatus::Active;
        assert!(!report_at(&config, &DomainSettings::default(), now).stalled);
        assert!(!report_at(&DomainConfig::default(), &DomainSettings::default(), now).stalled);
    }

    #[tokio::test]
    async fn end_to_end_activation() {
        let h = create_test_lifecycle_service();
        let deployments = DeploymentStatusService::new(h.ctx.clone());

        h.service.save_domain("acc-1", "links.acme.com").await.unwrap();
        assert!(!h.service.verify_domain("acc-1").await.unwrap().verified);
        assert_eq!(
            deployments.refresh_status("acc-1").await.unwrap().status,
            DeploymentStatus::Pending
        );

        h.verifier.push(verified_result()).await;
        assert!(h.service.verify_domain("acc-1").await.unwrap().verified);
        assert_eq!(
            deployments.refresh_status("acc-1").await.unwrap().status,
            DeploymentStatus::Deploying
        );

        assert_eq!(
            deployments.mark_active("acc-1").await.unwrap(),
            DeploymentStatus::Active
        );
        let report = deployments.refresh_status("acc-1").await.unwrap();
        assert_eq!(report.status, DeploymentStatus::Active);
        assert!(!report.stalled);

        // again: no-op, never downgraded
        assert_eq!(
            deployments.mark_active("acc-1").await.unwrap(),
            DeploymentStatus::Active
        );
        h.verifier.push(verified_result()).await;
        h.service.verify_domain("acc-1").await.unwrap();
        let config = h.repo.find_by_account("acc-1").await.unwrap().unwrap();
        assert_eq!(config.deployment_status, DeploymentStatus::Active);
    }

    #[tokio::test]
    async fn mark_active_rejects_unverified() {
        let h = create_test_lifecycle_service();
        let deployments = DeploymentStatusService::new(h.ctx.clone());

        let err = deployments.mark_active("ghost").await.unwrap_err();
        assert!(matches!(err, CoreError::AccountNotFound(_)));

        h.service.save_domain("acc-1", "links.acme.com").await.unwrap();
        let err = deployments.mark_active("acc-1").await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn mark_active_after_concurrent_delete_is_refused() {
        let (h, repo) = create_interleaved_lifecycle_service("acc-1");
        let deployments = DeploymentStatusService::new(h.ctx.clone());
        h.service.save_domain("acc-1", "links.acme.com").await.unwrap();
        h.verifier.push(verified_result()).await;
        assert!(h.service.verify_domain("acc-1").await.unwrap().verified);

        repo.queue(ConcurrentWrite::Delete).await;
        let err = deployments.mark_active("acc-1").await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)), "{err:?}");

        let config = h.repo.find_by_account("acc-1").await.unwrap().unwrap();
        assert!(config.custom_domain.is_none());
        assert_eq!(config.deployment_status, DeploymentStatus::Pending);
    }
}
