#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `AppStateBuilder` and the assembled services.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use biolink_domains_app::adapters::SqliteStore;
use biolink_domains_app::{AppConfig, AppState, AppStateBuilder};
use biolink_domains_core::error::{CoreError, CoreResult};
use biolink_domains_core::traits::{DomainVerifier, SubscriptionGate};
use biolink_domains_core::types::{
    DeploymentStatus, DnsRecordType, DomainConfigUpdate, RecordCheck, RootDomainMode, RootRoute,
    RouteDecision, VerificationResult, VerificationStatus,
};
use tokio::sync::Mutex;

async fn create_test_sqlite_store() -> (Arc<SqliteStore>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let store = SqliteStore::new(&db_path)
        .await
        .expect("failed to create SqliteStore");
    (Arc::new(store), tmp)
}

// ===== Mock Implementations =====

/// Answers "not propagated" until a CNAME is "added".
struct ScriptedVerifier {
    results: Mutex<VecDeque<bool>>,
}

impl ScriptedVerifier {
    fn new(results: &[bool]) -> Self {
        Self {
            results: Mutex::new(results.iter().copied().collect()),
        }
    }
}

#[async_trait]
impl DomainVerifier for ScriptedVerifier {
    async fn verify(&self, _domain: &str, expected_target: &str) -> VerificationResult {
        let verified = self.results.lock().await.pop_front().unwrap_or(false);
        VerificationResult {
            verified,
            status: if verified {
                VerificationStatus::Verified
            } else {
                VerificationStatus::NotPropagated
            },
            records: vec![RecordCheck {
                record_type: DnsRecordType::Cname,
                expected_value: expected_target.to_string(),
                found: verified,
                current_value: verified.then(|| expected_target.to_string()),
            }],
            message: if verified {
                "DNS verified.".to_string()
            } else {
                "DNS not propagated yet.".to_string()
            },
        }
    }
}

struct DenyAllGate;

#[async_trait]
impl SubscriptionGate for DenyAllGate {
    async fn custom_domains_enabled(&self, _account_id: &str) -> CoreResult<bool> {
        Ok(false)
    }
}

// ===== Builder =====

#[test]
fn build_requires_repository() {
    let result = AppStateBuilder::new().build();
    assert!(matches!(result, Err(CoreError::ValidationError(_))));
}

#[tokio::test]
async fn build_with_default_verifier() {
    let (store, _tmp) = create_test_sqlite_store().await;
    let state = AppStateBuilder::new()
        .domain_config_repository(store)
        .build()
        .unwrap();
    assert_eq!(state.ctx.settings().app_domain, "example.com");
}

#[tokio::test]
async fn from_config_opens_database() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.database.path = tmp.path().join("data").join("domains.db");
    config.domains.app_domain = "biolink.dev".to_string();

    let state = AppState::from_config(&config).await.unwrap();
    assert!(config.database.path.exists());
    assert_eq!(
        state.router.route("biolink.dev", "/").await.unwrap(),
        RouteDecision::MainApp
    );
}

#[tokio::test]
async fn gate_is_applied() {
    let (store, _tmp) = create_test_sqlite_store().await;
    let state = AppStateBuilder::new()
        .domain_config_repository(store)
        .verifier(Arc::new(ScriptedVerifier::new(&[])))
        .subscription_gate(Arc::new(DenyAllGate))
        .build()
        .unwrap();

    let err = state
        .lifecycle_service
        .save_domain("acc-1", "links.acme.com")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::FeatureUnavailable(_)));
}

// ===== End to end =====

#[tokio::test]
async fn save_verify_deploy_route() {
    let (store, _tmp) = create_test_sqlite_store().await;
    let state = AppStateBuilder::new()
        .domain_config_repository(store)
        .verifier(Arc::new(ScriptedVerifier::new(&[false, true])))
        .build()
        .unwrap();
    let lifecycle = &state.lifecycle_service;

    lifecycle.save_domain("acc-1", "links.acme.com").await.unwrap();
    assert!(!lifecycle.verify_domain("acc-1").await.unwrap().verified);
    assert_eq!(
        state.router.route("links.acme.com", "/").await.unwrap(),
        RouteDecision::DomainNotFound {
            domain: "links.acme.com".to_string()
        }
    );

    assert!(lifecycle.verify_domain("acc-1").await.unwrap().verified);
    let report = state.deployment_service.refresh_status("acc-1").await.unwrap();
    assert_eq!(report.status, DeploymentStatus::Deploying);

    state.deployment_service.mark_active("acc-1").await.unwrap();
    let report = state.deployment_service.refresh_status("acc-1").await.unwrap();
    assert_eq!(report.status, DeploymentStatus::Active);

    lifecycle
        .update_domain_config(
            "acc-1",
            DomainConfigUpdate {
                root_domain_mode: Some(RootDomainMode::Redirect),
                root_domain_redirect_url: Some("https://x.com".to_string()),
                ..DomainConfigUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        state.router.route("links.acme.com", "/").await.unwrap(),
        RouteDecision::Tenant {
            account_id: "acc-1".to_string(),
            route: RootRoute::RedirectTo("https://x.com".to_string()),
        }
    );
    assert_eq!(
        state.router.route("links.acme.com", "/bio").await.unwrap(),
        RouteDecision::Tenant {
            account_id: "acc-1".to_string(),
            route: RootRoute::ServeProfile,
        }
    );
}

#[tokio::test]
async fn verified_domain_blocks_other_accounts() {
    let (store, _tmp) = create_test_sqlite_store().await;
    let state = AppStateBuilder::new()
        .domain_config_repository(store)
        .verifier(Arc::new(ScriptedVerifier::new(&[true])))
        .build()
        .unwrap();
    let lifecycle = &state.lifecycle_service;

    lifecycle.save_domain("owner", "links.acme.com").await.unwrap();
    lifecycle.verify_domain("owner").await.unwrap();

    let err = lifecycle
        .save_domain("other", "LINKS.ACME.COM")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DomainConflict { .. }));
    assert!(
        !lifecycle
            .check_domain_availability("other", "links.acme.com")
            .await
            .unwrap()
            .available
    );

    lifecycle.delete_domain("owner").await.unwrap();
    assert!(lifecycle.save_domain("other", "links.acme.com").await.is_ok());
}
