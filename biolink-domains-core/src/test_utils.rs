//! Test helpers
//!
//! In-memory mocks and factory methods for service tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::{CoreError, CoreResult};
use crate::services::{DomainLifecycleService, ServiceContext};
use crate::traits::{DomainConfigRepository, DomainVerifier, SubscriptionGate};
use crate::types::{
    DeploymentStatus, DnsRecordType, DomainConfig, DomainSettings, RecordCheck, SettingsPatch,
    VerificationResult, VerificationStatus,
};

const TARGET: &str = "cname.example.com";

// ===== MockDomainConfigRepository =====

pub struct MockDomainConfigRepository {
    rows: RwLock<HashMap<String, DomainConfig>>,
    saves: RwLock<usize>,
}

impl MockDomainConfigRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            saves: RwLock::new(0),
        }
    }

    pub async fn save_count(&self) -> usize {
        *self.saves.read().await
    }

    async fn count_write(&self) {
        *self.saves.write().await += 1;
    }
}

/// Same guarantee as the unique index of the real store.
fn ensure_unclaimed(
    rows: &HashMap<String, DomainConfig>,
    account_id: &str,
    domain: &str,
) -> CoreResult<()> {
    let taken = rows.iter().any(|(id, row)| {
        id != account_id && row.domain_verified && row.normalized_domain().as_deref() == Some(domain)
    });
    if taken {
        return Err(CoreError::DomainConflict {
            domain: domain.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl DomainConfigRepository for MockDomainConfigRepository {
    async fn find_by_account(&self, account_id: &str) -> CoreResult<Option<DomainConfig>> {
        Ok(self.rows.read().await.get(account_id).cloned())
    }

    async fn save(&self, account_id: &str, config: &DomainConfig) -> CoreResult<()> {
        let mut rows = self.rows.write().await;
        if config.domain_verified {
            if let Some(domain) = config.normalized_domain() {
                ensure_unclaimed(&rows, account_id, &domain)?;
            }
        }
        rows.insert(account_id.to_string(), config.clone());
        drop(rows);
        self.count_write().await;
        Ok(())
    }

    async fn replace_domain(
        &self,
        account_id: &str,
        domain: Option<&str>,
    ) -> CoreResult<DomainConfig> {
        let mut rows = self.rows.write().await;
        let row = rows.entry(account_id.to_string()).or_default();
        row.replace_domain(domain.map(str::to_string));
        let config = row.clone();
        drop(rows);
        self.count_write().await;
        Ok(config)
    }

    async fn mark_verified(&self, account_id: &str, normalized_domain: &str) -> CoreResult<bool> {
        let mut rows = self.rows.write().await;
        let holds_domain = rows
            .get(account_id)
            .is_some_and(|row| row.normalized_domain().as_deref() == Some(normalized_domain));
        if !holds_domain {
            return Ok(false);
        }
        ensure_unclaimed(&rows, account_id, normalized_domain)?;
        let changed = rows
            .get_mut(account_id)
            .is_some_and(DomainConfig::mark_verified);
        drop(rows);
        if changed {
            self.count_write().await;
        }
        Ok(changed)
    }

    async fn update_settings(
        &self,
        account_id: &str,
        patch: &SettingsPatch,
    ) -> CoreResult<DomainConfig> {
        let mut rows = self.rows.write().await;
        let row = rows.entry(account_id.to_string()).or_default();
        patch.apply(row);
        let config = row.clone();
        drop(rows);
        self.count_write().await;
        Ok(config)
    }

    async fn find_verified_owner(&self, normalized_domain: &str) -> CoreResult<Option<String>> {
        Ok(self
            .find_by_domain(normalized_domain)
            .await?
            .map(|(account_id, _)| account_id))
    }

    async fn find_by_domain(
        &self,
        normalized_domain: &str,
    ) -> CoreResult<Option<(String, DomainConfig)>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|(_, row)| {
                row.domain_verified
                    && row.normalized_domain().as_deref() == Some(normalized_domain)
            })
            .map(|(id, row)| (id.clone(), row.clone())))
    }

    async fn update_deployment_status(
        &self,
        account_id: &str,
        status: DeploymentStatus,
    ) -> CoreResult<DeploymentStatus> {
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(account_id)
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))?;
        if row.advance_deployment(status) || !row.deployment_status.advances_to(status) {
            return Ok(row.deployment_status);
        }
        Err(CoreError::ValidationError(format!(
            "Deployment for account {account_id} cannot move from {} to {status}",
            row.deployment_status
        )))
    }
}

// ===== InterleavingRepository =====

/// A write from another request for the same account.
#[derive(Debug, Clone)]
pub enum ConcurrentWrite {
    Delete,
    Settings(SettingsPatch),
    Verify(String),
}

/// Wraps the mock repository and lands one queued concurrent write right
/// before the next narrow write, i.e. after the caller's reads.
pub struct InterleavingRepository {
    inner: Arc<MockDomainConfigRepository>,
    account_id: String,
    pending: Mutex<Option<ConcurrentWrite>>,
}

impl InterleavingRepository {
    pub fn new(inner: Arc<MockDomainConfigRepository>, account_id: &str) -> Self {
        Self {
            inner,
            account_id: account_id.to_string(),
            pending: Mutex::new(None),
        }
    }

    pub async fn queue(&self, write: ConcurrentWrite) {
        *self.pending.lock().await = Some(write);
    }

    async fn land(&self) -> CoreResult<()> {
        let Some(write) = self.pending.lock().await.take() else {
            return Ok(());
        };
        match write {
            ConcurrentWrite::Delete => {
                self.inner
                    .save(&self.account_id, &DomainConfig::default())
                    .await
            }
            ConcurrentWrite::Settings(patch) => self
                .inner
                .update_settings(&self.account_id, &patch)
                .await
                .map(|_| ()),
            ConcurrentWrite::Verify(domain) => self
                .inner
                .mark_verified(&self.account_id, &domain)
                .await
                .map(|_| ()),
        }
    }
}

#[async_trait]
impl DomainConfigRepository for InterleavingRepository {
    async fn find_by_account(&self, account_id: &str) -> CoreResult<Option<DomainConfig>> {
        self.inner.find_by_account(account_id).await
    }

    async fn save(&self, account_id: &str, config: &DomainConfig) -> CoreResult<()> {
        self.land().await?;
        self.inner.save(account_id, config).await
    }

    async fn replace_domain(
        &self,
        account_id: &str,
        domain: Option<&str>,
    ) -> CoreResult<DomainConfig> {
        self.land().await?;
        self.inner.replace_domain(account_id, domain).await
    }

    async fn mark_verified(&self, account_id: &str, normalized_domain: &str) -> CoreResult<bool> {
        self.land().await?;
        self.inner.mark_verified(account_id, normalized_domain).await
    }

    async fn update_settings(
        &self,
        account_id: &str,
        patch: &SettingsPatch,
    ) -> CoreResult<DomainConfig> {
        self.land().await?;
        self.inner.update_settings(account_id, patch).await
    }

    async fn find_verified_owner(&self, normalized_domain: &str) -> CoreResult<Option<String>> {
        self.inner.find_verified_owner(normalized_domain).await
    }

    async fn find_by_domain(
        &self,
        normalized_domain: &str,
    ) -> CoreResult<Option<(String, DomainConfig)>> {
        self.inner.find_by_domain(normalized_domain).await
    }

    async fn update_deployment_status(
        &self,
        account_id: &str,
        status: DeploymentStatus,
    ) -> CoreResult<DeploymentStatus> {
        self.land().await?;
        self.inner.update_deployment_status(account_id, status).await
    }
}

// ===== MockVerifier =====

/// Returns queued results in order, then "not propagated" forever.
pub struct MockVerifier {
    results: Mutex<VecDeque<VerificationResult>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockVerifier {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn push(&self, result: VerificationResult) {
        self.results.lock().await.push_back(result);
    }

    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl DomainVerifier for MockVerifier {
    async fn verify(&self, domain: &str, expected_target: &str) -> VerificationResult {
        self.calls
            .lock()
            .await
            .push((domain.to_string(), expected_target.to_string()));
        self.results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(not_propagated)
    }
}

// ===== MockSubscriptionGate =====

pub struct MockSubscriptionGate {
    enabled: RwLock<bool>,
}

impl MockSubscriptionGate {
    pub fn new() -> Self {
        Self {
            enabled: RwLock::new(true),
        }
    }

    pub async fn set_enabled(&self, enabled: bool) {
        *self.enabled.write().await = enabled;
    }
}

#[async_trait]
impl SubscriptionGate for MockSubscriptionGate {
    async fn custom_domains_enabled(&self, _account_id: &str) -> CoreResult<bool> {
        Ok(*self.enabled.read().await)
    }
}

// ===== Verification results =====

fn cname_check(found: bool, current: Option<&str>) -> RecordCheck {
    RecordCheck {
        record_type: DnsRecordType::Cname,
        expected_value: TARGET.to_string(),
        found,
        current_value: current.map(str::to_string),
    }
}

pub fn verified_result() -> VerificationResult {
    VerificationResult {
        verified: true,
        status: VerificationStatus::Verified,
        records: vec![cname_check(true, Some(TARGET))],
        message: format!("DNS verified: domain points to {TARGET}."),
    }
}

pub fn cname_mismatch(current: &str) -> VerificationResult {
    VerificationResult {
        verified: false,
        status: VerificationStatus::Mismatch,
        records: vec![cname_check(false, Some(current))],
        message: format!("CNAME points to {current}, expected {TARGET}."),
    }
}

pub fn not_propagated() -> VerificationResult {
    VerificationResult {
        verified: false,
        status: VerificationStatus::NotPropagated,
        records: vec![cname_check(false, None)],
        message: "DNS not propagated yet. Changes can take up to 48 hours.".to_string(),
    }
}

// ===== Factories =====

pub struct TestHarness {
    pub ctx: Arc<ServiceContext>,
    pub service: Arc<DomainLifecycleService>,
    pub repo: Arc<MockDomainConfigRepository>,
    pub verifier: Arc<MockVerifier>,
    pub gate: Arc<MockSubscriptionGate>,
}

pub fn create_test_lifecycle_service() -> TestHarness {
    let repo = Arc::new(MockDomainConfigRepository::new());
    harness_over(repo.clone(), repo)
}

/// Harness whose service writes through an `InterleavingRepository`;
/// `h.repo` is the shared underlying store.
pub fn create_interleaved_lifecycle_service(
    account_id: &str,
) -> (TestHarness, Arc<InterleavingRepository>) {
    let repo = Arc::new(MockDomainConfigRepository::new());
    let interleaving = Arc::new(InterleavingRepository::new(repo.clone(), account_id));
    (harness_over(interleaving.clone(), repo), interleaving)
}

fn harness_over(
    service_repo: Arc<dyn DomainConfigRepository>,
    repo: Arc<MockDomainConfigRepository>,
) -> TestHarness {
    let verifier = Arc::new(MockVerifier::new());
    let gate = Arc::new(MockSubscriptionGate::new());
    let ctx = Arc::new(ServiceContext::new(
        service_repo,
        verifier.clone(),
        gate.clone(),
        DomainSettings::default(),
    ));
    TestHarness {
        service: Arc::new(DomainLifecycleService::new(Arc::clone(&ctx))),
        ctx,
        repo,
        verifier,
        gate,
    }
}
