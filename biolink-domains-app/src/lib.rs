//! Platform-agnostic application bootstrap for Biolink custom domains.
//!
//! Provides `AppConfig` (TOML configuration), `AppState` (service container)
//! and `AppStateBuilder` (adapter injection).

pub mod adapters;
pub mod config;

use std::sync::Arc;

use biolink_domains_core::error::{CoreError, CoreResult};
use biolink_domains_core::services::{
    DeploymentStatusService, DomainLifecycleService, DomainRouter, ServiceContext,
    VerificationPoller,
};
use biolink_domains_core::traits::{
    AllowAllSubscriptionGate, DomainConfigRepository, DomainVerifier, SubscriptionGate,
};
use biolink_domains_core::types::DomainSettings;
use biolink_domains_doh::{DohVerifier, ReqwestDohTransport};

pub use config::AppConfig;
use config::{DohConfig, PollingConfig};

/// Platform-agnostic application state.
///
/// Holds all services and the `ServiceContext`. Every frontend constructs this
/// once at startup via `AppStateBuilder`.
pub struct AppState {
    /// Service context (holds all adapters)
    pub ctx: Arc<ServiceContext>,
    /// Save / verify / configure / delete
    pub lifecycle_service: Arc<DomainLifecycleService>,
    /// Deployment convergence
    pub deployment_service: DeploymentStatusService,
    /// Inbound request routing
    pub router: DomainRouter,
    /// Auto-verification polling
    pub poller: VerificationPoller,
}

impl AppState {
    /// Open the SQLite registry from `config` and build the full state.
    #[cfg(feature = "sqlite-store")]
    pub async fn from_config(config: &AppConfig) -> CoreResult<Self> {
        let store = adapters::SqliteStore::new(&config.database.path).await?;
        AppStateBuilder::new()
            .domain_config_repository(Arc::new(store))
            .settings(config.domains.clone())
            .doh(config.doh.clone())
            .polling(config.polling.clone())
            .build()
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `domain_config_repository` - where domain configurations are stored
///
/// # Optional
/// - `verifier` - defaults to a DoH verifier built from the `doh` config
/// - `subscription_gate` - defaults to `AllowAllSubscriptionGate`
/// - `settings`, `doh`, `polling` - default configuration sections
pub struct AppStateBuilder {
    domain_config_repository: Option<Arc<dyn DomainConfigRepository>>,
    verifier: Option<Arc<dyn DomainVerifier>>,
    subscription_gate: Option<Arc<dyn SubscriptionGate>>,
    settings: DomainSettings,
    doh: DohConfig,
    polling: PollingConfig,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            domain_config_repository: None,
            verifier: None,
            subscription_gate: None,
            settings: DomainSettings::default(),
            doh: DohConfig::default(),
            polling: PollingConfig::default(),
        }
    }

    #[must_use]
    pub fn domain_config_repository(mut self, repo: Arc<dyn DomainConfigRepository>) -> Self {
        self.domain_config_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn verifier(mut self, verifier: Arc<dyn DomainVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    #[must_use]
    pub fn subscription_gate(mut self, gate: Arc<dyn SubscriptionGate>) -> Self {
        self.subscription_gate = Some(gate);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: DomainSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn doh(mut self, doh: DohConfig) -> Self {
        self.doh = doh;
        self
    }

    #[must_use]
    pub fn polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing
    /// or the DoH client cannot be created.
    pub fn build(self) -> CoreResult<AppState> {
        let domain_config_repository = self.domain_config_repository.ok_or_else(|| {
            CoreError::ValidationError("domain_config_repository is required".to_string())
        })?;
        let verifier = match self.verifier {
            Some(verifier) => verifier,
            None => build_doh_verifier(&self.doh)?,
        };
        let subscription_gate = self
            .subscription_gate
            .unwrap_or_else(|| Arc::new(AllowAllSubscriptionGate));

        let ctx = Arc::new(ServiceContext::new(
            domain_config_repository,
            verifier,
            subscription_gate,
            self.settings,
        ));

        let lifecycle_service = Arc::new(DomainLifecycleService::new(Arc::clone(&ctx)));
        let deployment_service = DeploymentStatusService::new(Arc::clone(&ctx));
        let router = DomainRouter::new(Arc::clone(&ctx));
        let poller = VerificationPoller::new(Arc::clone(&lifecycle_service))
            .with_interval(self.polling.interval())
            .with_max_attempts(self.polling.max_attempts);

        log::debug!(
            "Application state ready for {} (CNAME target {})",
            ctx.settings().app_domain,
            ctx.settings().cname_target
        );

        Ok(AppState {
            ctx,
            lifecycle_service,
            deployment_service,
            router,
            poller,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn build_doh_verifier(doh: &DohConfig) -> CoreResult<Arc<dyn DomainVerifier>> {
    let transport = ReqwestDohTransport::new(doh.endpoint.clone(), doh.timeout()).map_err(|e| {
        CoreError::ValidationError(format!("Failed to create DoH client for {}: {e}", doh.endpoint))
    })?;
    log::info!("Verifying custom domains through {}", transport.endpoint());
    Ok(Arc::new(
        DohVerifier::new(Arc::new(transport)).with_a_record_diagnostics(doh.a_record_diagnostics),
    ))
}
