//! Biolink custom domain core library
//!
//! Business logic for tenant custom domains:
//! - Host classification and request routing (`HostnameResolver`, `DomainRouter`)
//! - Domain lifecycle: save, verify, configure, delete (`DomainLifecycleService`)
//! - Deployment convergence tracking (`DeploymentStatusService`)
//! - Root path behavior (`RootRoutingPolicy`)
//! - Cancellable auto-verification (`VerificationPoller`)
//!
//! Storage and collaborators are abstracted through traits; the platform layer
//! injects them via [`ServiceContext`].

pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{
    DeploymentStatusService, DomainLifecycleService, DomainRouter, HostnameResolver, PollHandle,
    PollOutcome, RootRoutingPolicy, ServiceContext, VerificationPoller,
};
pub use traits::{DomainConfigRepository, DomainVerifier, SubscriptionGate};
