//! Storage layer and collaborator abstraction trait definitions

mod domain_config_repository;
mod subscription_gate;

pub use domain_config_repository::DomainConfigRepository;
pub use subscription_gate::{AllowAllSubscriptionGate, SubscriptionGate};

// The verifier seam lives in the DoH library
pub use biolink_domains_doh::DomainVerifier;
