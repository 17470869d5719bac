//! Type definitions module

mod deployment;
mod domain_config;
mod response;
mod routing;
mod settings;

pub use deployment::DeploymentStatusReport;
pub use domain_config::{
    DeploymentStatus, DnsInstructions, DomainConfig, DomainConfigUpdate, RootDomainMode,
    SettingsPatch, SetupStep,
};
pub use response::{AvailabilityResponse, OkResponse};
pub use routing::{HostnameClassification, RootRoute, RouteDecision};
pub use settings::DomainSettings;

// Re-export DoH library public types
pub use biolink_domains_doh::{
    DnsRecordType, RecordCheck, VerificationResult, VerificationStatus,
};
