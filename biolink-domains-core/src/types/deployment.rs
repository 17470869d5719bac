//! Deployment status reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeploymentStatus;

/// Snapshot of a domain's deployment convergence.
///
/// A stall is a warning, never a failure: the edge platform's real state is
/// not observable from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatusReport {
    pub status: DeploymentStatus,
    pub stalled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploying_since: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
