use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The persistence backend answered its health probe.
    Ok,
    /// The service is up but the persistence backend is unreachable.
    Degraded,
}

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
}

impl HealthResponse {
    pub fn new(store_healthy: bool) -> Self {
        let status = if store_healthy {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        };
        Self { status }
    }
}
