use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the persistence backend; failures are logged and reported as degraded.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.store().health_check().await {
        Ok(()) => HealthResponse::new(true),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::new(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dto::health::HealthStatus, services::test_support::test_state};

    #[tokio::test]
    async fn test_memory_store_is_healthy() {
        let response = health_status(&test_state()).await;
        assert_eq!(response.status, HealthStatus::Ok);
    }
}
