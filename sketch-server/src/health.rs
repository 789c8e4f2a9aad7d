//! Health check endpoints for Kubernetes probes.
//!
//! Provides liveness and readiness probes for container orchestration:
//! - `/health/live` - Liveness probe (restart if fails)
//! - `/health/ready` - Readiness probe (remove from LB if fails)
//! - `/health` - Combined check for backward compatibility

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status: "healthy" or "unhealthy"
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
    /// Individual component checks
    pub checks: HealthChecks,
}

/// Individual health checks.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Pipeline configuration passes validation
    pub config: bool,
    /// Number of classifier rules loaded
    pub classifier_rules: usize,
}

/// Liveness probe - is the server running?
///
/// Returns 200 OK if the process is alive.
/// Kubernetes will restart the pod if this fails.
#[tracing::instrument(name = "liveness_probe")]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe - is the server ready to accept traffic?
///
/// Kubernetes will remove the pod from the load balancer if this fails.
#[tracing::instrument(name = "readiness_probe", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let config = state.pipeline.config();
    let config_ok = config.validate().is_ok();

    let status = HealthStatus {
        status: if config_ok { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks {
            config: config_ok,
            classifier_rules: config.classifier.rules.len(),
        },
    };

    let code = if config_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(status))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sketch_core::{PipelineConfig, SketchPipeline, StyleMode};

    use super::*;

    fn state(config: PipelineConfig) -> AppState {
        AppState {
            pipeline: Arc::new(SketchPipeline::new(config)),
            style_mode: StyleMode::Classes,
        }
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus {
            status: "healthy",
            version: "0.2.0",
            checks: HealthChecks {
                config: true,
                classifier_rules: 4,
            },
        };

        let json = serde_json::to_string(&status).expect("should serialize");
        assert!(json.contains("healthy"));
        assert!(json.contains("0.2.0"));
        assert!(json.contains("classifier_rules"));
    }

    #[tokio::test]
    async fn test_readiness_with_defaults() {
        let (code, Json(status)) = readiness(State(state(PipelineConfig::default()))).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(status.checks.classifier_rules, 4);
    }

    #[tokio::test]
    async fn test_readiness_with_broken_config() {
        let mut config = PipelineConfig::default();
        config.layout.row_coefficient = f32::NAN;

        let (code, Json(status)) = readiness(State(state(config))).await;

        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status.status, "unhealthy");
        assert!(!status.checks.config);
    }
}
