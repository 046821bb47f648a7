//! Concurrent backend health probing

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::client::BackendClient;
use crate::registry::{BackendDescriptor, BackendRegistry};

/// Deadline for each individual probe attempt
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Classification of one backend's probe result
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceStatus {
    /// Final probe attempt returned a sub-500 status
    Up,
    /// Final probe attempt returned a 5xx status
    Error,
    /// Both the primary probe and the root fallback failed at the
    /// transport level
    Down(String),
}

impl ServiceStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, ServiceStatus::Up)
    }
}

impl Serialize for ServiceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ServiceStatus::Up => serializer.serialize_str("up"),
            ServiceStatus::Error => serializer.serialize_str("error"),
            ServiceStatus::Down(reason) => {
                serializer.serialize_str(&format!("down ({})", reason))
            }
        }
    }
}

/// The `/health` response body. Always served with HTTP 200; the status
/// lives in the body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub services: BTreeMap<&'static str, ServiceStatus>,
}

/// Probe every registered backend concurrently and merge the results.
/// Recomputed from scratch on every call; no caching or hysteresis.
pub async fn check_health(client: &BackendClient, registry: &BackendRegistry) -> HealthReport {
    let probes = registry.all().map(|backend| probe_backend(client, backend));
    let results = futures::future::join_all(probes).await;

    let degraded = results.iter().any(|(_, status)| !status.is_up());
    let services = results.into_iter().collect();

    HealthReport {
        status: if degraded { "degraded" } else { "ok" },
        services,
    }
}

/// Probe one backend: primary health path first, root address as fallback.
///
/// A response on either attempt classifies the backend by status code, so
/// a backend that serves 200 at root but is otherwise non-functional still
/// reports `up`. Preserved as documented behavior.
async fn probe_backend(
    client: &BackendClient,
    backend: &BackendDescriptor,
) -> (&'static str, ServiceStatus) {
    let status = match client.probe(&backend.health_url(), PROBE_TIMEOUT).await {
        Ok(response) => classify(response.status().as_u16()),
        Err(primary_err) => {
            tracing::debug!(
                backend = backend.name,
                error = %primary_err,
                "Primary health probe failed, falling back to root"
            );
            match client.probe(&backend.base_url, PROBE_TIMEOUT).await {
                Ok(response) => classify(response.status().as_u16()),
                Err(fallback_err) => ServiceStatus::Down(fallback_err.to_string()),
            }
        }
    };

    (backend.name, status)
}

fn classify(status: u16) -> ServiceStatus {
    if status < 500 {
        ServiceStatus::Up
    } else {
        ServiceStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify(200), ServiceStatus::Up);
        assert_eq!(classify(204), ServiceStatus::Up);
        // Sub-500 includes client errors: a 404 on the probe path counts as up
        assert_eq!(classify(404), ServiceStatus::Up);
        assert_eq!(classify(499), ServiceStatus::Up);
        assert_eq!(classify(500), ServiceStatus::Error);
        assert_eq!(classify(503), ServiceStatus::Error);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&ServiceStatus::Up).unwrap(), "\"up\"");
        assert_eq!(
            serde_json::to_string(&ServiceStatus::Error).unwrap(),
            "\"error\""
        );
        assert_eq!(
            serde_json::to_string(&ServiceStatus::Down("connection refused".to_string())).unwrap(),
            "\"down (connection refused)\""
        );
    }

    #[test]
    fn test_report_shape() {
        let mut services = BTreeMap::new();
        services.insert("bernard", ServiceStatus::Up);
        services.insert("vllm", ServiceStatus::Down("refused".to_string()));

        let report = HealthReport {
            status: "degraded",
            services,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["services"]["bernard"], "up");
        assert_eq!(json["services"]["vllm"], "down (refused)");
    }
}
