use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of one health probe, or of the service overall.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Aggregated health snapshot. Producing one never fails; probe failures are
/// reported in the fields instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: ProbeStatus,
    pub cache_status: ProbeStatus,
    pub provider_status: ProbeStatus,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn new(cache_status: ProbeStatus, provider_status: ProbeStatus) -> Self {
        let status = if cache_status == ProbeStatus::Healthy
            && provider_status == ProbeStatus::Healthy
        {
            ProbeStatus::Healthy
        } else {
            ProbeStatus::Degraded
        };
        Self {
            status,
            cache_status,
            provider_status,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_only_when_both_probes_pass() {
        let report = HealthReport::new(ProbeStatus::Healthy, ProbeStatus::Healthy);
        assert_eq!(report.status, ProbeStatus::Healthy);

        let report = HealthReport::new(ProbeStatus::Healthy, ProbeStatus::Unhealthy);
        assert_eq!(report.status, ProbeStatus::Degraded);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let report = HealthReport::new(ProbeStatus::Healthy, ProbeStatus::Healthy);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "healthy");
    }
}
