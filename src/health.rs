use crate::BrowserPoolStats;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Healthy,
    Warning,
    Critical,
}

/// Classifies browser pool state for the health endpoint.
pub fn evaluate_pool(stats: &BrowserPoolStats) -> HealthLevel {
    if stats.total_instances == 0 || stats.healthy_instances + stats.busy_instances == 0 {
        return HealthLevel::Critical;
    }

    let failure_rate = stats.failed_instances as f64 / stats.total_instances as f64;
    if failure_rate > 0.5 {
        HealthLevel::Critical
    } else if failure_rate > 0.0 || stats.available_instances == 0 {
        HealthLevel::Warning
    } else {
        HealthLevel::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: usize, healthy: usize, busy: usize, failed: usize, available: usize) -> BrowserPoolStats {
        BrowserPoolStats {
            total_instances: total,
            healthy_instances: healthy,
            busy_instances: busy,
            failed_instances: failed,
            available_instances: available,
            total_pages_rendered: 0,
        }
    }

    #[test]
    fn all_healthy_pool_is_healthy() {
        assert_eq!(evaluate_pool(&stats(2, 2, 0, 0, 2)), HealthLevel::Healthy);
    }

    #[test]
    fn some_failures_degrade_to_warning() {
        assert_eq!(evaluate_pool(&stats(4, 3, 0, 1, 3)), HealthLevel::Warning);
    }

    #[test]
    fn mostly_failed_pool_is_critical() {
        assert_eq!(evaluate_pool(&stats(4, 1, 0, 3, 1)), HealthLevel::Critical);
        assert_eq!(evaluate_pool(&stats(0, 0, 0, 0, 0)), HealthLevel::Critical);
    }
}
