//! Loop configuration.
//!
//! All knobs are externally supplied (CLI flags with env fallbacks in
//! the daemon); the defaults here match the deployed monitor's
//! constants so a bare `MonitorConfig::default()` behaves sensibly in
//! tests.

use serde::{Deserialize, Serialize};

/// SLO thresholds per watched metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SloConfig {
    /// Soft latency threshold in ms; breach probability is 0 at or below.
    pub p95_soft_ms: f64,
    /// Hard latency ceiling in ms (real timeout); probability is 1 at or above.
    pub p95_hard_ms: f64,
    /// Hysteresis band: exit threshold = `p95_soft_ms * exit_ratio`.
    pub exit_ratio: f64,
    /// Error-rate ceiling (fraction, not percent).
    pub error_rate: f64,
    /// Resident memory ceiling in bytes.
    pub memory_bytes: f64,
}

impl SloConfig {
    /// Latency value below which the at-risk state is exited.
    pub fn exit_threshold_ms(&self) -> f64 {
        self.p95_soft_ms * self.exit_ratio
    }
}

impl Default for SloConfig {
    fn default() -> Self {
        Self {
            p95_soft_ms: 300.0,
            p95_hard_ms: 5000.0,
            exit_ratio: 0.9,
            error_rate: 0.02,
            memory_bytes: 300_000_000.0,
        }
    }
}

/// Query windows and trend projection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Long rate() window used for the primary trend series (e.g. "5m").
    pub long_trend: String,
    /// Short rate() window for the reactive secondary trend (e.g. "2m").
    pub short_trend: String,
    /// Fast rate() window for instant recovery detection (e.g. "30s").
    pub fast: String,
    /// Range-query lookback in minutes.
    pub lookback_minutes: u64,
    /// How far ahead the trend is projected, in seconds.
    pub horizon_secs: u64,
    /// Sample step of the range query, in seconds.
    pub step_secs: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            long_trend: "5m".to_string(),
            short_trend: "2m".to_string(),
            fast: "30s".to_string(),
            lookback_minutes: 10,
            horizon_secs: 180,
            step_secs: 30,
        }
    }
}

/// Gates and cutoffs for the decision engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Master switch for autonomous action.
    pub auto_heal: bool,
    /// Probability at or above which a single at-risk cycle triggers.
    pub prob_strong: f64,
    /// Lower bound of the weak band requiring two-cycle confirmation.
    pub prob_confirm_min: f64,
    /// Minimum fit quality before any action is considered.
    pub min_r2: f64,
    /// Trigger immediately once the forecast reaches this fraction of
    /// the hard ceiling, regardless of risk state.
    pub pre_timeout_ratio: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            auto_heal: true,
            prob_strong: 0.6,
            prob_confirm_min: 0.3,
            min_r2: 0.2,
            pre_timeout_ratio: 0.9,
        }
    }
}

/// Post-mitigation recovery and anti-flapping parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Seconds after a trigger during which acting is blocked outright
    /// and re-entry into at-risk is harder.
    pub cooldown_secs: u64,
    /// Cycles forced to OK immediately after a mitigation.
    pub grace_cycles: u32,
    /// Entry-threshold multiplier while cooldown is active (> 1).
    pub reenter_ratio: f64,
    /// Consecutive fast samples below the exit threshold needed to
    /// leave the at-risk state early.
    pub fast_exit_cycles: u32,
    /// Seconds after a mitigation during which the instant fast sample
    /// is blended into the effective forecast.
    pub blend_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 600,
            grace_cycles: 3,
            reenter_ratio: 1.2,
            fast_exit_cycles: 2,
            blend_secs: 120,
        }
    }
}

/// Complete control-loop configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub slo: SloConfig,
    pub windows: WindowConfig,
    pub decision: DecisionConfig,
    pub recovery: RecoveryConfig,
    /// Grafana base URL used to build dashboard links in notifications.
    pub grafana_base_url: String,
    /// Dashboard UID the notification links point at.
    pub dashboard_uid: String,
}

impl MonitorConfig {
    /// Link embedded in mitigation notifications.
    pub fn dashboard_link(&self) -> String {
        format!("{}/d/{}?viewPanel=1", self.grafana_base_url, self.dashboard_uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_threshold_is_below_soft() {
        let slo = SloConfig::default();
        assert!(slo.exit_threshold_ms() < slo.p95_soft_ms);
        assert_eq!(slo.exit_threshold_ms(), 270.0);
    }

    #[test]
    fn reenter_ratio_raises_entry() {
        let recovery = RecoveryConfig::default();
        assert!(recovery.reenter_ratio > 1.0);
    }

    #[test]
    fn defaults_match_deployed_constants() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.slo.p95_soft_ms, 300.0);
        assert_eq!(cfg.slo.p95_hard_ms, 5000.0);
        assert_eq!(cfg.windows.horizon_secs, 180);
        assert_eq!(cfg.windows.step_secs, 30);
        assert_eq!(cfg.recovery.cooldown_secs, 600);
        assert_eq!(cfg.recovery.grace_cycles, 3);
        assert_eq!(cfg.decision.prob_strong, 0.6);
        assert_eq!(cfg.decision.min_r2, 0.2);
    }

    #[test]
    fn dashboard_link_format() {
        let cfg = MonitorConfig {
            grafana_base_url: "http://grafana:3000".to_string(),
            dashboard_uid: "predictive-selfheal".to_string(),
            ..Default::default()
        };
        assert_eq!(
            cfg.dashboard_link(),
            "http://grafana:3000/d/predictive-selfheal?viewPanel=1"
        );
    }
}
