//! Domain types for the foresight control loop.
//!
//! These types cross crate boundaries: the forecast engine produces
//! `ForecastResult`, the monitor assembles `MetricForecast` entries
//! into an immutable `CycleRecord`, and the record is serialized to
//! JSON as the per-cycle structured log line.

use serde::{Deserialize, Serialize};

/// Result of a linear trend fit over a sample series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Projected value at the forecast horizon.
    pub forecast: f64,
    /// Trend slope in metric units per second.
    pub slope_per_sec: f64,
    /// Goodness of fit, `(-inf, 1]`. Zero for thin series (< 3 points).
    pub r2: f64,
}

/// Per-metric evaluation carried in the cycle record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricForecast {
    /// Metric name: "latency_p95_ms", "error_rate", "memory_bytes".
    pub metric: String,
    /// Last observed value.
    pub current: f64,
    /// Projected value at the horizon.
    pub forecast: f64,
    /// Threshold the forecast is compared against.
    pub threshold: f64,
    /// Display unit ("ms", "", "bytes").
    pub unit: String,
    pub slope_per_sec: f64,
    /// Whether the raw forecast exceeds the threshold.
    pub breach_predicted: bool,
    pub r2: f64,
}

/// Current risk status of the protected service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskState {
    Ok,
    AtRisk,
}

impl RiskState {
    /// Gauge representation: 1 when at risk, 0 otherwise.
    pub fn as_flag(self) -> u64 {
        match self {
            RiskState::Ok => 0,
            RiskState::AtRisk => 1,
        }
    }
}

/// Immutable snapshot of one control-loop cycle.
///
/// Created and logged exactly once at the end of every cycle; never
/// mutated afterward. This is the sole externally observable artifact
/// besides the side-effecting remediation/notification calls.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRecord {
    /// RFC 3339 timestamp of the cycle.
    pub ts: String,
    /// Per-metric forecasts evaluated this cycle.
    pub predictions: Vec<MetricForecast>,
    /// Any metric's raw forecast above its threshold.
    pub breach_any: bool,
    /// Fused forecast fed to the probability evaluator (latency only).
    pub effective_forecast_ms: Option<f64>,
    /// Breach probability in `[0, 1]`, absent without a latency forecast.
    pub probability: Option<f64>,
    /// Fit quality of the latency trend.
    pub r2: Option<f64>,
    /// Decision rationale ("cooldown", "strong_prob 0.68 r2=0.95", ...).
    pub decision: String,
    /// Risk state after this cycle's transition.
    pub state: RiskState,
    /// Set to "mitigation_called" when the actuator fired.
    pub action_taken: Option<String>,
    /// Human-readable mitigation reason, present only on action cycles.
    pub reason: Option<String>,
    /// Instant fast-window p95 observation, if available.
    pub fast_p95_ms: Option<f64>,
    /// Consecutive fast samples below the exit threshold.
    pub fast_ok_streak: u32,
    pub cooldown_active: bool,
    pub since_last_mitigation_secs: Option<u64>,
    /// Distinguishing marker, present exactly when a mitigation executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mitigation_event: Option<String>,
}
