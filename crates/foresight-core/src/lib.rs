//! foresight-core — shared domain types for the predictive control loop.
//!
//! Everything here is plain data: forecast results, the per-cycle
//! record that forms the structured log stream, and the loop
//! configuration. No I/O lives in this crate.

pub mod config;
pub mod types;

pub use config::{DecisionConfig, MonitorConfig, RecoveryConfig, SloConfig, WindowConfig};
pub use types::{CycleRecord, ForecastResult, MetricForecast, RiskState};
