//! foresight-telemetry — queries against the metrics store.
//!
//! A thin Prometheus HTTP API client with two operations: a range
//! query returning the ordered samples of the first result row, and a
//! soft-failing instant query returning a single scalar. No retries —
//! each cycle is a fresh attempt, so transport failures self-heal on
//! the next tick.
//!
//! The [`Telemetry`] trait is the seam the monitor is generic over;
//! tests swap in fakes instead of a live Prometheus.

pub mod client;
pub mod queries;

pub use client::{PromClient, Telemetry, TelemetryError};
