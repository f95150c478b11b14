//! foresight-metrics — observability for the control loop itself.
//!
//! The loop publishes cumulative counters and last-value gauges into
//! [`LoopMetrics`] (plain atomics); an independent axum listener
//! renders them in Prometheus text exposition format on `/metrics`.
//! The scrape path only ever reads published values, so it can never
//! block — or be blocked by — an in-flight cycle.

pub mod prometheus;
pub mod registry;
pub mod server;

pub use prometheus::render_prometheus;
pub use registry::{LoopMetrics, MetricsSnapshot};
pub use server::metrics_router;
