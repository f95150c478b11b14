//! foresight-monitor — the predictive self-healing control loop.
//!
//! One cycle per tick, data flowing one direction:
//!
//! ```text
//! Telemetry ─▶ Forecast ─▶ Risk evaluator ─▶ State machine
//!                                               │
//!                     CycleRecord  ◀─ Decision ─┤
//!                     (log + journal)           └─▶ Actuator
//! ```
//!
//! [`cycle::run_cycle`] executes a single pass and is deliberately
//! infallible: every downstream failure degrades that cycle's inputs
//! or outputs instead of propagating, so one bad cycle can never take
//! the scheduler down. [`monitor::Monitor`] owns the state machine and
//! drives the loop on a fixed interval until shutdown.

pub mod cycle;
pub mod journal;
pub mod monitor;

pub use cycle::run_cycle;
pub use journal::Journal;
pub use monitor::Monitor;

#[cfg(test)]
mod fakes;
