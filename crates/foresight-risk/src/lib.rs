//! foresight-risk — breach probability and the risk state machine.
//!
//! Two halves:
//!
//! - [`evaluator`] turns a fused forecast into a normalized breach
//!   probability against the soft threshold and the hard ceiling.
//! - [`state`] owns every piece of mutable loop state (risk status,
//!   fast-exit streak, post-mitigation grace, cooldown timestamp,
//!   weak-confirmation flag) and applies the hysteresis transitions
//!   once per cycle.
//!
//! # Hysteresis
//!
//! ```text
//!            enter: eff > soft (× reenter_ratio in cooldown)
//!   OK  ────────────────────────────────────────────────▶  AT_RISK
//!    ◀────────────────────────────────────────────────
//!            exit: eff < soft × exit_ratio
//!                  or fast sample < exit for N cycles
//! ```
//!
//! A grace counter set on mitigation overrides everything and forces
//! OK for the next few cycles.

pub mod evaluator;
pub mod state;

pub use evaluator::{Thresholds, breach_probability, effective_forecast};
pub use state::{RiskStateMachine, StepNote};
