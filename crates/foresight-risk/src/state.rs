//! The risk state machine.
//!
//! Owns every mutable field of the control loop: the OK/AT-RISK
//! status, the fast-recovery streak, the post-mitigation grace
//! counter, the last-mitigation instant, and the weak-confirmation
//! flag. All mutation happens inside one cycle's `step()` call; the
//! scheduler guarantees cycles never overlap, so no locking is
//! needed here.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use foresight_core::{RecoveryConfig, RiskState, SloConfig};

/// What a single state-machine step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepNote {
    /// No transition this cycle.
    Held,
    /// Grace counter active: state forced to OK regardless of forecast.
    GraceHold,
    /// Entered the at-risk state.
    Entered,
    /// Left the at-risk state (hysteresis exit or fast-recovery streak).
    Exited,
}

/// Hysteresis state machine with cooldown-gated re-entry.
#[derive(Debug)]
pub struct RiskStateMachine {
    state: RiskState,
    /// Consecutive fast-window samples below the exit threshold.
    fast_ok_streak: u32,
    /// Cycles left in the forced-OK window after a mitigation.
    grace_remaining: u32,
    last_mitigation: Option<Instant>,
    /// A weak-band signal was recorded last cycle and awaits confirmation.
    weak_pending: bool,

    entry_threshold: f64,
    exit_threshold: f64,
    reenter_ratio: f64,
    cooldown: Duration,
    grace_cycles: u32,
    fast_exit_cycles: u32,
    blend_window: Duration,
}

impl RiskStateMachine {
    pub fn new(slo: &SloConfig, recovery: &RecoveryConfig) -> Self {
        Self {
            state: RiskState::Ok,
            fast_ok_streak: 0,
            grace_remaining: 0,
            last_mitigation: None,
            weak_pending: false,
            entry_threshold: slo.p95_soft_ms,
            exit_threshold: slo.exit_threshold_ms(),
            reenter_ratio: recovery.reenter_ratio,
            cooldown: Duration::from_secs(recovery.cooldown_secs),
            grace_cycles: recovery.grace_cycles,
            fast_exit_cycles: recovery.fast_exit_cycles,
            blend_window: Duration::from_secs(recovery.blend_secs),
        }
    }

    /// Apply one cycle's transition, in precedence order: grace hold,
    /// then at-risk exit (hysteresis band or fast-recovery streak),
    /// then OK entry (raised threshold while cooldown is active).
    ///
    /// `effective` is the fused forecast (absent when no latency data
    /// arrived this cycle); `fast_sample` the instant fast-window
    /// observation feeding the recovery streak.
    pub fn step(
        &mut self,
        effective: Option<f64>,
        fast_sample: Option<f64>,
        now: Instant,
    ) -> StepNote {
        // Streak bookkeeping runs every cycle, independent of state.
        let fast_exit_hit = match fast_sample {
            Some(v) if v < self.exit_threshold => {
                self.fast_ok_streak += 1;
                self.fast_ok_streak >= self.fast_exit_cycles
            }
            _ => {
                self.fast_ok_streak = 0;
                false
            }
        };

        if self.grace_remaining > 0 {
            self.state = RiskState::Ok;
            self.grace_remaining -= 1;
            debug!(remaining = self.grace_remaining, "post-mitigation grace hold");
            return StepNote::GraceHold;
        }

        match self.state {
            RiskState::AtRisk => {
                let hysteresis_exit =
                    effective.is_some_and(|eff| eff < self.exit_threshold);
                if hysteresis_exit || fast_exit_hit {
                    self.state = RiskState::Ok;
                    self.fast_ok_streak = 0;
                    info!(
                        via_streak = fast_exit_hit,
                        exit_threshold = self.exit_threshold,
                        "left at-risk state"
                    );
                    StepNote::Exited
                } else {
                    StepNote::Held
                }
            }
            RiskState::Ok => {
                let entry = if self.cooldown_active(now) {
                    // Re-entry during cooldown is deliberately harder.
                    self.entry_threshold * self.reenter_ratio
                } else {
                    self.entry_threshold
                };
                if effective.is_some_and(|eff| eff > entry) {
                    self.state = RiskState::AtRisk;
                    info!(entry_threshold = entry, "entered at-risk state");
                    StepNote::Entered
                } else {
                    StepNote::Held
                }
            }
        }
    }

    /// Record a fired mitigation: starts the cooldown clock and the
    /// grace window, forces OK, and clears the weak-confirmation flag.
    pub fn record_mitigation(&mut self, now: Instant) {
        self.last_mitigation = Some(now);
        self.grace_remaining = self.grace_cycles;
        self.state = RiskState::Ok;
        self.weak_pending = false;
    }

    /// Whether the post-mitigation cooldown is still running.
    pub fn cooldown_active(&self, now: Instant) -> bool {
        self.last_mitigation
            .is_some_and(|t| now.saturating_duration_since(t) < self.cooldown)
    }

    /// Whether the instant fast sample should be blended into the
    /// effective forecast this cycle.
    pub fn in_blend_window(&self, now: Instant) -> bool {
        self.last_mitigation
            .is_some_and(|t| now.saturating_duration_since(t) < self.blend_window)
    }

    pub fn seconds_since_mitigation(&self, now: Instant) -> Option<u64> {
        self.last_mitigation
            .map(|t| now.saturating_duration_since(t).as_secs())
    }

    pub fn state(&self) -> RiskState {
        self.state
    }

    pub fn fast_ok_streak(&self) -> u32 {
        self.fast_ok_streak
    }

    pub fn grace_remaining(&self) -> u32 {
        self.grace_remaining
    }

    pub fn weak_pending(&self) -> bool {
        self.weak_pending
    }

    pub fn set_weak_pending(&mut self, pending: bool) {
        self.weak_pending = pending;
    }
}
