//! foresight-decision — whether to act this cycle.
//!
//! A pure decision table over the cycle's signals. No I/O: the monitor
//! feeds it the fused forecast, probability, fit quality, and state,
//! and it answers with a tagged [`TriggerOutcome`] whose precedence
//! order is auditable in one match:
//!
//! ```text
//! preconditions: auto-heal on, no cooldown, latency forecast, r2 ≥ min
//!   1. early timeout   eff ≥ pre_timeout_ratio × hard    (any state)
//!   2. strong signal   prob ≥ strong                      (at risk)
//!   3. weak confirmed  prob in [confirm_min, strong) on
//!                      two consecutive cycles              (at risk)
//! ```
//!
//! A single weak-band cycle records intent (`WeakPending`) and never
//! acts; the rationale string is recorded for every cycle either way.

use foresight_core::{DecisionConfig, RiskState};

/// Signals the decision engine consumes for one cycle.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInputs {
    pub cooldown_active: bool,
    /// Fused latency forecast, absent when no latency data arrived.
    pub effective_forecast: Option<f64>,
    /// Breach probability, present iff the forecast is.
    pub probability: Option<f64>,
    /// Fit quality of the latency trend, present iff the forecast is.
    pub r2: Option<f64>,
    pub state: RiskState,
    /// A weak-band signal was recorded on the previous cycle.
    pub weak_pending: bool,
    /// Hard latency ceiling (ms) for the early-timeout override.
    pub hard_ceiling: f64,
}

/// Why the engine held off this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldReason {
    Cooldown,
    AutoHealDisabled,
    NoLatencyForecast,
    LowFitQuality { r2: f64, min: f64 },
    NoTrigger { probability: Option<f64>, r2: Option<f64> },
}

/// Outcome of one decision evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerOutcome {
    /// Forecast already near the hard ceiling: act regardless of state.
    EarlyTimeout { probability: f64, effective: f64 },
    /// Probability at or above the strong cutoff while at risk.
    StrongSignal { probability: f64, r2: f64 },
    /// Second consecutive weak-band cycle while at risk.
    WeakConfirmed { probability: f64, r2: f64 },
    /// First weak-band cycle: record intent, do not act.
    WeakPending { probability: f64, r2: f64 },
    /// No action this cycle.
    Hold(HoldReason),
}

impl TriggerOutcome {
    /// Whether this outcome fires the mitigation actuator.
    pub fn should_act(&self) -> bool {
        matches!(
            self,
            TriggerOutcome::EarlyTimeout { .. }
                | TriggerOutcome::StrongSignal { .. }
                | TriggerOutcome::WeakConfirmed { .. }
        )
    }

    /// Whether the weak-confirmation flag should be armed for the
    /// next cycle.
    pub fn arms_weak_pending(&self) -> bool {
        matches!(self, TriggerOutcome::WeakPending { .. })
    }

    /// Rationale string recorded in the cycle log.
    pub fn rationale(&self) -> String {
        match self {
            TriggerOutcome::EarlyTimeout {
                probability,
                effective,
            } => format!("early_timeout {probability:.2} eff={effective:.0}"),
            TriggerOutcome::StrongSignal { probability, r2 } => {
                format!("strong_prob {probability:.2} r2={r2:.2}")
            }
            TriggerOutcome::WeakConfirmed { probability, r2 } => {
                format!("weak_confirmed {probability:.2} r2={r2:.2}")
            }
            TriggerOutcome::WeakPending { probability, r2 } => {
                format!("weak_first {probability:.2} r2={r2:.2}")
            }
            TriggerOutcome::Hold(reason) => match reason {
                HoldReason::Cooldown => "cooldown".to_string(),
                HoldReason::AutoHealDisabled => "auto_heal_disabled".to_string(),
                HoldReason::NoLatencyForecast => "no_latency_entry".to_string(),
                HoldReason::LowFitQuality { r2, min } => {
                    format!("low_r2 {r2:.2} < {min}")
                }
                HoldReason::NoTrigger { probability, r2 } => format!(
                    "no_trigger prob={} r2={}",
                    probability.map_or("na".to_string(), |p| format!("{p:.2}")),
                    r2.map_or("na".to_string(), |r| format!("{r:.2}")),
                ),
            },
        }
    }
}

/// Evaluate the decision table for one cycle.
pub fn decide(cfg: &DecisionConfig, inputs: DecisionInputs) -> TriggerOutcome {
    // Precondition gates, reported in precedence order.
    if inputs.cooldown_active {
        return TriggerOutcome::Hold(HoldReason::Cooldown);
    }
    if !cfg.auto_heal {
        return TriggerOutcome::Hold(HoldReason::AutoHealDisabled);
    }
    let (Some(effective), Some(probability)) = (inputs.effective_forecast, inputs.probability)
    else {
        return TriggerOutcome::Hold(HoldReason::NoLatencyForecast);
    };
    let r2 = inputs.r2.unwrap_or(0.0);
    if r2 < cfg.min_r2 {
        return TriggerOutcome::Hold(HoldReason::LowFitQuality {
            r2,
            min: cfg.min_r2,
        });
    }

    if effective >= cfg.pre_timeout_ratio * inputs.hard_ceiling {
        return TriggerOutcome::EarlyTimeout {
            probability,
            effective,
        };
    }

    let at_risk = inputs.state == RiskState::AtRisk;
    if at_risk && probability >= cfg.prob_strong {
        return TriggerOutcome::StrongSignal { probability, r2 };
    }

    let weak_band = probability >= cfg.prob_confirm_min && probability < cfg.prob_strong;
    if at_risk && weak_band {
        return if inputs.weak_pending {
            TriggerOutcome::WeakConfirmed { probability, r2 }
        } else {
            TriggerOutcome::WeakPending { probability, r2 }
        };
    }

    TriggerOutcome::Hold(HoldReason::NoTrigger {
        probability: Some(probability),
        r2: Some(r2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> DecisionConfig {
        DecisionConfig::default()
    }

    fn inputs(probability: f64, effective: f64, state: RiskState) -> DecisionInputs {
        DecisionInputs {
            cooldown_active: false,
            effective_forecast: Some(effective),
            probability: Some(probability),
            r2: Some(0.9),
            state,
            weak_pending: false,
            hard_ceiling: 5000.0,
        }
    }

    #[test]
    fn cooldown_blocks_everything() {
        let mut i = inputs(0.95, 4900.0, RiskState::AtRisk);
        i.cooldown_active = true;

        let outcome = decide(&cfg(), i);
        assert_eq!(outcome, TriggerOutcome::Hold(HoldReason::Cooldown));
        assert!(!outcome.should_act());
        assert_eq!(outcome.rationale(), "cooldown");
    }

    #[test]
    fn disabled_auto_heal_blocks() {
        let mut config = cfg();
        config.auto_heal = false;

        let outcome = decide(&config, inputs(0.95, 4900.0, RiskState::AtRisk));
        assert_eq!(outcome, TriggerOutcome::Hold(HoldReason::AutoHealDisabled));
    }

    #[test]
    fn missing_latency_forecast_blocks() {
        let mut i = inputs(0.0, 0.0, RiskState::AtRisk);
        i.effective_forecast = None;
        i.probability = None;
        i.r2 = None;

        let outcome = decide(&cfg(), i);
        assert_eq!(outcome, TriggerOutcome::Hold(HoldReason::NoLatencyForecast));
        assert_eq!(outcome.rationale(), "no_latency_entry");
    }

    #[test]
    fn low_fit_quality_blocks() {
        let mut i = inputs(0.95, 4000.0, RiskState::AtRisk);
        i.r2 = Some(0.1);

        let outcome = decide(&cfg(), i);
        assert!(matches!(
            outcome,
            TriggerOutcome::Hold(HoldReason::LowFitQuality { .. })
        ));
        assert_eq!(outcome.rationale(), "low_r2 0.10 < 0.2");
    }

    #[test]
    fn early_timeout_fires_even_when_ok() {
        // 4600 ≥ 0.9 × 5000: waiting for state confirmation risks a
        // real breach.
        let outcome = decide(&cfg(), inputs(0.92, 4600.0, RiskState::Ok));
        assert!(matches!(outcome, TriggerOutcome::EarlyTimeout { .. }));
        assert!(outcome.should_act());
    }

    #[test]
    fn early_timeout_outranks_strong() {
        let outcome = decide(&cfg(), inputs(0.99, 4900.0, RiskState::AtRisk));
        assert!(matches!(outcome, TriggerOutcome::EarlyTimeout { .. }));
    }

    #[test]
    fn strong_signal_requires_at_risk() {
        let strong = decide(&cfg(), inputs(0.68, 3500.0, RiskState::AtRisk));
        assert!(matches!(strong, TriggerOutcome::StrongSignal { .. }));
        assert_eq!(strong.rationale(), "strong_prob 0.68 r2=0.90");

        let held = decide(&cfg(), inputs(0.68, 3500.0, RiskState::Ok));
        assert!(matches!(held, TriggerOutcome::Hold(HoldReason::NoTrigger { .. })));
    }

    #[test]
    fn single_weak_cycle_never_acts() {
        let outcome = decide(&cfg(), inputs(0.4, 2200.0, RiskState::AtRisk));
        assert!(matches!(outcome, TriggerOutcome::WeakPending { .. }));
        assert!(!outcome.should_act());
        assert!(outcome.arms_weak_pending());
    }

    #[test]
    fn second_weak_cycle_confirms() {
        let mut i = inputs(0.4, 2200.0, RiskState::AtRisk);
        i.weak_pending = true;

        let outcome = decide(&cfg(), i);
        assert!(matches!(outcome, TriggerOutcome::WeakConfirmed { .. }));
        assert!(outcome.should_act());
    }

    #[test]
    fn weak_band_ignored_when_ok() {
        let outcome = decide(&cfg(), inputs(0.4, 2200.0, RiskState::Ok));
        assert!(matches!(outcome, TriggerOutcome::Hold(HoldReason::NoTrigger { .. })));
        assert!(!outcome.arms_weak_pending());
    }

    #[test]
    fn below_weak_band_is_no_trigger() {
        let outcome = decide(&cfg(), inputs(0.1, 800.0, RiskState::AtRisk));
        assert_eq!(
            outcome,
            TriggerOutcome::Hold(HoldReason::NoTrigger {
                probability: Some(0.1),
                r2: Some(0.9),
            })
        );
        assert_eq!(outcome.rationale(), "no_trigger prob=0.10 r2=0.90");
    }

    #[test]
    fn band_edges() {
        // Exactly at the strong cutoff → strong.
        let strong = decide(&cfg(), inputs(0.6, 3100.0, RiskState::AtRisk));
        assert!(matches!(strong, TriggerOutcome::StrongSignal { .. }));

        // Exactly at the confirm floor → weak band.
        let weak = decide(&cfg(), inputs(0.3, 1700.0, RiskState::AtRisk));
        assert!(matches!(weak, TriggerOutcome::WeakPending { .. }));
    }
}
