//! One control-loop cycle.

use std::time::Instant;

use tracing::{info, warn};

use foresight_actuator::Actuator;
use foresight_core::{CycleRecord, MetricForecast, MonitorConfig, RiskState, WindowConfig};
use foresight_decision::{DecisionInputs, decide};
use foresight_metrics::LoopMetrics;
use foresight_risk::{RiskStateMachine, StepNote, Thresholds, breach_probability, effective_forecast};
use foresight_telemetry::{Telemetry, queries};

/// Execute one full cycle: query, fit, fuse, score, step the state
/// machine, decide, and (maybe) act. Returns the immutable record of
/// what happened.
///
/// `now` is the monotonic instant of this cycle; the scheduler passes
/// `Instant::now()`, tests pass crafted values to move through
/// cooldown and blend windows without sleeping.
pub async fn run_cycle<T: Telemetry, A: Actuator>(
    cfg: &MonitorConfig,
    telemetry: &T,
    actuator: &A,
    machine: &mut RiskStateMachine,
    metrics: &LoopMetrics,
    now: Instant,
) -> CycleRecord {
    let windows = &cfg.windows;
    let long_expr = queries::latency_p95(&windows.long_trend);
    let short_expr = queries::latency_p95(&windows.short_trend);
    let fast_expr = queries::latency_p95(&windows.fast);

    let p95_series = fetch_series(telemetry, &long_expr, windows.lookback_minutes).await;
    let err_series = fetch_series(telemetry, &queries::error_rate(), windows.lookback_minutes).await;
    let mem_series =
        fetch_series(telemetry, &queries::resident_memory(), windows.lookback_minutes).await;

    let mut predictions = Vec::new();
    evaluate_metric(&mut predictions, "latency_p95_ms", &p95_series, cfg.slo.p95_soft_ms, "ms", windows);
    evaluate_metric(&mut predictions, "error_rate", &err_series, cfg.slo.error_rate, "", windows);
    evaluate_metric(&mut predictions, "memory_bytes", &mem_series, cfg.slo.memory_bytes, "bytes", windows);
    let breach_any = predictions.iter().any(|p| p.breach_predicted);

    let latency = predictions
        .iter()
        .find(|p| p.metric == "latency_p95_ms")
        .cloned();

    // The fast sample feeds both the post-mitigation blend and the
    // recovery streak.
    let fast_observed = telemetry.query_instant(&fast_expr).await;

    let (effective, probability, r2) = match &latency {
        Some(lat) => {
            let short_series =
                fetch_series(telemetry, &short_expr, windows.lookback_minutes).await;
            let short_forecast =
                foresight_forecast::fit(&short_series, windows.horizon_secs, windows.step_secs)
                    .map(|f| f.forecast);

            let eff = effective_forecast(
                lat.forecast,
                short_forecast,
                fast_observed,
                machine.in_blend_window(now),
            );
            let prob = breach_probability(
                eff,
                Thresholds {
                    soft: cfg.slo.p95_soft_ms,
                    hard: cfg.slo.p95_hard_ms,
                },
            );
            (Some(eff), Some(prob), Some(lat.r2))
        }
        None => (None, None, None),
    };

    let cooldown_active = machine.cooldown_active(now);
    metrics.set_cooldown_active(cooldown_active);
    if let Some(eff) = effective {
        metrics.set_forecast(eff);
    }
    if let Some(p) = probability {
        metrics.set_probability(p);
    }
    if let Some(r) = r2 {
        metrics.set_r2(r);
    }

    let note = machine.step(effective, fast_observed, now);
    match machine.state() {
        RiskState::AtRisk => {
            metrics.set_in_risk_state(true);
            metrics.inc_risk_cycles();
        }
        RiskState::Ok => {
            metrics.set_in_risk_state(false);
            metrics.inc_ok_cycles();
        }
    }

    let outcome = decide(
        &cfg.decision,
        DecisionInputs {
            cooldown_active,
            effective_forecast: effective,
            probability,
            r2,
            state: machine.state(),
            weak_pending: machine.weak_pending(),
            hard_ceiling: cfg.slo.p95_hard_ms,
        },
    );
    let mut decision = outcome.rationale();
    if note == StepNote::Exited {
        decision.push_str(" fast_exit");
    }

    let mut action_taken = None;
    let mut reason = None;
    let mut mitigation_event = None;

    if outcome.should_act()
        && let Some(lat) = &latency
    {
        let eff = effective.unwrap_or(lat.forecast);
        let prob = probability.unwrap_or(0.0);
        let mitigation_reason = format!(
            "Mitigating: p95_raw={:.0}ms eff={:.0}ms (prob={:.2}) decision={} slo={:.0} timeout={:.0}",
            lat.forecast, eff, prob, decision, cfg.slo.p95_soft_ms, cfg.slo.p95_hard_ms
        );
        let message = format!(
            "PREDICTIVE: {mitigation_reason} | Dash: {}",
            cfg.dashboard_link()
        );

        // Notification and annotation are independent of the
        // remediation call's success; all three are best-effort.
        actuator.notify(&message).await;
        actuator.annotate(&message, &["predictive", "mitigation_decision"]).await;
        let delivered = actuator.mitigate().await;

        // Cooldown and grace key off the decision to act, not the HTTP
        // result: a repeat call changes nothing the loop can observe.
        machine.record_mitigation(now);
        metrics.inc_mitigations();
        info!(
            forecast = lat.forecast,
            effective = eff,
            probability = prob,
            delivered,
            decision = %decision,
            "mitigation executed"
        );

        action_taken = Some("mitigation_called".to_string());
        reason = Some(mitigation_reason);
        mitigation_event = Some("mitigation executed".to_string());
    } else {
        machine.set_weak_pending(outcome.arms_weak_pending());
    }

    let since_last = machine.seconds_since_mitigation(now);
    metrics.set_since_last_mitigation(since_last);
    metrics.inc_cycles();

    CycleRecord {
        ts: chrono::Utc::now().to_rfc3339(),
        predictions,
        breach_any,
        effective_forecast_ms: effective,
        probability,
        r2,
        decision,
        state: machine.state(),
        action_taken,
        reason,
        fast_p95_ms: fast_observed,
        fast_ok_streak: machine.fast_ok_streak(),
        cooldown_active,
        since_last_mitigation_secs: since_last,
        mitigation_event,
    }
}

/// Range-query a series, degrading to empty on transport failure. The
/// next tick is a fresh attempt, so there is nothing to retry here.
async fn fetch_series<T: Telemetry>(telemetry: &T, expr: &str, minutes: u64) -> Vec<f64> {
    match telemetry.query_range(expr, minutes).await {
        Ok(series) => series,
        Err(e) => {
            warn!(error = %e, expr, "range query failed; series treated as empty");
            Vec::new()
        }
    }
}

/// Fit one metric's series and append its forecast entry. Empty series
/// are skipped entirely (insufficient data is not an error).
fn evaluate_metric(
    out: &mut Vec<MetricForecast>,
    name: &str,
    series: &[f64],
    threshold: f64,
    unit: &str,
    windows: &WindowConfig,
) {
    let Some(&current) = series.last() else {
        return;
    };
    let Some(fit) = foresight_forecast::fit(series, windows.horizon_secs, windows.step_secs)
    else {
        return;
    };
    out.push(MetricForecast {
        metric: name.to_string(),
        current,
        forecast: fit.forecast,
        threshold,
        unit: unit.to_string(),
        slope_per_sec: fit.slope_per_sec,
        breach_predicted: fit.forecast > threshold,
        r2: fit.r2,
    });
}
