//! Prometheus text exposition format.

use crate::registry::MetricsSnapshot;

/// Render a metrics snapshot into the Prometheus text format.
///
/// `version` labels the build-info gauge so a scrape can confirm
/// which build of the loop is running.
pub fn render_prometheus(snap: &MetricsSnapshot, version: &str) -> String {
    let mut out = String::new();

    out.push_str("# HELP foresight_cycles_total Prediction cycles executed.\n");
    out.push_str("# TYPE foresight_cycles_total counter\n");
    out.push_str(&format!("foresight_cycles_total {}\n", snap.cycles_total));

    out.push_str("# HELP foresight_mitigations_total Automatic mitigations triggered.\n");
    out.push_str("# TYPE foresight_mitigations_total counter\n");
    out.push_str(&format!(
        "foresight_mitigations_total {}\n",
        snap.mitigations_total
    ));

    out.push_str("# HELP foresight_risk_cycles_total Cycles spent in the at-risk state.\n");
    out.push_str("# TYPE foresight_risk_cycles_total counter\n");
    out.push_str(&format!(
        "foresight_risk_cycles_total {}\n",
        snap.risk_cycles_total
    ));

    out.push_str("# HELP foresight_ok_cycles_total Cycles spent in the OK state.\n");
    out.push_str("# TYPE foresight_ok_cycles_total counter\n");
    out.push_str(&format!("foresight_ok_cycles_total {}\n", snap.ok_cycles_total));

    out.push_str("# HELP foresight_forecast_p95_ms Latest effective p95 latency forecast (ms).\n");
    out.push_str("# TYPE foresight_forecast_p95_ms gauge\n");
    out.push_str(&format!(
        "foresight_forecast_p95_ms {:.2}\n",
        snap.forecast_p95_ms
    ));

    out.push_str("# HELP foresight_probability Breach probability (0-1).\n");
    out.push_str("# TYPE foresight_probability gauge\n");
    out.push_str(&format!("foresight_probability {:.4}\n", snap.probability));

    out.push_str("# HELP foresight_r2 Fit quality of the latency trend.\n");
    out.push_str("# TYPE foresight_r2 gauge\n");
    out.push_str(&format!("foresight_r2 {:.4}\n", snap.r2));

    out.push_str("# HELP foresight_cooldown_active Cooldown active (1=yes, 0=no).\n");
    out.push_str("# TYPE foresight_cooldown_active gauge\n");
    out.push_str(&format!(
        "foresight_cooldown_active {}\n",
        snap.cooldown_active as u8
    ));

    out.push_str("# HELP foresight_in_risk_state Current risk state (1=at risk, 0=ok).\n");
    out.push_str("# TYPE foresight_in_risk_state gauge\n");
    out.push_str(&format!(
        "foresight_in_risk_state {}\n",
        snap.in_risk_state as u8
    ));

    out.push_str(
        "# HELP foresight_since_last_mitigation_seconds Seconds since the last mitigation.\n",
    );
    out.push_str("# TYPE foresight_since_last_mitigation_seconds gauge\n");
    if let Some(secs) = snap.since_last_mitigation_secs {
        out.push_str(&format!("foresight_since_last_mitigation_seconds {secs}\n"));
    }

    out.push_str("# HELP foresight_build_info Build info of the foresight monitor.\n");
    out.push_str("# TYPE foresight_build_info gauge\n");
    out.push_str(&format!("foresight_build_info{{version=\"{version}\"}} 1\n"));

    out
}
