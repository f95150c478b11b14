//! Atomic counters and gauges published by the cycle worker.
//!
//! The single cycle worker is the only writer; the metrics listener
//! only loads. f64 gauges are stored as bit patterns in `AtomicU64`
//! so both sides stay lock-free.

use std::sync::atomic::{AtomicU64, Ordering};

/// Sentinel for "never mitigated" in the since-last gauge.
const UNSET: u64 = u64::MAX;

/// Cumulative counters and last-published gauges for the loop.
#[derive(Debug, Default)]
pub struct LoopMetrics {
    cycles_total: AtomicU64,
    mitigations_total: AtomicU64,
    risk_cycles_total: AtomicU64,
    ok_cycles_total: AtomicU64,

    forecast_p95_ms: AtomicU64,
    probability: AtomicU64,
    r2: AtomicU64,
    cooldown_active: AtomicU64,
    in_risk_state: AtomicU64,
    since_last_mitigation: AtomicU64,
}

/// Point-in-time copy of every published value, for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot {
    pub cycles_total: u64,
    pub mitigations_total: u64,
    pub risk_cycles_total: u64,
    pub ok_cycles_total: u64,
    pub forecast_p95_ms: f64,
    pub probability: f64,
    pub r2: f64,
    pub cooldown_active: bool,
    pub in_risk_state: bool,
    pub since_last_mitigation_secs: Option<u64>,
}

impl LoopMetrics {
    pub fn new() -> Self {
        let m = Self::default();
        m.since_last_mitigation.store(UNSET, Ordering::Relaxed);
        m
    }

    pub fn inc_cycles(&self) {
        self.cycles_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_mitigations(&self) {
        self.mitigations_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_risk_cycles(&self) {
        self.risk_cycles_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ok_cycles(&self) {
        self.ok_cycles_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_forecast(&self, value: f64) {
        self.forecast_p95_ms.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn set_probability(&self, value: f64) {
        self.probability.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn set_r2(&self, value: f64) {
        self.r2.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn set_cooldown_active(&self, active: bool) {
        self.cooldown_active.store(active as u64, Ordering::Relaxed);
    }

    pub fn set_in_risk_state(&self, at_risk: bool) {
        self.in_risk_state.store(at_risk as u64, Ordering::Relaxed);
    }

    pub fn set_since_last_mitigation(&self, secs: Option<u64>) {
        self.since_last_mitigation
            .store(secs.unwrap_or(UNSET), Ordering::Relaxed);
    }

    /// Read every published value. Safe to call from the scrape path
    /// while a cycle is running.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let since = self.since_last_mitigation.load(Ordering::Relaxed);
        MetricsSnapshot {
            cycles_total: self.cycles_total.load(Ordering::Relaxed),
            mitigations_total: self.mitigations_total.load(Ordering::Relaxed),
            risk_cycles_total: self.risk_cycles_total.load(Ordering::Relaxed),
            ok_cycles_total: self.ok_cycles_total.load(Ordering::Relaxed),
            forecast_p95_ms: f64::from_bits(self.forecast_p95_ms.load(Ordering::Relaxed)),
            probability: f64::from_bits(self.probability.load(Ordering::Relaxed)),
            r2: f64::from_bits(self.r2.load(Ordering::Relaxed)),
            cooldown_active: self.cooldown_active.load(Ordering::Relaxed) != 0,
            in_risk_state: self.in_risk_state.load(Ordering::Relaxed) != 0,
            since_last_mitigation_secs: if since == UNSET { None } else { Some(since) },
        }
    }
}
