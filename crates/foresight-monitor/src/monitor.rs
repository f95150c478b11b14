//! The cycle scheduler.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use foresight_actuator::Actuator;
use foresight_core::{CycleRecord, MonitorConfig};
use foresight_metrics::LoopMetrics;
use foresight_risk::RiskStateMachine;
use foresight_telemetry::Telemetry;

use crate::cycle::run_cycle;
use crate::journal::Journal;

/// Owns the state machine and drives one cycle per interval until
/// shutdown. Cycles run back to back on the same task, so state-machine
/// steps never overlap.
pub struct Monitor<T: Telemetry, A: Actuator> {
    cfg: MonitorConfig,
    interval: Duration,
    telemetry: T,
    actuator: A,
    machine: RiskStateMachine,
    metrics: Arc<LoopMetrics>,
    journal: Option<Journal>,
}

impl<T: Telemetry, A: Actuator> Monitor<T, A> {
    pub fn new(
        cfg: MonitorConfig,
        interval: Duration,
        telemetry: T,
        actuator: A,
        metrics: Arc<LoopMetrics>,
    ) -> Self {
        let machine = RiskStateMachine::new(&cfg.slo, &cfg.recovery);
        Self {
            cfg,
            interval,
            telemetry,
            actuator,
            machine,
            metrics,
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Execute one cycle now and publish its record.
    pub async fn tick(&mut self) -> CycleRecord {
        let record = run_cycle(
            &self.cfg,
            &self.telemetry,
            &self.actuator,
            &mut self.machine,
            &self.metrics,
            Instant::now(),
        )
        .await;
        self.publish(&record);
        record
    }

    fn publish(&self, record: &CycleRecord) {
        match serde_json::to_string(record) {
            Ok(line) => info!(target: "foresight_monitor::cycle", "{line}"),
            Err(e) => warn!(error = %e, "cycle record serialization failed"),
        }
        if let Some(journal) = &self.journal {
            journal.append(record);
        }
    }

    /// Run the monitor loop.
    pub async fn run(mut self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "predictive monitor started"
        );

        // First cycle fires right away; the interval sleep only gates
        // the cycles after it.
        self.tick().await;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.tick().await;
                }
                _ = shutdown.changed() => {
                    info!("predictive monitor shutting down");
                    break;
                }
            }
        }
    }
}
