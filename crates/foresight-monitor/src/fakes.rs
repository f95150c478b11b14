//! In-memory collaborators for cycle and scheduler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::bail;

use foresight_actuator::Actuator;
use foresight_telemetry::Telemetry;

#[derive(Debug, Default)]
struct TelemetryInner {
    ranges: HashMap<String, Vec<f64>>,
    instants: HashMap<String, Option<f64>>,
    fail_ranges: bool,
}

/// Canned query results, mutable between cycles through shared handles.
#[derive(Debug, Clone, Default)]
pub struct FakeTelemetry {
    inner: Arc<Mutex<TelemetryInner>>,
}

impl FakeTelemetry {
    pub fn set_range(&self, expr: &str, series: Vec<f64>) {
        self.inner
            .lock()
            .unwrap()
            .ranges
            .insert(expr.to_string(), series);
    }

    pub fn set_instant(&self, expr: &str, value: Option<f64>) {
        self.inner
            .lock()
            .unwrap()
            .instants
            .insert(expr.to_string(), value);
    }

    pub fn fail_ranges(&self, fail: bool) {
        self.inner.lock().unwrap().fail_ranges = fail;
    }
}

impl Telemetry for FakeTelemetry {
    async fn query_range(&self, expr: &str, _window_minutes: u64) -> anyhow::Result<Vec<f64>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_ranges {
            bail!("metrics store unreachable");
        }
        Ok(inner.ranges.get(expr).cloned().unwrap_or_default())
    }

    async fn query_instant(&self, expr: &str) -> Option<f64> {
        self.inner
            .lock()
            .unwrap()
            .instants
            .get(expr)
            .copied()
            .flatten()
    }
}

#[derive(Debug)]
struct ActuatorInner {
    /// Result returned for each mitigation call, in order.
    mitigations: Vec<bool>,
    notifications: Vec<String>,
    annotations: Vec<(String, Vec<String>)>,
    mitigation_result: bool,
}

impl Default for ActuatorInner {
    fn default() -> Self {
        Self {
            mitigations: Vec::new(),
            notifications: Vec::new(),
            annotations: Vec::new(),
            mitigation_result: true,
        }
    }
}

/// Records every actuation call; mitigation outcome is configurable.
#[derive(Debug, Clone, Default)]
pub struct FakeActuator {
    inner: Arc<Mutex<ActuatorInner>>,
}

impl FakeActuator {
    pub fn set_mitigation_result(&self, delivered: bool) {
        self.inner.lock().unwrap().mitigation_result = delivered;
    }

    pub fn mitigations(&self) -> Vec<bool> {
        self.inner.lock().unwrap().mitigations.clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.inner.lock().unwrap().notifications.clone()
    }

    pub fn annotations(&self) -> Vec<(String, Vec<String>)> {
        self.inner.lock().unwrap().annotations.clone()
    }
}

impl Actuator for FakeActuator {
    async fn mitigate(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let delivered = inner.mitigation_result;
        inner.mitigations.push(delivered);
        delivered
    }

    async fn notify(&self, message: &str) {
        self.inner
            .lock()
            .unwrap()
            .notifications
            .push(message.to_string());
    }

    async fn annotate(&self, text: &str, tags: &[&str]) {
        self.inner.lock().unwrap().annotations.push((
            text.to_string(),
            tags.iter().map(|t| t.to_string()).collect(),
        ));
    }
}
