//! foresight-actuator — the side-effecting calls of the control loop.
//!
//! Three downstream systems, all best-effort with short timeouts:
//!
//! - the remediation endpoint of the protected service (the one call
//!   that actually relieves load),
//! - a chat webhook for critical alerts,
//! - dashboard annotations overlaying mitigation decisions.
//!
//! Failures are swallowed and logged; the loop must never crash from
//! a downstream outage. Cooldown bookkeeping is *not* done here — the
//! state machine records the mitigation when the decision fires,
//! regardless of whether the HTTP call succeeded, which is what makes
//! a repeated call indistinguishable from a single one as far as the
//! loop's own state is concerned.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::json;
use tracing::{debug, warn};

/// Header carrying the admin token on remediation calls.
const ADMIN_TOKEN_HEADER: &str = "x-admin-token";
/// Marker distinguishing automated from manual invocation.
const AUTOMATED_HEADER: &str = "x-predictive-automated";

/// The actuation seam the monitor is generic over.
pub trait Actuator: Send + Sync {
    /// Best-effort remediation call. `false` on any failure.
    fn mitigate(&self) -> impl Future<Output = bool> + Send;

    /// Fire-and-forget alert notification.
    fn notify(&self, message: &str) -> impl Future<Output = ()> + Send;

    /// Fire-and-forget dashboard annotation.
    fn annotate(&self, text: &str, tags: &[&str]) -> impl Future<Output = ()> + Send;
}

/// Endpoint addresses and credentials for the real actuator.
#[derive(Debug, Clone, Default)]
pub struct ActuatorConfig {
    /// Base URL of the protected service (remediation lives under
    /// `/admin/mitigate`).
    pub target_base_url: String,
    pub admin_token: String,
    /// Alert webhook; notifications are skipped when unset.
    pub webhook_url: Option<String>,
    /// Grafana base URL; annotations are skipped when unset.
    pub grafana_base_url: Option<String>,
    pub grafana_api_token: Option<String>,
    pub grafana_user: Option<String>,
    pub grafana_password: Option<String>,
}

/// Production actuator talking HTTP to all three systems.
pub struct HttpActuator {
    cfg: ActuatorConfig,
    http: reqwest::Client,
}

impl HttpActuator {
    pub fn new(cfg: ActuatorConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { cfg, http })
    }
}

impl Actuator for HttpActuator {
    async fn mitigate(&self) -> bool {
        let url = format!(
            "{}/admin/mitigate",
            self.cfg.target_base_url.trim_end_matches('/')
        );
        match self
            .http
            .post(&url)
            .header(ADMIN_TOKEN_HEADER, &self.cfg.admin_token)
            .header(AUTOMATED_HEADER, "1")
            .send()
            .await
        {
            Ok(resp) => {
                debug!(status = %resp.status(), "remediation endpoint called");
                true
            }
            Err(e) => {
                warn!(error = %e, "remediation call failed");
                false
            }
        }
    }

    async fn notify(&self, message: &str) {
        let Some(url) = &self.cfg.webhook_url else {
            return;
        };
        let payload = json!({
            "alerts": [{
                "annotations": { "summary": message, "description": message },
                "labels": { "severity": "critical" }
            }]
        });
        if let Err(e) = self.http.post(url).json(&payload).send().await {
            debug!(error = %e, "alert notification failed");
        }
    }

    async fn annotate(&self, text: &str, tags: &[&str]) {
        let Some(base) = &self.cfg.grafana_base_url else {
            return;
        };
        let url = format!("{}/api/annotations", base.trim_end_matches('/'));
        let payload = json!({
            "time": epoch_millis(),
            "tags": tags,
            "text": text,
        });

        let mut req = self.http.post(&url).json(&payload);
        if let Some(token) = &self.cfg.grafana_api_token {
            req = req.bearer_auth(token);
        } else if let (Some(user), Some(password)) =
            (&self.cfg.grafana_user, &self.cfg.grafana_password)
        {
            req = req.basic_auth(user, Some(password));
        }

        if let Err(e) = req.send().await {
            debug!(error = %e, "dashboard annotation failed");
        }
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
