//! foresightd — the predictive self-healing monitor daemon.
//!
//! Single binary that assembles the control loop:
//! - Telemetry client (Prometheus HTTP API)
//! - Cycle worker (forecast, risk, decision, actuation)
//! - Metrics exposition endpoint
//!
//! # Usage
//!
//! ```text
//! foresightd --prom-url http://prometheus:9090 \
//!            --target-base http://app:8000 \
//!            --admin-token $ADMIN_TOKEN
//! ```
//!
//! Every flag falls back to an environment variable, so a bare
//! `foresightd` works in the composed deployment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use foresight_actuator::{ActuatorConfig, HttpActuator};
use foresight_core::MonitorConfig;
use foresight_metrics::{LoopMetrics, metrics_router};
use foresight_monitor::{Journal, Monitor};
use foresight_telemetry::PromClient;

#[derive(Parser, Debug)]
#[command(name = "foresightd", about = "Predictive self-healing monitor")]
struct Cli {
    /// Base URL of the Prometheus-compatible metrics store.
    #[arg(long, env = "PROM_URL", default_value = "http://prometheus:9090")]
    prom_url: String,

    /// Base URL of the protected service (remediation lives under
    /// /admin/mitigate).
    #[arg(long, env = "TARGET_SERVICE_BASE", default_value = "http://app:8000")]
    target_base: String,

    /// Admin token sent with remediation calls.
    #[arg(long, env = "ADMIN_TOKEN", default_value = "")]
    admin_token: String,

    /// Alertmanager-compatible webhook for critical notifications.
    #[arg(long, env = "ALERT_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Grafana base URL, used for annotations and dashboard links.
    #[arg(long, env = "GRAFANA_BASE_URL")]
    grafana_url: Option<String>,

    /// Grafana service-account token for the annotations API.
    #[arg(long, env = "GRAFANA_API_TOKEN")]
    grafana_api_token: Option<String>,

    /// Grafana basic-auth user, used when no API token is set.
    #[arg(long, env = "GRAFANA_USER")]
    grafana_user: Option<String>,

    #[arg(long, env = "GRAFANA_PASSWORD")]
    grafana_password: Option<String>,

    /// Dashboard UID linked from mitigation notifications.
    #[arg(long, env = "DASHBOARD_UID", default_value = "predictive-selfheal")]
    dashboard_uid: String,

    /// Soft p95 latency threshold in milliseconds.
    #[arg(long, env = "SLO_P95_MS", default_value = "300")]
    slo_p95_ms: f64,

    /// Hard p95 ceiling in milliseconds (the real request timeout).
    #[arg(long, env = "HARD_P95_MS", default_value = "5000")]
    hard_p95_ms: f64,

    /// Hysteresis exit ratio: leave at-risk below soft × this.
    #[arg(long, env = "SLO_EXIT_RATIO", default_value = "0.9")]
    exit_ratio: f64,

    /// Error-rate ceiling as a fraction.
    #[arg(long, env = "SLO_ERROR_RATE", default_value = "0.02")]
    slo_error_rate: f64,

    /// Resident-memory ceiling in bytes.
    #[arg(long, env = "SLO_MEMORY_BYTES", default_value = "300000000")]
    slo_memory_bytes: f64,

    /// Long rate() window for the primary trend series.
    #[arg(long, env = "TREND_WINDOW_LONG", default_value = "5m")]
    long_window: String,

    /// Short rate() window for the reactive secondary trend.
    #[arg(long, env = "TREND_WINDOW_SHORT", default_value = "2m")]
    short_window: String,

    /// Fast rate() window for instant recovery detection.
    #[arg(long, env = "TREND_WINDOW_FAST", default_value = "30s")]
    fast_window: String,

    /// Range-query lookback in minutes.
    #[arg(long, env = "LOOKBACK_MINUTES", default_value = "10")]
    lookback: u64,

    /// Range-query sample step in seconds.
    #[arg(long, env = "QUERY_STEP_SEC", default_value = "30")]
    step: u64,

    /// Cycle interval in seconds.
    #[arg(long, env = "CHECK_INTERVAL_SEC", default_value = "30")]
    interval: u64,

    /// Forecast horizon in seconds.
    #[arg(long, env = "PREDICTION_WINDOW_SEC", default_value = "180")]
    horizon: u64,

    /// Probability at or above which a single at-risk cycle triggers.
    #[arg(long, env = "PROB_STRONG", default_value = "0.6")]
    prob_strong: f64,

    /// Lower bound of the weak band needing two-cycle confirmation.
    #[arg(long, env = "PROB_CONFIRM_MIN", default_value = "0.3")]
    prob_confirm_min: f64,

    /// Minimum trend fit quality before any action.
    #[arg(long, env = "MIN_R2", default_value = "0.2")]
    min_r2: f64,

    /// Act immediately once the forecast reaches this fraction of the
    /// hard ceiling.
    #[arg(long, env = "PRE_TIMEOUT_RATIO", default_value = "0.9")]
    pre_timeout_ratio: f64,

    /// Cooldown after a mitigation in seconds.
    #[arg(long, env = "MITIGATION_COOLDOWN_SEC", default_value = "600")]
    cooldown: u64,

    /// Cycles forced to OK right after a mitigation.
    #[arg(long, env = "GRACE_CYCLES", default_value = "3")]
    grace_cycles: u32,

    /// Entry-threshold multiplier while cooldown is active.
    #[arg(long, env = "REENTER_RATIO", default_value = "1.2")]
    reenter_ratio: f64,

    /// Consecutive clean fast samples that exit at-risk early.
    #[arg(long, env = "FAST_EXIT_CYCLES", default_value = "2")]
    fast_exit_cycles: u32,

    /// Seconds after a mitigation during which the fast sample blends
    /// into the effective forecast.
    #[arg(long, env = "BLEND_WINDOW_SEC", default_value = "120")]
    blend: u64,

    /// Master switch for autonomous mitigation.
    #[arg(
        long,
        env = "AUTO_HEAL_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    auto_heal: bool,

    /// Port the Prometheus exposition endpoint listens on.
    #[arg(long, env = "MONITOR_METRICS_PORT", default_value = "9105")]
    metrics_port: u16,

    /// Optional JSONL journal of cycle records.
    #[arg(long, env = "CYCLE_JOURNAL_PATH")]
    journal: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    log_json: bool,
}

impl Cli {
    fn monitor_config(&self) -> MonitorConfig {
        let mut cfg = MonitorConfig::default();
        cfg.slo.p95_soft_ms = self.slo_p95_ms;
        cfg.slo.p95_hard_ms = self.hard_p95_ms;
        cfg.slo.exit_ratio = self.exit_ratio;
        cfg.slo.error_rate = self.slo_error_rate;
        cfg.slo.memory_bytes = self.slo_memory_bytes;
        cfg.windows.long_trend = self.long_window.clone();
        cfg.windows.short_trend = self.short_window.clone();
        cfg.windows.fast = self.fast_window.clone();
        cfg.windows.lookback_minutes = self.lookback;
        cfg.windows.horizon_secs = self.horizon;
        cfg.windows.step_secs = self.step;
        cfg.decision.auto_heal = self.auto_heal;
        cfg.decision.prob_strong = self.prob_strong;
        cfg.decision.prob_confirm_min = self.prob_confirm_min;
        cfg.decision.min_r2 = self.min_r2;
        cfg.decision.pre_timeout_ratio = self.pre_timeout_ratio;
        cfg.recovery.cooldown_secs = self.cooldown;
        cfg.recovery.grace_cycles = self.grace_cycles;
        cfg.recovery.reenter_ratio = self.reenter_ratio;
        cfg.recovery.fast_exit_cycles = self.fast_exit_cycles;
        cfg.recovery.blend_secs = self.blend;
        cfg.grafana_base_url = self.grafana_url.clone().unwrap_or_default();
        cfg.dashboard_uid = self.dashboard_uid.clone();
        cfg
    }

    fn actuator_config(&self) -> ActuatorConfig {
        ActuatorConfig {
            target_base_url: self.target_base.clone(),
            admin_token: self.admin_token.clone(),
            webhook_url: self.webhook_url.clone(),
            grafana_base_url: self.grafana_url.clone(),
            grafana_api_token: self.grafana_api_token.clone(),
            grafana_user: self.grafana_user.clone(),
            grafana_password: self.grafana_password.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    run(cli).await
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,foresightd=debug,foresight=debug".parse().unwrap());
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("predictive monitor daemon starting");

    let cfg = cli.monitor_config();
    let interval = Duration::from_secs(cli.interval);

    let telemetry = PromClient::new(&cli.prom_url, cfg.windows.step_secs)?;
    info!(prom_url = %cli.prom_url, "telemetry client initialized");

    let actuator = HttpActuator::new(cli.actuator_config())?;
    info!(target = %cli.target_base, auto_heal = cli.auto_heal, "actuator initialized");

    let metrics = Arc::new(LoopMetrics::new());

    let mut monitor = Monitor::new(cfg, interval, telemetry, actuator, Arc::clone(&metrics));
    if let Some(path) = &cli.journal {
        monitor = monitor.with_journal(Journal::new(path));
        info!(path = %path.display(), "cycle journal enabled");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_handle = tokio::spawn(monitor.run(shutdown_rx));

    let router = metrics_router(metrics);
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.metrics_port));
    info!(%addr, "metrics endpoint starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    let _ = monitor_handle.await;

    info!("predictive monitor daemon stopped");
    Ok(())
}
