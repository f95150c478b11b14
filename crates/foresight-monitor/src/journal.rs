//! Append-only JSONL journal of cycle records.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::warn;

use foresight_core::CycleRecord;

/// One JSON object per line, appended after every cycle. Writes are
/// best-effort: a full disk must not stop the loop.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, record: &CycleRecord) {
        if let Err(e) = self.try_append(record) {
            warn!(error = %e, path = %self.path.display(), "journal append failed");
        }
    }

    fn try_append(&self, record: &CycleRecord) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foresight_core::RiskState;

    fn record(decision: &str) -> CycleRecord {
        CycleRecord {
            ts: "2026-01-01T00:00:00Z".to_string(),
            predictions: Vec::new(),
            breach_any: false,
            effective_forecast_ms: Some(250.0),
            probability: Some(0.0),
            r2: Some(0.99),
            decision: decision.to_string(),
            state: RiskState::Ok,
            action_taken: None,
            reason: None,
            fast_p95_ms: None,
            fast_ok_streak: 0,
            cooldown_active: false,
            since_last_mitigation_secs: None,
            mitigation_event: None,
        }
    }

    #[test]
    fn appends_one_json_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cycles.jsonl");
        let journal = Journal::new(&path);

        journal.append(&record("no_trigger prob=0.00 r2=0.99"));
        journal.append(&record("cooldown"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed["decision"], "cooldown");
        assert_eq!(parsed["state"], "ok");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal/deep/cycles.jsonl");
        let journal = Journal::new(&path);

        journal.append(&record("no_trigger prob=0.00 r2=0.99"));
        assert!(path.exists());
    }

    #[test]
    fn unwritable_path_does_not_panic() {
        let journal = Journal::new("/proc/definitely/not/writable.jsonl");
        journal.append(&record("cooldown"));
    }
}
