// src/telemetry.rs
//
// Optional JSONL audit trail of thinning decisions.
//
// The gate's draws are reproducible, so an offline audit can re-derive every
// decision from the records written here. Controlled entirely via
// environment variables; off by default. Write failures disable the sink for
// the rest of the process instead of propagating into the event path.
//
// Environment variables:
// - `RANKLOG_TELEMETRY_MODE`:   "jsonl" enables the sink; anything else is off.
// - `RANKLOG_TELEMETRY_PATH`:   target file, required when mode is "jsonl".
// - `RANKLOG_TELEMETRY_APPEND`: "1"/"true"/"yes" appends instead of truncating.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde_json::{json, Value as JsonValue};

use crate::sampling::GateDecision;

/// Audit record schema version.
pub const AUDIT_SCHEMA_VERSION: i64 = 1;

/// Sink mode, controlled by RANKLOG_TELEMETRY_MODE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryMode {
    Off,
    Jsonl,
}

impl TelemetryMode {
    /// Parse mode from the environment. Defaults to Off; unknown values are
    /// treated as Off.
    pub fn from_env() -> Self {
        match env::var("RANKLOG_TELEMETRY_MODE") {
            Ok(s) if s.eq_ignore_ascii_case("jsonl") => TelemetryMode::Jsonl,
            _ => TelemetryMode::Off,
        }
    }
}

/// Sink configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub mode: TelemetryMode,
    pub path: Option<PathBuf>,
    pub append: bool,
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let mode = TelemetryMode::from_env();
        let path = if mode == TelemetryMode::Jsonl {
            env::var("RANKLOG_TELEMETRY_PATH").ok().map(PathBuf::from)
        } else {
            None
        };
        let append = env::var("RANKLOG_TELEMETRY_APPEND")
            .ok()
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self { mode, path, append }
    }
}

/// JSONL audit sink. All methods are no-ops when the mode is Off.
pub struct TelemetrySink {
    mode: TelemetryMode,
    path: Option<PathBuf>,
    append: bool,
    writer: Option<BufWriter<File>>,
}

impl TelemetrySink {
    /// Construct from environment configuration. Never fails: invalid
    /// configuration falls back to Off.
    pub fn from_env() -> Self {
        Self::from_config(TelemetryConfig::from_env())
    }

    pub fn from_config(cfg: TelemetryConfig) -> Self {
        Self {
            mode: cfg.mode,
            path: cfg.path,
            append: cfg.append,
            writer: None,
        }
    }

    fn ensure_writer(&mut self) -> Option<&mut BufWriter<File>> {
        if self.mode != TelemetryMode::Jsonl {
            return None;
        }

        if self.writer.is_none() {
            self.writer = self.path.as_ref().and_then(|p| open_writer(p, self.append));
            if self.writer.is_none() {
                // misconfigured or unwritable target: disable for the
                // rest of the process rather than failing the event path
                self.mode = TelemetryMode::Off;
                return None;
            }
        }

        self.writer.as_mut()
    }

    /// Write one JSON value as a single line. Errors disable the sink.
    pub fn log_json(&mut self, value: &JsonValue) {
        let writer = match self.ensure_writer() {
            Some(w) => w,
            None => return,
        };

        let line = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(_) => return,
        };

        if writeln!(writer, "{line}").is_err() || writer.flush().is_err() {
            self.mode = TelemetryMode::Off;
            self.writer = None;
        }
    }

    /// Record one gate application for offline audit.
    pub fn log_gate(
        &mut self,
        event_id: &str,
        pass_probability: f64,
        salt: u64,
        decision: GateDecision,
        retention_probability: f64,
    ) {
        if self.mode != TelemetryMode::Jsonl {
            return;
        }
        self.log_json(&json!({
            "schema_version": AUDIT_SCHEMA_VERSION,
            "event_id": event_id,
            "pass_probability": pass_probability,
            "salt": salt,
            "decision": match decision {
                GateDecision::Keep => "keep",
                GateDecision::Drop => "drop",
            },
            "retention_probability": retention_probability,
        }));
    }
}

fn open_writer(path: &std::path::Path, append: bool) -> Option<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let mut options = OpenOptions::new();
    options.create(true).write(true);
    if append {
        options.append(true);
    } else {
        options.truncate(true);
    }
    options.open(path).ok().map(BufWriter::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_mode_is_noop() {
        let mut sink = TelemetrySink::from_config(TelemetryConfig {
            mode: TelemetryMode::Off,
            path: None,
            append: false,
        });
        // must not panic or create files
        sink.log_gate("id", 0.5, 1, GateDecision::Keep, 0.5);
    }

    #[test]
    fn test_jsonl_without_path_disables_itself() {
        let mut sink = TelemetrySink::from_config(TelemetryConfig {
            mode: TelemetryMode::Jsonl,
            path: None,
            append: false,
        });
        sink.log_json(&json!({"k": 1}));
        assert_eq!(sink.mode, TelemetryMode::Off);
    }

    #[test]
    fn test_writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let mut sink = TelemetrySink::from_config(TelemetryConfig {
            mode: TelemetryMode::Jsonl,
            path: Some(path.clone()),
            append: false,
        });

        sink.log_gate("event_id", 0.5, 1, GateDecision::Keep, 0.5);
        sink.log_gate("event_id", 0.5, 2, GateDecision::Drop, 0.25);
        drop(sink);

        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: JsonValue = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["schema_version"], 1);
        assert_eq!(first["event_id"], "event_id");
        assert_eq!(first["decision"], "keep");
        assert_eq!(first["retention_probability"], 0.5);
    }
}
