use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Aggregate backend status from `GET /api/status`. The backend marshals
/// bare Go structs, so the updater/pool fields arrive PascalCase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub updater: UpdaterStatus,
    #[serde(default)]
    pub pool: PoolStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdaterStatus {
    #[serde(default, rename = "LastUpdateStart")]
    pub last_update_start: String,
    #[serde(default, rename = "LastUpdateEnd")]
    pub last_update_end: String,
    #[serde(default, rename = "LastUpdateErr")]
    pub last_update_err: String,
    #[serde(default, rename = "LastFetched")]
    pub last_fetched: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolStats {
    #[serde(default, rename = "Total")]
    pub total: i64,
    #[serde(default, rename = "Disabled")]
    pub disabled: i64,
}

/// Node-health snapshot from `GET /api/nodes`. Replaced wholesale on every
/// poll; the backend's ordering is preserved as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodesSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeRow>,
    #[serde(default)]
    pub nodes_total: u64,
    #[serde(default)]
    pub nodes_alive: u64,
    #[serde(default)]
    pub updated_at_utc: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeRow {
    pub id: String,
    #[serde(default)]
    pub alive: bool,
    #[serde(default)]
    pub delay_ms: i64,
    #[serde(default)]
    pub last_seen_utc: String,
    #[serde(default)]
    pub last_try_utc: String,
}

/// One record from the live log feed. `id` is assigned by the server and
/// strictly increases; the client resumes the stream after the highest id
/// it has processed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRecord {
    pub id: u64,
    #[serde(default)]
    pub time_utc: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub attrs: Option<BTreeMap<String, String>>,
}

/// Minimum severity requested from the log subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Next level in display order, wrapping at the end. Used by the level
    /// selector in the console.
    pub fn cycle(self) -> Self {
        match self {
            LogLevel::Debug => LogLevel::Info,
            LogLevel::Info => LogLevel::Warn,
            LogLevel::Warn => LogLevel::Error,
            LogLevel::Error => LogLevel::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("Unknown level: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_snapshot_reads_pascal_case_fields() {
        let snapshot: StatusSnapshot = serde_json::from_str(
            r#"{
                "updater": {
                    "LastUpdateStart": "2026-08-28T10:00:00Z",
                    "LastUpdateEnd": "2026-08-28T10:00:05Z",
                    "LastUpdateErr": "",
                    "LastFetched": 42
                },
                "pool": {"Total": 10, "Disabled": 2},
                "server_time_utc": "2026-08-28T10:00:06Z"
            }"#,
        )
        .expect("parse status");
        assert_eq!(snapshot.updater.last_fetched, 42);
        assert_eq!(snapshot.pool.total, 10);
        assert_eq!(snapshot.pool.disabled, 2);
    }

    #[test]
    fn status_snapshot_defaults_missing_pool() {
        let snapshot: StatusSnapshot =
            serde_json::from_str(r#"{"updater": {"LastFetched": 1}}"#).expect("parse status");
        assert_eq!(snapshot.pool, PoolStats::default());
        assert_eq!(snapshot.updater.last_fetched, 1);
    }

    #[test]
    fn nodes_snapshot_tolerates_sparse_rows() {
        let snapshot: NodesSnapshot = serde_json::from_str(
            r#"{
                "nodes": [{"id": "node-a"}, {"id": "node-b", "alive": true, "delay_ms": 120}],
                "nodes_total": 2,
                "nodes_alive": 1,
                "updated_at_utc": "2026-08-28T10:00:00Z"
            }"#,
        )
        .expect("parse nodes");
        assert_eq!(snapshot.nodes.len(), 2);
        assert!(!snapshot.nodes[0].alive);
        assert_eq!(snapshot.nodes[1].delay_ms, 120);
    }

    #[test]
    fn log_record_requires_id() {
        let err = serde_json::from_str::<LogRecord>(r#"{"msg": "no id"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn level_parses_aliases_and_round_trips() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("INFO".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn level_cycle_wraps() {
        let mut level = LogLevel::Debug;
        for _ in 0..4 {
            level = level.cycle();
        }
        assert_eq!(level, LogLevel::Debug);
    }
}
