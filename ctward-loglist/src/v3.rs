//! Serde model of the v3 `log_list.json` schema
//!
//! See <https://www.gstatic.com/ct/log_list/v3/log_list_schema.json>. Keys stay as the
//! base64 strings they arrive as, so a bad key can be reported verbatim.

use crate::base64::Base64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LogListV3 {
    pub version: String,
    pub log_list_timestamp: DateTime<Utc>,
    pub operators: Vec<Operator>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Operator {
    pub name: String,
    pub email: Vec<String>,
    pub logs: Vec<Log>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tiled_logs: Vec<Log>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Log {
    #[serde(default)]
    pub description: Option<String>,
    pub log_id: Base64<Vec<u8>>,
    pub key: String,
    pub mmd: u64,
    #[serde(default)]
    pub url: Option<Url>,
    #[serde(default)]
    pub dns: Option<String>,
    #[serde(default)]
    pub state: Option<State>,
    #[serde(default)]
    pub temporal_interval: Option<Interval>,
    #[serde(default)]
    pub log_type: Option<LogType>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub previous_operators: Vec<PreviousOperatorV3>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum State {
    Pending {
        timestamp: DateTime<Utc>,
    },
    Qualified {
        timestamp: DateTime<Utc>,
    },
    Usable {
        timestamp: DateTime<Utc>,
    },
    Readonly {
        timestamp: DateTime<Utc>,
        final_tree_head: Option<FinalTreeHead>,
    },
    Retired {
        timestamp: DateTime<Utc>,
    },
    Rejected {
        timestamp: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Interval {
    pub start_inclusive: DateTime<Utc>,
    pub end_exclusive: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LogType {
    Prod,
    Test,
    MonitoringOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PreviousOperatorV3 {
    pub name: String,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FinalTreeHead {
    pub sha256_root_hash: Base64<Vec<u8>>,
    pub tree_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const LOG_LIST: &str = include_str!("../../testdata/log_list.json");

    #[test]
    fn parse_log_list() {
        let log_list: LogListV3 = serde_json::from_str(LOG_LIST).unwrap();

        assert_eq!(log_list.version, "25.6");
        assert_eq!(
            log_list.log_list_timestamp,
            Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(log_list.operators.len(), 3);

        let log = &log_list.operators[0].logs[0];
        assert_eq!(log.log_id.len(), 32);
        assert!(matches!(log.state, Some(State::Usable { .. })));
    }
}
