use crate::{
    result::{LogListInvalid, LogListResult, LogListValid},
    v3::{Log, LogListV3, State},
};
use base64::{Engine, prelude::BASE64_STANDARD};
use chrono::{DateTime, Utc};
use ctward_core::{LogServer, PreviousOperator};

/// Turn verified `log_list.json` bytes into trusted [`LogServer`] entries
///
/// Log state decides inclusion: logs that are pending, rejected or carry no state at
/// all are dropped, retired and readonly logs stay trusted for SCTs issued before the
/// state transition, and qualified or usable logs are trusted without bound. A single
/// key that fails to parse rejects the entire list.
pub(crate) fn parse_log_list(bytes: &[u8]) -> LogListResult {
    let log_list: LogListV3 = match serde_json::from_slice(bytes) {
        Ok(log_list) => log_list,
        Err(err) => {
            return LogListResult::Invalid(LogListInvalid::LogListJsonBadFormat(err.to_string()));
        }
    };

    let mut servers = vec![];
    for operator in &log_list.operators {
        for log in operator.logs.iter().chain(operator.tiled_logs.iter()) {
            let Some(valid_until) = trust_window(log) else {
                continue;
            };

            let key_der = match BASE64_STANDARD.decode(&log.key) {
                Ok(key_der) => key_der,
                Err(err) => {
                    return LogListResult::Invalid(LogListInvalid::LogServerInvalidKey {
                        key: log.key.clone(),
                        cause: err.to_string(),
                    });
                }
            };

            let previous_operators = log
                .previous_operators
                .iter()
                .map(|previous| PreviousOperator {
                    name: previous.name.clone(),
                    end_time: previous.end_time,
                })
                .collect();

            match LogServer::new(&key_der, valid_until, operator.name.clone(), previous_operators)
            {
                Ok(server) => servers.push(server),
                Err(err) => {
                    return LogListResult::Invalid(LogListInvalid::LogServerInvalidKey {
                        key: log.key.clone(),
                        cause: err.to_string(),
                    });
                }
            }
        }
    }

    if servers.is_empty() {
        return LogListResult::Invalid(LogListInvalid::NoLogServers);
    }

    LogListResult::Valid(LogListValid::Success {
        timestamp: log_list.log_list_timestamp,
        servers,
    })
}

/// `None` excludes the log, `Some(None)` trusts it without bound, `Some(timestamp)`
/// trusts SCTs issued up to the state transition
fn trust_window(log: &Log) -> Option<Option<DateTime<Utc>>> {
    match &log.state {
        None | Some(State::Pending { .. }) | Some(State::Rejected { .. }) => None,
        Some(State::Retired { timestamp }) | Some(State::Readonly { timestamp, .. }) => {
            Some(Some(*timestamp))
        }
        Some(State::Qualified { .. }) | Some(State::Usable { .. }) => Some(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const LOG_LIST: &[u8] = include_bytes!("../../testdata/log_list.json");

    #[test]
    fn parse_fixture_list() {
        let result = parse_log_list(LOG_LIST);

        let LogListResult::Valid(LogListValid::Success { timestamp, servers }) = result else {
            panic!("expected a valid log list, got {result:?}");
        };

        assert_eq!(timestamp, Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap());
        assert_eq!(servers.len(), 3);
        assert_eq!(
            servers.iter().map(LogServer::operator).collect::<Vec<_>>(),
            ["Alpha Trust", "Beta Watch", "Gamma Logs"]
        );
        assert!(servers.iter().all(|server| server.valid_until().is_none()));
    }

    fn list_with_state(state: &str) -> Vec<u8> {
        String::from_utf8_lossy(LOG_LIST)
            .replace("\"usable\"", &format!("\"{state}\""))
            .into_bytes()
    }

    #[test]
    fn pending_and_rejected_logs_are_excluded() {
        for state in ["pending", "rejected"] {
            assert_eq!(
                parse_log_list(&list_with_state(state)),
                LogListResult::Invalid(LogListInvalid::NoLogServers),
                "state {state}"
            );
        }
    }

    #[test]
    fn retired_logs_keep_a_trust_window() {
        let result = parse_log_list(&list_with_state("retired"));

        let LogListResult::Valid(LogListValid::Success { servers, .. }) = result else {
            panic!("expected a valid log list, got {result:?}");
        };

        // The state transition timestamp of the fixture logs
        let retired = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(servers.iter().all(|server| server.valid_until() == Some(retired)));
    }

    #[test]
    fn one_bad_key_rejects_the_list() {
        let bytes = String::from_utf8_lossy(LOG_LIST).replacen("MFkw", "!!!!", 1).into_bytes();

        assert!(matches!(
            parse_log_list(&bytes),
            LogListResult::Invalid(LogListInvalid::LogServerInvalidKey { .. })
        ));
    }

    #[test]
    fn garbage_json_is_bad_format() {
        assert!(matches!(
            parse_log_list(b"{not json"),
            LogListResult::Invalid(LogListInvalid::LogListJsonBadFormat(_))
        ));
    }
}
