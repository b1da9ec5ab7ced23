use chrono::{DateTime, Utc};
use ctward_core::LogServer;
use std::fmt;

use crate::verifier::LogServerSignatureFailure;

/// The raw bytes of `log_list.json` and its signature, or why they could not be loaded
///
/// Sources report every failure in-band so that the cache manager can fall back to
/// another tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLogListResult {
    Success {
        log_list: Vec<u8>,
        signature: Vec<u8>,
    },
    Failure(RawLogListFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLogListFailure {
    JsonTooBig,
    JsonFailedLoading(String),
    SigTooBig,
    SigFailedLoading(String),
    ZipTooBig,
    ZipJsonTooBig,
    ZipSigTooBig,
    ZipJsonMissing,
    ZipSigMissing,
    ZipFailedLoading(String),
    DiskFailedLoading(String),
}

impl fmt::Display for RawLogListFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLogListFailure::JsonTooBig => write!(f, "log_list.json is too large"),
            RawLogListFailure::JsonFailedLoading(cause) => {
                write!(f, "log_list.json failed to load with {cause}")
            }
            RawLogListFailure::SigTooBig => write!(f, "log_list.sig is too large"),
            RawLogListFailure::SigFailedLoading(cause) => {
                write!(f, "log_list.sig failed to load with {cause}")
            }
            RawLogListFailure::ZipTooBig => write!(f, "log_list.zip is too large"),
            RawLogListFailure::ZipJsonTooBig => {
                write!(f, "log_list.json inside log_list.zip is too large")
            }
            RawLogListFailure::ZipSigTooBig => {
                write!(f, "log_list.sig inside log_list.zip is too large")
            }
            RawLogListFailure::ZipJsonMissing => {
                write!(f, "log_list.zip does not contain log_list.json")
            }
            RawLogListFailure::ZipSigMissing => {
                write!(f, "log_list.zip does not contain log_list.sig")
            }
            RawLogListFailure::ZipFailedLoading(cause) => {
                write!(f, "log_list.zip failed to load with {cause}")
            }
            RawLogListFailure::DiskFailedLoading(cause) => {
                write!(f, "cached log list failed to load with {cause}")
            }
        }
    }
}

/// The outcome of loading and interpreting the log list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogListResult {
    Valid(LogListValid),

    /// The network has been unreachable for so long that the freshest cached list is
    /// older than 70 days: verification is explicitly disabled rather than blocking
    /// every connection on data that old.
    DisableChecks {
        timestamp: DateTime<Utc>,
        network_result: Box<LogListResult>,
    },

    Invalid(LogListInvalid),
}

/// A usable set of log servers, annotated with how fresh it is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogListValid {
    Success {
        timestamp: DateTime<Utc>,
        servers: Vec<LogServer>,
    },

    /// The network returned a list that is older than data we already had; the cached
    /// data wins, since a current list can never regress
    StaleNetworkUsingCachedData {
        timestamp: DateTime<Utc>,
        servers: Vec<LogServer>,
        network_result: Box<LogListValid>,
    },

    /// The network list is between 14 and 70 days old; still used, but callers may
    /// want to surface the staleness
    StaleNetworkUsingNetworkData {
        timestamp: DateTime<Utc>,
        servers: Vec<LogServer>,
    },
}

impl LogListValid {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LogListValid::Success { timestamp, .. }
            | LogListValid::StaleNetworkUsingCachedData { timestamp, .. }
            | LogListValid::StaleNetworkUsingNetworkData { timestamp, .. } => *timestamp,
        }
    }

    pub fn servers(&self) -> &[LogServer] {
        match self {
            LogListValid::Success { servers, .. }
            | LogListValid::StaleNetworkUsingCachedData { servers, .. }
            | LogListValid::StaleNetworkUsingNetworkData { servers, .. } => servers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogListInvalid {
    SignatureVerificationFailed(LogServerSignatureFailure),
    NoLogServers,
    LogListJsonFailedLoading,
    LogListJsonFailedLoadingWithException(String),
    LogListSigFailedLoadingWithException(String),
    LogListZipFailedLoadingWithException(String),
    LogListJsonBadFormat(String),
    LogServerInvalidKey {
        key: String,
        cause: String,
    },

    /// The network list itself is older than 70 days and nothing cached is better
    LogListStaleNetwork {
        network_result: Box<LogListValid>,
    },
}

impl fmt::Display for LogListResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogListResult::Valid(_) => write!(f, "Valid log list"),
            LogListResult::DisableChecks { timestamp, .. } => write!(
                f,
                "Certificate transparency checks disabled: freshest log list is from \
                 {timestamp} and the network is unreachable"
            ),
            LogListResult::Invalid(invalid) => invalid.fmt(f),
        }
    }
}

impl fmt::Display for LogListInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogListInvalid::SignatureVerificationFailed(failure) => {
                write!(f, "log_list.json failed signature verification: {failure}")
            }
            LogListInvalid::NoLogServers => write!(f, "log_list.json contains no log servers"),
            LogListInvalid::LogListJsonFailedLoading => write!(f, "log_list.json failed to load"),
            LogListInvalid::LogListJsonFailedLoadingWithException(cause) => {
                write!(f, "log_list.json failed to load with {cause}")
            }
            LogListInvalid::LogListSigFailedLoadingWithException(cause) => {
                write!(f, "log_list.sig failed to load with {cause}")
            }
            LogListInvalid::LogListZipFailedLoadingWithException(cause) => {
                write!(f, "log_list.zip failed to load with {cause}")
            }
            LogListInvalid::LogListJsonBadFormat(cause) => {
                write!(f, "log_list.json badly formatted with {cause}")
            }
            LogListInvalid::LogServerInvalidKey { key, cause } => {
                write!(f, "Public key for log server {key} cannot be used with {cause}")
            }
            LogListInvalid::LogListStaleNetwork { network_result } => write!(
                f,
                "log list from the network is too old, it is from {}",
                network_result.timestamp()
            ),
        }
    }
}
