use crate::v1::SignedCertificateTimestamp;
use chrono::{DateTime, Utc};
use std::fmt;

/// Outcome of checking a single SCT against its log server
///
/// Every way a check can fail is a value here; the verifier never surfaces a raw error
/// for an SCT, since one bad SCT must not abort the evaluation of the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SctVerificationResult {
    Valid {
        sct: SignedCertificateTimestamp,
        /// The operator that ran the log when the SCT was issued
        operator: String,
    },
    Invalid(InvalidSctResult),
}

impl SctVerificationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, SctVerificationResult::Valid { .. })
    }
}

impl fmt::Display for SctVerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SctVerificationResult::Valid { .. } => write!(f, "Valid SCT"),
            SctVerificationResult::Invalid(invalid) => invalid.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidSctResult {
    /// The signature does not verify against the log key
    FailedVerification,

    /// No entry in the log list matches the log id of the SCT
    NoTrustedLogServerFound,

    FutureTimestamp {
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// The SCT was issued after the log stopped being trusted
    LogServerUntrusted {
        timestamp: DateTime<Utc>,
        log_server_valid_until: DateTime<Utc>,
    },

    LogIdMismatch {
        expected: String,
        received: String,
    },

    FailedWithException {
        cause: String,
    },
}

impl fmt::Display for InvalidSctResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidSctResult::FailedVerification => {
                write!(f, "SCT signature failed verification")
            }
            InvalidSctResult::NoTrustedLogServerFound => {
                write!(f, "No trusted log server found for SCT")
            }
            InvalidSctResult::FutureTimestamp { timestamp, now } => write!(
                f,
                "SCT timestamp, {timestamp}, is in the future, current timestamp is {now}."
            ),
            InvalidSctResult::LogServerUntrusted {
                timestamp,
                log_server_valid_until,
            } => write!(
                f,
                "SCT timestamp, {timestamp}, is greater than the log server validity, \
                 {log_server_valid_until}."
            ),
            InvalidSctResult::LogIdMismatch { expected, received } => write!(
                f,
                "Log ID of SCT, {received}, does not match the log server, {expected}"
            ),
            InvalidSctResult::FailedWithException { cause } => {
                write!(f, "SCT validation failed: {cause}")
            }
        }
    }
}
