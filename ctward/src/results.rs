use ctward_core::SctVerificationResult;
use ctward_loglist::LogListResult;
use std::{collections::BTreeMap, fmt};

/// Overall outcome of verifying one certificate chain for one host
///
/// Success and failure both carry the evidence they were decided on; a caller that
/// wants to fail open on some failures can match on the variant it is willing to
/// tolerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Success(Success),
    Failure(Failure),
}

impl VerificationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, VerificationResult::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Success {
    /// Enough SCTs verified against trusted logs, keyed by base64 log id
    Trusted {
        scts: BTreeMap<String, SctVerificationResult>,
    },

    /// The host is not covered by the include/exclude patterns
    DisabledForHost { host: String },

    /// The freshest log list available has expired and the network is unreachable;
    /// checks are suspended rather than enforced against expired data
    DisabledStaleLogList,

    /// The connection was not protected by TLS in the first place
    InsecureConnection { host: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    NoCertificates,

    /// The leaf carries no embedded SCTs at all
    NoScts,

    TooFewSctsTrusted {
        scts: BTreeMap<String, SctVerificationResult>,
        min_sct_count: usize,
    },

    TooFewDistinctOperators {
        scts: BTreeMap<String, SctVerificationResult>,
        required: usize,
    },

    /// The log list could not be loaded or did not verify
    LogServersFailed(LogListResult),

    UnknownIoException(String),
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationResult::Success(success) => success.fmt(f),
            VerificationResult::Failure(failure) => failure.fmt(f),
        }
    }
}

impl fmt::Display for Success {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Success::Trusted { scts } => {
                let trusted = scts.values().filter(|sct| sct.is_valid()).count();
                write!(f, "Success: SCT trusted logs {trusted} of {}", scts.len())
            }
            Success::DisabledForHost { host } => {
                write!(f, "Success: SCT not enabled for {host}")
            }
            Success::DisabledStaleLogList => {
                write!(f, "Success: SCT checks disabled as the log list is stale")
            }
            Success::InsecureConnection { host } => {
                write!(f, "Success: SCT not enabled for insecure connection to {host}")
            }
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::NoCertificates => write!(f, "Failure: No certificates"),
            Failure::NoScts => write!(
                f,
                "Failure: This certificate does not have any Signed Certificate Timestamps in it."
            ),
            Failure::TooFewSctsTrusted {
                scts,
                min_sct_count,
            } => {
                let trusted = scts.values().filter(|sct| sct.is_valid()).count();
                write!(
                    f,
                    "Failure: Too few trusted SCTs, required {min_sct_count}, found {trusted} in \
                     {scts:?}"
                )
            }
            Failure::TooFewDistinctOperators { required, .. } => {
                write!(f, "Failure: Too few distinct operators, required {required}")
            }
            Failure::LogServersFailed(result) => {
                write!(f, "Failure: Unable to load log servers with {result}")
            }
            Failure::UnknownIoException(cause) => write!(f, "Failure: IO Exception {cause}"),
        }
    }
}
