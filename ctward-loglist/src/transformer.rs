use crate::{
    parser::parse_log_list,
    result::{LogListInvalid, LogListResult, RawLogListFailure, RawLogListResult},
    verifier::{LogListVerifier, LogServerSignatureResult},
};

/// Turns raw bytes from any source into a [`LogListResult`]
///
/// Signature verification comes first; only an authenticated document is parsed.
#[derive(Debug, Clone, Default)]
pub struct RawLogListTransformer {
    verifier: LogListVerifier,
}

impl RawLogListTransformer {
    pub fn new(verifier: LogListVerifier) -> Self {
        Self { verifier }
    }

    pub fn transform(&self, raw: &RawLogListResult) -> LogListResult {
        match raw {
            RawLogListResult::Success {
                log_list,
                signature,
            } => match self.verifier.verify(log_list, signature) {
                LogServerSignatureResult::Valid => parse_log_list(log_list),
                LogServerSignatureResult::Invalid(failure) => {
                    LogListResult::Invalid(LogListInvalid::SignatureVerificationFailed(failure))
                }
            },
            RawLogListResult::Failure(failure) => LogListResult::Invalid(map_failure(failure)),
        }
    }
}

fn map_failure(failure: &RawLogListFailure) -> LogListInvalid {
    match failure {
        RawLogListFailure::JsonFailedLoading(cause)
        | RawLogListFailure::DiskFailedLoading(cause) => {
            LogListInvalid::LogListJsonFailedLoadingWithException(cause.clone())
        }
        RawLogListFailure::SigFailedLoading(cause) => {
            LogListInvalid::LogListSigFailedLoadingWithException(cause.clone())
        }
        RawLogListFailure::ZipFailedLoading(cause) => {
            LogListInvalid::LogListZipFailedLoadingWithException(cause.clone())
        }
        RawLogListFailure::JsonTooBig
        | RawLogListFailure::SigTooBig
        | RawLogListFailure::ZipTooBig
        | RawLogListFailure::ZipJsonTooBig
        | RawLogListFailure::ZipSigTooBig
        | RawLogListFailure::ZipJsonMissing
        | RawLogListFailure::ZipSigMissing => LogListInvalid::LogListJsonFailedLoading,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::LogListValid;

    const LOG_LIST: &[u8] = include_bytes!("../../testdata/log_list.json");
    const SIGNATURE: &[u8] = include_bytes!("../../testdata/log_list.sig");
    const TEST_KEY: &str = include_str!("../../testdata/log_list_test_pubkey.pem");

    fn transformer() -> RawLogListTransformer {
        RawLogListTransformer::new(LogListVerifier::new(TEST_KEY))
    }

    #[test]
    fn verified_bytes_are_parsed() {
        let raw = RawLogListResult::Success {
            log_list: LOG_LIST.to_vec(),
            signature: SIGNATURE.to_vec(),
        };

        assert!(matches!(
            transformer().transform(&raw),
            LogListResult::Valid(LogListValid::Success { .. })
        ));
    }

    #[test]
    fn bad_signature_never_reaches_the_parser() {
        let mut tampered = LOG_LIST.to_vec();
        tampered[0] ^= 0x01;
        let raw = RawLogListResult::Success {
            log_list: tampered,
            signature: SIGNATURE.to_vec(),
        };

        assert!(matches!(
            transformer().transform(&raw),
            LogListResult::Invalid(LogListInvalid::SignatureVerificationFailed(_))
        ));
    }

    #[test]
    fn failures_map_to_invalid() {
        let raw = RawLogListResult::Failure(RawLogListFailure::ZipFailedLoading("offline".into()));
        assert_eq!(
            transformer().transform(&raw),
            LogListResult::Invalid(LogListInvalid::LogListZipFailedLoadingWithException(
                "offline".into()
            ))
        );
    }
}
