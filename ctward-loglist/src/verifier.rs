use rsa::{
    pkcs1v15,
    pkcs8::DecodePublicKey,
    signature::Verifier,
};
use sha2::Sha256;
use std::fmt;

/// The key the log list distributor signs `log_list.json` with
const LOG_LIST_PUBLIC_KEY: &str = include_str!("../resources/log_list_pubkey.pem");

/// Verifies the detached SHA256withRSA signature over the raw `log_list.json` bytes
///
/// Verification happens before the JSON is parsed, so nothing unauthenticated ever
/// reaches the parser. The distributors key is bundled; deployments that mirror the
/// list under their own key can swap it out with [`LogListVerifier::new`].
#[derive(Debug, Clone)]
pub struct LogListVerifier {
    public_key_pem: String,
}

impl Default for LogListVerifier {
    fn default() -> Self {
        Self::new(LOG_LIST_PUBLIC_KEY)
    }
}

impl LogListVerifier {
    pub fn new(public_key_pem: impl Into<String>) -> Self {
        Self {
            public_key_pem: public_key_pem.into(),
        }
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> LogServerSignatureResult {
        let public_key = match rsa::RsaPublicKey::from_public_key_pem(&self.public_key_pem) {
            Ok(public_key) => public_key,
            Err(err) => {
                return LogServerSignatureResult::Invalid(
                    LogServerSignatureFailure::PublicKeyNotValid(err.to_string()),
                );
            }
        };

        let signature = match pkcs1v15::Signature::try_from(signature) {
            Ok(signature) => signature,
            Err(err) => {
                return LogServerSignatureResult::Invalid(
                    LogServerSignatureFailure::SignatureNotValid(err.to_string()),
                );
            }
        };

        match pkcs1v15::VerifyingKey::<Sha256>::new(public_key).verify(message, &signature) {
            Ok(()) => LogServerSignatureResult::Valid,
            Err(_) => LogServerSignatureResult::Invalid(LogServerSignatureFailure::SignatureFailed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogServerSignatureResult {
    Valid,
    Invalid(LogServerSignatureFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogServerSignatureFailure {
    /// The signature does not match the message
    SignatureFailed,
    /// The signature bytes themselves are malformed
    SignatureNotValid(String),
    PublicKeyNotValid(String),
}

impl fmt::Display for LogServerSignatureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogServerSignatureFailure::SignatureFailed => write!(f, "Signature failed"),
            LogServerSignatureFailure::SignatureNotValid(cause) => {
                write!(f, "Signature not valid with {cause}")
            }
            LogServerSignatureFailure::PublicKeyNotValid(cause) => {
                write!(f, "Public key not valid with {cause}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG_LIST: &[u8] = include_bytes!("../../testdata/log_list.json");
    const SIGNATURE: &[u8] = include_bytes!("../../testdata/log_list.sig");
    const TEST_KEY: &str = include_str!("../../testdata/log_list_test_pubkey.pem");

    #[test]
    fn fixture_signature_verifies() {
        let verifier = LogListVerifier::new(TEST_KEY);
        assert_eq!(
            verifier.verify(LOG_LIST, SIGNATURE),
            LogServerSignatureResult::Valid
        );
    }

    #[test]
    fn tampered_message_fails() {
        let verifier = LogListVerifier::new(TEST_KEY);
        let mut message = LOG_LIST.to_vec();
        message[0] ^= 0x01;

        assert_eq!(
            verifier.verify(&message, SIGNATURE),
            LogServerSignatureResult::Invalid(LogServerSignatureFailure::SignatureFailed)
        );
    }

    #[test]
    fn malformed_signature_fails() {
        let verifier = LogListVerifier::new(TEST_KEY);
        assert!(matches!(
            verifier.verify(LOG_LIST, &[0x01, 0x02]),
            LogServerSignatureResult::Invalid(_)
        ));
    }

    #[test]
    fn bad_public_key_is_reported() {
        let verifier = LogListVerifier::new("not a pem");
        assert!(matches!(
            verifier.verify(LOG_LIST, SIGNATURE),
            LogServerSignatureResult::Invalid(LogServerSignatureFailure::PublicKeyNotValid(_))
        ));
    }
}
