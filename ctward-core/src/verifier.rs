use crate::{
    CertificateChain, InvalidSctResult, LogServer, SctVerificationResult,
    signature::SignatureValidationError,
    utils::codec::Encode,
    v1::SignedCertificateTimestamp,
};
use base64::{Engine, prelude::BASE64_STANDARD};
use chrono::{DateTime, Utc};

/// Checks SCTs against a single trusted log server
///
/// Validation is layered: the log id has to match, the timestamp must not lie in the
/// future or past the window the log is trusted for, and only then is the signature
/// checked against the reconstructed RFC 6962 3.2 payload.
#[derive(Debug, Clone)]
pub struct LogSignatureVerifier {
    log_server: LogServer,
}

impl LogSignatureVerifier {
    pub fn new(log_server: LogServer) -> Self {
        Self { log_server }
    }

    pub fn verify(
        &self,
        sct: &SignedCertificateTimestamp,
        chain: &CertificateChain,
    ) -> SctVerificationResult {
        self.verify_at(sct, chain, Utc::now())
    }

    pub(crate) fn verify_at(
        &self,
        sct: &SignedCertificateTimestamp,
        chain: &CertificateChain,
        now: DateTime<Utc>,
    ) -> SctVerificationResult {
        if sct.log_id() != self.log_server.id() {
            return SctVerificationResult::Invalid(InvalidSctResult::LogIdMismatch {
                expected: BASE64_STANDARD.encode(self.log_server.id()),
                received: BASE64_STANDARD.encode(sct.log_id()),
            });
        }

        let timestamp = i64::try_from(sct.timestamp())
            .ok()
            .and_then(DateTime::from_timestamp_millis);
        let Some(timestamp) = timestamp else {
            return SctVerificationResult::Invalid(InvalidSctResult::FailedWithException {
                cause: format!("SCT timestamp {} is out of range", sct.timestamp()),
            });
        };

        if timestamp > now {
            return SctVerificationResult::Invalid(InvalidSctResult::FutureTimestamp {
                timestamp,
                now,
            });
        }

        if let Some(valid_until) = self.log_server.valid_until()
            && timestamp > valid_until
        {
            return SctVerificationResult::Invalid(InvalidSctResult::LogServerUntrusted {
                timestamp,
                log_server_valid_until: valid_until,
            });
        }

        let entry = match chain.as_log_entry() {
            Ok(entry) => entry,
            Err(err) => {
                return SctVerificationResult::Invalid(InvalidSctResult::FailedWithException {
                    cause: err.to_string(),
                });
            }
        };

        let payload = match sct.signed_payload(entry).encode_to_vec() {
            Ok(payload) => payload,
            Err(err) => {
                return SctVerificationResult::Invalid(InvalidSctResult::FailedWithException {
                    cause: err.to_string(),
                });
            }
        };

        match sct.signature().validate(&payload, self.log_server.key()) {
            Ok(()) => SctVerificationResult::Valid {
                sct: sct.clone(),
                operator: self.log_server.operator_at(timestamp).to_owned(),
            },
            Err(SignatureValidationError::InvalidSignature) => {
                SctVerificationResult::Invalid(InvalidSctResult::FailedVerification)
            }
            Err(err) => SctVerificationResult::Invalid(InvalidSctResult::FailedWithException {
                cause: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const CHAIN_3SCTS: &str = include_str!("../../testdata/chain-3scts.pem");
    const CHAIN_1SCT: &str = include_str!("../../testdata/chain-1sct.pem");
    const CHAIN_PRECERT_SIGNER: &str = include_str!("../../testdata/chain-precert-signer.pem");

    const LOG_KEYS: [&[u8]; 3] = [
        include_bytes!("../../testdata/log-key-a.der"),
        include_bytes!("../../testdata/log-key-b.der"),
        include_bytes!("../../testdata/log-key-c.der"),
    ];

    fn log_server(key_der: &[u8], operator: &str) -> LogServer {
        LogServer::new(key_der, None, operator.into(), vec![]).unwrap()
    }

    fn verifier_for(sct: &SignedCertificateTimestamp) -> LogSignatureVerifier {
        let server = LOG_KEYS
            .iter()
            .enumerate()
            .map(|(idx, key)| log_server(key, &format!("Operator {idx}")))
            .find(|server| server.id() == sct.log_id())
            .expect("no fixture key matches the SCT");
        LogSignatureVerifier::new(server)
    }

    #[test]
    fn embedded_scts_verify() {
        let chain = CertificateChain::from_pem_chain(CHAIN_3SCTS).unwrap();
        let scts = chain.leaf().extract_scts().unwrap();
        assert_eq!(scts.len(), 3);

        for sct in &scts {
            let result = verifier_for(sct).verify(sct, &chain);
            assert!(result.is_valid(), "{result}");
        }
    }

    #[test]
    fn signing_cert_chain_verifies() {
        let chain = CertificateChain::from_pem_chain(CHAIN_PRECERT_SIGNER).unwrap();
        let scts = chain.leaf().extract_scts().unwrap();
        assert_eq!(scts.len(), 1);

        let result = verifier_for(&scts[0]).verify(&scts[0], &chain);
        assert!(result.is_valid(), "{result}");
    }

    #[test]
    fn sct_of_a_different_certificate_fails() {
        // The SCT out of one chain cannot vouch for another leaf
        let chain = CertificateChain::from_pem_chain(CHAIN_3SCTS).unwrap();
        let other = CertificateChain::from_pem_chain(CHAIN_1SCT).unwrap();
        let sct = &other.leaf().extract_scts().unwrap()[0];

        assert_eq!(
            verifier_for(sct).verify(sct, &chain),
            SctVerificationResult::Invalid(InvalidSctResult::FailedVerification)
        );
    }

    #[test]
    fn mismatched_log_id() {
        let chain = CertificateChain::from_pem_chain(CHAIN_1SCT).unwrap();
        let sct = &chain.leaf().extract_scts().unwrap()[0];

        let verifier = LogSignatureVerifier::new(log_server(LOG_KEYS[2], "Other"));
        assert!(matches!(
            verifier.verify(sct, &chain),
            SctVerificationResult::Invalid(InvalidSctResult::LogIdMismatch { .. })
        ));
    }

    #[test]
    fn future_timestamp_is_rejected() {
        let chain = CertificateChain::from_pem_chain(CHAIN_1SCT).unwrap();
        let sct = &chain.leaf().extract_scts().unwrap()[0];

        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            verifier_for(sct).verify_at(sct, &chain, now),
            SctVerificationResult::Invalid(InvalidSctResult::FutureTimestamp { .. })
        ));
    }

    #[test]
    fn retired_log_rejects_later_scts() {
        let chain = CertificateChain::from_pem_chain(CHAIN_1SCT).unwrap();
        let sct = &chain.leaf().extract_scts().unwrap()[0];

        let retired = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let server = LogServer::new(LOG_KEYS[0], Some(retired), "Alpha Trust".into(), vec![])
            .unwrap();

        assert!(matches!(
            LogSignatureVerifier::new(server).verify(sct, &chain),
            SctVerificationResult::Invalid(InvalidSctResult::LogServerUntrusted { .. })
        ));
    }
}
