use crate::asn1::{Asn1, Asn1Error};
use chrono::{DateTime, Utc};
use p256::pkcs8::DecodePublicKey as _;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

const EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";

/// The public key of a log, parsed for the algorithm its SPKI declares
#[derive(Debug, Clone)]
pub enum LogKey {
    Ecdsa(p256::ecdsa::VerifyingKey),
    Rsa(rsa::RsaPublicKey),
}

impl LogKey {
    /// Parse a DER encoded `SubjectPublicKeyInfo`
    ///
    /// The algorithm identifier decides how the key material is interpreted; anything
    /// other than EC P-256 or RSA is rejected.
    pub fn from_spki_der(der: &[u8]) -> Result<Self, LogKeyError> {
        let algorithm = Asn1::read(der)?.query().child(0).child(0).oid()?;

        match algorithm.as_str() {
            EC_PUBLIC_KEY => p256::ecdsa::VerifyingKey::from_public_key_der(der)
                .map(LogKey::Ecdsa)
                .map_err(|_| LogKeyError::MalformedKey("an EC P-256 key")),
            RSA_ENCRYPTION => rsa::RsaPublicKey::from_public_key_der(der)
                .map(LogKey::Rsa)
                .map_err(|_| LogKeyError::MalformedKey("an RSA key")),
            other => Err(LogKeyError::UnsupportedAlgorithm(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogKeyError {
    #[error("Failed to read the key algorithm: {0}")]
    Asn1(#[from] Asn1Error),

    #[error("The key algorithm {0} is not supported")]
    UnsupportedAlgorithm(String),

    #[error("The key material does not parse as {0}")]
    MalformedKey(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousOperator {
    pub name: String,
    pub end_time: DateTime<Utc>,
}

/// A single trusted log out of the log list
#[derive(Clone)]
pub struct LogServer {
    key: LogKey,
    id: [u8; 32],
    valid_until: Option<DateTime<Utc>>,
    operator: String,
    previous_operators: Vec<PreviousOperator>,
}

impl LogServer {
    pub fn new(
        key_der: &[u8],
        valid_until: Option<DateTime<Utc>>,
        operator: String,
        previous_operators: Vec<PreviousOperator>,
    ) -> Result<Self, LogKeyError> {
        let key = LogKey::from_spki_der(key_der)?;

        // RFC 6962 3.2: the log id is the SHA-256 of the logs public key
        let id = Sha256::digest(key_der).into();

        Ok(Self {
            key,
            id,
            valid_until,
            operator,
            previous_operators,
        })
    }

    pub fn key(&self) -> &LogKey {
        &self.key
    }

    pub fn id(&self) -> [u8; 32] {
        self.id
    }

    /// `None` means the log is trusted for certificates of any age
    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// The operator that ran this log at `timestamp`
    ///
    /// Operator handovers are recorded with the time the previous operator stopped, so
    /// the owner at a point in time is the previous operator with the earliest end
    /// after it, or the current operator if there is none.
    pub fn operator_at(&self, timestamp: DateTime<Utc>) -> &str {
        self.previous_operators
            .iter()
            .filter(|previous| previous.end_time > timestamp)
            .min_by_key(|previous| previous.end_time)
            .map(|previous| previous.name.as_str())
            .unwrap_or(&self.operator)
    }
}

impl fmt::Debug for LogServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogServer")
            .field("id", &hex::encode(self.id))
            .field("operator", &self.operator)
            .field("valid_until", &self.valid_until)
            .finish()
    }
}

impl PartialEq for LogServer {
    fn eq(&self, other: &Self) -> bool {
        // The id is the hash of the key, so comparing it covers the key as well
        self.id == other.id
            && self.valid_until == other.valid_until
            && self.operator == other.operator
            && self.previous_operators == other.previous_operators
    }
}

impl Eq for LogServer {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const LOG_KEY: &[u8] = include_bytes!("../../testdata/log-key-a.der");

    #[test]
    fn parse_ec_log_key() {
        let server = LogServer::new(LOG_KEY, None, "Alpha Trust".into(), vec![]).unwrap();

        assert!(matches!(server.key(), LogKey::Ecdsa(_)));
        assert_eq!(server.id(), <[u8; 32]>::from(Sha256::digest(LOG_KEY)));
    }

    #[test]
    fn unsupported_key_algorithm() {
        // SPKI with the DSA algorithm identifier
        let spki = [
            0x30, 0x0E, 0x30, 0x09, 0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x38, 0x04, 0x01, 0x03,
            0x01, 0x00,
        ];
        assert_eq!(
            LogKey::from_spki_der(&spki).unwrap_err(),
            LogKeyError::UnsupportedAlgorithm("1.2.840.10040.4.1".into())
        );
    }

    #[test]
    fn garbage_key_fails() {
        assert!(matches!(
            LogKey::from_spki_der(&[0xFF, 0x00]),
            Err(LogKeyError::Asn1(_))
        ));
    }

    #[test]
    fn operator_handover() {
        let date = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        let server = LogServer::new(
            LOG_KEY,
            None,
            "Current".into(),
            vec![
                PreviousOperator {
                    name: "Second".into(),
                    end_time: date(2023, 1, 1),
                },
                PreviousOperator {
                    name: "First".into(),
                    end_time: date(2021, 1, 1),
                },
            ],
        )
        .unwrap();

        assert_eq!(server.operator_at(date(2020, 6, 1)), "First");
        assert_eq!(server.operator_at(date(2022, 6, 1)), "Second");
        assert_eq!(server.operator_at(date(2024, 6, 1)), "Current");
    }
}
