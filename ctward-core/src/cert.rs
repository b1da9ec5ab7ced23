use crate::{
    asn1::{self, Asn1, Asn1Error},
    utils::codec::{CodecError, Decode},
    v1::{SctList, SignedCertificateTimestamp},
};
use chrono::{DateTime, Utc};
use const_oid::ObjectIdentifier;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use thiserror::Error;
use x509_cert::{
    Certificate as Cert,
    der::{Decode as _, DecodePem, Encode as _},
};

pub(crate) const SCT_LIST_OID: &str = "1.3.6.1.4.1.11129.2.4.2";
pub(crate) const CT_POISON_OID: &str = "1.3.6.1.4.1.11129.2.4.3";
const PRECERT_SIGNING_OID: &str = "1.3.6.1.4.1.11129.2.4.4";

const SCT_LIST: ObjectIdentifier = ObjectIdentifier::new_unwrap(SCT_LIST_OID);
const CT_POISON: ObjectIdentifier = ObjectIdentifier::new_unwrap(CT_POISON_OID);
const EXT_KEY_USAGE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.37");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate(pub(crate) Cert);

impl Certificate {
    pub fn from_der(input: &[u8]) -> Result<Self, CertificateError> {
        Ok(Self(Cert::from_der(input)?))
    }

    pub fn from_pem(input: &str) -> Result<Self, CertificateError> {
        Ok(Self(Cert::from_pem(input.as_bytes())?))
    }

    /// Load every certificate out of a concatenated PEM file, leaf first
    pub fn load_pem_chain(input: &str) -> Result<Vec<Self>, CertificateError> {
        Ok(Cert::load_pem_chain(input.as_bytes())?
            .into_iter()
            .map(Self)
            .collect())
    }

    pub fn to_der(&self) -> Result<Vec<u8>, CertificateError> {
        Ok(self.0.to_der()?)
    }

    /// Borrow the underlying `x509-cert` structure
    pub fn x509(&self) -> &Cert {
        &self.0
    }

    pub(crate) fn tbs_der(&self) -> Result<Vec<u8>, CertificateError> {
        Ok(self.0.tbs_certificate.to_der()?)
    }

    pub(crate) fn spki_der(&self) -> Result<Vec<u8>, CertificateError> {
        Ok(self.0.tbs_certificate.subject_public_key_info.to_der()?)
    }

    /// SHA-256 over the DER encoded `SubjectPublicKeyInfo`
    pub fn public_key_hash(&self) -> Result<[u8; 32], CertificateError> {
        Ok(Sha256::digest(self.spki_der()?).into())
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        DateTime::from(self.0.tbs_certificate.validity.not_before.to_system_time())
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        DateTime::from(self.0.tbs_certificate.validity.not_after.to_system_time())
    }

    pub fn subject_common_name(&self) -> Result<Option<String>, CertificateError> {
        let subject = self.0.tbs_certificate.subject.to_der()?;
        Ok(asn1::common_name(&subject)?)
    }

    fn extension(&self, oid: ObjectIdentifier) -> Option<&[u8]> {
        self.0
            .tbs_certificate
            .extensions
            .as_deref()?
            .iter()
            .find(|extension| extension.extn_id == oid)
            .map(|extension| extension.extn_value.as_bytes())
    }

    pub fn has_embedded_scts(&self) -> bool {
        self.extension(SCT_LIST).is_some()
    }

    /// Whether the certificate carries the RFC 6962 3.1 poison extension
    pub fn is_pre_certificate(&self) -> bool {
        self.extension(CT_POISON).is_some()
    }

    /// Whether this is a certificate the CA delegated precertificate signing to
    pub fn is_precert_signing_cert(&self) -> Result<bool, CertificateError> {
        let Some(eku) = self.extension(EXT_KEY_USAGE) else {
            return Ok(false);
        };

        for purpose in Asn1::read(eku)?.children()? {
            if purpose.oid()? == PRECERT_SIGNING_OID {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Decode the SCTs embedded in the certificate
    ///
    /// The extension value wraps the TLS encoded list in one more OCTET STRING.
    pub fn extract_scts(&self) -> Result<Vec<SignedCertificateTimestamp>, CertificateError> {
        let Some(extension) = self.extension(SCT_LIST) else {
            return Ok(vec![]);
        };

        let list = Asn1::read(extension)?.octet_string()?;
        Ok(SctList::decode(Cursor::new(list))?.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    #[error("Failed to parse a DER encoded certificate: {0}")]
    DerParseError(x509_cert::der::ErrorKind),

    #[error("Failed to decode a value {0}")]
    CodecError(#[from] CodecError),

    #[error("Failed to decode an extension: {0}")]
    Asn1Error(#[from] Asn1Error),

    #[error("The chain does not contain the issuer of the leaf")]
    InvalidChain,

    #[error("The chain uses a precertificate signing certificate but does not include its CA")]
    NoIssuingCa,
}

impl From<x509_cert::der::Error> for CertificateError {
    fn from(value: x509_cert::der::Error) -> Self {
        Self::DerParseError(value.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const CHAIN_3SCTS: &str = include_str!("../../testdata/chain-3scts.pem");
    const CHAIN_NOSCTS: &str = include_str!("../../testdata/chain-noscts.pem");
    const CHAIN_PRECERT_SIGNER: &str = include_str!("../../testdata/chain-precert-signer.pem");

    #[test]
    fn extract_embedded_scts() {
        let chain = Certificate::load_pem_chain(CHAIN_3SCTS).unwrap();
        assert_eq!(chain.len(), 2);

        let leaf = &chain[0];
        assert!(leaf.has_embedded_scts());
        assert!(!chain[1].has_embedded_scts());

        let scts = leaf.extract_scts().unwrap();
        assert_eq!(scts.len(), 3);
        assert_eq!(scts[0].timestamp(), 1748822400000);
    }

    #[test]
    fn certificate_without_scts() {
        let chain = Certificate::load_pem_chain(CHAIN_NOSCTS).unwrap();
        assert!(!chain[0].has_embedded_scts());
        assert_eq!(chain[0].extract_scts().unwrap(), vec![]);
    }

    #[test]
    fn precert_signing_certificate_marker() {
        let chain = Certificate::load_pem_chain(CHAIN_PRECERT_SIGNER).unwrap();
        assert_eq!(chain.len(), 3);

        assert!(!chain[0].is_precert_signing_cert().unwrap());
        assert!(chain[1].is_precert_signing_cert().unwrap());
        assert!(!chain[2].is_precert_signing_cert().unwrap());
    }

    #[test]
    fn validity_and_subject() {
        let chain = Certificate::load_pem_chain(CHAIN_3SCTS).unwrap();
        let leaf = &chain[0];

        assert_eq!(
            leaf.subject_common_name().unwrap().as_deref(),
            Some("example.org")
        );
        assert_eq!(
            leaf.not_before(),
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        );
    }
}
