use crate::{
    Certificate, CertificateError,
    asn1::strip_extensions,
    cert::{CT_POISON_OID, SCT_LIST_OID},
    v1,
};
use sha2::{Digest, Sha256};

/// A chain of trust as presented by TLS
///
/// The leaf comes first, followed by the certificate that issued it. When the leaf was
/// logged as a precertificate, the issuer (or the CA behind a dedicated precertificate
/// signing certificate) is what anchors the signed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateChain(Vec<Certificate>);

impl CertificateChain {
    pub fn new(certs: Vec<Certificate>) -> Result<Self, CertificateError> {
        if certs.is_empty() {
            return Err(CertificateError::InvalidChain);
        }
        Ok(Self(certs))
    }

    pub fn from_pem_chain(input: &str) -> Result<Self, CertificateError> {
        Self::new(Certificate::load_pem_chain(input)?)
    }

    pub fn leaf(&self) -> &Certificate {
        &self.0[0]
    }

    pub fn certs(&self) -> &[Certificate] {
        &self.0
    }

    /// Reconstruct the log entry the SCTs of the leaf were issued over
    ///
    /// A leaf with embedded SCTs (or the poison extension) was logged as a
    /// precertificate: the entry carries the hash of the issuing CAs public key and
    /// the TBS with the CT extensions removed. Anything else was logged as a plain
    /// X.509 entry.
    pub(crate) fn as_log_entry(&self) -> Result<v1::LogEntry, CertificateError> {
        let leaf = self.leaf();
        if !leaf.has_embedded_scts() && !leaf.is_pre_certificate() {
            return Ok(v1::LogEntry::X509(leaf.to_der()?.into()));
        }

        let issuer = self.0.get(1).ok_or(CertificateError::InvalidChain)?;

        // With a precertificate signing certificate in between, the entry is bound to
        // the CA that issued the signing certificate. See RFC 6962 3.2.
        let key_holder = if issuer.is_precert_signing_cert()? {
            self.0.get(2).ok_or(CertificateError::NoIssuingCa)?
        } else {
            issuer
        };

        let issuer_key_hash: [u8; 32] = Sha256::digest(key_holder.spki_der()?).into();
        let tbs_certificate =
            strip_extensions(&leaf.tbs_der()?, &[SCT_LIST_OID, CT_POISON_OID])?;

        Ok(v1::LogEntry::PreCert(v1::PreCert {
            issuer_key_hash,
            tbs_certificate: tbs_certificate.into(),
        }))
    }
}
