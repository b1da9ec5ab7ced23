use crate::{
    Version,
    signature::DigitallySigned,
    utils::{
        codec::{CodecError, Decode, Encode, MeteredRead},
        vec::CodecVec,
    },
    v1::{LogEntry, SignatureType},
};
use std::io::{Read, Write};

/// See RFC 6962 3.2
///
/// The embedded extension value is an outer `u16` prefixed list of `u16` prefixed
/// serialized SCTs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SctList(Vec<SignedCertificateTimestamp>);

impl SctList {
    pub fn into_inner(self) -> Vec<SignedCertificateTimestamp> {
        self.0
    }
}

impl Decode for SctList {
    fn decode(mut reader: impl Read) -> Result<Self, CodecError> {
        let length = u16::decode(&mut reader)?.into();
        let mut scts = vec![];

        let mut reader = MeteredRead::new(reader);

        while reader.consumed() < length {
            let _len = u16::decode(&mut reader)?;
            let sct = SignedCertificateTimestamp::decode(&mut reader)?;
            scts.push(sct);
        }

        Ok(Self(scts))
    }
}

/// See RFC 6962 3.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificateTimestamp {
    sct_version: Version,
    id: [u8; 32],
    timestamp: u64,
    extensions: CodecVec<u16>,
    signature: DigitallySigned,
}

impl SignedCertificateTimestamp {
    pub fn new(
        sct_version: Version,
        id: [u8; 32],
        timestamp: u64,
        extensions: Vec<u8>,
        signature: DigitallySigned,
    ) -> Self {
        Self {
            sct_version,
            id,
            timestamp,
            extensions: extensions.into(),
            signature,
        }
    }

    pub fn log_id(&self) -> [u8; 32] {
        self.id
    }

    /// Milliseconds since the epoch, as carried on the wire
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn signature(&self) -> &DigitallySigned {
        &self.signature
    }

    /// The `certificate_timestamp` structure the log signed over this SCT
    pub(crate) fn signed_payload(&self, entry: LogEntry) -> CertificateTimestamp {
        CertificateTimestamp {
            sct_version: self.sct_version,
            timestamp: self.timestamp,
            entry,
            extensions: self.extensions.clone(),
        }
    }
}

impl Encode for SignedCertificateTimestamp {
    fn encode(&self, mut writer: impl Write) -> Result<(), CodecError> {
        self.sct_version.encode(&mut writer)?;
        self.id.encode(&mut writer)?;
        self.timestamp.encode(&mut writer)?;
        self.extensions.encode(&mut writer)?;
        self.signature.encode(&mut writer)?;
        Ok(())
    }
}

impl Decode for SignedCertificateTimestamp {
    fn decode(mut reader: impl Read) -> Result<Self, CodecError> {
        Ok(Self {
            sct_version: Version::decode(&mut reader)?,
            id: <[u8; 32]>::decode(&mut reader)?,
            timestamp: u64::decode(&mut reader)?,
            extensions: CodecVec::decode(&mut reader)?,
            signature: DigitallySigned::decode(&mut reader)?,
        })
    }
}

/// See RFC 6962 3.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CertificateTimestamp {
    sct_version: Version,
    // SignatureType signature_type = certificate_timestamp;
    timestamp: u64,
    entry: LogEntry,
    extensions: CodecVec<u16>,
}

impl Encode for CertificateTimestamp {
    fn encode(&self, mut writer: impl Write) -> Result<(), CodecError> {
        self.sct_version.encode(&mut writer)?;
        SignatureType::CertificateTimestamp.encode(&mut writer)?;
        self.timestamp.encode(&mut writer)?;
        self.entry.encode(&mut writer)?;
        self.extensions.encode(&mut writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{HashAlgorithm, SignatureAlgorithm};
    use std::io::Cursor;

    fn serialized_sct(timestamp: u64) -> Vec<u8> {
        let mut bytes = vec![0x00]; // v1
        bytes.extend_from_slice(&[0xAA; 32]); // log id
        bytes.extend_from_slice(&timestamp.to_be_bytes());
        bytes.extend_from_slice(&[0x00, 0x00]); // no extensions
        bytes.extend_from_slice(&[0x04, 0x03]); // sha256, ecdsa
        bytes.extend_from_slice(&[0x00, 0x03, 0x01, 0x02, 0x03]);
        bytes
    }

    #[test]
    fn decode_single_sct() {
        let sct =
            SignedCertificateTimestamp::decode(Cursor::new(serialized_sct(1748822400000))).unwrap();

        assert_eq!(sct.log_id(), [0xAA; 32]);
        assert_eq!(sct.timestamp(), 1748822400000);
        assert_eq!(
            sct,
            SignedCertificateTimestamp::new(
                Version::V1,
                [0xAA; 32],
                1748822400000,
                vec![],
                DigitallySigned::new(
                    HashAlgorithm::Sha256,
                    SignatureAlgorithm::Ecdsa,
                    vec![0x01, 0x02, 0x03]
                ),
            )
        );
    }

    #[test]
    fn decode_sct_list() {
        let first = serialized_sct(1);
        let second = serialized_sct(2);

        let mut bytes = vec![];
        let total = first.len() + second.len() + 4;
        bytes.extend_from_slice(&(total as u16).to_be_bytes());
        for sct in [&first, &second] {
            bytes.extend_from_slice(&(sct.len() as u16).to_be_bytes());
            bytes.extend_from_slice(sct);
        }

        let scts = SctList::decode(Cursor::new(bytes)).unwrap().into_inner();
        assert_eq!(scts.len(), 2);
        assert_eq!(scts[0].timestamp(), 1);
        assert_eq!(scts[1].timestamp(), 2);
    }

    #[test]
    fn truncated_sct_is_rejected() {
        let mut bytes = serialized_sct(1);
        bytes.truncate(bytes.len() - 1);
        assert!(SignedCertificateTimestamp::decode(Cursor::new(bytes)).is_err());
    }

    #[test]
    fn payload_encoding_layout() {
        let sct =
            SignedCertificateTimestamp::decode(Cursor::new(serialized_sct(0x0102030405060708)))
                .unwrap();
        let payload = sct.signed_payload(LogEntry::X509(vec![0xC0, 0xFF, 0xEE].into()));
        let encoded = payload.encode_to_vec().unwrap();

        let mut expected = vec![0x00, 0x00]; // version, signature type
        expected.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        expected.extend_from_slice(&[0x00, 0x00]); // entry type: x509_entry
        expected.extend_from_slice(&[0x00, 0x00, 0x03, 0xC0, 0xFF, 0xEE]);
        expected.extend_from_slice(&[0x00, 0x00]); // no extensions
        assert_eq!(encoded, expected);
    }
}
