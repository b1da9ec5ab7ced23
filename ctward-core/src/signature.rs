//! The `digitally-signed` struct carried inside every SCT

use crate::{
    log_server::LogKey,
    utils::{
        codec::{CodecError, Decode, Encode},
        vec::CodecVec,
    },
};
use p256::ecdsa::{Signature as EcdsaSignature, signature::Verifier};
use rsa::pkcs1v15;
use sha2::Sha256;
use std::{
    fmt::Display,
    io::{Read, Write},
};
use thiserror::Error;

/// See RFC 5246 4.7
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitallySigned {
    hash: HashAlgorithm,
    signature_algorithm: SignatureAlgorithm,
    signature: CodecVec<u16>,
}

impl DigitallySigned {
    pub fn new(
        hash: HashAlgorithm,
        signature_algorithm: SignatureAlgorithm,
        signature: Vec<u8>,
    ) -> Self {
        Self {
            hash,
            signature_algorithm,
            signature: signature.into(),
        }
    }

    /// Verify `data` against a log key
    ///
    /// Only SHA-256 with ECDSA or RSA is accepted, which is everything RFC 6962 2.1.4
    /// allows a log to use.
    pub fn validate(&self, data: &[u8], key: &LogKey) -> Result<(), SignatureValidationError> {
        if self.hash != HashAlgorithm::Sha256 {
            return Err(SignatureValidationError::UnsupportedHashAlgorithm(
                self.hash,
            ));
        }

        match (self.signature_algorithm, key) {
            (SignatureAlgorithm::Ecdsa, LogKey::Ecdsa(verifying_key)) => {
                let signature = EcdsaSignature::from_der(self.signature.as_ref())
                    .map_err(|_| SignatureValidationError::MalformedSignature)?;

                verifying_key
                    .verify(data, &signature)
                    .map_err(|_| SignatureValidationError::InvalidSignature)
            }
            (SignatureAlgorithm::Rsa, LogKey::Rsa(public_key)) => {
                let signature = pkcs1v15::Signature::try_from(self.signature.as_ref())
                    .map_err(|_| SignatureValidationError::MalformedSignature)?;

                pkcs1v15::VerifyingKey::<Sha256>::new(public_key.clone())
                    .verify(data, &signature)
                    .map_err(|_| SignatureValidationError::InvalidSignature)
            }
            (algorithm, _) => Err(SignatureValidationError::UnsupportedSignatureAlgorithm(
                algorithm,
            )),
        }
    }
}

impl Encode for DigitallySigned {
    fn encode(&self, mut writer: impl Write) -> Result<(), CodecError> {
        self.hash.encode(&mut writer)?;
        self.signature_algorithm.encode(&mut writer)?;
        self.signature.encode(&mut writer)?;
        Ok(())
    }
}

impl Decode for DigitallySigned {
    fn decode(mut reader: impl Read) -> Result<Self, CodecError> {
        Ok(Self {
            hash: HashAlgorithm::decode(&mut reader)?,
            signature_algorithm: SignatureAlgorithm::decode(&mut reader)?,
            signature: CodecVec::decode(&mut reader)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureValidationError {
    #[error("The hash algorithm {0} is not supported by the implementation")]
    UnsupportedHashAlgorithm(HashAlgorithm),

    #[error("The signature algorithm {0} does not match the key of the log")]
    UnsupportedSignatureAlgorithm(SignatureAlgorithm),

    #[error("The signature could not be parsed for the specified signature algorithm")]
    MalformedSignature,

    #[error("The signature verification failed")]
    InvalidSignature,

    #[error("Error encoding a value: {0}")]
    CodecError(#[from] CodecError),
}

/// See RFC 5246 7.4.1.4.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HashAlgorithm {
    None,
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl Encode for HashAlgorithm {
    fn encode(&self, mut writer: impl Write) -> Result<(), CodecError> {
        let discriminant = match self {
            HashAlgorithm::None => 0,
            HashAlgorithm::Md5 => 1,
            HashAlgorithm::Sha1 => 2,
            HashAlgorithm::Sha224 => 3,
            HashAlgorithm::Sha256 => 4,
            HashAlgorithm::Sha384 => 5,
            HashAlgorithm::Sha512 => 6,
        };
        Ok(writer.write_all(&[discriminant])?)
    }
}

impl Decode for HashAlgorithm {
    fn decode(mut reader: impl Read) -> Result<Self, CodecError> {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;

        match buf[0] {
            0 => Ok(HashAlgorithm::None),
            1 => Ok(HashAlgorithm::Md5),
            2 => Ok(HashAlgorithm::Sha1),
            3 => Ok(HashAlgorithm::Sha224),
            4 => Ok(HashAlgorithm::Sha256),
            5 => Ok(HashAlgorithm::Sha384),
            6 => Ok(HashAlgorithm::Sha512),
            x => Err(CodecError::UnknownVariant("HashAlgorithm", x as u64)),
        }
    }
}

impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithm::None => write!(f, "None"),
            HashAlgorithm::Md5 => write!(f, "Md5"),
            HashAlgorithm::Sha1 => write!(f, "Sha1"),
            HashAlgorithm::Sha224 => write!(f, "Sha224"),
            HashAlgorithm::Sha256 => write!(f, "Sha256"),
            HashAlgorithm::Sha384 => write!(f, "Sha384"),
            HashAlgorithm::Sha512 => write!(f, "Sha512"),
        }
    }
}

/// See RFC 5246 7.4.1.4.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SignatureAlgorithm {
    Anonymous,
    Rsa,
    Dsa,
    Ecdsa,
}

impl Encode for SignatureAlgorithm {
    fn encode(&self, mut writer: impl Write) -> Result<(), CodecError> {
        let discriminant = match self {
            SignatureAlgorithm::Anonymous => 0,
            SignatureAlgorithm::Rsa => 1,
            SignatureAlgorithm::Dsa => 2,
            SignatureAlgorithm::Ecdsa => 3,
        };
        Ok(writer.write_all(&[discriminant])?)
    }
}

impl Decode for SignatureAlgorithm {
    fn decode(mut reader: impl Read) -> Result<Self, CodecError> {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;

        match buf[0] {
            0 => Ok(SignatureAlgorithm::Anonymous),
            1 => Ok(SignatureAlgorithm::Rsa),
            2 => Ok(SignatureAlgorithm::Dsa),
            3 => Ok(SignatureAlgorithm::Ecdsa),
            x => Err(CodecError::UnknownVariant("SignatureAlgorithm", x as u64)),
        }
    }
}

impl Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureAlgorithm::Anonymous => write!(f, "Anonymous"),
            SignatureAlgorithm::Rsa => write!(f, "Rsa"),
            SignatureAlgorithm::Dsa => write!(f, "Dsa"),
            SignatureAlgorithm::Ecdsa => write!(f, "Ecdsa"),
        }
    }
}
