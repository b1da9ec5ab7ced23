use std::io::{Read, Write};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("There is no variant with the discriminant {1} in {0}")]
    UnknownVariant(&'static str, u64),

    #[error("A length of {read} bytes does not fit into a {expected} byte prefix")]
    UnexpectedSize { read: usize, expected: usize },

    #[error("A vector of {received} bytes exceeds the maximum of {max} bytes")]
    VectorTooLong { received: usize, max: usize },

    #[error("I/O error while en- or decoding: {0:?}")]
    IoError(std::io::ErrorKind),
}

impl From<std::io::Error> for CodecError {
    fn from(value: std::io::Error) -> Self {
        CodecError::IoError(value.kind())
    }
}

pub(crate) trait Encode {
    fn encode(&self, writer: impl Write) -> Result<(), CodecError>;

    fn encode_to_vec(&self) -> Result<Vec<u8>, CodecError> {
        let mut buf = vec![];
        self.encode(&mut buf)?;
        Ok(buf)
    }
}

pub(crate) trait Decode
where
    Self: Sized,
{
    fn decode(reader: impl Read) -> Result<Self, CodecError>;
}

impl Encode for u8 {
    fn encode(&self, mut writer: impl Write) -> Result<(), CodecError> {
        Ok(writer.write_all(&self.to_be_bytes())?)
    }
}

impl Decode for u8 {
    fn decode(mut reader: impl Read) -> Result<Self, CodecError> {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;
        Ok(u8::from_be_bytes(buf))
    }
}

impl Encode for u16 {
    fn encode(&self, mut writer: impl Write) -> Result<(), CodecError> {
        Ok(writer.write_all(&self.to_be_bytes())?)
    }
}

impl Decode for u16 {
    fn decode(mut reader: impl Read) -> Result<Self, CodecError> {
        let mut buf = [0u8; 2];
        reader.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }
}

impl Encode for u32 {
    fn encode(&self, mut writer: impl Write) -> Result<(), CodecError> {
        Ok(writer.write_all(&self.to_be_bytes())?)
    }
}

impl Decode for u32 {
    fn decode(mut reader: impl Read) -> Result<Self, CodecError> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }
}

impl Encode for u64 {
    fn encode(&self, mut writer: impl Write) -> Result<(), CodecError> {
        Ok(writer.write_all(&self.to_be_bytes())?)
    }
}

impl Decode for u64 {
    fn decode(mut reader: impl Read) -> Result<Self, CodecError> {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode(&self, mut writer: impl Write) -> Result<(), CodecError> {
        Ok(writer.write_all(self)?)
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(mut reader: impl Read) -> Result<Self, CodecError> {
        let mut buf = [0u8; N];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Wraps a reader and counts the bytes handed out
///
/// Lists in the TLS presentation language are bounded by a byte length rather than an
/// element count, so a list decoder needs to know how far it has read.
pub(crate) struct MeteredRead<R> {
    inner: R,
    consumed: usize,
}

impl<R> MeteredRead<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    pub(crate) fn consumed(&self) -> usize {
        self.consumed
    }
}

impl<R: Read> Read for MeteredRead<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.consumed += read;
        Ok(read)
    }
}
