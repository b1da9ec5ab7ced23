use crate::utils::{
    codec::{CodecError, Decode, Encode},
    vec::CodecVecLen,
};
use std::io::{Read, Write};

/// A big endian `uint24`
///
/// RFC 6962 carries certificates as `opaque ASN.1Cert<1..2^24-1>`, so their length
/// prefix does not fit any native integer width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct U24(u32);

impl U24 {
    const MAX_VALUE: u32 = (1 << 24) - 1;
}

impl Encode for U24 {
    fn encode(&self, mut writer: impl Write) -> Result<(), CodecError> {
        let bytes = self.0.to_be_bytes();
        Ok(writer.write_all(&bytes[1..])?)
    }
}

impl Decode for U24 {
    fn decode(mut reader: impl Read) -> Result<Self, CodecError> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf[1..])?;
        Ok(Self(u32::from_be_bytes(buf)))
    }
}

impl TryFrom<usize> for U24 {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if value <= Self::MAX_VALUE as usize {
            Ok(Self(value as u32))
        } else {
            Err(())
        }
    }
}

impl TryInto<usize> for U24 {
    type Error = ();

    fn try_into(self) -> Result<usize, Self::Error> {
        self.0.try_into().map_err(|_| ())
    }
}

impl CodecVecLen for U24 {
    const MAX: usize = 3;
}
