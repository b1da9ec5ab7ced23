//! A minimal DER decoder over borrowed byte windows
//!
//! Certificates are handled by [`x509_cert`] wherever possible. This module exists for
//! the places where the verifier has to look at raw DER: reading values out of opaque
//! extension payloads, detecting the algorithm of a log key, and reconstructing the
//! precertificate TBS with byte-exact surgery (see [`strip_extensions`]).

use thiserror::Error;

mod header;
mod oid;
mod query;
mod strip;
mod time;

pub use header::{Header, Tag};
pub use query::Query;
pub use strip::strip_extensions;

pub(crate) use query::common_name;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Asn1Error {
    #[error("The input ended in the middle of a tag or length field")]
    TruncatedInput,

    #[error("Tag {0:#04x} uses an unsupported encoding")]
    UnsupportedTag(u8),

    #[error("A length of {length} bytes overruns the remaining {remaining} bytes")]
    LengthOverrun { length: usize, remaining: usize },

    #[error("Indefinite lengths are not allowed in DER")]
    IndefiniteLength,

    #[error("Expected {expected} but found tag {found:#04x}")]
    UnexpectedTag { expected: &'static str, found: u8 },

    #[error("Failed to decode an OBJECT IDENTIFIER")]
    InvalidOid,

    #[error("Failed to decode an INTEGER")]
    InvalidInteger,

    #[error("Failed to decode a string value")]
    InvalidString,

    #[error("Failed to decode a UTCTime or GeneralizedTime value")]
    InvalidTime,

    #[error("No element matches the query")]
    NoSuchElement,
}

/// A single decoded TLV, borrowing the input
///
/// Children of constructed values are only parsed when asked for, so reading one field
/// out of a deeply nested structure touches just the headers on the path to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asn1<'a> {
    header: Header,
    window: &'a [u8],
}

impl<'a> Asn1<'a> {
    /// Decode the TLV starting at the beginning of `bytes`
    ///
    /// Trailing bytes after the value are permitted; use [`Asn1::total_len`] to find
    /// where the value ends.
    pub fn read(bytes: &'a [u8]) -> Result<Self, Asn1Error> {
        let header = header::read_header(bytes)?;
        let total = header.header_len + header.content_len;
        Ok(Self {
            header,
            window: &bytes[..total],
        })
    }

    pub fn tag(&self) -> Tag {
        self.header.tag
    }

    /// The content octets, without tag and length
    pub fn content(&self) -> &'a [u8] {
        &self.window[self.header.header_len..]
    }

    /// The complete encoding, including tag and length
    pub fn encoded(&self) -> &'a [u8] {
        self.window
    }

    pub fn total_len(&self) -> usize {
        self.window.len()
    }

    /// Decode the children of a constructed value
    pub fn children(&self) -> Result<Vec<Asn1<'a>>, Asn1Error> {
        if !self.header.tag.is_constructed() {
            return Err(Asn1Error::UnexpectedTag {
                expected: "a constructed value",
                found: self.header.tag.raw(),
            });
        }

        let mut children = vec![];
        let mut rest = self.content();
        while !rest.is_empty() {
            let child = Asn1::read(rest)?;
            rest = &rest[child.total_len()..];
            children.push(child);
        }
        Ok(children)
    }

    pub fn query(self) -> Query<'a> {
        Query::new(self)
    }

    pub fn boolean(&self) -> Result<bool, Asn1Error> {
        self.expect_tag(Tag::BOOLEAN, "a BOOLEAN")?;
        match self.content() {
            [0x00] => Ok(false),
            [_] => Ok(true),
            _ => Err(Asn1Error::InvalidInteger),
        }
    }

    /// Decode an INTEGER that fits into an `i64`
    pub fn integer(&self) -> Result<i64, Asn1Error> {
        self.expect_tag(Tag::INTEGER, "an INTEGER")?;
        let content = self.content();
        if content.is_empty() || content.len() > 8 {
            return Err(Asn1Error::InvalidInteger);
        }

        let negative = content[0] & 0x80 != 0;
        let mut value: i64 = if negative { -1 } else { 0 };
        for byte in content {
            value = (value << 8) | *byte as i64;
        }
        Ok(value)
    }

    pub fn oid(&self) -> Result<String, Asn1Error> {
        self.expect_tag(Tag::OBJECT_IDENTIFIER, "an OBJECT IDENTIFIER")?;
        oid::decode_oid(self.content())
    }

    pub fn octet_string(&self) -> Result<&'a [u8], Asn1Error> {
        self.expect_tag(Tag::OCTET_STRING, "an OCTET STRING")?;
        Ok(self.content())
    }

    /// Decode a BIT STRING, returning the payload without the unused-bits octet
    pub fn bit_string(&self) -> Result<&'a [u8], Asn1Error> {
        self.expect_tag(Tag::BIT_STRING, "a BIT STRING")?;
        match self.content() {
            [0x00, payload @ ..] => Ok(payload),
            _ => Err(Asn1Error::InvalidString),
        }
    }

    /// Decode a PrintableString or UTF8String
    pub fn string(&self) -> Result<&'a str, Asn1Error> {
        if self.header.tag != Tag::PRINTABLE_STRING && self.header.tag != Tag::UTF8_STRING {
            return Err(Asn1Error::UnexpectedTag {
                expected: "a PrintableString or UTF8String",
                found: self.header.tag.raw(),
            });
        }
        str::from_utf8(self.content()).map_err(|_| Asn1Error::InvalidString)
    }

    /// Decode a UTCTime or GeneralizedTime value as UTC
    pub fn time(&self) -> Result<chrono::DateTime<chrono::Utc>, Asn1Error> {
        time::decode_time(self.header.tag, self.content())
    }

    pub fn is_null(&self) -> bool {
        self.header.tag == Tag::NULL && self.content().is_empty()
    }

    fn expect_tag(&self, tag: Tag, expected: &'static str) -> Result<(), Asn1Error> {
        if self.header.tag != tag {
            return Err(Asn1Error::UnexpectedTag {
                expected,
                found: self.header.tag.raw(),
            });
        }
        Ok(())
    }
}
