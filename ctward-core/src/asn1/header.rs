use crate::asn1::Asn1Error;

/// A DER tag octet
///
/// Multi-octet tag numbers never occur in X.509 and are rejected while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag(u8);

impl Tag {
    pub const BOOLEAN: Tag = Tag(0x01);
    pub const INTEGER: Tag = Tag(0x02);
    pub const BIT_STRING: Tag = Tag(0x03);
    pub const OCTET_STRING: Tag = Tag(0x04);
    pub const NULL: Tag = Tag(0x05);
    pub const OBJECT_IDENTIFIER: Tag = Tag(0x06);
    pub const UTF8_STRING: Tag = Tag(0x0C);
    pub const PRINTABLE_STRING: Tag = Tag(0x13);
    pub const UTC_TIME: Tag = Tag(0x17);
    pub const GENERALIZED_TIME: Tag = Tag(0x18);
    pub const SEQUENCE: Tag = Tag(0x30);
    pub const SET: Tag = Tag(0x31);

    /// A constructed context-specific tag, e.g. the `[3]` around the extension list
    pub const fn context_specific(number: u8) -> Tag {
        Tag(0xA0 | number)
    }

    pub fn raw(&self) -> u8 {
        self.0
    }

    pub fn is_constructed(&self) -> bool {
        self.0 & 0x20 != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: Tag,
    pub header_len: usize,
    pub content_len: usize,
}

pub(crate) fn read_header(bytes: &[u8]) -> Result<Header, Asn1Error> {
    let [tag, first_len, ..] = bytes else {
        return Err(Asn1Error::TruncatedInput);
    };

    if tag & 0x1F == 0x1F {
        return Err(Asn1Error::UnsupportedTag(*tag));
    }
    let tag = Tag(*tag);

    let (header_len, content_len) = if first_len & 0x80 == 0 {
        (2, *first_len as usize)
    } else {
        let count = (first_len & 0x7F) as usize;
        if count == 0 {
            return Err(Asn1Error::IndefiniteLength);
        }
        if count > size_of::<usize>() || bytes.len() < 2 + count {
            return Err(Asn1Error::TruncatedInput);
        }

        let mut len = 0usize;
        for byte in &bytes[2..2 + count] {
            len = (len << 8) | *byte as usize;
        }
        (2 + count, len)
    };

    if content_len > bytes.len() - header_len {
        return Err(Asn1Error::LengthOverrun {
            length: content_len,
            remaining: bytes.len() - header_len,
        });
    }

    Ok(Header {
        tag,
        header_len,
        content_len,
    })
}

/// Write a tag and a minimally encoded DER length
pub(crate) fn write_header(tag: Tag, content_len: usize, out: &mut Vec<u8>) {
    out.push(tag.0);

    if content_len < 0x80 {
        out.push(content_len as u8);
        return;
    }

    let bytes = content_len.to_be_bytes();
    let skip = bytes.iter().take_while(|byte| **byte == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_forms() {
        let header = read_header(&[0x30, 0x7F, 0x00][..]);
        assert!(matches!(
            header,
            Err(Asn1Error::LengthOverrun {
                length: 127,
                remaining: 1
            })
        ));

        let mut bytes = vec![0x30, 0x7F];
        bytes.extend(std::iter::repeat_n(0x00, 127));
        let header = read_header(&bytes).unwrap();
        assert_eq!((header.header_len, header.content_len), (2, 127));
    }

    #[test]
    fn written_lengths_are_minimal() {
        let mut out = vec![];
        write_header(Tag::SEQUENCE, 0x7F, &mut out);
        assert_eq!(out, vec![0x30, 0x7F]);

        let mut out = vec![];
        write_header(Tag::SEQUENCE, 0x80, &mut out);
        assert_eq!(out, vec![0x30, 0x81, 0x80]);

        let mut out = vec![];
        write_header(Tag::SEQUENCE, 0x101, &mut out);
        assert_eq!(out, vec![0x30, 0x82, 0x01, 0x01]);
    }
}
