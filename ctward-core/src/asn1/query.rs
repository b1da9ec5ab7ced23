use crate::asn1::{Asn1, Asn1Error, Tag};

/// Path-style extraction from a decoded [`Asn1`] value
///
/// Steps compose left to right and the first failure sticks, so a lookup reads as one
/// expression:
///
/// ```ignore
/// let algorithm = Asn1::read(spki_der)?.query().child(0).child(0).oid()?;
/// ```
#[derive(Debug, Clone)]
pub struct Query<'a>(Result<Asn1<'a>, Asn1Error>);

impl<'a> Query<'a> {
    pub(crate) fn new(node: Asn1<'a>) -> Self {
        Self(Ok(node))
    }

    /// Descend into the n-th child of a constructed value
    pub fn child(self, index: usize) -> Self {
        Self(self.0.and_then(|node| {
            node.children()?
                .into_iter()
                .nth(index)
                .ok_or(Asn1Error::NoSuchElement)
        }))
    }

    /// Descend into the first child with the given tag
    pub fn find_tag(self, tag: Tag) -> Self {
        Self(self.0.and_then(|node| {
            node.children()?
                .into_iter()
                .find(|child| child.tag() == tag)
                .ok_or(Asn1Error::NoSuchElement)
        }))
    }

    pub fn node(self) -> Result<Asn1<'a>, Asn1Error> {
        self.0
    }

    pub fn oid(self) -> Result<String, Asn1Error> {
        self.0.and_then(|node| node.oid())
    }

    pub fn string(self) -> Result<&'a str, Asn1Error> {
        self.0.and_then(|node| node.string())
    }

    pub fn octet_string(self) -> Result<&'a [u8], Asn1Error> {
        self.0.and_then(|node| node.octet_string())
    }
}

const COMMON_NAME: &str = "2.5.4.3";

/// Extract the common name out of a DER encoded X.501 `Name`
pub(crate) fn common_name(name_der: &[u8]) -> Result<Option<String>, Asn1Error> {
    let name = Asn1::read(name_der)?;
    for rdn in name.children()? {
        for attribute in rdn.children()? {
            let children = attribute.children()?;
            let [oid, value] = children.as_slice() else {
                continue;
            };
            if oid.oid()? == COMMON_NAME {
                return Ok(Some(value.string()?.to_owned()));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    // SEQUENCE { SET { SEQUENCE { OID 2.5.4.3, PrintableString "example.org" } } }
    const NAME: &[u8] = &[
        0x30, 0x16, 0x31, 0x14, 0x30, 0x12, 0x06, 0x03, 0x55, 0x04, 0x03, 0x13, 0x0B, b'e', b'x',
        b'a', b'm', b'p', b'l', b'e', b'.', b'o', b'r', b'g',
    ];

    #[test]
    fn query_path() {
        let node = Asn1::read(NAME).unwrap();
        assert_eq!(
            node.query().child(0).child(0).child(0).oid().unwrap(),
            "2.5.4.3"
        );
        assert_eq!(
            node.query().child(0).child(0).child(1).string().unwrap(),
            "example.org"
        );
        assert_eq!(
            node.query().child(3).oid(),
            Err(Asn1Error::NoSuchElement)
        );
    }

    #[test]
    fn common_name_lookup() {
        assert_eq!(common_name(NAME).unwrap().as_deref(), Some("example.org"));
    }
}
