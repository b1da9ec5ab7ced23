use crate::asn1::Asn1Error;
use std::fmt::Write;

/// Decode the content octets of an OBJECT IDENTIFIER into dotted-decimal form
///
/// Arcs are accumulated in a `u128`, which is wide enough for every identifier that
/// appears in certificates while still rejecting absurd continuations.
pub(crate) fn decode_oid(content: &[u8]) -> Result<String, Asn1Error> {
    let [first, rest @ ..] = content else {
        return Err(Asn1Error::InvalidOid);
    };

    let mut oid = String::new();
    match first {
        byte if *byte < 40 => write!(oid, "0.{byte}"),
        byte if *byte < 80 => write!(oid, "1.{}", byte - 40),
        byte => write!(oid, "2.{}", *byte as u32 - 80),
    }
    .map_err(|_| Asn1Error::InvalidOid)?;

    let mut arc: u128 = 0;
    for byte in rest {
        arc = arc.checked_mul(128).ok_or(Asn1Error::InvalidOid)? | (byte & 0x7F) as u128;
        if byte & 0x80 == 0 {
            write!(oid, ".{arc}").map_err(|_| Asn1Error::InvalidOid)?;
            arc = 0;
        }
    }

    // A set continuation bit on the last octet means the value was cut off
    if content.last().is_some_and(|byte| byte & 0x80 != 0) {
        return Err(Asn1Error::InvalidOid);
    }

    Ok(oid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_identifiers() {
        // id-ce-extKeyUsage
        assert_eq!(decode_oid(&[0x55, 0x1D, 0x25]).unwrap(), "2.5.29.37");
        // The embedded SCT list extension
        assert_eq!(
            decode_oid(&[0x2B, 0x06, 0x01, 0x04, 0x01, 0xD6, 0x79, 0x02, 0x04, 0x02]).unwrap(),
            "1.3.6.1.4.1.11129.2.4.2"
        );
    }

    #[test]
    fn truncated_arc_is_rejected() {
        assert_eq!(decode_oid(&[0x2B, 0x86]), Err(Asn1Error::InvalidOid));
        assert_eq!(decode_oid(&[]), Err(Asn1Error::InvalidOid));
    }
}
