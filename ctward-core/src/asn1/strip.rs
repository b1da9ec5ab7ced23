use crate::asn1::{Asn1, Asn1Error, Tag, header};

/// Remove extensions from a raw DER encoded `TBSCertificate`
///
/// The log signed the precertificate TBS without the embedded SCT list (and without
/// the poison extension), so verification has to reproduce those exact bytes. Working
/// on the raw encoding keeps every untouched field byte-identical; only the extension
/// list, its `[3]` wrapper and the outer SEQUENCE get their lengths recomputed.
///
/// An extension list that becomes empty is omitted entirely, as RFC 5280 requires.
pub fn strip_extensions(tbs_der: &[u8], remove: &[&str]) -> Result<Vec<u8>, Asn1Error> {
    let tbs = Asn1::read(tbs_der)?;
    if tbs.tag() != Tag::SEQUENCE {
        return Err(Asn1Error::UnexpectedTag {
            expected: "a TBSCertificate SEQUENCE",
            found: tbs.tag().raw(),
        });
    }

    let mut content = Vec::with_capacity(tbs_der.len());
    for child in tbs.children()? {
        if child.tag() != Tag::context_specific(3) {
            content.extend_from_slice(child.encoded());
            continue;
        }

        let extension_list = child.query().child(0).node()?;
        let mut kept = vec![];
        for extension in extension_list.children()? {
            let oid = extension.query().child(0).oid()?;
            if !remove.contains(&oid.as_str()) {
                kept.extend_from_slice(extension.encoded());
            }
        }

        if kept.is_empty() {
            continue;
        }

        let mut wrapped = vec![];
        header::write_header(Tag::SEQUENCE, kept.len(), &mut wrapped);
        wrapped.extend_from_slice(&kept);

        header::write_header(Tag::context_specific(3), wrapped.len(), &mut content);
        content.extend_from_slice(&wrapped);
    }

    let mut out = Vec::with_capacity(content.len() + 4);
    header::write_header(Tag::SEQUENCE, content.len(), &mut out);
    out.extend_from_slice(&content);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tlv(tag: Tag, content: &[u8]) -> Vec<u8> {
        let mut out = vec![];
        header::write_header(tag, content.len(), &mut out);
        out.extend_from_slice(content);
        out
    }

    fn extension(oid_content: &[u8], value: &[u8]) -> Vec<u8> {
        let mut content = tlv(Tag::OBJECT_IDENTIFIER, oid_content);
        content.extend(tlv(Tag::OCTET_STRING, value));
        tlv(Tag::SEQUENCE, &content)
    }

    fn tbs(serial: &[u8], extensions: &[Vec<u8>]) -> Vec<u8> {
        let mut content = tlv(Tag::INTEGER, serial);
        if !extensions.is_empty() {
            let list = tlv(Tag::SEQUENCE, &extensions.concat());
            content.extend(tlv(Tag::context_specific(3), &list));
        }
        tlv(Tag::SEQUENCE, &content)
    }

    // id-ce-basicConstraints and the SCT list extension
    const BASIC_CONSTRAINTS: &[u8] = &[0x55, 0x1D, 0x13];
    const SCT_LIST: &[u8] = &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xD6, 0x79, 0x02, 0x04, 0x02];

    #[test]
    fn removes_one_extension_and_keeps_the_rest() {
        let keep = extension(BASIC_CONSTRAINTS, &[0x01]);
        let drop = extension(SCT_LIST, &[0x02; 200]);

        let input = tbs(&[0x05], &[keep.clone(), drop]);
        let expected = tbs(&[0x05], &[keep]);

        let stripped = strip_extensions(&input, &["1.3.6.1.4.1.11129.2.4.2"]).unwrap();
        assert_eq!(stripped, expected);
    }

    #[test]
    fn recomputes_lengths_across_the_long_form_boundary() {
        // Dropping the big extension shrinks the outer lengths from long to short form
        let keep = extension(BASIC_CONSTRAINTS, &[0x01]);
        let drop = extension(SCT_LIST, &[0x02; 300]);

        let input = tbs(&[0x05], &[keep.clone(), drop.clone()]);
        assert!(input.len() > 0x80 + 2);

        let stripped = strip_extensions(&input, &["1.3.6.1.4.1.11129.2.4.2"]).unwrap();
        assert_eq!(stripped, tbs(&[0x05], &[keep]));
    }

    #[test]
    fn empty_extension_list_is_omitted() {
        let drop = extension(SCT_LIST, &[0x02]);
        let input = tbs(&[0x05], &[drop]);

        let stripped = strip_extensions(&input, &["1.3.6.1.4.1.11129.2.4.2"]).unwrap();
        assert_eq!(stripped, tbs(&[0x05], &[]));
    }

    #[test]
    fn untouched_input_round_trips() {
        let keep = extension(BASIC_CONSTRAINTS, &[0x01]);
        let input = tbs(&[0x05], &[keep]);

        let stripped = strip_extensions(&input, &["1.3.6.1.4.1.11129.2.4.3"]).unwrap();
        assert_eq!(stripped, input);
    }
}
