use crate::asn1::{Asn1Error, Tag};
use chrono::{DateTime, TimeZone, Utc};

/// Decode a UTCTime (`YYMMDDHHMMSSZ`) or GeneralizedTime (`YYYYMMDDHHMMSSZ`) value
///
/// DER requires the seconds field and the `Z` suffix, so these are the only two shapes
/// that occur in certificates. See RFC 5280 4.1.2.5.
pub(crate) fn decode_time(tag: Tag, content: &[u8]) -> Result<DateTime<Utc>, Asn1Error> {
    let text = str::from_utf8(content).map_err(|_| Asn1Error::InvalidTime)?;

    let (year, rest) = match tag {
        Tag::UTC_TIME if text.len() == 13 => {
            let year: i32 = parse_digits(&text[0..2])?;
            // RFC 5280 4.1.2.5.1: values below 50 are in the 2000s
            let year = if year < 50 { 2000 + year } else { 1900 + year };
            (year, &text[2..])
        }
        Tag::GENERALIZED_TIME if text.len() == 15 => (parse_digits(&text[0..4])?, &text[4..]),
        _ => return Err(Asn1Error::InvalidTime),
    };

    if !rest.ends_with('Z') {
        return Err(Asn1Error::InvalidTime);
    }

    Utc.with_ymd_and_hms(
        year,
        parse_digits(&rest[0..2])?,
        parse_digits(&rest[2..4])?,
        parse_digits(&rest[4..6])?,
        parse_digits(&rest[6..8])?,
        parse_digits(&rest[8..10])?,
    )
    .single()
    .ok_or(Asn1Error::InvalidTime)
}

fn parse_digits<T: std::str::FromStr>(text: &str) -> Result<T, Asn1Error> {
    if !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(Asn1Error::InvalidTime);
    }
    text.parse().map_err(|_| Asn1Error::InvalidTime)
}
