//! Field-level wire rules shared by the encoder and the decoder.
//!
//! | Kind           | Layout                                  |
//! |----------------|-----------------------------------------|
//! | String         | u32 length + UTF-8 bytes                |
//! | FixedString(w) | exactly `w` bytes                       |
//! | Bool           | 1 byte, `0` or `1`                      |
//! | Int64          | marker `0x03` + 8 bytes two's complement |
//! | Float64        | marker `0x04` + 8 bytes IEEE-754        |
//! | Container      | u32 self-inclusive length + content     |
//! | Element length | u32 exclusive length                    |
//!
//! All integers are little-endian.

use bytes::{BufMut, BytesMut};
use rsf_error::{RsfResult, rsf_bail, rsf_err};
use rsf_schema::FieldKind;

/// Width of every length and count field.
pub const SIZE_LEN: usize = 4;
/// Width of an encoded boolean.
pub const BOOL_LEN: usize = 1;
/// Width of an encoded integer or float: one marker byte and eight payload bytes.
pub const NUMERIC_LEN: usize = 9;

/// Convert a byte count into a 4-byte length field value.
pub fn size_u32(len: usize, limit: u32) -> RsfResult<u32> {
    u32::try_from(len)
        .ok()
        .filter(|len| *len <= limit)
        .ok_or_else(|| rsf_err!(LengthOverflow: "length {} exceeds the limit of {} bytes", len, limit))
}

/// Append a 4-byte length or count.
pub fn put_size(buf: &mut BytesMut, len: usize, limit: u32) -> RsfResult<()> {
    buf.put_u32_le(size_u32(len, limit)?);
    Ok(())
}

/// Append a length-prefixed string. The prefix excludes itself.
pub fn put_string(buf: &mut BytesMut, value: &str, limit: u32) -> RsfResult<()> {
    put_size(buf, value.len(), limit)?;
    buf.put_slice(value.as_bytes());
    Ok(())
}

/// Append a fixed-width string, which must be exactly `width` bytes long.
pub fn put_fixed_string(buf: &mut BytesMut, value: &str, width: u32) -> RsfResult<()> {
    if u32::try_from(value.len()).ok() != Some(width) {
        rsf_bail!(
            UnsupportedType: "fixed-width string \"{}\" is {} bytes, expected exactly {}",
            value.escape_default(),
            value.len(),
            width
        );
    }
    buf.put_slice(value.as_bytes());
    Ok(())
}

/// Append a boolean.
pub fn put_bool(buf: &mut BytesMut, value: bool) {
    buf.put_u8(u8::from(value));
}

/// Append a 64-bit integer with its marker.
pub fn put_int64(buf: &mut BytesMut, value: i64) {
    buf.put_u8(FieldKind::INT64_TAG);
    buf.put_i64_le(value);
}

/// Append a 64-bit float with its marker.
pub fn put_float64(buf: &mut BytesMut, value: f64) {
    buf.put_u8(FieldKind::FLOAT64_TAG);
    buf.put_f64_le(value);
}

/// Append a container: a self-inclusive length followed by `content`.
pub fn put_block(buf: &mut BytesMut, content: &[u8], limit: u32) -> RsfResult<()> {
    put_size(buf, SIZE_LEN + content.len(), limit)?;
    buf.put_slice(content);
    Ok(())
}

/// Decode a boolean byte.
pub fn bool_from_byte(byte: u8) -> RsfResult<bool> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => rsf_bail!(MalformedField: "boolean byte must be 0 or 1, found {}", other),
    }
}

fn numeric_payload(bytes: [u8; NUMERIC_LEN], marker: u8, name: &str) -> RsfResult<[u8; 8]> {
    let [found, payload @ ..] = bytes;
    if found != marker {
        rsf_bail!(MalformedField: "expected {} marker {}, found {}", name, marker, found);
    }
    Ok(payload)
}

/// Decode an integer field, checking its marker.
pub fn int64_from_bytes(bytes: [u8; NUMERIC_LEN]) -> RsfResult<i64> {
    numeric_payload(bytes, FieldKind::INT64_TAG, "int64").map(i64::from_le_bytes)
}

/// Decode a float field, checking its marker.
pub fn float64_from_bytes(bytes: [u8; NUMERIC_LEN]) -> RsfResult<f64> {
    numeric_payload(bytes, FieldKind::FLOAT64_TAG, "float64").map(f64::from_le_bytes)
}

/// Decode UTF-8 text read from a string field.
pub fn string_from_bytes(bytes: Vec<u8>) -> RsfResult<String> {
    String::from_utf8(bytes).map_err(|e| rsf_err!(MalformedField: "string is not UTF-8: {}", e))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn string_layout() {
        let mut buf = BytesMut::new();
        put_string(&mut buf, "posit", u32::MAX).unwrap();
        assert_eq!(buf.as_ref(), b"\x05\x00\x00\x00posit");
    }

    #[test]
    fn fixed_string_checks_width() {
        let mut buf = BytesMut::new();
        put_fixed_string(&mut buf, "2020-10-01", 10).unwrap();
        assert_eq!(buf.len(), 10);
        assert!(
            put_fixed_string(&mut buf, "2020-1-01", 10)
                .unwrap_err()
                .is_unsupported_type()
        );
    }

    #[test]
    fn block_is_self_inclusive() {
        let mut buf = BytesMut::new();
        put_block(&mut buf, b"abc", u32::MAX).unwrap();
        assert_eq!(buf.as_ref(), b"\x07\x00\x00\x00abc");
    }

    #[test]
    fn limit_is_enforced() {
        let mut buf = BytesMut::new();
        let err = put_block(&mut buf, &[0u8; 16], 16).unwrap_err();
        assert!(matches!(err, rsf_error::RsfError::LengthOverflow(..)));
    }

    #[rstest]
    #[case(0)]
    #[case(55)]
    #[case(-1)]
    #[case(i64::MIN)]
    #[case(i64::MAX)]
    fn int64_layout(#[case] value: i64) {
        let mut buf = BytesMut::new();
        put_int64(&mut buf, value);
        assert_eq!(buf.len(), NUMERIC_LEN);
        let bytes: [u8; NUMERIC_LEN] = buf.as_ref().try_into().unwrap();
        assert_eq!(int64_from_bytes(bytes).unwrap(), value);
    }

    #[test]
    fn numeric_markers_are_checked() {
        let mut buf = BytesMut::new();
        put_float64(&mut buf, 92.689);
        let bytes: [u8; NUMERIC_LEN] = buf.as_ref().try_into().unwrap();
        assert_eq!(float64_from_bytes(bytes).unwrap(), 92.689);
        assert!(int64_from_bytes(bytes).unwrap_err().is_malformed());
    }

    #[rstest]
    #[case(0, Some(false))]
    #[case(1, Some(true))]
    #[case(2, None)]
    fn bool_bytes(#[case] byte: u8, #[case] expected: Option<bool>) {
        assert_eq!(bool_from_byte(byte).ok(), expected);
    }
}
