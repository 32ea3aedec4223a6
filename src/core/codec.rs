use miette::{Result, miette};

use crate::{
    common::error::TypeMismatch,
    core::types::{FieldKind, FieldValue},
};

/// Checks a value against the kind declared for its field.
///
/// Returns the value unchanged when its kind equals `declared` or when it is
/// an explicit null. No coercion is attempted: a numeric string is not a
/// Number.
///
/// # Example
///
/// ```
/// use rowstore::{FieldKind, FieldValue, codec};
///
/// assert!(codec::check(&FieldValue::Number(30.0), FieldKind::Number).is_ok());
/// assert!(codec::check(&FieldValue::Null, FieldKind::Blob).is_ok());
///
/// let err = codec::check(&FieldValue::from("30"), FieldKind::Number).unwrap_err();
/// assert_eq!(err.actual, FieldKind::String);
/// ```
pub fn check(value: &FieldValue, declared: FieldKind) -> Result<&FieldValue, TypeMismatch> {
    match value.kind() {
        None => Ok(value),
        Some(actual) if actual == declared => Ok(value),
        Some(actual) => Err(TypeMismatch {
            expected: declared,
            actual,
        }),
    }
}

/// Appends the canonical byte encoding of a non-null value.
///
/// - Number: 8 bytes (little-endian f64)
/// - String: 4-byte length + UTF-8 bytes
/// - Boolean: 1 byte
/// - Blob: 4-byte length + raw bytes
///
/// Null writes nothing; nullness is recorded by the caller.
///
/// Fails if a string or blob is too long for its 4-byte length prefix.
pub(crate) fn encode_value(value: &FieldValue, bytes: &mut Vec<u8>) -> Result<()> {
    match value {
        FieldValue::Number(number) => bytes.extend_from_slice(&number.to_le_bytes()),
        FieldValue::String(text) => write_len_prefixed(text.as_bytes(), bytes)?,
        FieldValue::Boolean(b) => bytes.push(u8::from(*b)),
        FieldValue::Blob(blob) => write_len_prefixed(blob, bytes)?,
        FieldValue::Null => {}
    }
    Ok(())
}

/// Decodes one non-null value of the given kind starting at `*offset`.
///
/// Advances `offset` past the consumed bytes.
pub(crate) fn decode_value(kind: FieldKind, bytes: &[u8], offset: &mut usize) -> Result<FieldValue> {
    match kind {
        FieldKind::Number => {
            let raw = take(bytes, offset, 8, "number value")?;
            let mut num_bytes = [0u8; 8];
            num_bytes.copy_from_slice(raw);
            Ok(FieldValue::Number(f64::from_le_bytes(num_bytes)))
        }
        FieldKind::Boolean => match take(bytes, offset, 1, "boolean value")?[0] {
            0 => Ok(FieldValue::Boolean(false)),
            1 => Ok(FieldValue::Boolean(true)),
            other => Err(miette!("Invalid boolean byte {other:#04x}")),
        },
        FieldKind::String => {
            let raw = read_len_prefixed(bytes, offset, "string")?;
            match std::str::from_utf8(raw) {
                Ok(text) => Ok(FieldValue::String(text.to_owned())),
                Err(_) => Err(miette!("Invalid UTF-8 sequence")),
            }
        }
        FieldKind::Blob => Ok(FieldValue::Blob(read_len_prefixed(bytes, offset, "blob")?.to_vec())),
    }
}

pub(crate) fn write_len_prefixed(data: &[u8], bytes: &mut Vec<u8>) -> Result<()> {
    bytes.extend_from_slice(&len_prefix(data.len())?);
    bytes.extend_from_slice(data);
    Ok(())
}

fn len_prefix(len: usize) -> Result<[u8; 4]> {
    let length = u32::try_from(len)
        .map_err(|_| miette!("Length {len} does not fit a 4-byte length prefix"))?;
    Ok(length.to_le_bytes())
}

pub(crate) fn read_len_prefixed<'a>(
    bytes: &'a [u8],
    offset: &mut usize,
    what: &str,
) -> Result<&'a [u8]> {
    let raw = take(bytes, offset, 4, what)?;
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(raw);
    let length = u32::from_le_bytes(len_bytes) as usize;

    take(bytes, offset, length, what)
}

fn take<'a>(bytes: &'a [u8], offset: &mut usize, len: usize, what: &str) -> Result<&'a [u8]> {
    let end = offset
        .checked_add(len)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| miette!("Not enough bytes for {what}"))?;

    let slice = &bytes[*offset..end];
    *offset = end;
    Ok(slice)
}
