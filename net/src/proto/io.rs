//! Field-level readers and writers over a byte cursor.
//!
//! Readers take `&mut &[u8]` and advance it only past what they consumed.
//! A short input is always [`ProtoError::Truncated`], never a partial value.

use super::{
    error::{ProtoError, Result},
    varint::{read_varint, write_varint},
};

#[inline]
pub fn take<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    if input.len() < len {
        return Err(ProtoError::Truncated);
    }

    let (head, tail) = input.split_at(len);
    *input = tail;
    Ok(head)
}

#[inline]
fn take_array<const N: usize>(input: &mut &[u8]) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(take(input, N)?);
    Ok(bytes)
}

#[inline]
pub fn read_u16_be(input: &mut &[u8]) -> Result<u16> {
    take_array(input).map(u16::from_be_bytes)
}

#[inline]
pub fn write_u16_be(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

#[inline]
pub fn read_i64_be(input: &mut &[u8]) -> Result<i64> {
    take_array(input).map(i64::from_be_bytes)
}

#[inline]
pub fn write_i64_be(out: &mut Vec<u8>, value: i64) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Upper bound for strings without a tighter field-specific limit.
pub const MAX_STRING_CHARS: usize = 32_767;

#[inline]
pub fn read_string<'a>(input: &mut &'a [u8]) -> Result<&'a str> {
    read_string_bounded(input, MAX_STRING_CHARS)
}

#[inline]
pub fn write_string(out: &mut Vec<u8>, value: &str) -> Result<()> {
    write_string_bounded(out, value, MAX_STRING_CHARS)
}

/// Reads a VarInt-prefixed UTF-8 string of at most `max_chars` UTF-16 units.
pub fn read_string_bounded<'a>(input: &mut &'a [u8], max_chars: usize) -> Result<&'a str> {
    let byte_len = read_varint(input)?;
    if byte_len < 0 {
        return Err(ProtoError::NegativeLength(byte_len));
    }

    let byte_len = byte_len as usize;
    let max_bytes = max_chars.saturating_mul(4);
    if byte_len > max_bytes {
        return Err(ProtoError::StringTooLong {
            max: max_bytes,
            actual: byte_len,
        });
    }

    let bytes = take(input, byte_len)?;
    let s = std::str::from_utf8(bytes).map_err(|_| ProtoError::InvalidUtf8)?;

    let char_count = s.encode_utf16().count();
    if char_count > max_chars {
        return Err(ProtoError::StringTooLong {
            max: max_chars,
            actual: char_count,
        });
    }

    Ok(s)
}

pub fn write_string_bounded(out: &mut Vec<u8>, value: &str, max_chars: usize) -> Result<()> {
    let char_count = value.encode_utf16().count();
    if char_count > max_chars {
        return Err(ProtoError::StringTooLong {
            max: max_chars,
            actual: char_count,
        });
    }

    let len = i32::try_from(value.len()).map_err(|_| ProtoError::StringTooLong {
        max: i32::MAX as usize,
        actual: value.len(),
    })?;
    write_varint(out, len);
    out.extend_from_slice(value.as_bytes());
    Ok(())
}
