//! Primitive little-endian readers and byte-string helpers.

use crate::error::{FormatError, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Reads a u32 from a byte slice at the given offset.
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    let bytes = slice_at(data, offset, 4)?;
    let mut cursor = Cursor::new(bytes);
    cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| FormatError::truncated(offset, 4, data.len()))
}

/// Reads a u16 from a byte slice at the given offset.
pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16> {
    let bytes = slice_at(data, offset, 2)?;
    let mut cursor = Cursor::new(bytes);
    cursor
        .read_u16::<LittleEndian>()
        .map_err(|_| FormatError::truncated(offset, 2, data.len()))
}

/// Returns `data[offset..offset + len]`, or a truncation error.
pub fn slice_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    match offset.checked_add(len) {
        Some(end) if end <= data.len() => Ok(&data[offset..end]),
        _ => Err(FormatError::truncated(offset, len, data.len())),
    }
}

/// Cuts a byte string at its first NUL.
///
/// Stored lengths include the terminator; anything after it is ignored.
/// Without a NUL the whole slice is the string.
pub fn until_nul(data: &[u8]) -> &[u8] {
    match data.iter().position(|&b| b == 0) {
        Some(end) => &data[..end],
        None => data,
    }
}

/// Splits a NUL-separated multi-string, dropping empty items.
pub fn split_multi_string(data: &[u8]) -> Vec<&[u8]> {
    data.split(|&b| b == 0).filter(|s| !s.is_empty()).collect()
}

/// Renders bytes as comma-separated uppercase hex pairs (`01,0A,FF`).
pub fn hex_pairs(data: &[u8]) -> String {
    data.iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(",")
}

/// Reads a zero-terminated array of u16 ids.
///
/// Reading stops at the first zero or at the end of `data`, whichever comes
/// first. A trailing odd byte is ignored.
pub fn read_u16_array(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&id| id != 0)
        .collect()
}

/// Joins two path parts, leaving out the separator when either side is empty.
pub fn join_path(head: &str, separator: &str, tail: &str) -> String {
    if tail.is_empty() {
        head.to_string()
    } else if head.is_empty() {
        tail.to_string()
    } else {
        format!("{}{}{}", head, separator, tail)
    }
}
