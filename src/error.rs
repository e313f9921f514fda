//! Error types for descriptor decoding.
//!
//! Structural problems with a `.000` buffer are reported as [`FormatError`]
//! and always abort the decode. Text normalization problems are reported as
//! [`EncodingError`] and are recovered from inside the decoder. Acquiring the
//! bytes in the first place is reported through [`OpenError`].

use std::io;
use thiserror::Error;

/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Structural errors found while decoding a descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The first four bytes are not `"MSCE"`.
    #[error("Bad signature: expected {expected:#010x}, found {found:#010x}")]
    BadSignature {
        /// Signature every descriptor starts with.
        expected: u32,
        /// Value actually read at offset 0.
        found: u32,
    },

    /// The header's declared file length disagrees with the buffer.
    #[error("Length mismatch: header declares {declared} bytes, buffer holds {actual} bytes")]
    LengthMismatch {
        /// Length stored in the header.
        declared: u32,
        /// Length of the buffer handed to the decoder.
        actual: usize,
    },

    /// The buffer (or a field inside it) ends before a fixed-size read completes.
    #[error("Truncated data at offset {offset:#x}: expected {expected} bytes, got {actual} bytes")]
    Truncated {
        /// Offset the read started at.
        offset: usize,
        /// Bytes required.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// A header string descriptor points outside the buffer.
    #[error("Header field {field} out of bounds: offset {offset:#x} + length {length} exceeds {buffer_len} bytes")]
    FieldOutOfBounds {
        /// Name of the header field.
        field: &'static str,
        /// Declared offset.
        offset: usize,
        /// Declared length.
        length: usize,
        /// Length of the buffer.
        buffer_len: usize,
    },

    /// A table record runs past the end of the buffer.
    #[error("{table} record {index} at offset {offset:#x} overruns the buffer: needs {size} bytes, {available} available")]
    RecordOverrun {
        /// Table being walked.
        table: &'static str,
        /// Zero-based record index within the table.
        index: usize,
        /// Offset of the record.
        offset: usize,
        /// Computed record size (or minimum prefix size).
        size: usize,
        /// Bytes left in the buffer from `offset`.
        available: usize,
    },

    /// No string entry carries this id.
    #[error("Unknown string id {0}")]
    UnknownStringId(u16),

    /// No directory entry carries this id.
    #[error("Unknown directory id {0}")]
    UnknownDirectoryId(u16),

    /// No file entry carries this id.
    #[error("Unknown file id {0}")]
    UnknownFileId(u16),

    /// No registry hive entry carries this id.
    #[error("Unknown registry hive id {0}")]
    UnknownHiveId(u16),

    /// Hive root code outside 1..=4.
    #[error("Unknown hive root {root} in registry hive {hive_id}")]
    UnknownHiveRoot {
        /// Hive entry id.
        hive_id: u16,
        /// Offending root code.
        root: u16,
    },

    /// Base directory code outside 0..=17.
    #[error("Unknown base directory {0}")]
    UnknownBaseDirectory(u16),

    /// Masked registry type matches no known code.
    #[error("Unknown registry value type {0:#010x}")]
    UnknownRegType(u32),

    /// Registry payload has the wrong size for its type.
    #[error("Invalid {value_type} payload in registry key {key_id}: expected {expected} bytes, got {actual}")]
    InvalidValueLength {
        /// Registry key entry id.
        key_id: u16,
        /// Type name, e.g. `REG_DWORD`.
        value_type: &'static str,
        /// Required payload length.
        expected: usize,
        /// Payload length found.
        actual: usize,
    },

    /// Reference resolution revisited an entity or went too deep.
    #[error("Cyclic reference while resolving {kind} {id} (depth {depth})")]
    CyclicReference {
        /// Kind of entity being resolved.
        kind: &'static str,
        /// Id of that entity.
        id: u16,
        /// Resolution depth reached.
        depth: usize,
    },
}

/// A byte string could not be decoded with any configured code page.
///
/// Never fatal: the decoder logs it and falls back to the original bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot decode {len} bytes as {tried}")]
pub struct EncodingError {
    /// Length of the rejected byte string.
    pub len: usize,
    /// Code pages tried, in order.
    pub tried: String,
}

/// Errors from acquiring descriptor bytes before decoding.
#[derive(Error, Debug)]
pub enum OpenError {
    /// I/O error while reading or mapping the source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The bytes are a structurally invalid descriptor.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The bytes are a whole cabinet; the `.000` member must be extracted first.
    #[error("Input is a cabinet (MSCF); extract its .000 member before decoding")]
    CabinetNotExtracted,

    /// The source is empty.
    #[error("Input is empty")]
    Empty,
}

impl FormatError {
    /// Creates a truncation error for a read of `expected` bytes at `offset`.
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset the read started at
    /// * `expected` - Number of bytes the read needs
    /// * `data_len` - Length of the slice being read
    pub fn truncated(offset: usize, expected: usize, data_len: usize) -> Self {
        Self::Truncated {
            offset,
            expected,
            actual: data_len.saturating_sub(offset),
        }
    }

    /// Creates a record overrun error for the named table.
    pub fn record_overrun(
        table: &'static str,
        index: usize,
        offset: usize,
        size: usize,
        data_len: usize,
    ) -> Self {
        Self::RecordOverrun {
            table,
            index,
            offset,
            size,
            available: data_len.saturating_sub(offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = FormatError::FieldOutOfBounds {
            field: "provider",
            offset: 0x80,
            length: 12,
            buffer_len: 0x84,
        };
        assert!(err.to_string().contains("provider"));

        let err = FormatError::record_overrun("file", 2, 0x100, 40, 0x110);
        let msg = err.to_string();
        assert!(msg.contains("file record 2"));
        assert!(msg.contains("16 available"));
    }

    #[test]
    fn test_truncated_saturates() {
        let err = FormatError::truncated(10, 4, 4);
        assert_eq!(
            err,
            FormatError::Truncated {
                offset: 10,
                expected: 4,
                actual: 0
            }
        );
    }

    #[test]
    fn test_open_error_wraps_format() {
        let err: OpenError = FormatError::UnknownStringId(3).into();
        assert!(matches!(err, OpenError::Format(FormatError::UnknownStringId(3))));
        assert_eq!(err.to_string(), "Unknown string id 3");
    }
}
