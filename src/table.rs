//! Generic walking of variable-length record tables.
//!
//! All six descriptor tables share one shape: a fixed prefix containing a
//! 16-bit length field, followed by a tail of exactly that many bytes. Only
//! the prefix size and the position of the length field differ per table,
//! so a single [`TableWalker`] parameterized by a [`RecordLayout`] walks them
//! all.

use crate::error::{FormatError, Result};
use crate::header::TableLocation;
use crate::utils::read_u16_le;
use std::collections::HashMap;
use tracing::debug;

/// Shape of one table's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// Table name used in error messages.
    pub table: &'static str,
    /// Size of the fixed prefix in bytes.
    pub prefix: usize,
    /// Position of the 16-bit tail length within the prefix.
    pub length_at: usize,
}

impl RecordLayout {
    /// Returns the total size of a record with the given tail length.
    pub fn record_size(&self, tail_len: u16) -> usize {
        self.prefix + tail_len as usize
    }
}

/// id, length, text.
pub const STRING_RECORD: RecordLayout = RecordLayout {
    table: "string",
    prefix: 4,
    length_at: 2,
};

/// id, spec length, spec.
pub const DIRECTORY_RECORD: RecordLayout = RecordLayout {
    table: "directory",
    prefix: 4,
    length_at: 2,
};

/// id, directory id, unknown, flags lower, flags upper, name length, name.
pub const FILE_RECORD: RecordLayout = RecordLayout {
    table: "file",
    prefix: 12,
    length_at: 10,
};

/// id, hive root, unknown, spec length, spec.
pub const REG_HIVE_RECORD: RecordLayout = RecordLayout {
    table: "registry hive",
    prefix: 8,
    length_at: 6,
};

/// id, hive id, substitution, type lower, type upper, data length, data.
pub const REG_KEY_RECORD: RecordLayout = RecordLayout {
    table: "registry key",
    prefix: 12,
    length_at: 10,
};

/// id, unknown, base directory, target id, link type, spec length, spec.
pub const LINK_RECORD: RecordLayout = RecordLayout {
    table: "link",
    prefix: 12,
    length_at: 10,
};

/// One record located by a [`TableWalker`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// Zero-based index within the table.
    pub index: usize,
    /// Absolute offset of the record in the descriptor.
    pub offset: usize,
    /// Fixed prefix bytes.
    pub prefix: &'a [u8],
    /// Variable tail bytes.
    pub tail: &'a [u8],
}

impl<'a> Record<'a> {
    /// Reads a u16 field from the prefix.
    pub fn field(&self, pos: usize) -> Result<u16> {
        read_u16_le(self.prefix, pos).map_err(|_| {
            FormatError::truncated(self.offset + pos, 2, self.offset + self.prefix.len())
        })
    }

    /// Returns the record id (always the first prefix field).
    pub fn id(&self) -> Result<u16> {
        self.field(0)
    }
}

/// Iterator over the records of one table.
///
/// Yields exactly `count` records, or stops after the first error.
pub struct TableWalker<'a> {
    data: &'a [u8],
    layout: RecordLayout,
    offset: usize,
    index: usize,
    count: usize,
    failed: bool,
}

impl<'a> TableWalker<'a> {
    /// Creates a walker over the table at `location`.
    ///
    /// # Arguments
    ///
    /// * `data` - The whole descriptor buffer.
    /// * `layout` - Record shape for this table.
    /// * `location` - Table offset and record count from the header.
    pub fn new(data: &'a [u8], layout: RecordLayout, location: TableLocation) -> Self {
        Self {
            data,
            layout,
            offset: location.offset as usize,
            index: 0,
            count: location.count as usize,
            failed: false,
        }
    }

    fn read_record(&self) -> Result<Record<'a>> {
        let prefix_end = self.offset.checked_add(self.layout.prefix);
        let prefix = match prefix_end {
            Some(end) if end <= self.data.len() => &self.data[self.offset..end],
            _ => {
                return Err(FormatError::record_overrun(
                    self.layout.table,
                    self.index,
                    self.offset,
                    self.layout.prefix,
                    self.data.len(),
                ))
            }
        };

        let tail_len = read_u16_le(prefix, self.layout.length_at)?;
        let size = self.layout.record_size(tail_len);
        let end = self.offset.saturating_add(size);
        if end > self.data.len() {
            return Err(FormatError::record_overrun(
                self.layout.table,
                self.index,
                self.offset,
                size,
                self.data.len(),
            ));
        }

        Ok(Record {
            index: self.index,
            offset: self.offset,
            prefix,
            tail: &self.data[self.offset + self.layout.prefix..end],
        })
    }
}

impl<'a> Iterator for TableWalker<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.count {
            return None;
        }

        match self.read_record() {
            Ok(record) => {
                self.offset += record.prefix.len() + record.tail.len();
                self.index += 1;
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        (0, Some(self.count - self.index))
    }
}

/// An entry carrying a 16-bit id.
pub trait Identified {
    /// Returns the entry id.
    fn id(&self) -> u16;
}

/// An entry type stored in one of the descriptor tables.
pub trait TableEntry<'a>: Identified + Sized {
    /// Record shape of the table.
    const LAYOUT: RecordLayout;

    /// Parses one entry from its record.
    fn parse_record(record: &Record<'a>) -> Result<Self>;
}

/// A fully walked table with an id index.
///
/// Ids are not required to be unique; like a linear scan, the index keeps
/// the first entry for each id.
#[derive(Debug, Clone)]
pub struct IndexedTable<T> {
    entries: Vec<T>,
    index: HashMap<u16, usize>,
}

impl<T: Identified> IndexedTable<T> {
    /// Walks and parses the table at `location`.
    pub fn load<'a>(data: &'a [u8], location: TableLocation) -> Result<Self>
    where
        T: TableEntry<'a>,
    {
        let mut entries = Vec::with_capacity(location.count as usize);
        let mut index = HashMap::with_capacity(location.count as usize);

        for record in TableWalker::new(data, T::LAYOUT, location) {
            let entry = T::parse_record(&record?)?;
            index.entry(entry.id()).or_insert(entries.len());
            entries.push(entry);
        }

        debug!(
            table = T::LAYOUT.table,
            count = entries.len(),
            unique = index.len(),
            "Indexed table"
        );

        Ok(Self { entries, index })
    }

    /// Returns all entries in storage order.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Looks an entry up through the index.
    pub fn get(&self, id: u16) -> Option<&T> {
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    /// Looks an entry up by scanning in storage order.
    pub fn find_linear(&self, id: u16) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_record(id: u16, text: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(&(text.len() as u16).to_le_bytes());
        out.extend_from_slice(text);
        out
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(STRING_RECORD.record_size(4), 8);
        assert_eq!(FILE_RECORD.record_size(9), 21);
        assert_eq!(REG_HIVE_RECORD.record_size(6), 14);
        assert_eq!(LINK_RECORD.record_size(4), 16);
    }

    #[test]
    fn test_walks_exactly_count_records() {
        let mut data = vec![0xEEu8; 3];
        data.extend(string_record(1, b"ab\0"));
        data.extend(string_record(2, b"c\0"));
        data.extend(string_record(3, b"trailing\0"));

        let location = TableLocation { offset: 3, count: 2 };
        let records: Vec<_> = TableWalker::new(&data, STRING_RECORD, location)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].offset, 3);
        assert_eq!(records[0].tail, b"ab\0");
        assert_eq!(records[1].offset, 10);
        assert_eq!(records[1].id().unwrap(), 2);
        assert_eq!(records[1].tail, b"c\0");
    }

    #[test]
    fn test_tail_overrun() {
        let mut data = string_record(1, b"abc\0");
        data.truncate(6);

        let location = TableLocation { offset: 0, count: 1 };
        let mut walker = TableWalker::new(&data, STRING_RECORD, location);
        assert_eq!(
            walker.next().unwrap().unwrap_err(),
            FormatError::RecordOverrun {
                table: "string",
                index: 0,
                offset: 0,
                size: 8,
                available: 6
            }
        );
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_prefix_overrun() {
        let data = vec![0u8; 10];
        let location = TableLocation { offset: 4, count: 1 };
        let result = TableWalker::new(&data, FILE_RECORD, location).next().unwrap();
        assert!(matches!(result, Err(FormatError::RecordOverrun { table: "file", .. })));
    }

    #[test]
    fn test_empty_table_ignores_offset() {
        let data = vec![0u8; 4];
        let location = TableLocation { offset: 0xFFFF_FFFF, count: 0 };
        assert!(TableWalker::new(&data, LINK_RECORD, location).next().is_none());
    }
}
