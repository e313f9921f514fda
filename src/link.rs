//! Shell link entries.

use crate::directory::BaseDirectory;
use crate::error::Result;
use crate::strings::Spec;
use crate::table::{Identified, Record, RecordLayout, TableEntry, LINK_RECORD};

/// What a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Target id is a directory id (0 meaning `%InstallDir%`).
    Directory,
    /// Target id is a file id.
    File,
}

impl LinkKind {
    /// Maps the stored link type; any non-zero value means a file.
    pub fn from_code(code: u16) -> Self {
        if code == 0 {
            LinkKind::Directory
        } else {
            LinkKind::File
        }
    }
}

/// Link entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Link id.
    pub id: u16,
    /// Undocumented field, preserved as read.
    pub unknown: u16,
    /// Directory the link is created in.
    pub base_directory: BaseDirectory,
    /// File or directory id the link points at.
    pub target_id: u16,
    /// Kind of `target_id`.
    pub kind: LinkKind,
    /// Link name relative to `base_directory`, as string ids.
    pub spec: Spec,
}

impl LinkEntry {
    /// Parses a link entry from its table record.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownBaseDirectory` if the base directory code is above 17.
    pub fn parse(record: &Record<'_>) -> Result<Self> {
        Ok(LinkEntry {
            id: record.id()?,
            unknown: record.field(2)?,
            base_directory: BaseDirectory::from_code(record.field(4)?)?,
            target_id: record.field(6)?,
            kind: LinkKind::from_code(record.field(8)?),
            spec: Spec::parse(record.tail),
        })
    }

    /// Returns true if the link targets a file.
    pub fn is_file(&self) -> bool {
        self.kind == LinkKind::File
    }
}

impl Identified for LinkEntry {
    fn id(&self) -> u16 {
        self.id
    }
}

impl<'a> TableEntry<'a> for LinkEntry {
    const LAYOUT: RecordLayout = LINK_RECORD;

    fn parse_record(record: &Record<'a>) -> Result<Self> {
        LinkEntry::parse(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    fn record_bytes(base: u16, kind: u16) -> Vec<u8> {
        let mut data = Vec::new();
        for v in [1u16, 0, base, 4, kind, 4, 6, 0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_parse_link() {
        let data = record_bytes(11, 1);
        let record = Record {
            index: 0,
            offset: 0,
            prefix: &data[..12],
            tail: &data[12..],
        };
        let link = LinkEntry::parse(&record).unwrap();
        assert_eq!(link.base_directory.placeholder(), "%CE11%");
        assert!(link.is_file());
        assert_eq!(link.target_id, 4);
        assert_eq!(link.spec.ids(), &[6]);
    }

    #[test]
    fn test_out_of_range_base_directory() {
        let data = record_bytes(99, 0);
        let record = Record {
            index: 0,
            offset: 0,
            prefix: &data[..12],
            tail: &data[12..],
        };
        assert_eq!(
            LinkEntry::parse(&record).unwrap_err(),
            FormatError::UnknownBaseDirectory(99)
        );
    }
}
