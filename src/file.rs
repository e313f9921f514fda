//! File entries and their installation flags.

use crate::error::Result;
use crate::table::{Identified, Record, RecordLayout, TableEntry, FILE_RECORD};
use crate::utils::until_nul;

/// Installation flags of a file entry.
///
/// The record stores the word as two halves; this is `upper << 16 | lower`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileFlags(pub u32);

impl FileFlags {
    /// Reference-counted shared file, kept at uninstall while still referenced.
    pub const REFERENCE_COUNTED: u32 = 0x8000_0000;

    /// Ignore the cabinet file date and always overwrite the target.
    pub const IGNORE_CAB_DATE: u32 = 0x4000_0000;

    /// Do not overwrite the target if it is newer.
    pub const NO_OVERWRITE_IF_NEWER: u32 = 0x2000_0000;

    /// Self-register this DLL.
    pub const SELF_REGISTER: u32 = 0x1000_0000;

    /// Do not copy unless the target already exists.
    pub const COPY_ONLY_IF_EXISTS: u32 = 0x0000_0400;

    /// Overwrite the target if it exists.
    pub const OVERWRITE_IF_EXISTS: u32 = 0x0000_0010;

    /// Do not skip this file.
    pub const NO_SKIP: u32 = 0x0000_0002;

    /// Warn the user if this file is skipped.
    pub const WARN_IF_SKIPPED: u32 = 0x0000_0001;

    /// Combines the two stored halves.
    pub fn from_halves(lower: u16, upper: u16) -> Self {
        Self((u32::from(upper) << 16) | u32::from(lower))
    }

    /// Returns true if the specified flag is set.
    pub fn has_flag(&self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Returns true if this is a reference-counted shared file.
    pub fn is_reference_counted(&self) -> bool {
        self.has_flag(Self::REFERENCE_COUNTED)
    }

    /// Returns true if the cabinet file date is ignored.
    pub fn ignores_cab_date(&self) -> bool {
        self.has_flag(Self::IGNORE_CAB_DATE)
    }

    /// Returns true if a newer target is kept.
    pub fn keeps_newer_target(&self) -> bool {
        self.has_flag(Self::NO_OVERWRITE_IF_NEWER)
    }

    /// Returns true if the DLL self-registers.
    pub fn self_registers(&self) -> bool {
        self.has_flag(Self::SELF_REGISTER)
    }

    /// Returns true if the file is only copied over an existing target.
    pub fn copies_only_if_exists(&self) -> bool {
        self.has_flag(Self::COPY_ONLY_IF_EXISTS)
    }

    /// Returns true if an existing target is overwritten.
    pub fn overwrites_if_exists(&self) -> bool {
        self.has_flag(Self::OVERWRITE_IF_EXISTS)
    }

    /// Returns true if the file must not be skipped.
    pub fn no_skip(&self) -> bool {
        self.has_flag(Self::NO_SKIP)
    }

    /// Returns true if skipping the file warns the user.
    pub fn warns_if_skipped(&self) -> bool {
        self.has_flag(Self::WARN_IF_SKIPPED)
    }
}

/// File entry.
///
/// The payload itself is the cabinet member whose three-digit extension
/// equals `id`; it is not part of the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry<'a> {
    /// File id.
    pub id: u16,
    /// Directory the file installs into.
    pub directory_id: u16,
    /// Undocumented field, usually equal to `id`.
    pub unknown: u16,
    /// Installation flags.
    pub flags: FileFlags,
    /// Installed file name, terminator removed.
    pub name: &'a [u8],
}

impl<'a> FileEntry<'a> {
    /// Parses a file entry from its table record.
    pub fn parse(record: &Record<'a>) -> Result<Self> {
        Ok(FileEntry {
            id: record.id()?,
            directory_id: record.field(2)?,
            unknown: record.field(4)?,
            flags: FileFlags::from_halves(record.field(6)?, record.field(8)?),
            name: until_nul(record.tail),
        })
    }

    /// Returns the cabinet member suffix holding this file's payload, e.g. `"007"`.
    pub fn member_extension(&self) -> String {
        format!("{:03}", self.id)
    }
}

impl Identified for FileEntry<'_> {
    fn id(&self) -> u16 {
        self.id
    }
}

impl<'a> TableEntry<'a> for FileEntry<'a> {
    const LAYOUT: RecordLayout = FILE_RECORD;

    fn parse_record(record: &Record<'a>) -> Result<Self> {
        FileEntry::parse(record)
    }
}
