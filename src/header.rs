//! Descriptor header parsing.
//!
//! The header is the first 100 bytes of a `.000` file. It carries the target
//! platform constraints, the location and size of the six entry tables, and
//! three top-level strings (application name, provider and the list of
//! unsupported platforms).

use crate::error::{FormatError, Result};
use crate::utils::{read_u16_le, read_u32_le};
use std::fmt;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 0x64;

/// Signature every descriptor starts with ("MSCE" read as a little-endian u32).
pub const MSCE_SIGNATURE: u32 = 0x4543_534D;

/// Signature of a whole cabinet file ("MSCF" read as a little-endian u32).
pub const MSCF_SIGNATURE: u32 = 0x4643_534D;

const FILE_LENGTH_OFFSET: usize = 0x08;
const ARCHITECTURE_OFFSET: usize = 0x14;
const VERSION_OFFSET: usize = 0x18;
const COUNTS_OFFSET: usize = 0x30;
const TABLE_OFFSETS_OFFSET: usize = 0x3C;
const STRINGS_OFFSET: usize = 0x54;

/// Location of one entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableLocation {
    /// Byte offset of the first record.
    pub offset: u32,
    /// Number of records.
    pub count: u16,
}

/// Locations of all six entry tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tables {
    /// String table.
    pub strings: TableLocation,
    /// Directory table.
    pub directories: TableLocation,
    /// File table.
    pub files: TableLocation,
    /// Registry hive table.
    pub reg_hives: TableLocation,
    /// Registry key table.
    pub reg_keys: TableLocation,
    /// Link table.
    pub links: TableLocation,
}

/// Offset and length of a string stored directly in the header area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StringField {
    /// Byte offset from the start of the descriptor.
    pub offset: u16,
    /// Length in bytes, including the terminating NUL.
    pub length: u16,
}

impl StringField {
    /// Returns the bytes this field covers.
    pub fn bytes<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        let start = self.offset as usize;
        let end = start + self.length as usize;
        data.get(start..end).unwrap_or(&[])
    }

    fn validate(&self, field: &'static str, buffer_len: usize) -> Result<()> {
        let end = self.offset as usize + self.length as usize;
        if end > buffer_len {
            return Err(FormatError::FieldOutOfBounds {
                field,
                offset: self.offset as usize,
                length: self.length as usize,
                buffer_len,
            });
        }
        Ok(())
    }
}

/// A Windows CE version bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CeVersion {
    /// Major version, 0 when unrestricted.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl CeVersion {
    /// Returns the bound, or `None` when the major version is 0.
    pub fn restricted(self) -> Option<Self> {
        (self.major != 0).then_some(self)
    }
}

impl fmt::Display for CeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Target processor families named in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    /// Hitachi/Renesas SH3 family.
    Sh3,
    /// SH4 family.
    Sh4,
    /// Intel 386.
    I386,
    /// Intel 486.
    I486,
    /// Intel Pentium.
    I586,
    /// PowerPC 601.
    Ppc601,
    /// PowerPC 603.
    Ppc603,
    /// PowerPC 604.
    Ppc604,
    /// PowerPC 620.
    Ppc620,
    /// Motorola 821.
    Motorola821,
    /// ARM 720/820/920 and StrongARM.
    Arm,
    /// MIPS R4000.
    Mips,
    /// Alpha 21064.
    Alpha,
    /// ARM 7TDMI (Thumb).
    Thumb,
}

impl Architecture {
    /// Maps a header architecture code to a family.
    ///
    /// Returns `None` for 0 (no restriction) and for codes not in the table.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            103 | 10003 | 10004 => Some(Architecture::Sh3),
            104 | 10005 => Some(Architecture::Sh4),
            386 => Some(Architecture::I386),
            486 => Some(Architecture::I486),
            586 => Some(Architecture::I586),
            601 => Some(Architecture::Ppc601),
            603 => Some(Architecture::Ppc603),
            604 => Some(Architecture::Ppc604),
            620 => Some(Architecture::Ppc620),
            821 => Some(Architecture::Motorola821),
            1824 | 2080 | 2336 | 2577 => Some(Architecture::Arm),
            4000 => Some(Architecture::Mips),
            21064 => Some(Architecture::Alpha),
            70001 => Some(Architecture::Thumb),
            _ => None,
        }
    }

    /// Returns the display name used by the exporters.
    pub fn name(&self) -> &'static str {
        match self {
            Architecture::Sh3 => "SH3",
            Architecture::Sh4 => "SH4",
            Architecture::I386 => "I386",
            Architecture::I486 => "I486",
            Architecture::I586 => "I586",
            Architecture::Ppc601 => "PPC601",
            Architecture::Ppc603 => "PPC603",
            Architecture::Ppc604 => "PPC604",
            Architecture::Ppc620 => "PPC620",
            Architecture::Motorola821 => "MOTOROLA821",
            Architecture::Arm => "ARM",
            Architecture::Mips => "MIPS",
            Architecture::Alpha => "ALPHA",
            Architecture::Thumb => "THUMB",
        }
    }
}

/// Descriptor header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    /// Signature, always [`MSCE_SIGNATURE`] once parsed.
    pub signature: u32,

    /// Declared total length of the descriptor.
    pub file_length: u32,

    /// Reserved words at 0x04, 0x0C and 0x10 (usually 0, 0, 1).
    pub reserved: [u32; 3],

    /// Raw target architecture code.
    pub architecture_code: u32,

    /// Lowest CE version the payload installs on.
    pub min_ce_version: CeVersion,

    /// Highest CE version the payload installs on.
    pub max_ce_version: CeVersion,

    /// Lowest CE build number, 0 when unrestricted.
    pub min_ce_build: u32,

    /// Highest CE build number, 0 when unrestricted.
    pub max_ce_build: u32,

    /// Entry table locations.
    pub tables: Tables,

    /// Application name.
    pub app_name: StringField,

    /// Provider name.
    pub provider: StringField,

    /// Multi-string of unsupported platform names.
    pub unsupported: StringField,

    /// Trailing reserved halfwords.
    pub reserved_tail: [u16; 2],
}

impl Header {
    /// Parses and validates the header at the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `data` is shorter than [`HEADER_SIZE`]
    /// - the signature is not [`MSCE_SIGNATURE`]
    /// - the declared file length differs from `data.len()`
    /// - a header string field lies outside `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(FormatError::Truncated {
                offset: 0,
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let signature = read_u32_le(data, 0x00)?;
        if signature != MSCE_SIGNATURE {
            return Err(FormatError::BadSignature {
                expected: MSCE_SIGNATURE,
                found: signature,
            });
        }

        let file_length = read_u32_le(data, FILE_LENGTH_OFFSET)?;
        if file_length as usize != data.len() {
            return Err(FormatError::LengthMismatch {
                declared: file_length,
                actual: data.len(),
            });
        }

        let reserved = [
            read_u32_le(data, 0x04)?,
            read_u32_le(data, 0x0C)?,
            read_u32_le(data, 0x10)?,
        ];
        let architecture_code = read_u32_le(data, ARCHITECTURE_OFFSET)?;

        let min_ce_version = CeVersion {
            major: read_u32_le(data, VERSION_OFFSET)?,
            minor: read_u32_le(data, VERSION_OFFSET + 4)?,
        };
        let max_ce_version = CeVersion {
            major: read_u32_le(data, VERSION_OFFSET + 8)?,
            minor: read_u32_le(data, VERSION_OFFSET + 12)?,
        };
        let min_ce_build = read_u32_le(data, VERSION_OFFSET + 16)?;
        let max_ce_build = read_u32_le(data, VERSION_OFFSET + 20)?;

        let table = |index: usize| -> Result<TableLocation> {
            Ok(TableLocation {
                count: read_u16_le(data, COUNTS_OFFSET + index * 2)?,
                offset: read_u32_le(data, TABLE_OFFSETS_OFFSET + index * 4)?,
            })
        };
        let tables = Tables {
            strings: table(0)?,
            directories: table(1)?,
            files: table(2)?,
            reg_hives: table(3)?,
            reg_keys: table(4)?,
            links: table(5)?,
        };

        let string_field = |index: usize| -> Result<StringField> {
            Ok(StringField {
                offset: read_u16_le(data, STRINGS_OFFSET + index * 4)?,
                length: read_u16_le(data, STRINGS_OFFSET + index * 4 + 2)?,
            })
        };
        let app_name = string_field(0)?;
        let provider = string_field(1)?;
        let unsupported = string_field(2)?;

        app_name.validate("app name", data.len())?;
        provider.validate("provider", data.len())?;
        unsupported.validate("unsupported list", data.len())?;

        let reserved_tail = [read_u16_le(data, 0x60)?, read_u16_le(data, 0x62)?];

        Ok(Header {
            signature,
            file_length,
            reserved,
            architecture_code,
            min_ce_version,
            max_ce_version,
            min_ce_build,
            max_ce_build,
            tables,
            app_name,
            provider,
            unsupported,
            reserved_tail,
        })
    }

    /// Returns the target architecture, if the code is a known one.
    pub fn architecture(&self) -> Option<Architecture> {
        Architecture::from_code(self.architecture_code)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CE Cabinet Descriptor Header:\n\
             - Length: {} bytes\n\
             - Architecture: {}\n\
             - CE Version: {} - {}\n\
             - Entries: {} strings, {} dirs, {} files, {} hives, {} keys, {} links",
            self.file_length,
            self.architecture().map_or("none", |a| a.name()),
            self.min_ce_version,
            self.max_ce_version,
            self.tables.strings.count,
            self.tables.directories.count,
            self.tables.files.count,
            self.tables.reg_hives.count,
            self.tables.reg_keys.count,
            self.tables.links.count,
        )
    }
}
