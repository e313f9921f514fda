//! Registry hive and registry key entries.

use crate::error::{FormatError, Result};
use crate::strings::Spec;
use crate::table::{
    Identified, Record, RecordLayout, TableEntry, REG_HIVE_RECORD, REG_KEY_RECORD,
};
use crate::utils::until_nul;
use crate::value::ValueType;

/// Predefined registry root keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiveRoot {
    /// `HKEY_CLASSES_ROOT` (code 1).
    ClassesRoot,
    /// `HKEY_CURRENT_USER` (code 2).
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE` (code 3).
    LocalMachine,
    /// `HKEY_USERS` (code 4).
    Users,
}

impl HiveRoot {
    /// Maps a stored root code to a root key.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(HiveRoot::ClassesRoot),
            2 => Some(HiveRoot::CurrentUser),
            3 => Some(HiveRoot::LocalMachine),
            4 => Some(HiveRoot::Users),
            _ => None,
        }
    }

    /// Returns the full root key name.
    pub fn name(&self) -> &'static str {
        match self {
            HiveRoot::ClassesRoot => "HKEY_CLASSES_ROOT",
            HiveRoot::CurrentUser => "HKEY_CURRENT_USER",
            HiveRoot::LocalMachine => "HKEY_LOCAL_MACHINE",
            HiveRoot::Users => "HKEY_USERS",
        }
    }
}

/// Registry hive entry: a key path under one of the root keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegHiveEntry {
    /// Hive id referenced by registry keys.
    pub id: u16,
    /// Root key.
    pub root: HiveRoot,
    /// Undocumented field, usually 0.
    pub unknown: u16,
    /// Key path below the root, as string ids.
    pub spec: Spec,
}

impl RegHiveEntry {
    /// Parses a registry hive entry from its table record.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownHiveRoot` if the root code is not 1..=4.
    pub fn parse(record: &Record<'_>) -> Result<Self> {
        let id = record.id()?;
        let root_code = record.field(2)?;
        let root = HiveRoot::from_code(root_code).ok_or(FormatError::UnknownHiveRoot {
            hive_id: id,
            root: root_code,
        })?;

        Ok(RegHiveEntry {
            id,
            root,
            unknown: record.field(4)?,
            spec: Spec::parse(record.tail),
        })
    }
}

/// Registry key entry: one named value under a hive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegKeyEntry<'a> {
    /// Entry id.
    pub id: u16,
    /// Owning hive id.
    pub hive_id: u16,
    /// Non-zero if `%…%` variables in the data are substituted at install time.
    pub variable_substitution: u16,
    /// Type and flag word, `upper << 16 | lower`.
    pub type_word: u32,
    /// Value name, empty for the hive's default value.
    pub name: &'a [u8],
    /// Raw value bytes.
    pub data: &'a [u8],
}

impl<'a> RegKeyEntry<'a> {
    /// Keep an existing value instead of overwriting it.
    pub const FLAG_NO_CLOBBER: u32 = 0x0000_0002;

    /// Parses a registry key entry from its table record.
    ///
    /// The tail starts with the NUL-terminated value name; the value bytes
    /// follow the terminator.
    pub fn parse(record: &Record<'a>) -> Result<Self> {
        let lower = record.field(6)?;
        let upper = record.field(8)?;
        let name = until_nul(record.tail);
        let data = record.tail.get(name.len() + 1..).unwrap_or(&[]);

        Ok(RegKeyEntry {
            id: record.id()?,
            hive_id: record.field(2)?,
            variable_substitution: record.field(4)?,
            type_word: (u32::from(upper) << 16) | u32::from(lower),
            name,
            data,
        })
    }

    /// Returns true if this entry sets the hive's default value.
    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }

    /// Returns true if an existing value is kept.
    pub fn no_clobber(&self) -> bool {
        (self.type_word & Self::FLAG_NO_CLOBBER) != 0
    }

    /// Returns the value type selected by the type word.
    pub fn value_type(&self) -> Result<ValueType> {
        ValueType::from_type_word(self.type_word)
    }
}

impl Identified for RegHiveEntry {
    fn id(&self) -> u16 {
        self.id
    }
}

impl<'a> TableEntry<'a> for RegHiveEntry {
    const LAYOUT: RecordLayout = REG_HIVE_RECORD;

    fn parse_record(record: &Record<'a>) -> Result<Self> {
        RegHiveEntry::parse(record)
    }
}

impl Identified for RegKeyEntry<'_> {
    fn id(&self) -> u16 {
        self.id
    }
}

impl<'a> TableEntry<'a> for RegKeyEntry<'a> {
    const LAYOUT: RecordLayout = REG_KEY_RECORD;

    fn parse_record(record: &Record<'a>) -> Result<Self> {
        RegKeyEntry::parse(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(data: &[u8], prefix: usize) -> Record<'_> {
        Record {
            index: 0,
            offset: 0,
            prefix: &data[..prefix],
            tail: &data[prefix..],
        }
    }

    #[test]
    fn test_hive_roots() {
        assert_eq!(HiveRoot::from_code(3).unwrap().name(), "HKEY_LOCAL_MACHINE");
        assert_eq!(HiveRoot::from_code(0), None);
        assert_eq!(HiveRoot::from_code(5), None);
    }

    #[test]
    fn test_parse_hive() {
        let mut data = Vec::new();
        for v in [2u16, 3, 0, 6, 11, 12, 0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let hive = RegHiveEntry::parse(&record(&data, 8)).unwrap();
        assert_eq!(hive.root, HiveRoot::LocalMachine);
        assert_eq!(hive.spec.ids(), &[11, 12]);
    }

    #[test]
    fn test_parse_hive_bad_root() {
        let mut data = Vec::new();
        for v in [2u16, 9, 0, 2, 0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        assert_eq!(
            RegHiveEntry::parse(&record(&data, 8)).unwrap_err(),
            FormatError::UnknownHiveRoot { hive_id: 2, root: 9 }
        );
    }

    #[test]
    fn test_parse_key() {
        let mut data = Vec::new();
        for v in [1u16, 2, 0, 0x0001, 0x0001, 8] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(b"Ver\0");
        data.extend_from_slice(&[0x2A, 0, 0, 0]);

        let key = RegKeyEntry::parse(&record(&data, 12)).unwrap();
        assert_eq!(key.name, b"Ver");
        assert_eq!(key.data, &[0x2A, 0, 0, 0]);
        assert_eq!(key.type_word, 0x0001_0001);
        assert_eq!(key.value_type().unwrap(), ValueType::Dword);
        assert!(!key.is_default());
        assert!(!key.no_clobber());
    }

    #[test]
    fn test_parse_default_key() {
        let mut data = Vec::new();
        for v in [1u16, 2, 0, 0x0002, 0, 3] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(b"\0x\0");

        let key = RegKeyEntry::parse(&record(&data, 12)).unwrap();
        assert!(key.is_default());
        assert_eq!(key.data, b"x\0");
        assert!(key.no_clobber());
        assert_eq!(key.value_type().unwrap(), ValueType::String);
    }
}
