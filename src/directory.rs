//! Directory entries and well-known base directories.

use crate::error::{FormatError, Result};
use crate::strings::Spec;
use crate::table::{Identified, Record, RecordLayout, TableEntry, DIRECTORY_RECORD};

/// Placeholder for the application's installation directory.
pub const INSTALL_DIR: &str = "%InstallDir%";

/// Placeholders addressed by base directory codes 0..=17.
pub const BASE_DIRECTORIES: [&str; 18] = [
    INSTALL_DIR,
    "%CE1%",
    "%CE2%",
    "%CE3%",
    "%CE4%",
    "%CE5%",
    "%CE6%",
    "%CE7%",
    "%CE8%",
    "%CE9%",
    "%CE10%",
    "%CE11%",
    "%CE12%",
    "%CE13%",
    "%CE14%",
    "%CE15%",
    "%CE16%",
    "%CE17%",
];

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Directory id referenced by files and links.
    pub id: u16,
    /// Path components as string ids.
    pub spec: Spec,
}

impl DirectoryEntry {
    /// Parses a directory entry from its table record.
    pub fn parse(record: &Record<'_>) -> Result<Self> {
        Ok(DirectoryEntry {
            id: record.id()?,
            spec: Spec::parse(record.tail),
        })
    }
}

impl Identified for DirectoryEntry {
    fn id(&self) -> u16 {
        self.id
    }
}

impl<'a> TableEntry<'a> for DirectoryEntry {
    const LAYOUT: RecordLayout = DIRECTORY_RECORD;

    fn parse_record(record: &Record<'a>) -> Result<Self> {
        DirectoryEntry::parse(record)
    }
}

/// Device platform families with differing `%CEn%` layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Handheld PC.
    HandheldPc,
    /// Palm-size PC.
    PalmSizePc,
    /// Pocket PC.
    PocketPc,
}

/// A validated base directory code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseDirectory(u16);

impl BaseDirectory {
    /// Validates a base directory code.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnknownBaseDirectory`] for codes above 17.
    pub fn from_code(code: u16) -> Result<Self> {
        if (code as usize) < BASE_DIRECTORIES.len() {
            Ok(BaseDirectory(code))
        } else {
            Err(FormatError::UnknownBaseDirectory(code))
        }
    }

    /// Returns the raw code.
    pub fn code(&self) -> u16 {
        self.0
    }

    /// Returns the placeholder token, e.g. `%CE2%`.
    pub fn placeholder(&self) -> &'static str {
        BASE_DIRECTORIES[self.0 as usize]
    }

    /// Returns the concrete device path on `platform`.
    ///
    /// `None` for `%InstallDir%` (chosen at install time) and for
    /// directories the platform does not have.
    pub fn expand(&self, platform: Platform) -> Option<&'static str> {
        let index = (self.0 as usize).checked_sub(1)?;
        let table = match platform {
            Platform::HandheldPc => &HPC_DIRECTORIES,
            Platform::PalmSizePc => &PSPC_DIRECTORIES,
            Platform::PocketPc => &PPC_DIRECTORIES,
        };
        table[index]
    }
}

const HPC_DIRECTORIES: [Option<&str>; 17] = [
    Some("\\Program Files"),
    Some("\\Windows"),
    Some("\\Windows\\Desktop"),
    Some("\\Windows\\StartUp"),
    Some("\\My Documents"),
    Some("\\Program Files\\Accessories"),
    Some("\\Program Files\\Communications"),
    Some("\\Program Files\\Games"),
    Some("\\Program Files\\Pocket Outlook"),
    Some("\\Program Files\\Office"),
    Some("\\Windows\\Programs"),
    Some("\\Windows\\Programs\\Accessories"),
    Some("\\Windows\\Programs\\Communications"),
    Some("\\Windows\\Programs\\Games"),
    Some("\\Windows\\Fonts"),
    Some("\\Windows\\Recent"),
    Some("\\Windows\\Favorites"),
];

const PSPC_DIRECTORIES: [Option<&str>; 17] = [
    Some("\\Program Files"),
    Some("\\Windows"),
    None,
    Some("\\Windows\\StartUp"),
    Some("\\My Documents"),
    Some("\\Program Files\\Accessories"),
    Some("\\Program Files\\Communications"),
    Some("\\Program Files\\Games"),
    None,
    None,
    Some("\\Windows\\Start Menu\\Programs"),
    Some("\\Windows\\Start Menu\\Accessories"),
    Some("\\Windows\\Start Menu\\Communications"),
    Some("\\Windows\\Start Menu\\Games"),
    Some("\\Windows\\Fonts"),
    None,
    Some("\\Windows\\Start Menu"),
];

const PPC_DIRECTORIES: [Option<&str>; 17] = [
    Some("\\Program Files"),
    Some("\\Windows"),
    None,
    Some("\\Windows\\StartUp"),
    Some("\\My Documents"),
    None,
    None,
    None,
    None,
    None,
    Some("\\Windows\\Start Menu\\Programs"),
    None,
    None,
    Some("\\Windows\\Start Menu\\Games"),
    Some("\\Windows\\Fonts"),
    None,
    Some("\\Windows\\Start Menu"),
];

/// Replaces every `%CEn%` token in `path` with its path on `platform`.
///
/// Tokens the platform does not map, and `%InstallDir%`, are left as-is.
pub fn expand_placeholders(path: &str, platform: Platform) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find("%CE") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let token_len = candidate[1..].find('%').map(|end| end + 2);

        let replacement = token_len.and_then(|len| {
            let code: u16 = candidate[3..len - 1].parse().ok()?;
            let base = BaseDirectory::from_code(code).ok().filter(|b| b.code() > 0)?;
            base.expand(platform).map(|p| (p, len))
        });

        match replacement {
            Some((expanded, len)) => {
                out.push_str(expanded);
                rest = &candidate[len..];
            }
            None => {
                out.push_str("%CE");
                rest = &candidate[3..];
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_directory_table() {
        assert_eq!(BASE_DIRECTORIES.len(), 18);
        assert_eq!(BaseDirectory::from_code(0).unwrap().placeholder(), "%InstallDir%");
        assert_eq!(BaseDirectory::from_code(17).unwrap().placeholder(), "%CE17%");
        assert_eq!(
            BaseDirectory::from_code(18).unwrap_err(),
            FormatError::UnknownBaseDirectory(18)
        );
        assert_eq!(
            BaseDirectory::from_code(99).unwrap_err(),
            FormatError::UnknownBaseDirectory(99)
        );
    }

    #[test]
    fn test_expand_per_platform() {
        let games = BaseDirectory::from_code(8).unwrap();
        assert_eq!(games.expand(Platform::HandheldPc), Some("\\Program Files\\Games"));
        assert_eq!(games.expand(Platform::PocketPc), None);
        assert_eq!(BaseDirectory::from_code(0).unwrap().expand(Platform::PocketPc), None);
    }

    #[test]
    fn test_expand_placeholders() {
        assert_eq!(
            expand_placeholders("%CE1%\\Acme\\%CE17%", Platform::PocketPc),
            "\\Program Files\\Acme\\\\Windows\\Start Menu"
        );
        assert_eq!(
            expand_placeholders("%CE3%\\x", Platform::PocketPc),
            "%CE3%\\x"
        );
        assert_eq!(
            expand_placeholders("%InstallDir%\\%CE99%\\%CE", Platform::HandheldPc),
            "%InstallDir%\\%CE99%\\%CE"
        );
    }

    #[test]
    fn test_parse_entry() {
        let data = [10, 0, 4, 0, 5, 0, 0, 0];
        let record = Record {
            index: 0,
            offset: 0,
            prefix: &data[..4],
            tail: &data[4..],
        };
        let entry = DirectoryEntry::parse(&record).unwrap();
        assert_eq!(entry.id, 10);
        assert_eq!(entry.spec.ids(), &[5]);
    }
}
