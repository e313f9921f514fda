//! Structured JSON export.

use crate::descriptor::{Descriptor, File, Link, RegistryEntry};
use crate::header::CeVersion;
use crate::utils::hex_pairs;
use crate::value::ValueData;
use serde::Serialize;
use serde_json::Value;

/// Top-level JSON document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorJson {
    /// Application name.
    pub app_name: String,
    /// Provider name.
    pub provider: String,
    /// Architecture name, null when unknown or unrestricted.
    pub architecture: Option<&'static str>,
    /// Unsupported platforms; omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unsupported: Vec<String>,
    /// Minimum CE version; omitted when unrestricted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_ce_version: Option<VersionJson>,
    /// Maximum CE version; omitted when unrestricted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ce_version: Option<VersionJson>,
    /// Minimum CE build; omitted when zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_ce_build_number: Option<u32>,
    /// Maximum CE build; omitted when zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ce_build_number: Option<u32>,
    /// Directories.
    pub directories: Vec<DirectoryJson>,
    /// Files.
    pub files: Vec<FileJson>,
    /// Registry values.
    pub registry_entries: Vec<RegistryEntryJson>,
    /// Shell links.
    pub links: Vec<LinkJson>,
}

/// A CE version bound.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// `"major.minor"`.
    pub string_value: String,
}

impl From<CeVersion> for VersionJson {
    fn from(version: CeVersion) -> Self {
        Self {
            major: version.major,
            minor: version.minor,
            string_value: version.to_string(),
        }
    }
}

/// A directory.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryJson {
    /// Directory id.
    pub id: u16,
    /// Resolved path.
    pub path: String,
}

/// A file. Flag fields appear only when set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileJson {
    /// File id.
    pub id: u16,
    /// File name.
    pub name: String,
    /// Resolved target directory.
    pub directory: String,
    /// Set flags.
    #[serde(flatten)]
    pub flags: FileFlagsJson,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Named file flag bits.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFlagsJson {
    #[serde(skip_serializing_if = "is_false")]
    is_reference_counting_shared_file: bool,
    #[serde(skip_serializing_if = "is_false")]
    ignore_cab_file_date: bool,
    #[serde(skip_serializing_if = "is_false")]
    do_not_over_write_if_target_is_newer: bool,
    #[serde(skip_serializing_if = "is_false")]
    self_register_dll: bool,
    #[serde(skip_serializing_if = "is_false")]
    do_not_copy_unless_target_exists: bool,
    #[serde(skip_serializing_if = "is_false")]
    over_write_target_if_exists: bool,
    #[serde(skip_serializing_if = "is_false")]
    do_not_skip: bool,
    #[serde(skip_serializing_if = "is_false")]
    warn_if_skipped: bool,
}

impl From<&File> for FileJson {
    fn from(file: &File) -> Self {
        let flags = file.flags;
        Self {
            id: file.id,
            name: file.name.clone(),
            directory: file.directory.clone(),
            flags: FileFlagsJson {
                is_reference_counting_shared_file: flags.is_reference_counted(),
                ignore_cab_file_date: flags.ignores_cab_date(),
                do_not_over_write_if_target_is_newer: flags.keeps_newer_target(),
                self_register_dll: flags.self_registers(),
                do_not_copy_unless_target_exists: flags.copies_only_if_exists(),
                over_write_target_if_exists: flags.overwrites_if_exists(),
                do_not_skip: flags.no_skip(),
                warn_if_skipped: flags.warns_if_skipped(),
            },
        }
    }
}

/// A registry value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntryJson {
    /// Full key path.
    pub path: String,
    /// Value name, null for the default value.
    pub name: Option<String>,
    /// `REG_DWORD`, `REG_SZ`, `REG_MULTI_SZ` or `REG_BINARY`.
    pub data_type: &'static str,
    /// Number, string, array of strings, or comma-separated hex.
    pub value: Value,
}

impl From<&RegistryEntry> for RegistryEntryJson {
    fn from(entry: &RegistryEntry) -> Self {
        let value = match &entry.value {
            ValueData::Dword(d) => Value::from(*d),
            ValueData::String(s) => Value::from(s.as_str()),
            ValueData::MultiString { strings, .. } => Value::from(strings.clone()),
            ValueData::Binary(b) => Value::from(hex_pairs(b)),
        };
        Self {
            path: entry.path.clone(),
            name: entry.name.clone(),
            data_type: entry.value.value_type().name(),
            value,
        }
    }
}

/// A shell link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkJson {
    /// Link id.
    pub link_id: u16,
    /// True if the target is a file.
    pub is_file: bool,
    /// Target file or directory id.
    pub target_id: u16,
    /// Where the link is created.
    pub link_path: String,
    /// What the link points at.
    pub target_path: String,
}

impl From<&Link> for LinkJson {
    fn from(link: &Link) -> Self {
        Self {
            link_id: link.id,
            is_file: link.is_file(),
            target_id: link.target_id,
            link_path: link.link_path.clone(),
            target_path: link.target_path.clone(),
        }
    }
}

impl From<&Descriptor> for DescriptorJson {
    fn from(d: &Descriptor) -> Self {
        Self {
            app_name: d.app_name.clone(),
            provider: d.provider.clone(),
            architecture: d.architecture.map(|a| a.name()),
            unsupported: d.unsupported.clone(),
            min_ce_version: d.min_ce_version().map(VersionJson::from),
            max_ce_version: d.max_ce_version().map(VersionJson::from),
            min_ce_build_number: d.min_ce_build(),
            max_ce_build_number: d.max_ce_build(),
            directories: d
                .directories
                .iter()
                .map(|dir| DirectoryJson {
                    id: dir.id,
                    path: dir.path.clone(),
                })
                .collect(),
            files: d.files.iter().map(FileJson::from).collect(),
            registry_entries: d
                .registry_entries
                .iter()
                .map(RegistryEntryJson::from)
                .collect(),
            links: d.links.iter().map(LinkJson::from).collect(),
        }
    }
}

/// Converts a descriptor to a JSON value.
pub fn to_value(descriptor: &Descriptor) -> serde_json::Result<Value> {
    serde_json::to_value(DescriptorJson::from(descriptor))
}

/// Renders a descriptor as pretty-printed JSON.
pub fn to_string_pretty(descriptor: &Descriptor) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DescriptorJson::from(descriptor))
}
