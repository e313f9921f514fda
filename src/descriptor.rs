//! The fully resolved descriptor model.
//!
//! A [`Descriptor`] owns every resolved string and path, so it outlives the
//! buffer it was decoded from. Decoding is all-or-nothing: the first
//! structural error aborts and no partial model is returned.

use crate::context::Cab000;
use crate::directory::{expand_placeholders, BaseDirectory, Platform};
use crate::error::Result;
use crate::file::FileFlags;
use crate::header::{Architecture, CeVersion, Header};
use crate::link::LinkKind;
use crate::options::DecodeOptions;
use crate::registry::HiveRoot;
use crate::utils::join_path;
use crate::value::ValueData;
use tracing::{info, instrument};

/// A directory with its resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// Directory id.
    pub id: u16,
    /// Joined path components.
    pub path: String,
}

/// A file to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File id, also the cabinet member extension.
    pub id: u16,
    /// Installed file name.
    pub name: String,
    /// Target directory id.
    pub directory_id: u16,
    /// Resolved path of the target directory.
    pub directory: String,
    /// Installation flags.
    pub flags: FileFlags,
    /// Undocumented field, preserved as read.
    pub unknown: u16,
}

impl File {
    /// Returns `directory + separator + name`, without the separator when
    /// the directory is empty.
    pub fn path(&self, separator: &str) -> String {
        join_path(&self.directory, separator, &self.name)
    }

    /// Returns the cabinet member suffix holding the payload, e.g. `"007"`.
    pub fn member_extension(&self) -> String {
        format!("{:03}", self.id)
    }
}

/// A registry key path under one of the root keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegHive {
    /// Hive id.
    pub id: u16,
    /// Root key.
    pub root: HiveRoot,
    /// Root name plus key path.
    pub path: String,
}

/// One registry value to set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Registry key entry id.
    pub id: u16,
    /// Owning hive id.
    pub hive_id: u16,
    /// Resolved path of the owning hive.
    pub path: String,
    /// Value name, `None` for the key's default value.
    pub name: Option<String>,
    /// Decoded value.
    pub value: ValueData,
    /// `%…%` variables in the data are expanded on install.
    pub variable_substitution: bool,
    /// An existing value is kept.
    pub no_clobber: bool,
}

/// A shell link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link id.
    pub id: u16,
    /// Whether `target_id` names a file or a directory.
    pub kind: LinkKind,
    /// File or directory id the link points at.
    pub target_id: u16,
    /// Directory the link is created in.
    pub base_directory: BaseDirectory,
    /// Where the link is created.
    pub link_path: String,
    /// What the link points at.
    pub target_path: String,
    /// Undocumented field, preserved as read.
    pub unknown: u16,
}

impl Link {
    /// Returns true if the link points at a file.
    pub fn is_file(&self) -> bool {
        self.kind == LinkKind::File
    }
}

/// A decoded `.000` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Validated header.
    pub header: Header,
    /// Application name.
    pub app_name: String,
    /// Provider name.
    pub provider: String,
    /// Target architecture, `None` if unrestricted or unknown.
    pub architecture: Option<Architecture>,
    /// Platforms the package refuses to install on.
    pub unsupported: Vec<String>,
    /// Directory table in storage order.
    pub directories: Vec<Directory>,
    /// File table in storage order.
    pub files: Vec<File>,
    /// Registry hive table in storage order.
    pub reg_hives: Vec<RegHive>,
    /// Registry key table in storage order.
    pub registry_entries: Vec<RegistryEntry>,
    /// Link table in storage order.
    pub links: Vec<Link>,
}

impl Descriptor {
    /// Decodes a descriptor with default options.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_with(data, &DecodeOptions::default())
    }

    /// Decodes a descriptor.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use wcecab_parser::{DecodeOptions, Descriptor};
    ///
    /// let data = std::fs::read("setup.000").unwrap();
    /// let descriptor = Descriptor::decode_with(&data, &DecodeOptions::default()).unwrap();
    /// for file in &descriptor.files {
    ///     println!("{}", file.path("\\"));
    /// }
    /// ```
    #[instrument(skip_all, fields(len = data.len()))]
    pub fn decode_with(data: &[u8], options: &DecodeOptions) -> Result<Self> {
        let cab = Cab000::with_options(data, options.clone())?;
        let descriptor = Self::from_context(&cab)?;
        info!(
            app = %descriptor.app_name,
            files = descriptor.files.len(),
            registry_entries = descriptor.registry_entries.len(),
            links = descriptor.links.len(),
            "Decoded descriptor"
        );
        Ok(descriptor)
    }

    /// Resolves every entry of a bound context.
    pub fn from_context(cab: &Cab000<'_>) -> Result<Self> {
        let directories = cab
            .directories()
            .iter()
            .map(|entry| {
                Ok(Directory {
                    id: entry.id,
                    path: cab.resolve_spec(&entry.spec)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let files = cab
            .files()
            .iter()
            .map(|entry| {
                Ok(File {
                    id: entry.id,
                    name: cab.strings().normalize(entry.name),
                    directory_id: entry.directory_id,
                    directory: cab.resolve_directory(entry.directory_id)?,
                    flags: entry.flags,
                    unknown: entry.unknown,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let reg_hives = cab
            .reg_hives()
            .iter()
            .map(|entry| {
                Ok(RegHive {
                    id: entry.id,
                    root: entry.root,
                    path: cab.resolve_hive_path(entry)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let registry_entries = cab
            .reg_keys()
            .iter()
            .map(|key| {
                Ok(RegistryEntry {
                    id: key.id,
                    hive_id: key.hive_id,
                    path: cab.resolve_reg_path(key.hive_id)?,
                    name: cab.value_name(key),
                    value: cab.decode_value(key)?,
                    variable_substitution: key.variable_substitution != 0,
                    no_clobber: key.no_clobber(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let links = cab
            .links()
            .iter()
            .map(|entry| {
                Ok(Link {
                    id: entry.id,
                    kind: entry.kind,
                    target_id: entry.target_id,
                    base_directory: entry.base_directory,
                    link_path: cab.resolve_link_path(entry)?,
                    target_path: cab.resolve_link_target(entry)?,
                    unknown: entry.unknown,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Descriptor {
            header: cab.header().clone(),
            app_name: cab.app_name(),
            provider: cab.provider(),
            architecture: cab.architecture(),
            unsupported: cab.unsupported(),
            directories,
            files,
            reg_hives,
            registry_entries,
            links,
        })
    }

    /// Minimum CE version, if restricted.
    pub fn min_ce_version(&self) -> Option<CeVersion> {
        self.header.min_ce_version.restricted()
    }

    /// Maximum CE version, if restricted.
    pub fn max_ce_version(&self) -> Option<CeVersion> {
        self.header.max_ce_version.restricted()
    }

    /// Minimum CE build number, if restricted.
    pub fn min_ce_build(&self) -> Option<u32> {
        (self.header.min_ce_build != 0).then_some(self.header.min_ce_build)
    }

    /// Maximum CE build number, if restricted.
    pub fn max_ce_build(&self) -> Option<u32> {
        (self.header.max_ce_build != 0).then_some(self.header.max_ce_build)
    }

    /// Returns a copy with every `%CEn%` placeholder in directory, file,
    /// and link paths replaced by its location on `platform`.
    pub fn expand_placeholders(&self, platform: Platform) -> Descriptor {
        let mut out = self.clone();
        for dir in &mut out.directories {
            dir.path = expand_placeholders(&dir.path, platform);
        }
        for file in &mut out.files {
            file.directory = expand_placeholders(&file.directory, platform);
        }
        for link in &mut out.links {
            link.link_path = expand_placeholders(&link.link_path, platform);
            link.target_path = expand_placeholders(&link.target_path, platform);
        }
        out
    }
}
