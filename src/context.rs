//! The bound descriptor context and reference resolution.
//!
//! [`Cab000`] validates the header, walks all six tables once and keeps an
//! id index for each, so the `resolve_*` operations are lookups rather than
//! rescans. Every resolver reads only from the context it is called on.

use crate::directory::{DirectoryEntry, INSTALL_DIR};
use crate::error::{FormatError, Result};
use crate::file::FileEntry;
use crate::header::{Architecture, Header};
use crate::link::{LinkEntry, LinkKind};
use crate::options::{DecodeOptions, MIN_RESOLUTION_DEPTH};
use crate::registry::{RegHiveEntry, RegKeyEntry};
use crate::strings::{Spec, StringTable};
use crate::table::IndexedTable;
use crate::utils::{join_path, split_multi_string, until_nul};
use crate::value::ValueData;
use tracing::{debug, info, instrument};

/// Tracks the chain of references followed by one resolution.
struct Trail {
    visited: Vec<(&'static str, u16)>,
    max_depth: usize,
}

impl Trail {
    fn new(max_depth: usize) -> Self {
        Self {
            visited: Vec::new(),
            max_depth: max_depth.max(MIN_RESOLUTION_DEPTH),
        }
    }

    /// Records a step, failing on a revisit or when the chain is too long.
    fn enter(&mut self, kind: &'static str, id: u16) -> Result<()> {
        let depth = self.visited.len() + 1;
        if depth > self.max_depth || self.visited.contains(&(kind, id)) {
            return Err(FormatError::CyclicReference { kind, id, depth });
        }
        self.visited.push((kind, id));
        Ok(())
    }
}

/// A validated, indexed view over one descriptor buffer.
pub struct Cab000<'a> {
    data: &'a [u8],
    header: Header,
    options: DecodeOptions,
    strings: StringTable<'a>,
    directories: IndexedTable<DirectoryEntry>,
    files: IndexedTable<FileEntry<'a>>,
    reg_hives: IndexedTable<RegHiveEntry>,
    reg_keys: IndexedTable<RegKeyEntry<'a>>,
    links: IndexedTable<LinkEntry>,
}

impl<'a> Cab000<'a> {
    /// Opens a descriptor with default options.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        Self::with_options(data, DecodeOptions::default())
    }

    /// Validates the header and indexes every table.
    ///
    /// # Errors
    ///
    /// Any header or record-level [`FormatError`]. Id references are not
    /// followed here; they fail when resolved.
    #[instrument(skip_all, fields(len = data.len()))]
    pub fn with_options(data: &'a [u8], options: DecodeOptions) -> Result<Self> {
        let header = Header::parse(data)?;
        let tables = header.tables;

        let strings = StringTable::load(
            data,
            tables.strings,
            options.normalizer.normalizer(),
            options.missing_strings,
        )?;
        let directories = IndexedTable::load(data, tables.directories)?;
        let files = IndexedTable::load(data, tables.files)?;
        let reg_hives = IndexedTable::load(data, tables.reg_hives)?;
        let reg_keys = IndexedTable::load(data, tables.reg_keys)?;
        let links = IndexedTable::load(data, tables.links)?;

        info!(
            strings = strings.entries().len(),
            directories = directories.len(),
            files = files.len(),
            reg_hives = reg_hives.len(),
            reg_keys = reg_keys.len(),
            links = links.len(),
            "Indexed descriptor tables"
        );

        Ok(Self {
            data,
            header,
            options,
            strings,
            directories,
            files,
            reg_hives,
            reg_keys,
            links,
        })
    }

    /// Returns the underlying buffer.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the validated header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the options this context resolves with.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Returns the string table.
    pub fn strings(&self) -> &StringTable<'a> {
        &self.strings
    }

    /// Directory entries in storage order.
    pub fn directories(&self) -> &[DirectoryEntry] {
        self.directories.entries()
    }

    /// File entries in storage order.
    pub fn files(&self) -> &[FileEntry<'a>] {
        self.files.entries()
    }

    /// Registry hive entries in storage order.
    pub fn reg_hives(&self) -> &[RegHiveEntry] {
        self.reg_hives.entries()
    }

    /// Registry key entries in storage order.
    pub fn reg_keys(&self) -> &[RegKeyEntry<'a>] {
        self.reg_keys.entries()
    }

    /// Link entries in storage order.
    pub fn links(&self) -> &[LinkEntry] {
        self.links.entries()
    }

    /// Application name from the header.
    pub fn app_name(&self) -> String {
        self.strings
            .normalize(until_nul(self.header.app_name.bytes(self.data)))
    }

    /// Provider name from the header.
    pub fn provider(&self) -> String {
        self.strings
            .normalize(until_nul(self.header.provider.bytes(self.data)))
    }

    /// Target architecture, if the code is known.
    pub fn architecture(&self) -> Option<Architecture> {
        self.header.architecture()
    }

    /// Platforms the package refuses to install on, e.g. `"HPC"`.
    pub fn unsupported(&self) -> Vec<String> {
        split_multi_string(self.header.unsupported.bytes(self.data))
            .into_iter()
            .map(|s| self.strings.normalize(s))
            .collect()
    }

    /// Resolves a string id to text.
    pub fn resolve_string(&self, id: u16) -> Result<String> {
        self.strings.resolve(id)
    }

    /// Resolves a spec array, joining with the configured separator.
    pub fn resolve_spec(&self, spec: &Spec) -> Result<String> {
        self.strings.resolve_spec(spec, &self.options.separator)
    }

    /// Resolves a directory id to its path.
    ///
    /// Id 0 is the installation directory and needs no table entry.
    ///
    /// # Errors
    ///
    /// [`FormatError::UnknownDirectoryId`] if no entry carries `id`, or any
    /// error from resolving its spec.
    pub fn resolve_directory(&self, id: u16) -> Result<String> {
        self.directory_path(id, &mut Trail::new(self.options.max_resolution_depth))
    }

    /// Resolves a file id to `directory + separator + name`.
    pub fn resolve_file_path(&self, id: u16) -> Result<String> {
        self.file_path(id, &mut Trail::new(self.options.max_resolution_depth))
    }

    /// Resolves a hive id to `root + separator + key path`.
    ///
    /// A hive with an empty spec resolves to the bare root name.
    pub fn resolve_reg_path(&self, hive_id: u16) -> Result<String> {
        let hive = self
            .reg_hives
            .get(hive_id)
            .ok_or(FormatError::UnknownHiveId(hive_id))?;
        self.resolve_hive_path(hive)
    }

    /// Resolves the full key path of a hive entry.
    pub fn resolve_hive_path(&self, hive: &RegHiveEntry) -> Result<String> {
        let key_path = self.resolve_spec(&hive.spec)?;
        Ok(self.join(hive.root.name(), &key_path))
    }

    /// Resolves where a link is created: base directory placeholder plus
    /// its spec.
    pub fn resolve_link_path(&self, link: &LinkEntry) -> Result<String> {
        let name = self.resolve_spec(&link.spec)?;
        Ok(self.join(link.base_directory.placeholder(), &name))
    }

    /// Resolves what a link points at.
    ///
    /// # Errors
    ///
    /// [`FormatError::CyclicReference`] if the chain of references exceeds
    /// `max_resolution_depth` or revisits an entry, plus any lookup error of
    /// the target.
    pub fn resolve_link_target(&self, link: &LinkEntry) -> Result<String> {
        let mut trail = Trail::new(self.options.max_resolution_depth);
        trail.enter("link", link.id)?;
        match link.kind {
            LinkKind::File => self.file_path(link.target_id, &mut trail),
            LinkKind::Directory => self.directory_path(link.target_id, &mut trail),
        }
    }

    /// Decodes the value of a registry key entry.
    pub fn decode_value(&self, key: &RegKeyEntry<'_>) -> Result<ValueData> {
        let value_type = key.value_type()?;
        ValueData::parse(key.data, value_type, key.id, self.strings.normalizer())
    }

    /// Returns the value name of a key entry, `None` for the default value.
    pub fn value_name(&self, key: &RegKeyEntry<'_>) -> Option<String> {
        if key.is_default() {
            None
        } else {
            Some(self.strings.normalize(key.name))
        }
    }

    fn directory_path(&self, id: u16, trail: &mut Trail) -> Result<String> {
        trail.enter("directory", id)?;
        if id == 0 {
            return Ok(INSTALL_DIR.to_string());
        }
        let entry = self
            .directories
            .get(id)
            .ok_or(FormatError::UnknownDirectoryId(id))?;
        self.resolve_spec(&entry.spec)
    }

    fn file_path(&self, id: u16, trail: &mut Trail) -> Result<String> {
        trail.enter("file", id)?;
        let entry = self.files.get(id).ok_or(FormatError::UnknownFileId(id))?;
        let directory = self.directory_path(entry.directory_id, trail)?;
        let name = self.strings.normalize(entry.name);
        debug!(id, directory_id = entry.directory_id, "Resolved file path");
        Ok(self.join(&directory, &name))
    }

    fn join(&self, head: &str, tail: &str) -> String {
        join_path(head, &self.options.separator, tail)
    }
}
