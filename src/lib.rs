//! # Windows CE Cabinet Descriptor Parser
//!
//! Decoder for the `.000` installer descriptor found inside Windows CE
//! `.cab` packages.
//!
//! ## Features
//!
//! - **Bounds-checked**: every record and header field is validated against the buffer
//! - **Indexed resolution**: each table is walked once and indexed by id
//! - **Typed model**: files, registry values and links with resolved paths
//! - **Legacy text**: Shift-JIS and windows-1251 strings normalized to UTF-8
//! - **Exporters**: JSON, `REGEDIT4` and plain summary
//!
//! ## Architecture
//!
//! 1. **Header**: signature, length, architecture, version bounds, table locations
//! 2. **Table walker**: one iterator over the six variable-length record tables
//! 3. **String table**: id to text, and spec arrays to joined paths
//! 4. **Context** ([`Cab000`]): indexed tables plus the `resolve_*` operations
//! 5. **Model** ([`Descriptor`]): owned, fully resolved result of one decode
//! 6. **Exporters** ([`export`]): renderers over the model
//!
//! ## Binary Layout
//!
//! ```text
//! [Header - 100 bytes]
//!   - Signature: "MSCE"
//!   - Declared file length
//!   - Target architecture, CE version and build bounds
//!   - Entry counts and offsets of the six tables
//!   - Offset/length of app name, provider, unsupported list
//!
//! [Tables - at their declared offsets]
//!   [Record - fixed prefix + tail]
//!     - Strings:     id, length, text
//!     - Directories: id, length, spec
//!     - Files:       id, dir id, unknown, flags, length, name
//!     - Reg hives:   id, root, unknown, length, spec
//!     - Reg keys:    id, hive id, substitution, type, length, name + data
//!     - Links:       id, unknown, base dir, target id, kind, length, spec
//! ```
//!
//! ## Examples
//!
//! ### Basic Usage
//!
//! ```no_run
//! use wcecab_parser::{DecodeOptions, DescriptorSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = DescriptorSource::open("SETUP.000")?;
//! let descriptor = source.decode(&DecodeOptions::default())?;
//!
//! println!("{} by {}", descriptor.app_name, descriptor.provider);
//! for file in &descriptor.files {
//!     println!("  {}", file.path("\\"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Resolving Individual References
//!
//! ```no_run
//! use wcecab_parser::Cab000;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("SETUP.000")?;
//! let cab = Cab000::parse(&data)?;
//!
//! for link in cab.links() {
//!     println!("{} -> {}", cab.resolve_link_path(link)?, cab.resolve_link_target(link)?);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod descriptor;
pub mod directory;
pub mod error;
pub mod export;
pub mod file;
pub mod header;
pub mod link;
pub mod options;
pub mod registry;
pub mod source;
pub mod strings;
pub mod table;
pub mod text;
pub mod utils;
pub mod value;

// Re-export main types for convenience
pub use context::Cab000;
pub use descriptor::{Descriptor, Directory, File, Link, RegHive, RegistryEntry};
pub use directory::{expand_placeholders, BaseDirectory, DirectoryEntry, Platform};
pub use error::{EncodingError, FormatError, OpenError, Result};
pub use export::ExportFormat;
pub use file::{FileEntry, FileFlags};
pub use header::{Architecture, CeVersion, Header};
pub use link::{LinkEntry, LinkKind};
pub use options::{DecodeOptions, MissingString};
pub use registry::{HiveRoot, RegHiveEntry, RegKeyEntry};
pub use source::{ContainerKind, DescriptorSource};
pub use strings::{Spec, StringTable};
pub use table::{RecordLayout, TableWalker};
pub use text::{LegacyCodepages, TextEncoding, TextNormalizer, Utf8Lossy};
pub use value::{ValueData, ValueType};

/// Decodes a descriptor buffer with default options.
pub fn decode(data: &[u8]) -> Result<Descriptor> {
    Descriptor::decode(data)
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
