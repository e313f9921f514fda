//! Acquiring descriptor bytes.
//!
//! A `.000` descriptor normally sits inside a cabinet. Extracting it is left
//! to an external tool; this module only obtains already-extracted bytes from
//! a file, a reader or a buffer, and refuses cabinets outright.

use crate::descriptor::Descriptor;
use crate::error::OpenError;
use crate::header::{MSCE_SIGNATURE, MSCF_SIGNATURE};
use crate::options::DecodeOptions;
use crate::utils::read_u32_le;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

/// What a buffer looks like from its first four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// A cabinet archive (`"MSCF"`); the descriptor must be extracted first.
    Cabinet,
    /// A descriptor (`"MSCE"`).
    Descriptor,
    /// Anything else, including buffers shorter than four bytes.
    Unknown,
}

impl ContainerKind {
    /// Classifies a buffer by its signature.
    pub fn sniff(data: &[u8]) -> Self {
        match read_u32_le(data, 0) {
            Ok(MSCF_SIGNATURE) => ContainerKind::Cabinet,
            Ok(MSCE_SIGNATURE) => ContainerKind::Descriptor,
            _ => ContainerKind::Unknown,
        }
    }
}

enum SourceData {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// Descriptor bytes, memory-mapped or owned.
pub struct DescriptorSource {
    data: SourceData,
}

impl DescriptorSource {
    /// Memory-maps a descriptor file.
    ///
    /// # Errors
    ///
    /// [`OpenError::Io`] if the file cannot be opened or mapped,
    /// [`OpenError::Empty`] for an empty file and
    /// [`OpenError::CabinetNotExtracted`] for a cabinet.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenError> {
        info!("Opening descriptor");
        let file = File::open(&path)?;

        if file.metadata()?.len() == 0 {
            return Err(OpenError::Empty);
        }

        // SAFETY: The file is opened read-only and the map is owned by the
        // returned source. Every read of the mapped bytes goes through the
        // bounds-checked decoder.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(size = mmap.len(), "Memory mapped descriptor file");

        Self::from_data(SourceData::Mapped(mmap))
    }

    /// Reads a descriptor from a stream until end of input.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, OpenError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        debug!(size = buf.len(), "Read descriptor from stream");
        Self::from_vec(buf)
    }

    /// Wraps an owned buffer.
    pub fn from_vec(data: Vec<u8>) -> Result<Self, OpenError> {
        Self::from_data(SourceData::Owned(data))
    }

    fn from_data(data: SourceData) -> Result<Self, OpenError> {
        let source = Self { data };
        let bytes = source.as_slice();
        if bytes.is_empty() {
            return Err(OpenError::Empty);
        }
        if ContainerKind::sniff(bytes) == ContainerKind::Cabinet {
            return Err(OpenError::CabinetNotExtracted);
        }
        Ok(source)
    }

    /// Returns the descriptor bytes.
    pub fn as_slice(&self) -> &[u8] {
        match &self.data {
            SourceData::Mapped(mmap) => mmap,
            SourceData::Owned(data) => data,
        }
    }

    /// Returns true if the bytes are memory-mapped.
    pub fn is_mapped(&self) -> bool {
        matches!(self.data, SourceData::Mapped(_))
    }

    /// Decodes the bytes into a [`Descriptor`].
    pub fn decode(&self, options: &DecodeOptions) -> Result<Descriptor, OpenError> {
        Ok(Descriptor::decode_with(self.as_slice(), options)?)
    }
}
