//! Decoder configuration.

use crate::text::TextEncoding;
use serde::{Deserialize, Serialize};

/// Default path separator used when joining spec components.
pub const DEFAULT_SEPARATOR: &str = "\\";

/// Default bound on link → file → directory resolution chains.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 8;

/// Length of the longest acyclic chain (link, file, directory).
pub const MIN_RESOLUTION_DEPTH: usize = 3;

/// What to do when a spec references a string id that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingString {
    /// Abort the decode with `FormatError::UnknownStringId`.
    #[default]
    Error,
    /// Substitute the empty string.
    Empty,
}

/// Options controlling how a descriptor is decoded and resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Separator placed between path components.
    pub separator: String,
    /// Policy for unknown string ids.
    pub missing_strings: MissingString,
    /// Maximum depth of a reference chain before it is reported as cyclic.
    pub max_resolution_depth: usize,
    /// Text normalization applied to every string.
    pub normalizer: TextEncoding,
}

impl DecodeOptions {
    /// Setter for the `separator` field
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Setter for the `missing_strings` field
    ///```
    /// use wcecab_parser::{DecodeOptions, MissingString};
    ///
    /// let options = DecodeOptions::default().missing_strings(MissingString::Empty);
    /// assert_eq!(options.missing_strings, MissingString::Empty);
    ///```
    pub fn missing_strings(mut self, policy: MissingString) -> Self {
        self.missing_strings = policy;
        self
    }

    /// Setter for the `max_resolution_depth` field, raised to at least
    /// [`MIN_RESOLUTION_DEPTH`]
    pub fn max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth.max(MIN_RESOLUTION_DEPTH);
        self
    }

    /// Setter for the `normalizer` field
    pub fn normalizer(mut self, encoding: TextEncoding) -> Self {
        self.normalizer = encoding;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            separator: DEFAULT_SEPARATOR.to_string(),
            missing_strings: MissingString::default(),
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
            normalizer: TextEncoding::default(),
        }
    }
}
