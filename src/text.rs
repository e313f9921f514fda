//! Text normalization for descriptor strings.
//!
//! Descriptors store strings as raw bytes. Installers built for Western
//! locales produce plain ASCII, but Japanese and Cyrillic packages carry
//! Shift-JIS or windows-1251 text, and newer ones UTF-8. Normalization turns any of these into a
//! Rust `String` and never fails: when no code page fits, the original bytes
//! are kept (lossily) instead.

use crate::error::EncodingError;
use encoding_rs::{Encoding, SHIFT_JIS, WINDOWS_1251};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Converts descriptor byte strings into text.
pub trait TextNormalizer {
    /// Attempts a strict conversion of `bytes`.
    fn try_normalize(&self, bytes: &[u8]) -> std::result::Result<String, EncodingError>;

    /// Converts `bytes`, falling back to lossy UTF-8 of the original bytes.
    fn normalize(&self, bytes: &[u8]) -> String {
        match self.try_normalize(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Keeping original bytes");
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }
}

/// Returns true if every byte is printable 7-bit ASCII (tab, CR and LF included).
pub fn is_printable_ascii(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|&b| matches!(b, 0x20..=0x7E | b'\t' | b'\r' | b'\n'))
}

/// Accepts valid UTF-8, then tries a primary and a fallback legacy code page.
#[derive(Debug, Clone, Copy)]
pub struct LegacyCodepages {
    primary: &'static Encoding,
    fallback: &'static Encoding,
}

impl LegacyCodepages {
    /// Creates a normalizer trying `primary`, then `fallback`.
    pub fn new(primary: &'static Encoding, fallback: &'static Encoding) -> Self {
        Self { primary, fallback }
    }
}

impl Default for LegacyCodepages {
    fn default() -> Self {
        Self::new(SHIFT_JIS, WINDOWS_1251)
    }
}

impl TextNormalizer for LegacyCodepages {
    fn try_normalize(&self, bytes: &[u8]) -> std::result::Result<String, EncodingError> {
        if is_printable_ascii(bytes) {
            return Ok(String::from_utf8_lossy(bytes).into_owned());
        }
        if let Ok(text) = std::str::from_utf8(bytes) {
            return Ok(text.to_string());
        }

        for encoding in [self.primary, self.fallback] {
            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
                return Ok(text.into_owned());
            }
        }

        Err(EncodingError {
            len: bytes.len(),
            tried: format!("{}, {}", self.primary.name(), self.fallback.name()),
        })
    }
}

/// Treats every string as UTF-8, replacing invalid sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Lossy;

impl TextNormalizer for Utf8Lossy {
    fn try_normalize(&self, bytes: &[u8]) -> std::result::Result<String, EncodingError> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Normalizer selection for [`DecodeOptions`](crate::DecodeOptions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// UTF-8, then Shift-JIS, then windows-1251, then the original bytes.
    #[default]
    Legacy,
    /// UTF-8 with replacement characters.
    Utf8Lossy,
}

impl TextEncoding {
    /// Returns the normalizer for this selection.
    pub fn normalizer(self) -> Box<dyn TextNormalizer + Send + Sync> {
        match self {
            TextEncoding::Legacy => Box::new(LegacyCodepages::default()),
            TextEncoding::Utf8Lossy => Box::new(Utf8Lossy),
        }
    }
}
