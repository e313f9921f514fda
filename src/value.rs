//! Registry value decoding and rendering.

use crate::error::{FormatError, Result};
use crate::text::TextNormalizer;
use crate::utils::{hex_pairs, split_multi_string, until_nul};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fmt;
use std::io::Cursor;

/// Bits of the type word that select the value type.
pub const TYPE_REG_MASK: u32 = 0x0001_0001;

/// Masked type word of a `REG_DWORD` value.
pub const TYPE_REG_DWORD: u32 = 0x0001_0001;

/// Masked type word of a `REG_SZ` value.
pub const TYPE_REG_SZ: u32 = 0x0000_0000;

/// Masked type word of a `REG_MULTI_SZ` value.
pub const TYPE_REG_MULTI_SZ: u32 = 0x0001_0000;

/// Masked type word of a `REG_BINARY` value.
pub const TYPE_REG_BINARY: u32 = 0x0000_0001;

/// Registry value types a descriptor can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// 32-bit little-endian integer.
    Dword,
    /// String.
    String,
    /// NUL-separated strings.
    MultiString,
    /// Binary data.
    Binary,
}

impl ValueType {
    /// Selects the value type from a full type/flag word.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnknownRegType`] if the masked word is not one
    /// of the four type codes.
    pub fn from_type_word(word: u32) -> Result<Self> {
        match word & TYPE_REG_MASK {
            TYPE_REG_DWORD => Ok(ValueType::Dword),
            TYPE_REG_SZ => Ok(ValueType::String),
            TYPE_REG_MULTI_SZ => Ok(ValueType::MultiString),
            TYPE_REG_BINARY => Ok(ValueType::Binary),
            other => Err(FormatError::UnknownRegType(other)),
        }
    }

    /// Returns the name of this value type.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Dword => "REG_DWORD",
            ValueType::String => "REG_SZ",
            ValueType::MultiString => "REG_MULTI_SZ",
            ValueType::Binary => "REG_BINARY",
        }
    }
}

/// Decoded registry value data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueData {
    /// 32-bit integer.
    Dword(u32),

    /// String value.
    String(String),

    /// Multiple strings, with the raw bytes kept for hex rendering.
    MultiString {
        /// Decoded items, empty items dropped.
        strings: Vec<String>,
        /// Payload as stored.
        raw: Vec<u8>,
    },

    /// Binary data.
    Binary(Vec<u8>),
}

impl ValueData {
    /// Decodes a payload of the given type.
    ///
    /// # Arguments
    ///
    /// * `data` - Raw value bytes following the key name.
    /// * `value_type` - Type selected by the key's type word.
    /// * `key_id` - Registry key id for error reporting.
    /// * `normalizer` - Text conversion for string payloads.
    pub fn parse(
        data: &[u8],
        value_type: ValueType,
        key_id: u16,
        normalizer: &dyn TextNormalizer,
    ) -> Result<Self> {
        match value_type {
            ValueType::Dword => {
                if data.len() != 4 {
                    return Err(FormatError::InvalidValueLength {
                        key_id,
                        value_type: value_type.name(),
                        expected: 4,
                        actual: data.len(),
                    });
                }
                let mut cursor = Cursor::new(data);
                let value = cursor
                    .read_u32::<LittleEndian>()
                    .map_err(|_| FormatError::truncated(0, 4, data.len()))?;
                Ok(ValueData::Dword(value))
            }

            ValueType::String => Ok(ValueData::String(normalizer.normalize(until_nul(data)))),

            ValueType::MultiString => Ok(ValueData::MultiString {
                strings: split_multi_string(data)
                    .into_iter()
                    .map(|s| normalizer.normalize(s))
                    .collect(),
                raw: data.to_vec(),
            }),

            ValueType::Binary => Ok(ValueData::Binary(data.to_vec())),
        }
    }

    /// Returns the value type of this data.
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueData::Dword(_) => ValueType::Dword,
            ValueData::String(_) => ValueType::String,
            ValueData::MultiString { .. } => ValueType::MultiString,
            ValueData::Binary(_) => ValueType::Binary,
        }
    }

    /// Renders the value the way a `.reg` file writes it.
    ///
    /// `dword:0000002A`, `"text"`, `hex(7):41,00,00` or `hex:01,02`.
    pub fn to_regedit(&self) -> String {
        match self {
            ValueData::Dword(d) => format!("dword:{:08X}", d),
            ValueData::String(s) => format!("\"{}\"", escape_regedit(s)),
            ValueData::MultiString { raw, .. } => format!("hex(7):{}", hex_pairs(raw)),
            ValueData::Binary(b) => format!("hex:{}", hex_pairs(b)),
        }
    }
}

impl fmt::Display for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueData::Dword(d) => write!(f, "{}", d),
            ValueData::String(s) => write!(f, "{}", s),
            ValueData::MultiString { strings, .. } => write!(f, "{}", strings.join(", ")),
            ValueData::Binary(b) => write!(f, "{}", hex_pairs(b)),
        }
    }
}

/// Escapes `\` and `"` for a quoted `.reg` string.
pub fn escape_regedit(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::LegacyCodepages;

    fn parse(data: &[u8], word: u32) -> Result<ValueData> {
        let value_type = ValueType::from_type_word(word)?;
        ValueData::parse(data, value_type, 1, &LegacyCodepages::default())
    }

    #[test]
    fn test_type_word_masking() {
        assert_eq!(ValueType::from_type_word(0x0001_0001).unwrap(), ValueType::Dword);
        assert_eq!(ValueType::from_type_word(0x0000_0002).unwrap(), ValueType::String);
        assert_eq!(ValueType::from_type_word(0x0001_0002).unwrap(), ValueType::MultiString);
        assert_eq!(ValueType::from_type_word(0x2000_0001).unwrap(), ValueType::Binary);
        assert_eq!(ValueType::Dword.name(), "REG_DWORD");
    }

    #[test]
    fn test_dword() {
        let value = parse(&[0x01, 0x00, 0x00, 0x00], TYPE_REG_DWORD).unwrap();
        assert_eq!(value, ValueData::Dword(1));
        assert_eq!(value.to_regedit(), "dword:00000001");
        assert_eq!(value.to_string(), "1");
    }

    #[test]
    fn test_dword_wrong_length() {
        let err = parse(&[0x01, 0x00], TYPE_REG_DWORD).unwrap_err();
        assert_eq!(
            err,
            FormatError::InvalidValueLength {
                key_id: 1,
                value_type: "REG_DWORD",
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn test_string() {
        let value = parse(b"C:\\say \"hi\"\0", TYPE_REG_SZ).unwrap();
        assert_eq!(value, ValueData::String("C:\\say \"hi\"".to_string()));
        assert_eq!(value.to_regedit(), r#""C:\\say \"hi\"""#);

        let unterminated = parse(b"abc", TYPE_REG_SZ).unwrap();
        assert_eq!(unterminated, ValueData::String("abc".to_string()));
    }

    #[test]
    fn test_multi_string() {
        let value = parse(b"A\0BC\0\0", TYPE_REG_MULTI_SZ).unwrap();
        match &value {
            ValueData::MultiString { strings, .. } => assert_eq!(strings, &["A", "BC"]),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(value.to_regedit(), "hex(7):41,00,42,43,00,00");
        assert_eq!(value.to_string(), "A, BC");
    }

    #[test]
    fn test_binary() {
        let value = parse(&[0xDE, 0xAD, 0x0B], TYPE_REG_BINARY).unwrap();
        assert_eq!(value.to_regedit(), "hex:DE,AD,0B");
        assert_eq!(value.value_type(), ValueType::Binary);
    }
}
