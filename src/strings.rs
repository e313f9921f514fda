//! String table and spec array resolution.
//!
//! Directories, registry hives and links name their paths indirectly: each
//! stores a "spec", a zero-terminated array of string ids. Resolving a spec
//! means looking every id up in the string table and joining the texts.

use crate::error::{FormatError, Result};
use crate::header::TableLocation;
use crate::options::MissingString;
use crate::table::{Identified, IndexedTable, Record, RecordLayout, TableEntry, STRING_RECORD};
use crate::text::TextNormalizer;
use crate::utils::{read_u16_array, until_nul};
use tracing::debug;

/// One entry of the string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringEntry<'a> {
    /// String id referenced by specs.
    pub id: u16,
    /// Raw text bytes, terminator removed.
    pub bytes: &'a [u8],
}

impl<'a> StringEntry<'a> {
    /// Parses a string entry from its table record.
    pub fn parse(record: &Record<'a>) -> Result<Self> {
        Ok(StringEntry {
            id: record.id()?,
            bytes: until_nul(record.tail),
        })
    }
}

impl Identified for StringEntry<'_> {
    fn id(&self) -> u16 {
        self.id
    }
}

impl<'a> TableEntry<'a> for StringEntry<'a> {
    const LAYOUT: RecordLayout = STRING_RECORD;

    fn parse_record(record: &Record<'a>) -> Result<Self> {
        StringEntry::parse(record)
    }
}

/// A zero-terminated list of string ids describing a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spec(Vec<u16>);

impl Spec {
    /// Reads a spec from a record tail. The terminator is not kept.
    pub fn parse(tail: &[u8]) -> Self {
        Spec(read_u16_array(tail))
    }

    /// Returns the ids in path order.
    pub fn ids(&self) -> &[u16] {
        &self.0
    }

    /// Returns true if the spec holds only the terminator.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u16>> for Spec {
    fn from(ids: Vec<u16>) -> Self {
        Spec(ids.into_iter().take_while(|&id| id != 0).collect())
    }
}

/// The decoded string table with an id index.
pub struct StringTable<'a> {
    table: IndexedTable<StringEntry<'a>>,
    normalizer: Box<dyn TextNormalizer + Send + Sync>,
    missing: MissingString,
}

impl<'a> StringTable<'a> {
    /// Walks the string table and indexes it by id.
    ///
    /// When an id occurs twice the first entry wins, matching a linear scan.
    pub fn load(
        data: &'a [u8],
        location: TableLocation,
        normalizer: Box<dyn TextNormalizer + Send + Sync>,
        missing: MissingString,
    ) -> Result<Self> {
        Ok(Self {
            table: IndexedTable::load(data, location)?,
            normalizer,
            missing,
        })
    }

    /// Returns all entries in storage order.
    pub fn entries(&self) -> &[StringEntry<'a>] {
        self.table.entries()
    }

    /// Looks an entry up through the index.
    pub fn get(&self, id: u16) -> Option<&StringEntry<'a>> {
        self.table.get(id)
    }

    /// Looks an entry up by scanning the table in storage order.
    pub fn find_linear(&self, id: u16) -> Option<&StringEntry<'a>> {
        self.table.find_linear(id)
    }

    /// Returns the normalizer this table decodes text with.
    pub fn normalizer(&self) -> &dyn TextNormalizer {
        self.normalizer.as_ref()
    }

    /// Normalizes an arbitrary byte string with this table's normalizer.
    pub fn normalize(&self, bytes: &[u8]) -> String {
        self.normalizer.normalize(bytes)
    }

    /// Resolves a string id to text.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnknownStringId`] when no entry matches and the
    /// table was loaded with [`MissingString::Error`].
    pub fn resolve(&self, id: u16) -> Result<String> {
        match self.get(id) {
            Some(entry) => Ok(self.normalizer.normalize(entry.bytes)),
            None => match self.missing {
                MissingString::Error => Err(FormatError::UnknownStringId(id)),
                MissingString::Empty => {
                    debug!(id, "Substituting empty text for unknown string id");
                    Ok(String::new())
                }
            },
        }
    }

    /// Resolves every id of a spec and joins the texts with `separator`.
    ///
    /// An empty spec yields the empty string.
    pub fn resolve_spec(&self, spec: &Spec, separator: &str) -> Result<String> {
        let parts = spec
            .ids()
            .iter()
            .map(|&id| self.resolve(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::LegacyCodepages;

    fn table_bytes(entries: &[(u16, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for (id, text) in entries {
            out.extend_from_slice(&id.to_le_bytes());
            out.extend_from_slice(&(text.len() as u16).to_le_bytes());
            out.extend_from_slice(text);
        }
        out
    }

    fn load(data: &[u8], count: u16, missing: MissingString) -> StringTable<'_> {
        let location = TableLocation { offset: 0, count };
        StringTable::load(data, location, Box::new(LegacyCodepages::default()), missing).unwrap()
    }

    #[test]
    fn test_resolve_by_value_not_position() {
        let data = table_bytes(&[(9, b"Games\0"), (5, b"Foo\0")]);
        let table = load(&data, 2, MissingString::Error);
        assert_eq!(table.resolve(5).unwrap(), "Foo");
        assert_eq!(table.resolve(9).unwrap(), "Games");
        assert_eq!(table.find_linear(5), table.get(5));
    }

    #[test]
    fn test_unknown_id() {
        let data = table_bytes(&[(1, b"a\0")]);
        let table = load(&data, 1, MissingString::Error);
        assert_eq!(table.resolve(2).unwrap_err(), FormatError::UnknownStringId(2));

        let lenient = load(&data, 1, MissingString::Empty);
        assert_eq!(lenient.resolve(2).unwrap(), "");
    }

    #[test]
    fn test_duplicate_id_first_wins() {
        let data = table_bytes(&[(3, b"first\0"), (3, b"second\0")]);
        let table = load(&data, 2, MissingString::Error);
        assert_eq!(table.resolve(3).unwrap(), "first");
        assert_eq!(table.entries().len(), 2);
    }

    #[test]
    fn test_resolve_spec() {
        let data = table_bytes(&[(2, b"Bar\0"), (1, b"Foo\0")]);
        let table = load(&data, 2, MissingString::Error);

        let spec = Spec::parse(&[1, 0, 2, 0, 0, 0]);
        assert_eq!(table.resolve_spec(&spec, "\\").unwrap(), "Foo\\Bar");

        let empty = Spec::parse(&[0, 0]);
        assert!(empty.is_empty());
        assert_eq!(table.resolve_spec(&empty, "\\").unwrap(), "");

        let missing = Spec::from(vec![1, 7, 0]);
        assert_eq!(
            table.resolve_spec(&missing, "\\").unwrap_err(),
            FormatError::UnknownStringId(7)
        );
    }
}
