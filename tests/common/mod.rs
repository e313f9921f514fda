//! Synthetic `.000` descriptor builder for integration tests.

#![allow(dead_code)]

use wcecab_parser::header::{HEADER_SIZE, MSCE_SIGNATURE};

/// Builds a descriptor buffer with the header and six tables laid out
/// back to back.
#[derive(Debug, Clone, Default)]
pub struct DescriptorBuilder {
    architecture: u32,
    versions: [u32; 6],
    app_name: Vec<u8>,
    provider: Vec<u8>,
    unsupported: Vec<u8>,
    strings: Vec<Vec<u8>>,
    directories: Vec<Vec<u8>>,
    files: Vec<Vec<u8>>,
    reg_hives: Vec<Vec<u8>>,
    reg_keys: Vec<Vec<u8>>,
    links: Vec<Vec<u8>>,
}

fn words(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn spec_bytes(ids: &[u16]) -> Vec<u8> {
    let mut spec = ids.to_vec();
    spec.push(0);
    words(&spec)
}

fn with_nul(text: &[u8]) -> Vec<u8> {
    let mut out = text.to_vec();
    out.push(0);
    out
}

impl DescriptorBuilder {
    pub fn new() -> Self {
        Self {
            app_name: with_nul(b"App"),
            provider: with_nul(b"Provider"),
            ..Self::default()
        }
    }

    pub fn architecture(mut self, code: u32) -> Self {
        self.architecture = code;
        self
    }

    /// Min major, min minor, max major, max minor, min build, max build.
    pub fn versions(mut self, versions: [u32; 6]) -> Self {
        self.versions = versions;
        self
    }

    pub fn app_name(mut self, name: &[u8]) -> Self {
        self.app_name = with_nul(name);
        self
    }

    pub fn provider(mut self, name: &[u8]) -> Self {
        self.provider = with_nul(name);
        self
    }

    pub fn unsupported(mut self, items: &[&str]) -> Self {
        self.unsupported = items.iter().flat_map(|s| with_nul(s.as_bytes())).collect();
        self
    }

    pub fn string(mut self, id: u16, text: &[u8]) -> Self {
        let text = with_nul(text);
        let mut record = words(&[id, text.len() as u16]);
        record.extend(text);
        self.strings.push(record);
        self
    }

    pub fn directory(mut self, id: u16, spec: &[u16]) -> Self {
        let spec = spec_bytes(spec);
        let mut record = words(&[id, spec.len() as u16]);
        record.extend(spec);
        self.directories.push(record);
        self
    }

    pub fn file(mut self, id: u16, directory_id: u16, flags: u32, name: &str) -> Self {
        let name = with_nul(name.as_bytes());
        let mut record = words(&[
            id,
            directory_id,
            id,
            (flags & 0xFFFF) as u16,
            (flags >> 16) as u16,
            name.len() as u16,
        ]);
        record.extend(name);
        self.files.push(record);
        self
    }

    pub fn reg_hive(mut self, id: u16, root: u16, spec: &[u16]) -> Self {
        let spec = spec_bytes(spec);
        let mut record = words(&[id, root, 0, spec.len() as u16]);
        record.extend(spec);
        self.reg_hives.push(record);
        self
    }

    pub fn reg_key(mut self, id: u16, hive_id: u16, type_word: u32, name: &str, data: &[u8]) -> Self {
        let mut tail = with_nul(name.as_bytes());
        tail.extend_from_slice(data);
        let mut record = words(&[
            id,
            hive_id,
            0,
            (type_word & 0xFFFF) as u16,
            (type_word >> 16) as u16,
            tail.len() as u16,
        ]);
        record.extend(tail);
        self.reg_keys.push(record);
        self
    }

    pub fn link(mut self, id: u16, base: u16, target_id: u16, is_file: bool, spec: &[u16]) -> Self {
        let spec = spec_bytes(spec);
        let mut record = words(&[id, 0, base, target_id, is_file as u16, spec.len() as u16]);
        record.extend(spec);
        self.links.push(record);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];

        let put_u32 = |data: &mut Vec<u8>, at: usize, v: u32| {
            data[at..at + 4].copy_from_slice(&v.to_le_bytes());
        };
        put_u32(&mut data, 0x00, MSCE_SIGNATURE);
        put_u32(&mut data, 0x10, 1);
        put_u32(&mut data, 0x14, self.architecture);
        for (i, v) in self.versions.iter().enumerate() {
            put_u32(&mut data, 0x18 + i * 4, *v);
        }

        let put_u16 = |data: &mut Vec<u8>, at: usize, v: u16| {
            data[at..at + 2].copy_from_slice(&v.to_le_bytes());
        };

        for (i, text) in [&self.app_name, &self.provider, &self.unsupported]
            .into_iter()
            .enumerate()
        {
            let offset = data.len() as u16;
            put_u16(&mut data, 0x54 + i * 4, offset);
            put_u16(&mut data, 0x56 + i * 4, text.len() as u16);
            data.extend_from_slice(text);
        }

        let tables = [
            &self.strings,
            &self.directories,
            &self.files,
            &self.reg_hives,
            &self.reg_keys,
            &self.links,
        ];
        for (i, records) in tables.into_iter().enumerate() {
            let offset = data.len() as u32;
            put_u16(&mut data, 0x30 + i * 2, records.len() as u16);
            put_u32(&mut data, 0x3C + i * 4, offset);
            for record in records {
                data.extend_from_slice(record);
            }
        }

        let len = data.len() as u32;
        put_u32(&mut data, 0x08, len);
        data
    }
}

/// A descriptor exercising every table.
pub fn sample() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .app_name(b"Solitaire")
        .provider(b"Acme")
        .architecture(2577)
        .versions([3, 0, 4, 21, 0, 0])
        .unsupported(&["HPC", "PALM PC"])
        .string(1, b"%CE1%")
        .string(2, b"Acme")
        .string(3, b"Software")
        .string(4, b"Solitaire")
        .string(5, b"%CE11%")
        .directory(1, &[1, 2])
        .directory(2, &[5])
        .file(1, 1, 0x8000_0000, "sol.exe")
        .file(2, 0, 0x0000_0002, "readme.txt")
        .reg_hive(1, 3, &[3, 2])
        .reg_hive(2, 2, &[])
        .reg_key(1, 1, 0x0001_0001, "Version", &[0x2A, 0, 0, 0])
        .reg_key(2, 1, 0x0000_0000, "", b"C:\\Acme\0")
        .reg_key(3, 2, 0x0001_0000, "List", b"a\0b\0\0")
        .reg_key(4, 1, 0x0000_0001, "Blob", &[0xDE, 0xAD])
        .link(1, 11, 1, true, &[4])
        .link(2, 0, 2, false, &[2])
}
