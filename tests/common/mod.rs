//! Shared fixtures for integration tests.
//!
//! Archives are assembled in memory with the same layout the reader expects:
//! header, folder records, per-folder name and file records, the file name
//! block, then entry data.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use runbsa::bsa::{
    ARCHIVE_FLAG_COMPRESSED, COMPRESSION_TOGGLE_BIT, FILE_RECORD_SIZE, FOLDER_RECORD_SIZE,
    HEADER_SIZE, MAGIC, VERSION,
};
use runbsa::{Archive, ReadOptions};

pub struct TestFile {
    pub name: String,
    pub data: Vec<u8>,
    pub toggle: bool,
}

pub struct TestFolder {
    pub name: String,
    pub files: Vec<TestFile>,
}

/// Builds v103 archives for tests
#[derive(Default)]
pub struct BsaBuilder {
    default_compressed: bool,
    size_prefix: bool,
    folders: Vec<TestFolder>,
}

impl BsaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compressed_by_default(mut self, enabled: bool) -> Self {
        self.default_compressed = enabled;
        self
    }

    /// Write the 4-byte original size in front of compressed data
    pub fn size_prefix(mut self, enabled: bool) -> Self {
        self.size_prefix = enabled;
        self
    }

    pub fn file(self, folder: &str, name: &str, data: &[u8]) -> Self {
        self.push(folder, name, data, false)
    }

    /// Add a file whose compression is the opposite of the archive default
    pub fn toggled_file(self, folder: &str, name: &str, data: &[u8]) -> Self {
        self.push(folder, name, data, true)
    }

    fn push(mut self, folder: &str, name: &str, data: &[u8], toggle: bool) -> Self {
        let file = TestFile {
            name: name.to_string(),
            data: data.to_vec(),
            toggle,
        };
        match self.folders.iter_mut().find(|f| f.name == folder) {
            Some(existing) => existing.files.push(file),
            None => self.folders.push(TestFolder {
                name: folder.to_string(),
                files: vec![file],
            }),
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let file_count: usize = self.folders.iter().map(|f| f.files.len()).sum();
        let total_folder_name_length: usize =
            self.folders.iter().map(|f| f.name.len() + 1).sum();
        let total_file_name_length: usize = self
            .folders
            .iter()
            .flat_map(|f| &f.files)
            .map(|f| f.name.len() + 1)
            .sum();

        let records_end = HEADER_SIZE as usize + FOLDER_RECORD_SIZE * self.folders.len();
        let blocks_len: usize = self
            .folders
            .iter()
            .map(|f| 1 + f.name.len() + 1 + FILE_RECORD_SIZE * f.files.len())
            .sum();
        let data_start = records_end + blocks_len + total_file_name_length;

        // Stored bytes of every entry, in record order
        let payloads: Vec<Vec<u8>> = self
            .folders
            .iter()
            .flat_map(|f| &f.files)
            .map(|f| {
                if self.default_compressed ^ f.toggle {
                    let mut out = Vec::new();
                    if self.size_prefix {
                        out.extend_from_slice(&(f.data.len() as u32).to_le_bytes());
                    }
                    out.extend_from_slice(&zlib(&f.data));
                    out
                } else {
                    f.data.clone()
                }
            })
            .collect();

        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&HEADER_SIZE.to_le_bytes());
        let flags = if self.default_compressed {
            ARCHIVE_FLAG_COMPRESSED
        } else {
            0
        };
        out.extend_from_slice(&flags.to_le_bytes());
        out.extend_from_slice(&(self.folders.len() as u32).to_le_bytes());
        out.extend_from_slice(&(file_count as u32).to_le_bytes());
        out.extend_from_slice(&(total_folder_name_length as u32).to_le_bytes());
        out.extend_from_slice(&(total_file_name_length as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());

        let mut block_pos = records_end;
        for folder in &self.folders {
            out.extend_from_slice(&hash(&folder.name, true).to_le_bytes());
            out.extend_from_slice(&(folder.files.len() as u32).to_le_bytes());
            let raw_offset = block_pos + total_file_name_length;
            out.extend_from_slice(&(raw_offset as u32).to_le_bytes());
            block_pos += 1 + folder.name.len() + 1 + FILE_RECORD_SIZE * folder.files.len();
        }

        let mut data_pos = data_start;
        let mut payload = payloads.iter();
        for folder in &self.folders {
            out.push((folder.name.len() + 1) as u8);
            out.extend_from_slice(folder.name.as_bytes());
            out.push(0);
            for file in &folder.files {
                let stored = payload.next().expect("one payload per file");
                let mut size = stored.len() as u32;
                if file.toggle {
                    size |= COMPRESSION_TOGGLE_BIT;
                }
                out.extend_from_slice(&hash(&file.name, false).to_le_bytes());
                out.extend_from_slice(&size.to_le_bytes());
                out.extend_from_slice(&(data_pos as u32).to_le_bytes());
                data_pos += stored.len();
            }
        }

        for file in self.folders.iter().flat_map(|f| &f.files) {
            out.extend_from_slice(file.name.as_bytes());
            out.push(0);
        }

        assert_eq!(out.len(), data_start);
        for stored in &payloads {
            out.extend_from_slice(stored);
        }
        out
    }

    /// Build and load from memory
    pub fn load(&self) -> Archive<Vec<u8>> {
        load_bytes(self.build(), ReadOptions::default())
    }
}

pub fn load_bytes(bytes: Vec<u8>, options: ReadOptions) -> Archive<Vec<u8>> {
    let mut archive = Archive::new(Arc::new(bytes), "memory.bsa").with_options(options);
    archive.load().expect("fixture archive loads");
    archive
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(bytes).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn hash(name: &str, is_folder: bool) -> u64 {
    runbsa::hash_path(name, is_folder).unwrap_or(0)
}

/// A small archive with two folders, one compressed entry and mixed case
pub fn sample() -> BsaBuilder {
    BsaBuilder::new()
        .file("meshes\\Armor", "Cuirass.NIF", b"nif data for the cuirass")
        .file("meshes\\Armor", "helmet.nif", b"helmet")
        .toggled_file("textures", "sky.dds", &b"blue ".repeat(200))
        .file("textures", "empty.txt", b"")
}
