//! Directory decoding for v103 BSA archives.
//!
//! ## Layout
//!
//! 1. 36-byte header (magic, version, header size, flags, counts)
//! 2. Folder records, one per folder
//! 3. For each folder, at the folder record's offset: a length-prefixed
//!    folder name followed by that folder's file records
//! 4. The file name block: one NUL-terminated bare name per file record
//! 5. Entry data, addressed by absolute offsets
//!
//! Folder records are contiguous but each points away into the name/file
//! record area, so decoding keeps two cursors: one walking the folder
//! records and one for the block the current record points to. The name
//! block is read from wherever the second cursor ends up.
//!
//! The hash table some tools expect after the directory is never read.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::io::{BoundedReader, ReadAt};

use super::structures::*;

/// Everything decoded from an archive's directory
#[derive(Debug, Clone)]
pub struct Directory {
    pub header: Header,
    pub folders: Vec<FolderRecord>,
    pub files: Vec<FileRecord>,
}

/// Low-level BSA directory parser.
///
/// Typically used through [`Archive`](super::Archive) rather than directly.
pub struct BsaParser<R: ReadAt> {
    reader: Arc<R>,
    path: PathBuf,
}

impl<R: ReadAt> BsaParser<R> {
    /// Create a parser; `path` only labels errors.
    pub fn new(reader: Arc<R>, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the header, folder records, file records and file names.
    pub fn parse(&self) -> Result<Directory> {
        let size = self.reader.size();
        if size < MIN_ARCHIVE_SIZE {
            return Err(Error::format(
                &self.path,
                "File too small to be a valid BSA archive",
            ));
        }

        let mut records = BoundedReader::whole(Arc::clone(&self.reader));
        let header = self.read_header(&mut records)?;
        debug!(
            "BSA header: {} folders, {} files, flags {:#x}",
            header.folder_count, header.file_count, header.archive_flags
        );

        let default_compressed = header.compressed_by_default();
        let mut folders = Vec::new();
        let mut files = Vec::new();

        // Second cursor: folder names and file records. With no folders the
        // name block starts right after the header.
        let mut block = records.clone();

        for i in 0..header.folder_count {
            let raw = RawFolderRecord::read(&mut records)
                .map_err(|e| self.decoding("folder record", e))?;

            let name_offset = raw
                .name_offset(header.total_file_name_length)
                .ok_or_else(|| {
                    Error::format(
                        &self.path,
                        format!(
                            "folder {i} offset {} is smaller than the file name block",
                            raw.raw_offset
                        ),
                    )
                })?;
            block
                .seek(SeekFrom::Start(name_offset))
                .map_err(|e| self.decoding("folder name", e))?;
            let name = read_bstring(&mut block).map_err(|e| self.decoding("folder name", e))?;
            trace!("folder {i} '{name}': {} files at {name_offset}", raw.file_count);

            for _ in 0..raw.file_count {
                let (name_hash, file_size, offset) =
                    read_file_record(&mut block).map_err(|e| self.decoding("file record", e))?;
                files.push(FileRecord::new(
                    name.clone(),
                    name_hash,
                    file_size,
                    offset,
                    default_compressed,
                ));
            }

            folders.push(FolderRecord {
                name,
                name_hash: raw.name_hash,
                file_count: raw.file_count,
                raw_offset: raw.raw_offset,
            });
        }

        let mut names = BufReader::new(block);
        let mut buf = Vec::new();
        for file in &mut files {
            buf.clear();
            names
                .read_until(0, &mut buf)
                .map_err(|e| self.decoding("file name block", e))?;
            if buf.pop() != Some(0) {
                return Err(Error::format(
                    &self.path,
                    "archive truncated while reading file name block",
                ));
            }
            file.name.push('\\');
            file.name.push_str(&String::from_utf8_lossy(&buf));
        }

        debug!("Decoded {} folders and {} files", folders.len(), files.len());

        Ok(Directory {
            header,
            folders,
            files,
        })
    }

    fn read_header<T: Read>(&self, reader: &mut T) -> Result<Header> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| self.decoding("header", e))?;
        if &magic != MAGIC {
            return Err(Error::format(&self.path, "Unrecognized BSA header"));
        }

        let version = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| self.decoding("header", e))?;
        if version != VERSION {
            return Err(Error::format(
                &self.path,
                format!("Unknown BSA version {version}"),
            ));
        }

        let header_size = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| self.decoding("header", e))?;
        if header_size != HEADER_SIZE {
            return Err(Error::format(
                &self.path,
                format!("Unexpected BSA header size {header_size}"),
            ));
        }

        Header::read_counts(reader, version, header_size).map_err(|e| self.decoding("header", e))
    }

    fn decoding(&self, what: &str, err: std::io::Error) -> Error {
        Error::decoding(&self.path, what, err)
    }
}

/// Length-prefixed name; the length counts a trailing NUL when present.
fn read_bstring<T: Read>(reader: &mut T) -> std::io::Result<String> {
    let len = reader.read_u8()?;
    let mut bytes = vec![0u8; usize::from(len)];
    reader.read_exact(&mut bytes)?;
    if let Some(nul) = bytes.iter().position(|&b| b == 0) {
        bytes.truncate(nul);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_file_record<T: Read>(reader: &mut T) -> std::io::Result<(u64, u32, u32)> {
    let name_hash = reader.read_u64::<LittleEndian>()?;
    let size = reader.read_u32::<LittleEndian>()?;
    let offset = reader.read_u32::<LittleEndian>()?;
    Ok((name_hash, size, offset))
}
