use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::io::{BoundedReader, LocalFileReader, ReadAt};

use super::entry::EntryReader;
use super::parser::{BsaParser, Directory};
use super::structures::{FileRecord, FolderRecord, Header};

/// Options controlling how entries are read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Compressed entries start with a little-endian `u32` holding the
    /// decoded size, followed by the zlib stream. Shipping archives are laid
    /// out this way; when set, the prefix is skipped and the decoded length
    /// is checked against it.
    pub original_size_prefix: bool,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn original_size_prefix(mut self, enabled: bool) -> Self {
        self.original_size_prefix = enabled;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Unloaded,
    Loaded,
    Failed,
}

/// An opened BSA archive.
///
/// Holds the decoded directory (header, folders, the flat file table and a
/// name index) and the data source entries are streamed from. Once loaded
/// the archive is immutable and can be shared between threads; every
/// [`EntryReader`] it hands out reads through its own cursor.
pub struct Archive<R: ReadAt = LocalFileReader> {
    reader: Arc<R>,
    path: PathBuf,
    options: ReadOptions,
    state: LoadState,
    header: Option<Header>,
    folders: Vec<FolderRecord>,
    files: Vec<FileRecord>,
    index: HashMap<String, usize>,
}

impl Archive<LocalFileReader> {
    /// Open and load the archive at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ReadOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let reader = LocalFileReader::new(path).map_err(|e| Error::io(path, e))?;
        let mut archive = Self::new(Arc::new(reader), path).with_options(options);
        archive.load()?;
        Ok(archive)
    }
}

impl<R: ReadAt> Archive<R> {
    /// Wrap a data source without reading it yet; call [`load`](Self::load)
    /// next. `path` labels the archive in errors.
    pub fn new(reader: Arc<R>, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
            options: ReadOptions::default(),
            state: LoadState::Unloaded,
            header: None,
            folders: Vec::new(),
            files: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// Decode the archive directory.
    ///
    /// Loading is attempted once per instance. A failed load leaves the
    /// archive empty and unusable.
    ///
    /// # Errors
    ///
    /// [`Error::Misuse`] if a load was already attempted, otherwise whatever
    /// decoding the directory produced.
    pub fn load(&mut self) -> Result<()> {
        if self.state != LoadState::Unloaded {
            return Err(Error::misuse(format!(
                "archive {} was already loaded",
                self.path.display()
            )));
        }

        let parser = BsaParser::new(Arc::clone(&self.reader), self.path.clone());
        let Directory {
            header,
            folders,
            files,
        } = match parser.parse() {
            Ok(directory) => directory,
            Err(e) => {
                self.state = LoadState::Failed;
                return Err(e);
            }
        };

        let mut index = HashMap::with_capacity(files.len());
        for (i, file) in files.iter().enumerate() {
            if let Some(previous) = index.insert(file.name.clone(), i) {
                warn!(
                    "Duplicate entry '{}' (#{previous} shadowed by #{i}) in {}",
                    file.name,
                    self.path.display()
                );
            }
        }

        self.header = Some(header);
        self.folders = folders;
        self.files = files;
        self.index = index;
        self.state = LoadState::Loaded;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> ReadOptions {
        self.options
    }

    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }

    /// Decoded header, once loaded
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn folders(&self) -> &[FolderRecord] {
        &self.folders
    }

    /// All entries in directory order: folder by folder, files in record order.
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Position of the entry stored under exactly `name`.
    ///
    /// Names are matched as spelled in the archive: original case, `\`
    /// separators. This is *not* the normalized form used by
    /// [`hash_path`](crate::hash_path), so `meshes/x.nif` will not find
    /// `meshes\x.nif`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn record_at(&self, position: usize) -> Option<&FileRecord> {
        self.files.get(position)
    }

    /// Record stored under exactly `name`.
    pub fn get(&self, name: &str) -> Option<&FileRecord> {
        self.index_of(name).and_then(|i| self.record_at(i))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Open a stream over the contents of `name`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no entry is stored under `name`.
    pub fn get_file(&self, name: &str) -> Result<EntryReader<R>> {
        self.ensure_loaded()?;
        let record = self
            .get(name)
            .ok_or_else(|| Error::not_found(&self.path, name))?;
        self.open_record(record)
    }

    /// Open a stream over the contents of `record`.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] if the entry's data does not fit inside the archive.
    pub fn open_record(&self, record: &FileRecord) -> Result<EntryReader<R>> {
        self.ensure_loaded()?;

        let size = self.reader.size();
        if record.end() > size {
            warn!(
                "Entry '{}' spans {}..{} past the end of {} ({size} bytes)",
                record.name,
                record.offset,
                record.end(),
                self.path.display()
            );
            return Err(Error::format(
                &self.path,
                format!("entry '{}' extends past the end of the archive", record.name),
            ));
        }

        let mut window = BoundedReader::new(
            Arc::clone(&self.reader),
            u64::from(record.offset),
            u64::from(record.real_size()),
        )
        .map_err(|e| Error::io(&self.path, e))?;

        debug!(
            "Opening '{}' ({} bytes at {}, compressed: {})",
            record.name,
            record.real_size(),
            record.offset,
            record.compressed
        );

        if !record.compressed {
            return Ok(EntryReader::stored(window));
        }

        let expected = if self.options.original_size_prefix {
            let original = window
                .read_u32::<LittleEndian>()
                .map_err(|e| Error::decoding(&self.path, "original size prefix", e))?;
            Some(u64::from(original))
        } else {
            None
        };
        Ok(EntryReader::zlib(window, expected))
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(Error::misuse(format!(
                "archive {} is not loaded",
                self.path.display()
            )))
        }
    }
}
