use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

/// Magic bytes at the start of every BSA archive
pub const MAGIC: &[u8; 4] = b"BSA\0";

/// The only archive version understood (Oblivion, 0x67)
pub const VERSION: u32 = 103;

/// Declared size of the fixed header
pub const HEADER_SIZE: u32 = 36;

/// Archives shorter than this cannot even hold magic, version and header size
pub const MIN_ARCHIVE_SIZE: u64 = 12;

/// Archive flag: entries are compressed unless their size says otherwise
pub const ARCHIVE_FLAG_COMPRESSED: u32 = 1 << 2;

/// Size-field bit that inverts the archive default compression for one entry
pub const COMPRESSION_TOGGLE_BIT: u32 = 1 << 29;

/// Folder record: 8-byte hash, 4-byte file count, 4-byte offset
pub const FOLDER_RECORD_SIZE: usize = 16;

/// File record: 8-byte hash, 4-byte size, 4-byte offset
pub const FILE_RECORD_SIZE: usize = 16;

/// Decoded fixed-size archive header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub header_size: u32,
    pub archive_flags: u32,
    pub folder_count: u32,
    pub file_count: u32,
    pub total_folder_name_length: u32,
    pub total_file_name_length: u32,
    pub file_flags: u32,
}

impl Header {
    /// Whether entries are compressed unless toggled
    pub fn compressed_by_default(&self) -> bool {
        self.archive_flags & ARCHIVE_FLAG_COMPRESSED != 0
    }

    /// Read the fields following magic, version and header size.
    pub(crate) fn read_counts<T: Read>(
        reader: &mut T,
        version: u32,
        header_size: u32,
    ) -> io::Result<Self> {
        Ok(Self {
            version,
            header_size,
            archive_flags: reader.read_u32::<LittleEndian>()?,
            folder_count: reader.read_u32::<LittleEndian>()?,
            file_count: reader.read_u32::<LittleEndian>()?,
            total_folder_name_length: reader.read_u32::<LittleEndian>()?,
            total_file_name_length: reader.read_u32::<LittleEndian>()?,
            file_flags: reader.read_u32::<LittleEndian>()?,
        })
    }
}

/// Decoded folder record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRecord {
    /// Folder name as stored in the archive
    pub name: String,
    pub name_hash: u64,
    pub file_count: u32,
    /// Offset as stored, still including the total file name length
    pub raw_offset: u32,
}

/// Raw folder record fields, before the name is looked up
pub(crate) struct RawFolderRecord {
    pub name_hash: u64,
    pub file_count: u32,
    pub raw_offset: u32,
}

impl RawFolderRecord {
    pub fn read<T: Read>(reader: &mut T) -> io::Result<Self> {
        Ok(Self {
            name_hash: reader.read_u64::<LittleEndian>()?,
            file_count: reader.read_u32::<LittleEndian>()?,
            raw_offset: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Position of the folder's name block
    ///
    /// Stored offsets count the file name block as if it came first, so it
    /// has to be taken back out. `None` if the offset is smaller than that.
    pub fn name_offset(&self, total_file_name_length: u32) -> Option<u64> {
        self.raw_offset
            .checked_sub(total_file_name_length)
            .map(u64::from)
    }
}

/// Decoded file record, one per archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Full stored name: folder, `\`, bare file name, spelled as in the archive
    pub name: String,
    pub name_hash: u64,
    /// Size field as stored, compression toggle bit included
    pub size: u32,
    /// Absolute offset of the entry data in the archive
    pub offset: u32,
    /// Resolved compression state
    pub compressed: bool,
}

impl FileRecord {
    /// Build a record from its raw fields and the archive default.
    pub fn new(name: String, name_hash: u64, size: u32, offset: u32, default_compressed: bool) -> Self {
        let toggled = size & COMPRESSION_TOGGLE_BIT != 0;
        Self {
            name,
            name_hash,
            size,
            offset,
            compressed: default_compressed ^ toggled,
        }
    }

    /// Stored data length without the compression toggle bit
    pub fn real_size(&self) -> u32 {
        self.size & !COMPRESSION_TOGGLE_BIT
    }

    /// Whether this entry inverts the archive default
    pub fn toggles_compression(&self) -> bool {
        self.size & COMPRESSION_TOGGLE_BIT != 0
    }

    /// End of the entry data, exclusive
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.real_size())
    }

    /// File name without the folder part
    pub fn file_name(&self) -> &str {
        self.name.rsplit('\\').next().unwrap_or(&self.name)
    }
}
