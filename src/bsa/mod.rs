//! BSA archive reading.
//!
//! ## Architecture
//!
//! - [`structures`]: constants and decoded records (header, folders, files)
//! - [`parser`]: directory decoding from any [`ReadAt`](crate::io::ReadAt) source
//! - [`archive`]: the loaded archive, its name index and entry streams
//! - [`extractor`]: helpers for copying entries to memory, writers and disk
//!
//! ## Format Overview
//!
//! Only version 103 archives are understood. Every entry is described by a
//! file record inside its folder's section of the directory, and its bare
//! name lives in a separate block after all records. Entry data is either
//! stored or zlib-compressed: the archive flags give the default, and bit 29
//! of an entry's size field flips it for that entry.
//!
//! ## Limitations
//!
//! - Read only, archives cannot be written or modified
//! - zlib is the only compression scheme
//! - The name hashes stored in records are kept but never used for lookup

mod archive;
mod entry;
mod extractor;
mod parser;
mod structures;

pub use archive::{Archive, ReadOptions};
pub use entry::EntryReader;
pub use extractor::entry_path;
pub use parser::{BsaParser, Directory};
pub use structures::*;
