//! # runbsa
//!
//! A Rust reader and unpacker for BSA (version 103) game archives.
//!
//! A BSA bundles many named files into one blob. This crate decodes the
//! archive directory in a single pass and then streams individual entries
//! on demand, inflating zlib-compressed ones on the fly, without ever
//! reading the whole archive into memory.
//!
//! ## Features
//!
//! - Directory decoding with exact-name lookup
//! - Per-entry compression resolved from the archive default and the size
//!   field's toggle bit
//! - Streaming reads bounded to one entry, safe to use from many threads
//! - The archive's 64-bit path hash, for tools that build or check records
//!
//! ## Example
//!
//! ```no_run
//! use std::io::Read;
//! use runbsa::Archive;
//!
//! fn main() -> runbsa::Result<()> {
//!     let archive = Archive::open("Oblivion - Meshes.bsa")?;
//!     for file in archive.files() {
//!         println!("{} ({} bytes)", file.name, file.real_size());
//!     }
//!
//!     let mut data = Vec::new();
//!     let mut entry = archive.get_file("meshes\\clutter\\apple.nif")?;
//!     entry.read_to_end(&mut data).map_err(|e| runbsa::Error::io(archive.path(), e))?;
//!     Ok(())
//! }
//! ```

pub mod bsa;
pub mod cli;
pub mod error;
pub mod hash;
pub mod io;

pub use bsa::{Archive, EntryReader, FileRecord, FolderRecord, Header, ReadOptions};
pub use cli::Cli;
pub use error::{Error, Result};
pub use hash::hash_path;
pub use io::{BoundedReader, LocalFileReader, ReadAt};
