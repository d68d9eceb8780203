use std::fs;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::io::ReadAt;

use super::archive::Archive;
use super::structures::FileRecord;

impl<R: ReadAt> Archive<R> {
    /// Extract file data to memory
    pub fn extract_to_memory(&self, entry: &FileRecord) -> Result<Vec<u8>> {
        let mut reader = self.open_record(entry)?;
        let capacity = reader.size_hint().unwrap_or(0);
        let mut data = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));
        reader
            .read_to_end(&mut data)
            .map_err(|e| Error::io(self.path(), e))?;
        Ok(data)
    }

    /// Stream file data into `writer`, returning the number of bytes copied
    pub fn extract_to_writer<W: Write>(&self, entry: &FileRecord, writer: &mut W) -> Result<u64> {
        let mut reader = self.open_record(entry)?;
        io::copy(&mut reader, writer).map_err(|e| Error::io(self.path(), e))
    }

    /// Extract file to disk, creating parent directories as needed
    pub fn extract_to_file(&self, entry: &FileRecord, output_path: &Path) -> Result<u64> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::io(output_path, e))?;
            }
        }

        let mut reader = self.open_record(entry)?;
        let mut file = fs::File::create(output_path).map_err(|e| Error::io(output_path, e))?;
        let copied = io::copy(&mut reader, &mut file).map_err(|e| Error::io(self.path(), e))?;
        file.flush().map_err(|e| Error::io(output_path, e))?;
        Ok(copied)
    }
}

/// Relative filesystem path for a stored entry name.
///
/// Both `\` and `/` separate components. Empty, `.`, `..` and rooted
/// components are dropped so the result always stays below the directory it
/// is joined onto.
pub fn entry_path(name: &str) -> PathBuf {
    name.split(['\\', '/'])
        .filter(|part| {
            let mut components = Path::new(part).components();
            matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_path_splits_on_backslashes() {
        assert_eq!(
            entry_path("meshes\\armor\\x.nif"),
            Path::new("meshes").join("armor").join("x.nif")
        );
    }

    #[test]
    fn entry_path_stays_relative() {
        assert_eq!(
            entry_path("..\\..\\etc/passwd"),
            Path::new("etc").join("passwd")
        );
        assert_eq!(entry_path("\\a\\\\.\\b"), Path::new("a").join("b"));
        assert_eq!(entry_path(""), PathBuf::new());
    }
}
