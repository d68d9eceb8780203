use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;

use super::ReadAt;

/// A read-only window `[start, start + len)` over a [`ReadAt`] source.
///
/// Positions reported and accepted by [`Seek`] are relative to `start`.
/// Reads never return bytes outside the window.
pub struct BoundedReader<R: ReadAt> {
    source: Arc<R>,
    start: u64,
    len: u64,
    pos: u64,
}

impl<R: ReadAt> BoundedReader<R> {
    /// Open a window over `source`.
    ///
    /// # Errors
    ///
    /// Fails with [`io::ErrorKind::InvalidInput`] if the window does not fit
    /// inside the source.
    pub fn new(source: Arc<R>, start: u64, len: u64) -> io::Result<Self> {
        let end = start.checked_add(len);
        if end.is_none_or(|end| end > source.size()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "window {start}+{len} exceeds source size {}",
                    source.size()
                ),
            ));
        }
        Ok(Self {
            source,
            start,
            len,
            pos: 0,
        })
    }

    /// Window over the whole source.
    pub fn whole(source: Arc<R>) -> Self {
        let len = source.size();
        Self {
            source,
            start: 0,
            len,
            pos: 0,
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes left before the end of the window.
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Offset of the window in the underlying source.
    pub fn start(&self) -> u64 {
        self.start
    }
}

impl<R: ReadAt> Clone for BoundedReader<R> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            start: self.start,
            len: self.len,
            pos: self.pos,
        }
    }
}

impl<R: ReadAt> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let want = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let n = self.source.read_at(self.start + self.pos, &mut buf[..want])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: ReadAt> Seek for BoundedReader<R> {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let pos = match target {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        let Some(pos) = pos else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            ));
        };
        self.pos = pos;
        Ok(pos)
    }
}
