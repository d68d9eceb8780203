use flate2::read::ZlibDecoder;
use std::io::{self, Read};

use crate::io::{BoundedReader, ReadAt};

/// Stream over one archive entry's contents.
///
/// Stored entries are read straight from their window in the archive,
/// compressed ones go through a zlib decoder on the fly. Corrupt compressed
/// data shows up as an error from [`Read::read`] once the decoder hits it.
pub struct EntryReader<R: ReadAt> {
    inner: Inner<R>,
}

enum Inner<R: ReadAt> {
    Stored(BoundedReader<R>),
    Zlib {
        decoder: ZlibDecoder<BoundedReader<R>>,
        expected: Option<u64>,
        produced: u64,
    },
}

impl<R: ReadAt> EntryReader<R> {
    pub(crate) fn stored(window: BoundedReader<R>) -> Self {
        Self {
            inner: Inner::Stored(window),
        }
    }

    /// `expected` is the decoded length when the archive records it.
    pub(crate) fn zlib(window: BoundedReader<R>, expected: Option<u64>) -> Self {
        Self {
            inner: Inner::Zlib {
                decoder: ZlibDecoder::new(window),
                expected,
                produced: 0,
            },
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self.inner, Inner::Zlib { .. })
    }

    /// Length of the data this reader yields, when known up front.
    pub fn size_hint(&self) -> Option<u64> {
        match &self.inner {
            Inner::Stored(window) => Some(window.len()),
            Inner::Zlib { expected, .. } => *expected,
        }
    }
}

impl<R: ReadAt> Read for EntryReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Stored(window) => window.read(buf),
            Inner::Zlib {
                decoder,
                expected,
                produced,
            } => {
                let n = decoder.read(buf)?;
                *produced += n as u64;
                if let Some(expected) = *expected {
                    if *produced > expected {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("entry inflates past its recorded size of {expected} bytes"),
                        ));
                    }
                    if n == 0 && !buf.is_empty() && *produced < expected {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!(
                                "entry inflated to {produced} bytes, {expected} were recorded"
                            ),
                        ));
                    }
                }
                Ok(n)
            }
        }
    }
}
