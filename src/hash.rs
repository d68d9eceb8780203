//! Archive name hashing.
//!
//! BSA folder and file records carry a 64-bit hash of their path. The upper
//! 32 bits are a rolling hash over the interior of the name (plus the
//! extension for files), the lower 32 bits pack the first char, the last two
//! chars and the length, with a few flag bits for well-known extensions.
//!
//! Hashing works on the *normalized* form of a path: `/` becomes `\` and
//! ASCII letters are lower-cased. The archive's name index does not apply
//! this normalization; see [`Archive::index_of`](crate::Archive::index_of).

use crate::error::{Error, Result};

/// Longest path, in bytes, that can be hashed.
pub const MAX_PATH_LEN: usize = 254;

const MULTIPLIER: u64 = 0x1003f;

/// Compute the archive hash of `path`.
///
/// With `is_folder` set the whole path is hashed as a directory name and
/// dots carry no meaning. Otherwise everything from the last `.` on is
/// treated as the extension.
///
/// Non-ASCII bytes are hashed as unsigned values and are not case-folded.
///
/// # Errors
///
/// Returns [`Error::Misuse`] for an empty path or one longer than
/// [`MAX_PATH_LEN`] bytes.
///
/// # Examples
///
/// ```
/// assert_eq!(runbsa::hash_path("meshes\\x.nif", false)?, 0x7939_ECE5_6D08_DC78);
/// assert_eq!(runbsa::hash_path("Meshes/X.NIF", false)?, 0x7939_ECE5_6D08_DC78);
/// # Ok::<(), runbsa::Error>(())
/// ```
pub fn hash_path<P: AsRef<[u8]>>(path: P, is_folder: bool) -> Result<u64> {
    let path = path.as_ref();
    if path.is_empty() {
        return Err(Error::misuse("cannot hash an empty path"));
    }
    if path.len() > MAX_PATH_LEN {
        return Err(Error::misuse(format!(
            "path is {} bytes long, hashing is limited to {MAX_PATH_LEN}",
            path.len()
        )));
    }

    let mut buf = [0u8; MAX_PATH_LEN];
    let s = &mut buf[..path.len()];
    s.copy_from_slice(path);
    normalize_in_place(s);
    let s: &[u8] = s;

    let extension = if is_folder {
        None
    } else {
        s.iter().rposition(|&b| b == b'.')
    };

    let mut high = 0u64;
    let mut len = s.len();
    if let Some(dot) = extension {
        high = fold(high, &s[dot..]);
        len = dot;
    }

    // Skip the first char and the last two, they live in the low word.
    if len > 3 {
        high = high.wrapping_add(fold(0, &s[1..len - 2]));
    }
    high <<= 32;

    let last = if len > 0 { s[len - 1] } else { 0 };
    let mut low = u64::from(last);
    if len > 2 {
        low |= u64::from(s[len - 2]) << 8;
    }
    low |= (len as u64) << 16;
    low |= u64::from(s[0]) << 24;

    if let Some(dot) = extension {
        low |= extension_bits(&s[dot..]);
    }

    Ok(high.wrapping_add(low))
}

/// Rewrite `path` into the form the hasher sees.
pub fn normalize_in_place(path: &mut [u8]) {
    for b in path.iter_mut() {
        *b = if *b == b'/' {
            b'\\'
        } else {
            b.to_ascii_lowercase()
        };
    }
}

/// Normalized copy of `path`, as a string.
pub fn normalize(path: &str) -> String {
    path.chars()
        .map(|c| if c == '/' { '\\' } else { c.to_ascii_lowercase() })
        .collect()
}

fn fold(seed: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(seed, |h, &b| h.wrapping_mul(MULTIPLIER).wrapping_add(u64::from(b)))
}

/// Flag bits keyed on the first four bytes of the extension, dot included.
fn extension_bits(extension: &[u8]) -> u64 {
    let mut four = [0u8; 4];
    let n = extension.len().min(4);
    four[..n].copy_from_slice(&extension[..n]);
    match &four {
        b".kf\0" => 0x80,
        b".nif" => 0x8000,
        b".dds" => 0x8080,
        b".wav" => 0x8000_0000,
        _ => 0,
    }
}
