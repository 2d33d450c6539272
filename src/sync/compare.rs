//! Change Detector: byte-exact content comparison.
//!
//! Only file contents are compared.  Timestamps and permissions never make
//! two files unequal.
use std::io::{self, Read};
use std::path::Path;

use crate::operations::FileSystemOps;

const CHUNK: usize = 8 * 1024;

/// `true` only when `deployed` exists and holds exactly the bytes of
/// `candidate`.
///
/// A missing deployed file is a definite "not equal", never an error.  Any
/// read failure on either side also counts as "not equal" so the caller
/// falls through to a write, which reports the real problem.
#[must_use]
pub fn files_equal(fs: &dyn FileSystemOps, candidate: &Path, deployed: &Path) -> bool {
    if !fs.is_file(deployed) {
        return false;
    }
    match (fs.file_len(candidate), fs.file_len(deployed)) {
        (Ok(a), Ok(b)) if a == b => {}
        _ => return false,
    }
    let (Ok(a), Ok(b)) = (fs.open(candidate), fs.open(deployed)) else {
        return false;
    };
    streams_equal(a, b).unwrap_or(false)
}

/// `true` when `deployed` exists and its contents equal `expected`.
#[must_use]
pub fn content_matches(fs: &dyn FileSystemOps, expected: &[u8], deployed: &Path) -> bool {
    if !fs.is_file(deployed) {
        return false;
    }
    if fs.file_len(deployed).ok() != Some(expected.len() as u64) {
        return false;
    }
    fs.open(deployed)
        .and_then(|r| streams_equal(io::Cursor::new(expected), r))
        .unwrap_or(false)
}

/// Compare two readers chunk by chunk.
fn streams_equal(mut a: impl Read, mut b: impl Read) -> io::Result<bool> {
    let mut buf_a = [0u8; CHUNK];
    let mut buf_b = [0u8; CHUNK];
    loop {
        let n = read_full(&mut a, &mut buf_a)?;
        let m = read_full(&mut b, &mut buf_b)?;
        if buf_a.get(..n) != buf_b.get(..m) {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; short only at end of stream.
fn read_full(r: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let Some(rest) = buf.get_mut(filled..) else {
            break;
        };
        match r.read(rest) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
