//! Positioned reads and writes on plain file handles

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Read up to `len` bytes starting at `offset`.
///
/// Hitting end of file is not an error; the returned buffer is simply shorter.
pub fn read_range(mut file: &File, offset: u64, len: u64) -> io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
    file.take(len).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Read the whole file from the start, regardless of the current position
pub fn read_all(mut file: &File) -> io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Overwrite `data` at `offset`, extending the file if needed
pub fn write_at(mut file: &File, offset: u64, data: &[u8]) -> io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(data)
}
