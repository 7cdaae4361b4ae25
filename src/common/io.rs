use std::fs::{self, File};
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

/// A loaded input: mapped when large, copied into memory otherwise.
pub enum FileData {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Deref for FileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileData::Mmap(m) => m,
            FileData::Owned(v) => v,
        }
    }
}

impl From<Vec<u8>> for FileData {
    fn from(v: Vec<u8>) -> Self {
        FileData::Owned(v)
    }
}

/// Inputs at least this large are mapped instead of read.
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Load a whole input file.
pub fn read_file(path: &Path) -> io::Result<FileData> {
    let mut file = File::open(path)?;
    let metadata = file.metadata()?;

    if metadata.file_type().is_file() && metadata.len() >= MMAP_THRESHOLD {
        // SAFETY: read-only mapping of a file we do not modify.
        if let Ok(mmap) = unsafe { Mmap::map(&file) } {
            return Ok(FileData::Mmap(mmap));
        }
    }

    let mut buf = Vec::with_capacity(metadata.len() as usize);
    file.read_to_end(&mut buf)?;
    Ok(FileData::Owned(buf))
}

/// Create (or truncate) a file for writing.
pub fn create_file(path: &Path) -> io::Result<File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
