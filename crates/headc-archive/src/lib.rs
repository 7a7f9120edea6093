//! A small zip helper: read an archive's `.class` entries, write one out.
//!
//! This crate knows nothing about class-file bytes or binary names beyond
//! treating `.class` as a filter on the read side; `headc_classpath` owns
//! turning entry names into `ClassSymbol`s, and `headc_lower`/`headc_cli`
//! own presenting entries in the order the output jar is written in.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to open archive: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("entry not found: {0}")]
    EntryNotFound(String),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

/// A read-only handle onto an open zip archive (a jar on the classpath).
pub struct ArchiveReader<R> {
    inner: ZipArchive<R>,
}

impl ArchiveReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file)
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self { inner: ZipArchive::new(reader)? })
    }

    /// Every entry name ending in `.class`, in the archive's own central
    /// directory order.
    pub fn class_entry_names(&self) -> Vec<String> {
        self.inner.file_names().filter(|name| name.ends_with(".class")).map(|name| name.to_string()).collect()
    }

    pub fn read(&mut self, entry_name: &str) -> Result<Vec<u8>> {
        let mut entry =
            self.inner.by_name(entry_name).map_err(|_| ArchiveError::EntryNotFound(entry_name.to_string()))?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// Writes `entries` (`internal_name.class` → bytes) to a zip archive at
/// `path`. The caller is responsible for ordering: this never sorts, so a
/// caller writing non-class auxiliary entries keeps control of placement.
/// Every entry gets a fixed (zip-epoch) modification time so that otherwise
/// byte-identical archives don't differ by wall-clock time.
pub fn write_archive(path: &Path, entries: &[(String, Vec<u8>)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated).last_modified_time(
        zip::DateTime::default(),
    );

    for (name, bytes) in entries {
        writer.start_file(name, options)?;
        writer.write_all(bytes)?;
    }

    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_entries_through_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jar");
        let entries = vec![
            ("p/A.class".to_string(), vec![1, 2, 3]),
            ("p/B.class".to_string(), vec![4, 5]),
        ];
        write_archive(&path, &entries).unwrap();

        let mut reader = ArchiveReader::open(&path).unwrap();
        let mut names = reader.class_entry_names();
        names.sort();
        assert_eq!(names, vec!["p/A.class".to_string(), "p/B.class".to_string()]);
        assert_eq!(reader.read("p/A.class").unwrap(), vec![1, 2, 3]);
        assert_eq!(reader.read("p/B.class").unwrap(), vec![4, 5]);
    }

    #[test]
    fn missing_entry_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jar");
        write_archive(&path, &[]).unwrap();
        let mut reader = ArchiveReader::open(&path).unwrap();
        assert!(matches!(reader.read("nope.class"), Err(ArchiveError::EntryNotFound(_))));
    }

    #[test]
    fn reads_from_an_in_memory_archive() {
        let mut buf = Vec::new();
        {
            let mut writer = ZipWriter::new(Cursor::new(&mut buf));
            let options = FileOptions::default().compression_method(CompressionMethod::Stored);
            writer.start_file("q/C.class", options).unwrap();
            writer.write_all(&[9, 9]).unwrap();
            writer.finish().unwrap();
        }
        let mut reader = ArchiveReader::new(Cursor::new(buf)).unwrap();
        assert_eq!(reader.read("q/C.class").unwrap(), vec![9, 9]);
    }
}
