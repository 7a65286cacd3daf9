//! Index directory handling.
//!
//! A persisted index is a directory containing four store files with
//! fixed names: the file-paths store, the posting-lists store, the
//! line-numbers store, and the dictionary store (global header plus
//! serialized term trie). The build phase truncates and rewrites all
//! four; the query phase opens them read-only. The design assumes a
//! single writer and a single reader that never overlap; there is no
//! locking.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{LancetError, Result};

/// File-paths store: sequence of `[i64 length][length bytes of path]`.
pub const PATHS_FILE: &str = "paths.bin";

/// Posting-lists store: chained fixed-capacity blocks of posting records.
pub const POSTINGS_FILE: &str = "postings.bin";

/// Line-numbers store: sequence of `[i64 count][count x i64]`, ascending.
pub const LINES_FILE: &str = "lines.bin";

/// Dictionary store: `[i64 doc_count][i64 avg_doc_len]` then the trie.
pub const DICT_FILE: &str = "dict.bin";

/// A handle to the directory holding the four index store files.
#[derive(Debug, Clone)]
pub struct IndexDirectory {
    directory: PathBuf,
}

impl IndexDirectory {
    /// Create (or reuse) an index directory for writing.
    pub fn create<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            std::fs::create_dir_all(&directory).map_err(|e| {
                LancetError::storage(format!("Failed to create index directory: {e}"))
            })?;
        }
        if !directory.is_dir() {
            return Err(LancetError::storage(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(IndexDirectory { directory })
    }

    /// Open an existing index directory for reading.
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.is_dir() {
            return Err(LancetError::storage(format!(
                "Index directory does not exist: {}",
                directory.display()
            )));
        }

        Ok(IndexDirectory { directory })
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        &self.directory
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    /// Create a store file, truncating any previous contents. The handle
    /// is readable and writable for in-place field patching.
    pub fn create_file(&self, name: &str) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.file_path(name))
            .map_err(|e| LancetError::storage(format!("Failed to create {name}: {e}")))
    }

    /// Open an existing store file read-only.
    pub fn open_file(&self, name: &str) -> Result<File> {
        File::open(self.file_path(name)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LancetError::storage(format!(
                    "Store file not found: {} (is the index built?)",
                    name
                ))
            } else {
                LancetError::storage(format!("Failed to open {name}: {e}"))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom, Write};

    #[test]
    fn test_create_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let index_dir = dir.path().join("idx");

        let created = IndexDirectory::create(&index_dir).unwrap();
        assert_eq!(created.path(), index_dir.as_path());

        let opened = IndexDirectory::open(&index_dir).unwrap();
        assert_eq!(opened.path(), index_dir.as_path());
    }

    #[test]
    fn test_open_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = IndexDirectory::open(dir.path().join("missing"));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_file_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let index_dir = IndexDirectory::create(dir.path()).unwrap();

        let mut file = index_dir.create_file(PATHS_FILE).unwrap();
        file.write_all(b"stale contents").unwrap();
        drop(file);

        let mut file = index_dir.create_file(PATHS_FILE).unwrap();
        file.seek(SeekFrom::End(0)).unwrap();
        assert_eq!(file.stream_position().unwrap(), 0);
    }

    #[test]
    fn test_open_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let index_dir = IndexDirectory::create(dir.path()).unwrap();

        let mut file = index_dir.create_file(LINES_FILE).unwrap();
        file.write_all(b"abc").unwrap();
        drop(file);

        let mut file = index_dir.open_file(LINES_FILE).unwrap();
        let mut buf = String::new();
        file.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "abc");
    }

    #[test]
    fn test_open_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let index_dir = IndexDirectory::create(dir.path()).unwrap();

        let result = index_dir.open_file(DICT_FILE);
        assert!(result.is_err());
    }
}
