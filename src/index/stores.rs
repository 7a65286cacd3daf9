//! Auxiliary stores: document paths and line-number lists.
//!
//! Both stores are append-only sequences of length-prefixed entries
//! addressed by byte offset. The file-paths store holds one entry per
//! document; the line-numbers store holds one entry per (term,
//! document) pair, written during the per-document flush.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{LancetError, Result};
use crate::storage::{IndexDirectory, LINES_FILE, PATHS_FILE};

/// Store of document path strings: `[i64 length][length bytes]`.
#[derive(Debug)]
pub struct PathStore {
    file: File,
}

impl PathStore {
    /// Create the path store, truncating any previous contents.
    pub fn create(directory: &IndexDirectory) -> Result<Self> {
        Ok(PathStore {
            file: directory.create_file(PATHS_FILE)?,
        })
    }

    /// Open an existing path store read-only.
    pub fn open(directory: &IndexDirectory) -> Result<Self> {
        Ok(PathStore {
            file: directory.open_file(PATHS_FILE)?,
        })
    }

    /// Append a path, returning the offset of its entry.
    pub fn append(&mut self, path: &str) -> Result<i64> {
        let offset = self.file.seek(SeekFrom::End(0))? as i64;
        let bytes = path.as_bytes();
        self.file.write_i64::<LittleEndian>(bytes.len() as i64)?;
        self.file.write_all(bytes)?;
        Ok(offset)
    }

    /// Read the path stored at `offset`.
    pub fn read(&mut self, offset: i64) -> Result<String> {
        self.file.seek(SeekFrom::Start(offset as u64))?;
        let length = self.file.read_i64::<LittleEndian>()?;
        if length < 0 {
            return Err(LancetError::storage(format!(
                "Corrupt path entry at {offset}: length {length}"
            )));
        }

        let mut bytes = vec![0u8; length as usize];
        self.file.read_exact(&mut bytes)?;
        String::from_utf8(bytes)
            .map_err(|e| LancetError::storage(format!("Corrupt path entry at {offset}: {e}")))
    }
}

/// Store of per-(term, document) line numbers: `[i64 count][count x i64]`.
#[derive(Debug)]
pub struct LineStore {
    file: File,
}

impl LineStore {
    /// Create the line store, truncating any previous contents.
    pub fn create(directory: &IndexDirectory) -> Result<Self> {
        Ok(LineStore {
            file: directory.create_file(LINES_FILE)?,
        })
    }

    /// Open an existing line store read-only.
    pub fn open(directory: &IndexDirectory) -> Result<Self> {
        Ok(LineStore {
            file: directory.open_file(LINES_FILE)?,
        })
    }

    /// Append a list of line numbers (callers pass them ascending),
    /// returning the offset of the entry.
    pub fn append(&mut self, lines: &[i64]) -> Result<i64> {
        let offset = self.file.seek(SeekFrom::End(0))? as i64;
        self.file.write_i64::<LittleEndian>(lines.len() as i64)?;
        for &line in lines {
            self.file.write_i64::<LittleEndian>(line)?;
        }
        Ok(offset)
    }

    /// Read the line list stored at `offset`.
    pub fn read(&mut self, offset: i64) -> Result<Vec<i64>> {
        self.file.seek(SeekFrom::Start(offset as u64))?;
        let count = self.file.read_i64::<LittleEndian>()?;
        if count < 0 {
            return Err(LancetError::storage(format!(
                "Corrupt line entry at {offset}: count {count}"
            )));
        }

        let mut lines = Vec::with_capacity(count as usize);
        for _ in 0..count {
            lines.push(self.file.read_i64::<LittleEndian>()?);
        }
        Ok(lines)
    }
}
