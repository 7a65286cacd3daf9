//! Posting-list binary store.
//!
//! Each term owns a chain of fixed-capacity blocks in the posting
//! store. A block is `[count: i64][next: i64]` followed by a 4096-byte
//! slot reservation (102 posting records). `count` is the number of
//! used slots in that block and `next` is the offset of the next block
//! in the chain, or [`NO_NEXT`]. When the last block fills, a fresh
//! block is appended at end-of-file and linked, so a term's document
//! frequency is unbounded and can never overwrite a neighboring block.
//!
//! A posting record is five little-endian `i64` fields:
//! `{doc_id, path_offset, doc_len, term_freq, line_offset}`.
//! `line_offset` is [`NO_LINES`] until the per-document flush patches
//! in the offset of this record's line-number list.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{LancetError, Result};
use crate::storage::{IndexDirectory, POSTINGS_FILE};

/// Size of one posting record: five i64 fields.
pub const RECORD_BYTES: i64 = 40;

/// Slot reservation per block, in bytes.
pub const BLOCK_RESERVATION_BYTES: i64 = 4096;

/// Records per block.
pub const BLOCK_SLOTS: i64 = BLOCK_RESERVATION_BYTES / RECORD_BYTES;

/// Sentinel line-numbers offset for a record that has not been flushed.
pub const NO_LINES: i64 = -1;

const BLOCK_HEADER_BYTES: i64 = 16;
const NO_NEXT: i64 = -1;

/// One posting record: a (term, document) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingRecord {
    /// Dense document id, assigned in traversal order.
    pub doc_id: i64,
    /// Offset of this document's path in the file-paths store.
    pub path_offset: i64,
    /// Document length (alphabetic token count).
    pub doc_len: i64,
    /// Occurrences of the term in this document.
    pub term_freq: i64,
    /// Offset of this pair's line list in the line-numbers store.
    pub line_offset: i64,
}

/// The on-disk posting-list store.
#[derive(Debug)]
pub struct PostingStore {
    file: File,
}

impl PostingStore {
    /// Create the posting store, truncating any previous contents.
    pub fn create(directory: &IndexDirectory) -> Result<Self> {
        Ok(PostingStore {
            file: directory.create_file(POSTINGS_FILE)?,
        })
    }

    /// Open an existing posting store read-only.
    pub fn open(directory: &IndexDirectory) -> Result<Self> {
        Ok(PostingStore {
            file: directory.open_file(POSTINGS_FILE)?,
        })
    }

    /// Append a zeroed block at end-of-file and return its offset.
    pub fn allocate_block(&mut self) -> Result<i64> {
        let offset = self.file.seek(SeekFrom::End(0))? as i64;
        self.file.write_i64::<LittleEndian>(0)?;
        self.file.write_i64::<LittleEndian>(NO_NEXT)?;
        self.file
            .write_all(&[0u8; BLOCK_RESERVATION_BYTES as usize])?;
        Ok(offset)
    }

    /// Record one occurrence of the owning term in `doc_id`.
    ///
    /// If the document already has a record in the chain its term
    /// frequency is bumped in place; otherwise a fresh record with
    /// `term_freq = 1` is appended, growing the chain when the last
    /// block is full.
    pub fn add_occurrence(
        &mut self,
        block: i64,
        doc_id: i64,
        path_offset: i64,
        doc_len: i64,
    ) -> Result<()> {
        let mut current = block;
        loop {
            let (count, next) = self.read_header(current)?;

            for slot in 0..count {
                let record = self.read_slot(current, slot)?;
                if record.doc_id == doc_id {
                    self.write_field(current, slot, 3, record.term_freq + 1)?;
                    return Ok(());
                }
            }

            if next == NO_NEXT {
                let (target, slot) = if count < BLOCK_SLOTS {
                    (current, count)
                } else {
                    let fresh = self.allocate_block()?;
                    self.write_next(current, fresh)?;
                    (fresh, 0)
                };

                let record = PostingRecord {
                    doc_id,
                    path_offset,
                    doc_len,
                    term_freq: 1,
                    line_offset: NO_LINES,
                };
                self.write_slot(target, slot, &record)?;
                self.write_count(target, slot + 1)?;
                return Ok(());
            }

            current = next;
        }
    }

    /// Document frequency of the owning term: used slots over the chain.
    pub fn doc_frequency(&mut self, block: i64) -> Result<i64> {
        let mut total = 0;
        let mut current = block;
        loop {
            let (count, next) = self.read_header(current)?;
            total += count;
            if next == NO_NEXT {
                return Ok(total);
            }
            current = next;
        }
    }

    /// Read the record at chain-wide `index` (0-based across blocks).
    pub fn read_record(&mut self, block: i64, index: i64) -> Result<PostingRecord> {
        let mut remaining = index;
        let mut current = block;
        loop {
            let (count, next) = self.read_header(current)?;
            if remaining < count {
                return self.read_slot(current, remaining);
            }
            remaining -= count;
            if next == NO_NEXT {
                return Err(LancetError::storage(format!(
                    "Posting index {index} out of bounds for block at {block}"
                )));
            }
            current = next;
        }
    }

    /// Find the record for `doc_id` in the chain, if any.
    pub fn find_record(&mut self, block: i64, doc_id: i64) -> Result<Option<PostingRecord>> {
        let mut current = block;
        loop {
            let (count, next) = self.read_header(current)?;
            for slot in 0..count {
                let record = self.read_slot(current, slot)?;
                if record.doc_id == doc_id {
                    return Ok(Some(record));
                }
            }
            if next == NO_NEXT {
                return Ok(None);
            }
            current = next;
        }
    }

    /// Patch the line-numbers offset of `doc_id`'s record in place.
    pub fn set_line_offset(&mut self, block: i64, doc_id: i64, line_offset: i64) -> Result<()> {
        let mut current = block;
        loop {
            let (count, next) = self.read_header(current)?;
            for slot in 0..count {
                let record = self.read_slot(current, slot)?;
                if record.doc_id == doc_id {
                    return self.write_field(current, slot, 4, line_offset);
                }
            }
            if next == NO_NEXT {
                return Err(LancetError::storage(format!(
                    "No posting record for document {doc_id} in block at {block}"
                )));
            }
            current = next;
        }
    }

    fn read_header(&mut self, block: i64) -> Result<(i64, i64)> {
        self.file.seek(SeekFrom::Start(block as u64))?;
        let count = self.file.read_i64::<LittleEndian>()?;
        let next = self.file.read_i64::<LittleEndian>()?;
        if count < 0 || count > BLOCK_SLOTS {
            return Err(LancetError::storage(format!(
                "Corrupt posting block at {block}: count {count}"
            )));
        }
        Ok((count, next))
    }

    fn write_count(&mut self, block: i64, count: i64) -> Result<()> {
        self.file.seek(SeekFrom::Start(block as u64))?;
        self.file.write_i64::<LittleEndian>(count)?;
        Ok(())
    }

    fn write_next(&mut self, block: i64, next: i64) -> Result<()> {
        self.file.seek(SeekFrom::Start(block as u64 + 8))?;
        self.file.write_i64::<LittleEndian>(next)?;
        Ok(())
    }

    fn slot_offset(block: i64, slot: i64) -> u64 {
        (block + BLOCK_HEADER_BYTES + slot * RECORD_BYTES) as u64
    }

    fn read_slot(&mut self, block: i64, slot: i64) -> Result<PostingRecord> {
        self.file.seek(SeekFrom::Start(Self::slot_offset(block, slot)))?;
        Ok(PostingRecord {
            doc_id: self.file.read_i64::<LittleEndian>()?,
            path_offset: self.file.read_i64::<LittleEndian>()?,
            doc_len: self.file.read_i64::<LittleEndian>()?,
            term_freq: self.file.read_i64::<LittleEndian>()?,
            line_offset: self.file.read_i64::<LittleEndian>()?,
        })
    }

    fn write_slot(&mut self, block: i64, slot: i64, record: &PostingRecord) -> Result<()> {
        self.file.seek(SeekFrom::Start(Self::slot_offset(block, slot)))?;
        self.file.write_i64::<LittleEndian>(record.doc_id)?;
        self.file.write_i64::<LittleEndian>(record.path_offset)?;
        self.file.write_i64::<LittleEndian>(record.doc_len)?;
        self.file.write_i64::<LittleEndian>(record.term_freq)?;
        self.file.write_i64::<LittleEndian>(record.line_offset)?;
        Ok(())
    }

    /// Patch one i64 field of a record (field index 0..5).
    fn write_field(&mut self, block: i64, slot: i64, field: i64, value: i64) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(Self::slot_offset(block, slot) + field as u64 * 8))?;
        self.file.write_i64::<LittleEndian>(value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, PostingStore) {
        let dir = tempfile::tempdir().unwrap();
        let index_dir = IndexDirectory::create(dir.path()).unwrap();
        let store = PostingStore::create(&index_dir).unwrap();
        (dir, store)
    }

    #[test]
    fn test_allocate_block() {
        let (_dir, mut store) = store();

        let first = store.allocate_block().unwrap();
        let second = store.allocate_block().unwrap();

        assert_eq!(first, 0);
        assert_eq!(second, BLOCK_HEADER_BYTES + BLOCK_RESERVATION_BYTES);
        assert_eq!(store.doc_frequency(first).unwrap(), 0);
    }

    #[test]
    fn test_add_occurrence_appends_and_bumps() {
        let (_dir, mut store) = store();
        let block = store.allocate_block().unwrap();

        store.add_occurrence(block, 0, 100, 12).unwrap();
        store.add_occurrence(block, 0, 100, 12).unwrap();
        store.add_occurrence(block, 3, 200, 7).unwrap();

        assert_eq!(store.doc_frequency(block).unwrap(), 2);

        let first = store.read_record(block, 0).unwrap();
        assert_eq!(first.doc_id, 0);
        assert_eq!(first.term_freq, 2);
        assert_eq!(first.doc_len, 12);
        assert_eq!(first.line_offset, NO_LINES);

        let second = store.read_record(block, 1).unwrap();
        assert_eq!(second.doc_id, 3);
        assert_eq!(second.term_freq, 1);
        assert_eq!(second.path_offset, 200);
    }

    #[test]
    fn test_chain_growth_past_block_capacity() {
        let (_dir, mut store) = store();
        let block = store.allocate_block().unwrap();

        let docs = BLOCK_SLOTS + 5;
        for doc_id in 0..docs {
            store.add_occurrence(block, doc_id, doc_id * 10, 3).unwrap();
        }

        assert_eq!(store.doc_frequency(block).unwrap(), docs);

        // Records stay addressable across the chain boundary.
        for doc_id in [0, BLOCK_SLOTS - 1, BLOCK_SLOTS, docs - 1] {
            let record = store.read_record(block, doc_id).unwrap();
            assert_eq!(record.doc_id, doc_id);
            assert_eq!(record.path_offset, doc_id * 10);
        }

        // Bumping a record in the second block still works.
        store.add_occurrence(block, docs - 1, 0, 3).unwrap();
        let record = store.read_record(block, docs - 1).unwrap();
        assert_eq!(record.term_freq, 2);
        assert_eq!(store.doc_frequency(block).unwrap(), docs);
    }

    #[test]
    fn test_chained_terms_do_not_interfere() {
        let (_dir, mut store) = store();
        let first = store.allocate_block().unwrap();
        let second = store.allocate_block().unwrap();

        for doc_id in 0..BLOCK_SLOTS + 1 {
            store.add_occurrence(first, doc_id, 0, 1).unwrap();
        }
        store.add_occurrence(second, 9, 0, 1).unwrap();

        assert_eq!(store.doc_frequency(first).unwrap(), BLOCK_SLOTS + 1);
        assert_eq!(store.doc_frequency(second).unwrap(), 1);
        assert_eq!(store.read_record(second, 0).unwrap().doc_id, 9);
    }

    #[test]
    fn test_set_line_offset() {
        let (_dir, mut store) = store();
        let block = store.allocate_block().unwrap();

        store.add_occurrence(block, 0, 0, 1).unwrap();
        store.add_occurrence(block, 1, 8, 1).unwrap();

        store.set_line_offset(block, 1, 456).unwrap();

        assert_eq!(store.read_record(block, 0).unwrap().line_offset, NO_LINES);
        assert_eq!(store.read_record(block, 1).unwrap().line_offset, 456);
    }

    #[test]
    fn test_set_line_offset_unknown_doc() {
        let (_dir, mut store) = store();
        let block = store.allocate_block().unwrap();

        store.add_occurrence(block, 0, 0, 1).unwrap();
        assert!(store.set_line_offset(block, 42, 0).is_err());
    }

    #[test]
    fn test_find_record() {
        let (_dir, mut store) = store();
        let block = store.allocate_block().unwrap();

        store.add_occurrence(block, 2, 50, 4).unwrap();

        assert_eq!(store.find_record(block, 2).unwrap().unwrap().path_offset, 50);
        assert!(store.find_record(block, 3).unwrap().is_none());
    }

    #[test]
    fn test_read_record_out_of_bounds() {
        let (_dir, mut store) = store();
        let block = store.allocate_block().unwrap();

        store.add_occurrence(block, 0, 0, 1).unwrap();
        assert!(store.read_record(block, 1).is_err());
    }
}
