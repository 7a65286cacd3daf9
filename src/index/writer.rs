//! The index build pipeline.
//!
//! [`IndexWriter::build`] walks a directory of text files and drives
//! the four stores: per document it appends the path, tokenizes the
//! file twice (length pass, posting pass), feeds the term dictionary
//! and the posting store, and flushes the per-document line-number
//! accumulator. After the traversal it persists the global header and
//! the serialized dictionary. A rebuild truncates everything first;
//! there is no incremental update.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info};

use crate::analysis;
use crate::error::{LancetError, Result};
use crate::index::dictionary::{NO_POSTINGS, TermDictionary};
use crate::index::postings::PostingStore;
use crate::index::stores::{LineStore, PathStore};
use crate::storage::{DICT_FILE, IndexDirectory};

/// Summary of a completed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStats {
    /// Number of documents indexed.
    pub doc_count: i64,
    /// Total alphabetic token count across the corpus.
    pub token_count: i64,
    /// Average document length (integer division).
    pub avg_doc_len: i64,
}

/// Builds a persisted index from a directory of text files.
#[derive(Debug)]
pub struct IndexWriter {
    directory: IndexDirectory,
}

impl IndexWriter {
    /// Create a writer targeting `index_dir` (created if missing).
    pub fn new<P: AsRef<Path>>(index_dir: P) -> Result<Self> {
        Ok(IndexWriter {
            directory: IndexDirectory::create(index_dir)?,
        })
    }

    /// The index directory this writer targets.
    pub fn directory(&self) -> &IndexDirectory {
        &self.directory
    }

    /// Build the index over every regular file under `root`.
    pub fn build<P: AsRef<Path>>(&mut self, root: P) -> Result<BuildStats> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(LancetError::index(format!(
                "Root path is not a directory or does not exist: {}",
                root.display()
            )));
        }

        let mut paths = PathStore::create(&self.directory)?;
        let mut postings = PostingStore::create(&self.directory)?;
        let mut lines = LineStore::create(&self.directory)?;
        let mut dictionary = TermDictionary::new();

        let mut files = Vec::new();
        collect_files(root, &mut files)?;

        let mut doc_count: i64 = 0;
        let mut token_count: i64 = 0;
        // Per-document scratch: term -> ordered unique line numbers,
        // drained after every document.
        let mut pending: BTreeMap<Vec<u8>, BTreeSet<i64>> = BTreeMap::new();

        for file in &files {
            let doc_id = doc_count;
            let path_string = file.to_string_lossy().into_owned();
            let path_offset = paths.append(&path_string)?;

            let text = fs::read(file)?;

            // Pass 1: alphabetic runs give the document length.
            let doc_len = analysis::alphabetic_token_count(&text);
            token_count += doc_len;

            // Pass 2: whitespace-delimited tokens with line numbers.
            for (token, line) in analysis::line_tokens(&text) {
                let slot = dictionary.insert(&token);
                if *slot == NO_POSTINGS {
                    *slot = postings.allocate_block()?;
                }
                let block = *slot;
                postings.add_occurrence(block, doc_id, path_offset, doc_len)?;
                pending.entry(token).or_default().insert(line);
            }

            // Flush this document's line numbers and patch the records.
            for (term, line_set) in &pending {
                let block = dictionary.find(term).ok_or_else(|| {
                    LancetError::internal(format!(
                        "Pending term missing from dictionary in {path_string}"
                    ))
                })?;
                let numbers: Vec<i64> = line_set.iter().copied().collect();
                let line_offset = lines.append(&numbers)?;
                postings.set_line_offset(block, doc_id, line_offset)?;
            }
            pending.clear();

            debug!("indexed document {doc_id}: {path_string} ({doc_len} tokens)");
            doc_count += 1;
        }

        if doc_count == 0 {
            return Err(LancetError::index(format!(
                "No documents found under {}",
                root.display()
            )));
        }

        let avg_doc_len = token_count / doc_count;

        let mut dict_file = self.directory.create_file(DICT_FILE)?;
        dict_file.write_i64::<LittleEndian>(doc_count)?;
        dict_file.write_i64::<LittleEndian>(avg_doc_len)?;
        dictionary.write_to(&mut dict_file)?;
        dict_file.flush()?;

        info!(
            "indexed {doc_count} documents ({token_count} tokens, average length {avg_doc_len})"
        );

        Ok(BuildStats {
            doc_count,
            token_count,
            avg_doc_len,
        })
    }
}

/// Recursively collect regular files under `dir`, skipping OS artifact
/// files. Entries are sorted per directory so document ids are
/// deterministic across platforms.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<_> =
        fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() && entry.file_name() != ".DS_Store" {
            out.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_build_stats() {
        let root = tempfile::tempdir().unwrap();
        let index = tempfile::tempdir().unwrap();
        write_file(root.path(), "a.txt", "one two three\n");
        write_file(root.path(), "b.txt", "four five\n");

        let mut writer = IndexWriter::new(index.path()).unwrap();
        let stats = writer.build(root.path()).unwrap();

        assert_eq!(stats.doc_count, 2);
        assert_eq!(stats.token_count, 5);
        assert_eq!(stats.avg_doc_len, 2);
    }

    #[test]
    fn test_build_missing_root() {
        let index = tempfile::tempdir().unwrap();
        let mut writer = IndexWriter::new(index.path()).unwrap();

        let result = writer.build(index.path().join("nonexistent"));
        assert!(result.is_err());
    }

    #[test]
    fn test_build_empty_corpus() {
        let root = tempfile::tempdir().unwrap();
        let index = tempfile::tempdir().unwrap();

        let mut writer = IndexWriter::new(index.path()).unwrap();
        let result = writer.build(root.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_term_frequencies_accumulate() {
        let root = tempfile::tempdir().unwrap();
        let index = tempfile::tempdir().unwrap();
        write_file(root.path(), "a.txt", "echo echo echo\nother echo\n");

        let mut writer = IndexWriter::new(index.path()).unwrap();
        writer.build(root.path()).unwrap();

        let directory = IndexDirectory::open(index.path()).unwrap();
        let mut dict_file = directory.open_file(DICT_FILE).unwrap();
        use byteorder::ReadBytesExt;
        let _doc_count = dict_file.read_i64::<LittleEndian>().unwrap();
        let _avg = dict_file.read_i64::<LittleEndian>().unwrap();
        let dictionary = TermDictionary::read_from(&mut dict_file).unwrap();

        let block = dictionary.find(b"echo").unwrap();
        let mut postings = PostingStore::open(&directory).unwrap();
        assert_eq!(postings.doc_frequency(block).unwrap(), 1);

        let record = postings.read_record(block, 0).unwrap();
        assert_eq!(record.term_freq, 4);
        assert_eq!(record.doc_len, 5);

        let mut lines = LineStore::open(&directory).unwrap();
        assert_eq!(lines.read(record.line_offset).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_nested_directories_and_ds_store() {
        let root = tempfile::tempdir().unwrap();
        let index = tempfile::tempdir().unwrap();
        write_file(root.path(), "sub/inner.txt", "nested words here\n");
        write_file(root.path(), "top.txt", "word\n");
        write_file(root.path(), ".DS_Store", "junk junk junk\n");

        let mut writer = IndexWriter::new(index.path()).unwrap();
        let stats = writer.build(root.path()).unwrap();

        assert_eq!(stats.doc_count, 2);
        assert_eq!(stats.token_count, 4);
    }

    #[test]
    fn test_rebuild_truncates() {
        let root = tempfile::tempdir().unwrap();
        let index = tempfile::tempdir().unwrap();
        write_file(root.path(), "a.txt", "repeat repeat\n");

        let mut writer = IndexWriter::new(index.path()).unwrap();
        writer.build(root.path()).unwrap();
        writer.build(root.path()).unwrap();

        let directory = IndexDirectory::open(index.path()).unwrap();
        let mut dict_file = directory.open_file(DICT_FILE).unwrap();
        use byteorder::ReadBytesExt;
        let doc_count = dict_file.read_i64::<LittleEndian>().unwrap();
        let _avg = dict_file.read_i64::<LittleEndian>().unwrap();
        let dictionary = TermDictionary::read_from(&mut dict_file).unwrap();

        assert_eq!(doc_count, 1);

        // Frequencies must not double across rebuilds.
        let block = dictionary.find(b"repeat").unwrap();
        let mut postings = PostingStore::open(&directory).unwrap();
        assert_eq!(postings.doc_frequency(block).unwrap(), 1);
        assert_eq!(postings.read_record(block, 0).unwrap().term_freq, 2);
    }
}
