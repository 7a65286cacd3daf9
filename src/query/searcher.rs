//! Query evaluation and scoring.
//!
//! A [`Searcher`] loads the global header and the term dictionary once
//! per session. Each search resolves the query's terms to posting
//! chains, runs a multi-way merge over per-term document cursors,
//! scores every candidate with BM25 folded through the boolean
//! expression tree, keeps the top K in a bounded heap, and materializes
//! the per-term match details (path and line numbers) for the retained
//! documents.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;

use crate::error::{LancetError, Result};
use crate::index::dictionary::TermDictionary;
use crate::index::postings::PostingStore;
use crate::index::stores::{LineStore, PathStore};
use crate::query::parser;
use crate::storage::{DICT_FILE, IndexDirectory};

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// One term's contribution to a search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatch {
    /// The query term.
    pub term: String,
    /// Path of the matching document.
    pub path: String,
    /// Ascending line numbers where the term occurs.
    pub lines: Vec<i64>,
}

/// A ranked search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Dense document id.
    pub doc_id: i64,
    /// Folded BM25 score of the boolean expression.
    pub score: f64,
    /// Per-term matches, in query order, one per distinct query term
    /// occurring in this document.
    pub matches: Vec<TermMatch>,
}

/// A scored document for the top-K heap (min-heap by score, so the
/// worst retained hit sits on top).
#[derive(Debug, Clone)]
struct ScoredDoc {
    doc_id: i64,
    score: f64,
}

impl PartialEq for ScoredDoc {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.doc_id == other.doc_id
    }
}

impl Eq for ScoredDoc {}

impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredDoc {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: lower scores come first; higher doc ids lose ties.
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// A cursor over one query term's posting chain.
#[derive(Debug)]
struct TermCursor {
    term: String,
    block: i64,
    doc_freq: i64,
    index: i64,
    /// Current document id, or the exhausted sentinel.
    doc: i64,
}

/// Read-only query session over a persisted index.
#[derive(Debug)]
pub struct Searcher {
    directory: IndexDirectory,
    dictionary: TermDictionary,
    doc_count: i64,
    avg_doc_len: i64,
}

impl Searcher {
    /// Open an index directory and load the header and dictionary.
    pub fn open<P: AsRef<Path>>(index_dir: P) -> Result<Self> {
        let directory = IndexDirectory::open(index_dir)?;

        let mut dict_file = directory.open_file(DICT_FILE)?;
        let doc_count = dict_file.read_i64::<LittleEndian>()?;
        let avg_doc_len = dict_file.read_i64::<LittleEndian>()?;
        if doc_count <= 0 {
            return Err(LancetError::storage(format!(
                "Corrupt index header: document count {doc_count}"
            )));
        }
        let dictionary = TermDictionary::read_from(&mut dict_file)?;

        Ok(Searcher {
            directory,
            dictionary,
            doc_count,
            avg_doc_len,
        })
    }

    /// Number of indexed documents.
    pub fn doc_count(&self) -> i64 {
        self.doc_count
    }

    /// Evaluate `query` and return the top `k` hits, best first.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let expr = parser::parse_query(query)?;
        let terms = expr.terms();

        let mut postings = PostingStore::open(&self.directory)?;
        let exhausted = self.doc_count + 1;

        // One cursor per leaf occurrence, positioned on its first record.
        let mut cursors = Vec::with_capacity(terms.len());
        for term in &terms {
            let block = self.dictionary.find(term.as_bytes()).ok_or_else(|| {
                LancetError::query(format!("Term not found in index: {term}"))
            })?;
            let doc_freq = postings.doc_frequency(block)?;
            let doc = if doc_freq > 0 {
                postings.read_record(block, 0)?.doc_id
            } else {
                exhausted
            };
            cursors.push(TermCursor {
                term: term.to_string(),
                block,
                doc_freq,
                index: 0,
                doc,
            });
        }

        // Multi-way merge: the lowest current document id is the
        // candidate; every cursor tied at it is active this round. The
        // merge runs until every cursor is exhausted.
        let mut heap: BinaryHeap<ScoredDoc> = BinaryHeap::new();
        let mut scores: HashMap<String, f64> = HashMap::new();
        loop {
            let candidate = match cursors.iter().map(|c| c.doc).min() {
                Some(doc) if doc < exhausted => doc,
                _ => break,
            };

            scores.clear();
            for cursor in cursors.iter().filter(|c| c.doc == candidate) {
                let record = postings.read_record(cursor.block, cursor.index)?;
                let score = self.bm25(record.term_freq, cursor.doc_freq, record.doc_len);
                scores.insert(cursor.term.clone(), score);
            }

            let total = expr.score(&scores);
            if total > 0.0 {
                if heap.len() < k {
                    heap.push(ScoredDoc {
                        doc_id: candidate,
                        score: total,
                    });
                } else if let Some(worst) = heap.peek()
                    && total > worst.score
                {
                    heap.pop();
                    heap.push(ScoredDoc {
                        doc_id: candidate,
                        score: total,
                    });
                }
            }

            for cursor in cursors.iter_mut().filter(|c| c.doc == candidate) {
                cursor.index += 1;
                cursor.doc = if cursor.index < cursor.doc_freq {
                    postings.read_record(cursor.block, cursor.index)?.doc_id
                } else {
                    exhausted
                };
            }
        }

        let mut selected: Vec<ScoredDoc> = heap.into_vec();
        selected.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });

        debug!(
            "query {query:?}: {} candidate(s) retained of top {k}",
            selected.len()
        );

        self.materialize(&terms, &selected, &mut postings)
    }

    /// BM25: idf-weighted saturation with document-length normalization.
    fn bm25(&self, term_freq: i64, doc_freq: i64, doc_len: i64) -> f64 {
        let n = self.doc_count as f64;
        let df = doc_freq as f64;
        let tf = term_freq as f64;
        let avg = (self.avg_doc_len.max(1)) as f64;

        let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
        let saturation =
            (tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * doc_len as f64 / avg));

        idf * saturation
    }

    /// Build the per-term match details for the retained documents.
    fn materialize(
        &self,
        terms: &[&str],
        selected: &[ScoredDoc],
        postings: &mut PostingStore,
    ) -> Result<Vec<SearchHit>> {
        let mut paths = PathStore::open(&self.directory)?;
        let mut lines = LineStore::open(&self.directory)?;

        // Distinct query terms, first-occurrence order.
        let mut distinct: Vec<&str> = Vec::new();
        for &term in terms {
            if !distinct.contains(&term) {
                distinct.push(term);
            }
        }

        let mut hits = Vec::with_capacity(selected.len());
        for scored in selected {
            let mut matches = Vec::new();
            for &term in &distinct {
                let block = self.dictionary.find(term.as_bytes()).ok_or_else(|| {
                    LancetError::internal(format!("Resolved term vanished: {term}"))
                })?;
                let Some(record) = postings.find_record(block, scored.doc_id)? else {
                    continue;
                };

                let path = paths.read(record.path_offset)?;
                let line_numbers = if record.line_offset >= 0 {
                    lines.read(record.line_offset)?
                } else {
                    Vec::new()
                };
                matches.push(TermMatch {
                    term: term.to_string(),
                    path,
                    lines: line_numbers,
                });
            }
            hits.push(SearchHit {
                doc_id: scored.doc_id,
                score: scored.score,
                matches,
            });
        }

        Ok(hits)
    }
}
