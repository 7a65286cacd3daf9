//! On-disk inverted index: term dictionary, posting lists, auxiliary
//! stores, and the build pipeline.

pub mod dictionary;
pub mod postings;
pub mod stores;
pub mod writer;

pub use dictionary::TermDictionary;
pub use postings::{PostingRecord, PostingStore};
pub use stores::{LineStore, PathStore};
pub use writer::{BuildStats, IndexWriter};
