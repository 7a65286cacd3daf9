//! # Lancet
//!
//! A small on-disk boolean full-text search engine.
//!
//! Lancet builds an inverted index over a directory of text files and
//! answers boolean (AND/OR, parenthesized) queries ranked by BM25,
//! returning the top-K matching documents together with the line
//! numbers on which each query term occurs.
//!
//! ## Features
//!
//! - Character-trie term dictionary persisted as a single binary blob
//! - Chained fixed-capacity posting blocks with in-place field patching
//! - Recursive-descent boolean query parser
//! - Multi-way posting merge with BM25 scoring and top-K selection

pub mod analysis;
pub mod cli;
pub mod error;
pub mod index;
pub mod query;
pub mod storage;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
