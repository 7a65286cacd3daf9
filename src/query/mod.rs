//! Query parsing and evaluation.

pub mod parser;
pub mod searcher;

pub use parser::{Expr, parse_query};
pub use searcher::{SearchHit, Searcher, TermMatch};
