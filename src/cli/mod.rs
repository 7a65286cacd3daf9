//! Command line interface for the Lancet search engine.

pub mod args;
pub mod commands;

pub use args::*;
pub use commands::*;
