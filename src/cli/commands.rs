//! Command implementations for the Lancet CLI.

use std::io::{self, BufRead};

use crate::cli::args::*;
use crate::error::{LancetError, Result};
use crate::index::IndexWriter;
use crate::query::{SearchHit, Searcher};

/// Execute a CLI command.
pub fn execute_command(args: LancetArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => build_index(index_args.clone(), &args),
        Command::Search(search_args) => search_index(search_args.clone(), &args),
    }
}

/// Build the index over a document directory.
fn build_index(args: IndexArgs, cli_args: &LancetArgs) -> Result<()> {
    if cli_args.verbosity() > 1 {
        println!("Indexing {} into {}", args.root.display(), args.index_dir.display());
    }

    let mut writer = IndexWriter::new(&args.index_dir)?;
    let stats = writer.build(&args.root)?;

    if cli_args.verbosity() > 0 {
        println!(
            "Indexed {} documents ({} tokens, average length {})",
            stats.doc_count, stats.token_count, stats.avg_doc_len
        );
    }

    Ok(())
}

/// Run a query against a built index.
fn search_index(args: SearchArgs, _cli_args: &LancetArgs) -> Result<()> {
    let query = match args.query {
        Some(query) => query,
        None => read_query_line()?,
    };

    let searcher = Searcher::open(&args.index_dir)?;
    let hits = searcher.search(query.trim(), args.top)?;

    if hits.is_empty() {
        println!("nothing found");
        return Ok(());
    }

    for hit in &hits {
        print_hit(hit);
    }

    Ok(())
}

fn print_hit(hit: &SearchHit) {
    for term_match in &hit.matches {
        let lines: Vec<String> = term_match.lines.iter().map(|l| l.to_string()).collect();
        println!("TERM: '{}'", term_match.term);
        println!("     file: {}   lines: {}", term_match.path, lines.join(" "));
    }
}

fn read_query_line() -> Result<String> {
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(LancetError::query("No query given on standard input"));
    }
    Ok(line)
}
