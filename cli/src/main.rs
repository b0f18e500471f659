mod display;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};
use textsearch_core::corpus::load_documents;
use textsearch_core::{Document, IndexConfig, IndexKind, Indexer, SearchResult};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DUMP: &str = "enwiki-latest-abstract1.xml.gz";

#[derive(Parser)]
#[command(name = "textsearch")]
#[command(about = "Full-text TF-IDF search over an in-memory index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Input path: Wikipedia abstract dump (.xml.gz/.xml), JSON/JSONL file, or directory
    #[arg(long, short = 'p', default_value = DEFAULT_DUMP)]
    input: String,
    /// Index engine: sequential or parallel
    #[arg(long, default_value_t = IndexKind::Sequential)]
    engine: IndexKind,
    /// Worker threads for the parallel engine (defaults to CPU count)
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a corpus and search it interactively from stdin
    Search {
        #[command(flatten)]
        index: IndexArgs,
        /// Results shown per page
        #[arg(short = 'n', long, default_value_t = 5)]
        max_results: usize,
    },
    /// Run a single query and print the top results
    Query {
        #[command(flatten)]
        index: IndexArgs,
        /// Number of results to print
        #[arg(short = 'n', long, default_value_t = 5)]
        max_results: usize,
        /// Query text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Build both engines over a corpus and compare timings and rankings
    Bench {
        /// Input path: Wikipedia abstract dump (.xml.gz/.xml), JSON/JSONL file, or directory
        #[arg(long, short = 'p', default_value = DEFAULT_DUMP)]
        input: String,
        /// Searches per query per engine
        #[arg(long, default_value_t = 10)]
        rounds: usize,
        /// Queries to run
        #[arg(required = true)]
        queries: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { index, max_results } => {
            let (docs, idx) = load_and_index(&index)?;
            run_interactive(idx.as_ref(), &docs, max_results)
        }
        Commands::Query { index, max_results, text } => {
            let (docs, idx) = load_and_index(&index)?;
            let results = timed_search(idx.as_ref(), &text.join(" "));
            let mut out = io::stdout().lock();
            if results.is_empty() {
                writeln!(out, "No matches found.")?;
                return Ok(());
            }
            display::write_page(&mut out, &results, &docs, 0, max_results)?;
            Ok(())
        }
        Commands::Bench { input, rounds, queries } => bench(&input, rounds, &queries),
    }
}

fn load_and_index(args: &IndexArgs) -> Result<(Vec<Document>, Box<dyn Indexer>)> {
    let start = Instant::now();
    let docs = load_documents(&args.input).with_context(|| format!("failed to load documents from {}", args.input))?;
    tracing::info!(num_docs = docs.len(), elapsed = ?start.elapsed(), "loaded corpus");

    let mut config = IndexConfig::new(args.engine);
    config.workers = args.workers;
    let idx = build_index(&config, &docs)?;
    Ok((docs, idx))
}

fn build_index(config: &IndexConfig, docs: &[Document]) -> Result<Box<dyn Indexer>> {
    let start = Instant::now();
    let mut idx = config.build()?;
    idx.add(docs);
    let stats = idx.stats();
    tracing::info!(
        engine = %config.kind,
        num_docs = stats.document_count,
        num_terms = stats.term_count,
        elapsed = ?start.elapsed(),
        "indexed documents"
    );
    Ok(idx)
}

fn timed_search(idx: &dyn Indexer, query: &str) -> Vec<SearchResult> {
    let start = Instant::now();
    let results = idx.search(query);
    tracing::info!(query, hits = results.len(), elapsed = ?start.elapsed(), "search complete");
    results
}

fn run_interactive(idx: &dyn Indexer, docs: &[Document], page_size: usize) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();
    writeln!(out, "\nEnter your search query (type 'exit' or press Ctrl+D to quit):")?;

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = read_line(&mut input)? else { break };
        let query = line.trim();
        if query == "exit" {
            break;
        }
        if query.is_empty() {
            continue;
        }

        let results = timed_search(idx, query);
        writeln!(out, "\nSearch results for: {query:?}")?;
        if results.is_empty() {
            writeln!(out, "No matches found.")?;
            continue;
        }

        let mut shown = 0;
        loop {
            shown = display::write_page(&mut out, &results, docs, shown, page_size)?;
            if !display::write_footer(&mut out, results.len(), shown, page_size)? {
                break;
            }
            out.flush()?;
            match read_line(&mut input)? {
                Some(answer) if answer.trim().is_empty() => continue,
                Some(_) => break,
                None => return Ok(()),
            }
        }
    }
    writeln!(out, "\nExiting...")?;
    Ok(())
}

/// Next line from `input`, or `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line).context("failed to read stdin")? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn bench(input: &str, rounds: usize, queries: &[String]) -> Result<()> {
    let docs = load_documents(input).with_context(|| format!("failed to load documents from {input}"))?;
    let rounds = rounds.max(1);
    let mut out = io::stdout().lock();

    let mut rankings = Vec::new();
    for kind in [IndexKind::Sequential, IndexKind::Parallel] {
        let start = Instant::now();
        let idx = build_index(&IndexConfig::new(kind), &docs)?;
        let add_elapsed = start.elapsed();

        let mut search_elapsed = Duration::ZERO;
        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            let start = Instant::now();
            for _ in 0..rounds {
                idx.search(query);
            }
            search_elapsed += start.elapsed();
            results.push(idx.search(query));
        }
        let per_search = search_elapsed / (rounds * queries.len()) as u32;
        writeln!(out, "{kind:>10}: add {add_elapsed:?}, search {per_search:?} avg over {} searches", rounds * queries.len())?;
        rankings.push(results);
    }

    for (i, query) in queries.iter().enumerate() {
        let same = ranking_ids(&rankings[0][i]) == ranking_ids(&rankings[1][i]);
        writeln!(out, "{query:?}: {} hits, engines {}", rankings[0][i].len(), if same { "agree" } else { "DISAGREE" })?;
    }
    Ok(())
}

fn ranking_ids(results: &[SearchResult]) -> Vec<u32> {
    results.iter().map(|r| r.doc_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["textsearch", "search", "--input", "docs.jsonl", "--engine", "parallel", "-n", "3"]).unwrap();
        match cli.command {
            Commands::Search { index, max_results } => {
                assert_eq!(index.input, "docs.jsonl");
                assert_eq!(index.engine, IndexKind::Parallel);
                assert_eq!(max_results, 3);
            }
            _ => panic!("expected search"),
        }
        assert!(Cli::try_parse_from(["textsearch", "query", "-p", "docs.jsonl"]).is_err());
        match Cli::try_parse_from(["textsearch", "query", "donut"]).unwrap().command {
            Commands::Query { index, text, .. } => {
                assert_eq!(index.input, DEFAULT_DUMP);
                assert_eq!(text, vec!["donut".to_string()]);
            }
            _ => panic!("expected query"),
        }
        assert!(Cli::try_parse_from(["textsearch", "search", "-p", "x", "--engine", "sharded"]).is_err());
    }

    #[test]
    fn read_line_signals_end_of_input() {
        let mut input = io::Cursor::new("donut\n\n");
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("donut\n"));
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("\n"));
        assert_eq!(read_line(&mut input).unwrap(), None);
    }

    #[test]
    fn build_index_adds_every_document() {
        let docs = vec![Document::new(0, "glass plate"), Document::new(1, "donut is a donut")];
        let idx = build_index(&IndexConfig::new(IndexKind::Parallel).with_workers(2), &docs).unwrap();
        assert_eq!(idx.stats().document_count, 2);
        assert_eq!(ranking_ids(&idx.search("donut")), vec![1]);
    }
}
