//! Lodestone CLI - index a chat export and search it semantically.
//!
//! # Usage
//!
//! ```bash
//! # Index an export and drop into the interactive query loop
//! lodestone --vocab vectors.bin --messages export.jsonl
//!
//! # Bigger per-channel budget, exact search, JSON output
//! lodestone --vocab vectors.bin --messages export.jsonl -B 2m --mode exact --json
//! ```

mod export;
mod output;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lodestone_core::embedding::{EmbeddingStore, EmbeddingTable, InductionMatrix};
use lodestone_core::pipeline::{run_ingest, MessageSource, PipelineConfig};
use lodestone_core::search::{QueryMode, SemanticIndex};

/// Lodestone semantic search.
///
/// Builds an in-memory semantic index over a chat export, then answers
/// free-text queries against it.
#[derive(Parser)]
#[command(name = "lodestone", version, about)]
struct Cli {
    /// Path to word2vec-format binary embeddings
    #[arg(long)]
    vocab: PathBuf,

    /// Path to the fitted induction matrix (identity when omitted)
    #[arg(long)]
    induction: Option<PathBuf>,

    /// Path to a JSONL chat export, one message object per line
    #[arg(long)]
    messages: PathBuf,

    /// Data to ingest per channel, in units of [K]iB, [M]iB, or [G]iB
    #[arg(short = 'B', long, default_value = "8k")]
    budget: String,

    /// Lexical units to include in a single content block
    #[arg(long, default_value_t = lodestone_core::config::DOC_SPAN)]
    span: usize,

    /// Maximum concurrent ingest workers
    #[arg(long, default_value_t = lodestone_core::config::MAX_WORKERS)]
    workers: usize,

    /// Query mode: approx | exact
    #[arg(long, default_value = "approx")]
    mode: QueryMode,

    /// Maximum results per query
    #[arg(short = 'n', long, default_value_t = 8)]
    limit: usize,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let byte_budget = parse_budget(&cli.budget)
        .with_context(|| format!("invalid budget {:?}", cli.budget))?;

    let table = EmbeddingTable::load(&cli.vocab)
        .with_context(|| format!("loading vocabulary from {}", cli.vocab.display()))?;
    let dim = table.dim();
    let store: Arc<dyn EmbeddingStore> = Arc::new(table);

    let induction = match &cli.induction {
        Some(path) => InductionMatrix::load(path, dim)
            .with_context(|| format!("loading induction matrix from {}", path.display()))?,
        None => InductionMatrix::identity(dim),
    };

    let sources = export::load_export(&cli.messages)
        .with_context(|| format!("reading chat export from {}", cli.messages.display()))?;
    anyhow::ensure!(!sources.is_empty(), "chat export contains no messages");
    println!("Indexing {} channel(s)...", sources.len());

    let index = Arc::new(SemanticIndex::new(store, Arc::new(induction)));
    let cfg = PipelineConfig {
        doc_span: cli.span,
        byte_budget,
        max_workers: cli.workers,
        ..PipelineConfig::default()
    };
    let sources: Vec<Box<dyn MessageSource>> = sources
        .into_iter()
        .map(|s| Box::new(s) as Box<dyn MessageSource>)
        .collect();
    let report = run_ingest(Arc::clone(&index), sources, cfg).await;

    for failed in report.failed_channels() {
        eprintln!(
            "warning: channel {} aborted: {}",
            failed.channel_id,
            failed.error.as_ref().map(ToString::to_string).unwrap_or_default()
        );
    }
    println!(
        "Indexing complete: {} document(s) from {} byte(s).",
        report.total_documents(),
        report.total_bytes()
    );

    query_loop(&index, cli.mode, cli.limit, cli.json)
}

/// Reads query lines from stdin until EOF, printing ranked hits for each.
fn query_loop(index: &SemanticIndex, mode: QueryMode, limit: usize, json: bool) -> Result<()> {
    print!("> ");
    use std::io::Write;
    std::io::stdout().flush()?;
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let query = line.trim();
        if !query.is_empty() {
            match index.query(query, mode, limit) {
                Ok(hits) => {
                    let rendered = if json {
                        output::format_json(query, &hits)?
                    } else {
                        output::format_human(query, &hits)
                    };
                    println!("{rendered}");
                }
                Err(err) => eprintln!("query failed: {err}"),
            }
        }
        print!("> ");
        std::io::stdout().flush()?;
    }
    Ok(())
}

/// Parses a data-mass string such as `8k`, `1.5m`, or `1m512k` into bytes.
///
/// Units are binary (KiB/MiB/GiB); segments accumulate. A bare number is
/// bytes.
fn parse_budget(src: &str) -> Result<usize> {
    let mut total = 0f64;
    let mut rest = src.trim();
    anyhow::ensure!(!rest.is_empty(), "empty budget");
    while !rest.is_empty() {
        let split = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        anyhow::ensure!(split > 0, "expected a number in {src:?}");
        let value: f64 = rest[..split].parse()?;
        let mut unit = 1u64;
        let mut consumed = split;
        if let Some(c) = rest[split..].chars().next() {
            unit = match c.to_ascii_lowercase() {
                'k' => 1 << 10,
                'm' => 1 << 20,
                'g' => 1 << 30,
                other => anyhow::bail!("unit {other:?} not recognized"),
            };
            consumed += c.len_utf8();
        }
        total += value * unit as f64;
        rest = &rest[consumed..];
    }
    Ok(total.round() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_budget_units() {
        assert_eq!(parse_budget("8k").unwrap(), 8 << 10);
        assert_eq!(parse_budget("2m").unwrap(), 2 << 20);
        assert_eq!(parse_budget("1g").unwrap(), 1 << 30);
        assert_eq!(parse_budget("512").unwrap(), 512);
    }

    #[test]
    fn test_parse_budget_fraction_and_segments() {
        assert_eq!(parse_budget("1.5k").unwrap(), 1536);
        assert_eq!(parse_budget("1m512k").unwrap(), (1 << 20) + (512 << 10));
    }

    #[test]
    fn test_parse_budget_rejects_garbage() {
        assert!(parse_budget("").is_err());
        assert!(parse_budget("12x").is_err());
        assert!(parse_budget("k").is_err());
    }
}
