//! `rdf-canon-conformance`: Checks the writer's output properties.
//!
//! Runs determinism, round-trip, idempotence, cross-format and collection
//! checks over the built-in fixtures and, optionally, a directory of RDF files.
//!
//! **Usage:**
//! ```text
//! rdf-canon-conformance [--corpus <dir>] [--corpus-only]
//! ```
//!
//! Exits non-zero if any conformance check fails.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use rdf_canon_conformance::{run_all, ConformanceInputs};

/// Run the rdf-canon conformance suite.
#[derive(Parser)]
#[command(
    name = "rdf-canon-conformance",
    about = "Check that rdf-canon output is deterministic, lossless and stable"
)]
struct Args {
    /// Directory of RDF files to check in addition to the built-in fixtures.
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Only check the corpus directory.
    #[arg(long, requires = "corpus")]
    corpus_only: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let report = run_all(&ConformanceInputs {
        corpus: args.corpus,
        corpus_only: args.corpus_only,
    })?;

    println!("rdf-canon Conformance Report");
    println!("============================");
    println!();
    for result in &report.results {
        println!("{result}");
    }
    println!();
    println!("Summary: {}", report.summary());

    if !report.all_passed() {
        eprintln!(
            "Conformance FAILED: {} check(s) did not pass.",
            report.failure_count()
        );
        process::exit(1);
    }

    println!("Conformance PASSED.");
    Ok(())
}
