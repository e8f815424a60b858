//! Conformance suite for the `rdf-canon` writer.
//!
//! Checks the properties the writer promises, over a set of built-in
//! fixtures and optionally over a directory of RDF files.
//!
//! # Properties
//!
//! | Validator | Property |
//! |-----------|----------|
//! | `determinism` | Shuffled statements and renamed blank nodes give identical bytes |
//! | `roundtrip` | Output in every format re-parses to the same graph |
//! | `idempotence` | `write(parse(write(G))) == write(G)` in every format |
//! | `cross_format` | Turtle, RDF/XML and JSON-LD agree on blank-node subjects |
//! | `collections` | Lists use native list syntax and read back in order |
//!
//! # Entry Point
//!
//! ```no_run
//! use rdf_canon_conformance::{run_all, ConformanceInputs};
//!
//! let report = run_all(&ConformanceInputs::default()).expect("Failed to run conformance");
//! assert!(report.all_passed());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod fixtures;
pub mod report;
pub mod validators;

use std::path::PathBuf;

use anyhow::{Context, Result};
use rdf_canon::SourceFormat;
use walkdir::WalkDir;

pub use fixtures::Fixture;
pub use report::{ConformanceReport, Severity, TestResult};

/// What the conformance runner checks.
#[derive(Debug, Clone, Default)]
pub struct ConformanceInputs {
    /// Directory searched recursively for files in any readable RDF
    /// syntax, checked in addition to the built-in fixtures.
    pub corpus: Option<PathBuf>,
    /// Skip the built-in fixtures.
    pub corpus_only: bool,
}

impl ConformanceInputs {
    /// Collects the fixtures to check.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus directory cannot be walked or a file in
    /// it cannot be read.
    pub fn fixtures(&self) -> Result<Vec<Fixture>> {
        let mut fixtures = if self.corpus_only {
            Vec::new()
        } else {
            fixtures::builtin()
        };
        if let Some(corpus) = &self.corpus {
            let mut paths = Vec::new();
            for entry in WalkDir::new(corpus).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("Failed to walk {}", corpus.display()))?;
                if entry.file_type().is_file()
                    && SourceFormat::from_extension(entry.path()).is_some()
                {
                    paths.push(entry.into_path());
                }
            }
            for path in paths {
                fixtures.push(Fixture::load(&path)?);
            }
        }
        Ok(fixtures)
    }
}

/// Runs every validator and returns the aggregated report.
///
/// Validators run in this order, each over every fixture:
/// 1. Determinism (all three formats)
/// 2. Round-trip graph preservation (all three formats)
/// 3. Idempotence (all three formats)
/// 4. Cross-format blank-node agreement
/// 5. Collection fidelity (once, on its own list fixture)
///
/// # Errors
///
/// Returns an error only if a file system operation fails.
pub fn run_all(inputs: &ConformanceInputs) -> Result<ConformanceReport> {
    let fixtures = inputs.fixtures()?;
    tracing::info!(fixtures = fixtures.len(), "running conformance suite");

    let mut report = ConformanceReport::new();
    for fixture in &fixtures {
        report.extend(validators::determinism::validate(fixture));
        report.extend(validators::roundtrip::validate(fixture));
        report.extend(validators::idempotence::validate(fixture));
        report.extend(validators::cross_format::validate(fixture));
    }
    report.extend(validators::collections::validate());

    tracing::info!(
        failures = report.failure_count(),
        warnings = report.warning_count(),
        "conformance suite finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_suite_passes() {
        let report = run_all(&ConformanceInputs::default()).expect("no corpus to read");
        let failures: Vec<_> = report.results.iter().filter(|r| r.is_failure()).collect();
        assert!(failures.is_empty(), "Conformance failures: {:#?}", failures);
        assert!(report.results.len() > 20);
    }

    #[test]
    fn missing_corpus_is_an_error() {
        let inputs = ConformanceInputs {
            corpus: Some(PathBuf::from("/nonexistent/rdf-canon-corpus")),
            corpus_only: true,
        };
        assert!(run_all(&inputs).is_err());
    }
}
