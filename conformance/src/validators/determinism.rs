//! Determinism: the output depends only on the graph.
//!
//! Each fixture is written once as parsed, then again after shuffling its
//! statements and renaming every blank node. The renaming keeps the
//! relative order of the input labels, since structurally identical
//! blank nodes are told apart by label.

use proptest::strategy::{Just, Strategy, ValueTree};
use proptest::test_runner::TestRunner;
use rdf_canon::{write_to_string, Document, FormatError, Statement, Term};

use super::{first_difference, option_sets, TARGET_FORMATS};
use crate::fixtures::Fixture;
use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "determinism";

/// Permutations tried per format and option set.
const PERMUTATIONS: usize = 4;

/// A permutation of `items` drawn from `runner`'s random stream.
fn shuffled<T: Clone + std::fmt::Debug>(runner: &mut TestRunner, items: &[T]) -> Vec<T> {
    match Just(items.to_vec()).prop_shuffle().new_tree(runner) {
        Ok(tree) => tree.current(),
        Err(reason) => {
            tracing::warn!(%reason, "could not draw a permutation, using the input order");
            items.to_vec()
        }
    }
}

fn rename(term: &Term) -> Term {
    match term {
        Term::Blank(id) => Term::blank(format!("shuffled_{}", id.as_str())),
        other => other.clone(),
    }
}

/// `document` with shuffled statements and prefixes and renamed blank nodes.
///
/// # Errors
///
/// Returns the error of a renamed statement that cannot be rebuilt.
pub fn perturb(document: &Document, runner: &mut TestRunner) -> Result<Document, FormatError> {
    let statements = document
        .statements
        .iter()
        .map(|s| Statement::new(rename(s.subject()), s.predicate().clone(), rename(s.object())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Document {
        prefixes: shuffled(runner, &document.prefixes),
        statements: shuffled(runner, &statements),
    })
}

/// Checks that `fixture` is written identically in every format however
/// its statements are ordered and its blank nodes named.
pub fn validate(fixture: &Fixture) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let document = match fixture.document() {
        Ok(document) => document,
        Err(e) => {
            report.push(TestResult::fail(VALIDATOR, &fixture.name, format!("{e:#}")));
            return report;
        }
    };

    for format in TARGET_FORMATS {
        for (label, options) in option_sets() {
            let expected = match write_to_string(format, &options, &document) {
                Ok(expected) => expected,
                Err(FormatError::UnrepresentablePredicate(predicate)) => {
                    report.push(TestResult::warn(
                        VALIDATOR,
                        &fixture.name,
                        format!("{format}/{label}: skipped, <{predicate}> has no XML name"),
                    ));
                    continue;
                }
                Err(e) => {
                    report.push(TestResult::fail(
                        VALIDATOR,
                        &fixture.name,
                        format!("{format}/{label}: {e}"),
                    ));
                    continue;
                }
            };

            // Deterministic seed: every run draws the same permutations.
            let mut runner = TestRunner::deterministic();
            let mismatch = (1..=PERMUTATIONS).find_map(|attempt| {
                let actual = perturb(&document, &mut runner)
                    .and_then(|variant| write_to_string(format, &options, &variant));
                match actual {
                    Ok(actual) if actual == expected => None,
                    Ok(actual) => Some((attempt, first_difference(&expected, &actual))),
                    Err(e) => Some((attempt, vec![e.to_string()])),
                }
            });
            report.push(match mismatch {
                None => TestResult::pass(
                    VALIDATOR,
                    &fixture.name,
                    format!("{format}/{label}: identical under {PERMUTATIONS} permutations"),
                ),
                Some((attempt, details)) => TestResult::fail(
                    VALIDATOR,
                    &fixture.name,
                    format!("{format}/{label}: output changed under permutation {attempt}"),
                )
                .with_details(details),
            });
        }
    }
    report
}
