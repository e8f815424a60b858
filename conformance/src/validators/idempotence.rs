//! Idempotence: writing the parse of the output reproduces the output.
//!
//! Turtle output is re-read with the prefixes it declares. RDF/XML and
//! JSON-LD do not report every declaration back through their parsers, so
//! their output is rewritten under the fixture's own declarations.

use rdf_canon::{parse_document, write_to_string, Document, FormatError, TargetFormat, WriterOptions};

use super::{first_difference, option_sets, reader_for, TARGET_FORMATS};
use crate::fixtures::Fixture;
use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "idempotence";

fn rewrite(
    format: TargetFormat,
    options: &WriterOptions,
    document: &Document,
) -> Result<(String, String), FormatError> {
    let first = write_to_string(format, options, document)?;
    let mut reparsed = parse_document(&first, reader_for(format))?;
    if format != TargetFormat::Turtle {
        reparsed.prefixes.clone_from(&document.prefixes);
    }
    let second = write_to_string(format, options, &reparsed)?;
    Ok((first, second))
}

/// Checks `write(parse(write(G))) == write(G)` in every output format.
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
            let result = match rewrite(format, &options, &document) {
                Ok((first, second)) if first == second => TestResult::pass(
                    VALIDATOR,
                    &fixture.name,
                    format!("{format}/{label}: output is a fixed point"),
                ),
                Ok((first, second)) => TestResult::fail(
                    VALIDATOR,
                    &fixture.name,
                    format!("{format}/{label}: rewriting the output changed it"),
                )
                .with_details(first_difference(&first, &second)),
                Err(FormatError::UnrepresentablePredicate(predicate)) => TestResult::warn(
                    VALIDATOR,
                    &fixture.name,
                    format!("{format}/{label}: skipped, <{predicate}> has no XML name"),
                ),
                Err(e) => {
                    TestResult::fail(VALIDATOR, &fixture.name, format!("{format}/{label}: {e}"))
                }
            };
            report.push(result);
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::builtin;

    #[test]
    fn builtin_fixtures_are_fixed_points() {
        for fixture in builtin() {
            let report = validate(&fixture);
            assert!(report.all_passed(), "{:#?}", report.results);
        }
    }

    #[test]
    fn every_format_is_checked() {
        let report = validate(&Fixture::turtle(
            "one",
            "<http://example.com/s> <http://example.com/p> \"o\" .",
        ));
        assert_eq!(report.results.len(), TARGET_FORMATS.len() * option_sets().len());
        assert!(report.all_passed(), "{:#?}", report.results);
    }
}
