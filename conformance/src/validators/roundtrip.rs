//! Round-trip graph preservation.
//!
//! Output in every format must parse back to the input graph. The graphs
//! are compared up to blank-node labels, so both the ground triples and
//! the shape of the blank-node structure must survive.

use rdf_canon::isomorphism::first_mismatch;
use rdf_canon::{parse_document, write_to_string, FormatError};

use super::{option_sets, reader_for, TARGET_FORMATS};
use crate::fixtures::Fixture;
use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "roundtrip";

/// Checks that every output format preserves the graph of `fixture`.
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
            let output = match write_to_string(format, &options, &document) {
                Ok(output) => output,
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
                        format!("{format}/{label}: writing failed: {e}"),
                    ));
                    continue;
                }
            };
            let reparsed = match parse_document(&output, reader_for(format)) {
                Ok(reparsed) => reparsed,
                Err(e) => {
                    report.push(TestResult::fail(
                        VALIDATOR,
                        &fixture.name,
                        format!("{format}/{label}: output does not parse: {e}"),
                    ));
                    continue;
                }
            };

            report.push(match first_mismatch(&document.statements, &reparsed.statements) {
                None => TestResult::pass(
                    VALIDATOR,
                    &fixture.name,
                    format!("{format}/{label}: graph preserved"),
                ),
                Some(mismatch) => TestResult::fail(
                    VALIDATOR,
                    &fixture.name,
                    format!("{format}/{label}: graph changed after re-parsing"),
                )
                .with_details(vec![mismatch]),
            });
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::builtin;
    use rdf_canon::SourceFormat;

    #[test]
    fn builtin_fixtures_round_trip() {
        for fixture in builtin() {
            let report = validate(&fixture);
            assert!(report.all_passed(), "{:#?}", report.results);
            assert!(report.results.len() >= TARGET_FORMATS.len() * option_sets().len());
        }
    }

    #[test]
    fn unparsable_fixtures_fail() {
        let report = validate(&Fixture::turtle("broken", "<a> <b>"));
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn non_turtle_fixtures_round_trip() {
        let jsonld = Fixture {
            name: "jsonld".to_owned(),
            text: r#"{ "@id": "http://example.com/a",
                "http://example.com/p": { "http://example.com/q": "nested" } }"#
                .to_owned(),
            format: SourceFormat::JsonLd,
        };
        let report = validate(&jsonld);
        assert!(report.all_passed(), "{:#?}", report.results);
    }
}
