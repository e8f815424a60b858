//! Cross-format agreement.
//!
//! Turtle, RDF/XML and JSON-LD output of the same graph must name the same
//! blank-node subjects in the same order, and the JSON-LD output must be a
//! JSON array of node objects that each carry an `@id`.

use rdf_canon::{write_to_string, FormatError, TargetFormat};
use serde_json::Value;

use super::option_sets;
use crate::fixtures::Fixture;
use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "cross_format";

fn turtle_blank_subjects(turtle: &str) -> Vec<String> {
    turtle
        .lines()
        .filter_map(|line| line.strip_prefix("_:"))
        .map(str::to_owned)
        .collect()
}

fn rdfxml_blank_subjects(rdfxml: &str) -> Vec<String> {
    // subject node elements are the only elements at depth one
    rdfxml
        .lines()
        .filter(|line| line.starts_with("\t<") && !line.starts_with("\t</"))
        .filter_map(|line| line.split("rdf:nodeID=\"").nth(1))
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_owned)
        .collect()
}

fn jsonld_blank_subjects(jsonld: &str) -> Result<Vec<String>, String> {
    let value: Value = serde_json::from_str(jsonld).map_err(|e| format!("invalid JSON: {e}"))?;
    let nodes = value.as_array().ok_or("top level is not an array")?;
    let mut labels = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        let id = node
            .get("@id")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("node {i} has no string @id"))?;
        if node.get("@context").is_none() {
            return Err(format!("node {id} has no @context"));
        }
        if let Some(label) = id.strip_prefix("_:") {
            labels.push(label.to_owned());
        }
    }
    Ok(labels)
}

/// Checks that every format agrees on the blank-node subjects of `fixture`.
pub fn validate(fixture: &Fixture) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let document = match fixture.document() {
        Ok(document) => document,
        Err(e) => {
            report.push(TestResult::fail(VALIDATOR, &fixture.name, format!("{e:#}")));
            return report;
        }
    };

    for (label, options) in option_sets() {
        let turtle = write_to_string(TargetFormat::Turtle, &options, &document);
        let jsonld = write_to_string(TargetFormat::JsonLd, &options, &document);
        let (turtle, jsonld) = match (turtle, jsonld) {
            (Ok(turtle), Ok(jsonld)) => (turtle, jsonld),
            (Err(e), _) | (_, Err(e)) => {
                report.push(TestResult::fail(VALIDATOR, &fixture.name, format!("{label}: {e}")));
                continue;
            }
        };

        let expected = turtle_blank_subjects(&turtle);
        match jsonld_blank_subjects(&jsonld) {
            Ok(labels) if labels == expected => report.push(TestResult::pass(
                VALIDATOR,
                &fixture.name,
                format!("{label}: JSON-LD agrees on {} blank subjects", expected.len()),
            )),
            Ok(labels) => report.push(
                TestResult::fail(
                    VALIDATOR,
                    &fixture.name,
                    format!("{label}: JSON-LD blank subjects differ from Turtle"),
                )
                .with_details(vec![
                    format!("turtle:  {}", expected.join(" ")),
                    format!("json-ld: {}", labels.join(" ")),
                ]),
            ),
            Err(problem) => report.push(TestResult::fail(
                VALIDATOR,
                &fixture.name,
                format!("{label}: {problem}"),
            )),
        }

        match write_to_string(TargetFormat::RdfXml, &options, &document) {
            Ok(rdfxml) => {
                let labels = rdfxml_blank_subjects(&rdfxml);
                report.push(if labels == expected {
                    TestResult::pass(
                        VALIDATOR,
                        &fixture.name,
                        format!("{label}: RDF/XML agrees on {} blank subjects", labels.len()),
                    )
                } else {
                    TestResult::fail(
                        VALIDATOR,
                        &fixture.name,
                        format!("{label}: RDF/XML blank subjects differ from Turtle"),
                    )
                    .with_details(vec![
                        format!("turtle:  {}", expected.join(" ")),
                        format!("rdf/xml: {}", labels.join(" ")),
                    ])
                });
            }
            Err(FormatError::UnrepresentablePredicate(predicate)) => {
                report.push(TestResult::warn(
                    VALIDATOR,
                    &fixture.name,
                    format!("{label}: RDF/XML skipped, <{predicate}> has no XML name"),
                ));
            }
            Err(e) => {
                report.push(TestResult::fail(VALIDATOR, &fixture.name, format!("{label}: {e}")));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::builtin;

    #[test]
    fn builtin_fixtures_agree_across_formats() {
        for fixture in builtin() {
            let report = validate(&fixture);
            assert!(report.all_passed(), "{:#?}", report.results);
        }
    }

    #[test]
    fn missing_ids_are_reported() {
        assert!(jsonld_blank_subjects("[ { \"@context\" : {} } ]").is_err());
        assert!(jsonld_blank_subjects("{}").is_err());
        assert_eq!(
            jsonld_blank_subjects("[ { \"@id\" : \"_:blank1\", \"@context\" : {} } ]"),
            Ok(vec!["blank1".to_owned()])
        );
    }
}
