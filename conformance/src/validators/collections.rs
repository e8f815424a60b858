//! Collection fidelity: with inlining on, a well-formed RDF list is written
//! with each format's native list syntax rather than as `rdf:first` /
//! `rdf:rest` cells, and every format reads back as the same list.

use rdf_canon::vocab::{RDF_FIRST, RDF_NIL, RDF_REST};
use rdf_canon::{
    parse_document, write_to_string, Document, Iri, Literal, SourceFormat, TargetFormat, Term,
    WriterOptions,
};
use serde_json::Value;

use super::{reader_for, TARGET_FORMATS};
use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "collections";
const FIXTURE: &str = "three-member list";

const LIST: &str = "@prefix ex: <http://example.com/list/> .\nex:s ex:items ( ex:a \"b\" 3 ) .\n";

fn expected_members() -> Vec<Term> {
    vec![
        Term::iri("http://example.com/list/a"),
        Term::Literal(Literal::simple("b")),
        Term::Literal(Literal::typed(
            "3",
            Iri::new("http://www.w3.org/2001/XMLSchema#integer"),
        )),
    ]
}

/// The single object of `subject predicate ?o` in `document`.
fn object_of<'a>(document: &'a Document, subject: &Term, predicate: &str) -> Result<&'a Term, String> {
    let mut objects = document
        .statements
        .iter()
        .filter(|s| s.subject() == subject && s.predicate().as_str() == predicate)
        .map(|s| s.object());
    match (objects.next(), objects.next()) {
        (Some(object), None) => Ok(object),
        (None, _) => Err(format!("{subject} has no <{predicate}>")),
        (Some(_), Some(_)) => Err(format!("{subject} has several <{predicate}>")),
    }
}

/// Follows the list at `ex:s ex:items` cell by cell.
fn list_members(document: &Document) -> Result<Vec<Term>, String> {
    let mut cell = object_of(document, &Term::iri("http://example.com/list/s"), "http://example.com/list/items")?;
    let mut members = Vec::new();
    while cell.as_iri().map(Iri::as_str) != Some(RDF_NIL) {
        if !cell.is_blank() || members.len() > document.statements.len() {
            return Err(format!("{cell} is not a list cell"));
        }
        members.push(object_of(document, cell, RDF_FIRST)?.clone());
        cell = object_of(document, cell, RDF_REST)?;
    }
    Ok(members)
}

fn check_reparsed(output: &str, format: SourceFormat) -> Result<(), String> {
    let reparsed = parse_document(output, format).map_err(|e| e.to_string())?;
    let members = list_members(&reparsed)?;
    if members != expected_members() {
        let shown: Vec<String> = members.iter().map(ToString::to_string).collect();
        return Err(format!("list reads back as ({})", shown.join(" ")));
    }
    // one triple for ex:items, two per cell
    if reparsed.statements.len() != 7 {
        return Err(format!("re-parsed {} triples, expected 7", reparsed.statements.len()));
    }
    Ok(())
}

fn check_turtle(turtle: &str) -> Result<(), String> {
    if !turtle.contains("ex:items (") {
        return Err("no native list after ex:items".to_owned());
    }
    if turtle.contains("rdf:first") || turtle.contains("_:") {
        return Err("list cells were written out".to_owned());
    }
    Ok(())
}

fn check_jsonld(jsonld: &str) -> Result<(), String> {
    let value: Value = serde_json::from_str(jsonld).map_err(|e| format!("invalid JSON: {e}"))?;
    let members = value
        .get(0)
        .and_then(|node| node.get("ex:items"))
        .and_then(|items| items.get("@list"))
        .and_then(Value::as_array)
        .ok_or("ex:items is not an @list")?;
    if members.len() != 3 {
        return Err(format!("@list has {} members, expected 3", members.len()));
    }
    if members[0].get("@id").and_then(Value::as_str) != Some("ex:a") {
        return Err("first member is not ex:a".to_owned());
    }
    Ok(())
}

/// The native-syntax check for `format`; RDF/XML has none for lists
/// holding literals.
fn check_syntax(format: TargetFormat, output: &str) -> Result<(), String> {
    match format {
        TargetFormat::Turtle => check_turtle(output),
        TargetFormat::JsonLd => check_jsonld(output),
        TargetFormat::RdfXml => Ok(()),
    }
}

/// Checks native list rendering and list read-back in every format.
pub fn validate() -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let document = match parse_document(LIST, SourceFormat::Turtle) {
        Ok(document) => document,
        Err(e) => {
            report.push(TestResult::fail(VALIDATOR, FIXTURE, e.to_string()));
            return report;
        }
    };
    let options = WriterOptions {
        inline_blank_nodes: true,
        ..WriterOptions::default()
    };

    for format in TARGET_FORMATS {
        let outcome = write_to_string(format, &options, &document)
            .map_err(|e| e.to_string())
            .and_then(|output| {
                check_syntax(format, &output)?;
                check_reparsed(&output, reader_for(format))
            });
        report.push(match outcome {
            Ok(()) => TestResult::pass(VALIDATOR, FIXTURE, format!("{format}: list preserved")),
            Err(problem) => TestResult::fail(VALIDATOR, FIXTURE, format!("{format}: {problem}")),
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_native() {
        let report = validate();
        assert_eq!(report.results.len(), 3);
        assert!(report.all_passed(), "{:#?}", report.results);
    }

    #[test]
    fn expanded_lists_are_rejected() {
        let expanded = "ex:s\n\tex:items _:blank1 ;\n\t.\n";
        assert!(check_turtle(expanded).is_err());
        assert!(check_jsonld("[ { \"@id\" : \"ex:s\", \"ex:items\" : { \"@id\" : \"_:blank1\" } } ]").is_err());
    }

    #[test]
    fn reordered_lists_are_rejected() {
        let swapped = "@prefix ex: <http://example.com/list/> .\nex:s ex:items ( \"b\" ex:a 3 ) .\n";
        let err = check_reparsed(swapped, SourceFormat::Turtle).expect_err("members out of order");
        assert!(err.contains("reads back as"), "{err}");
        let truncated = "@prefix ex: <http://example.com/list/> .\nex:s ex:items ( ex:a \"b\" ) .\n";
        assert!(check_reparsed(truncated, SourceFormat::Turtle).is_err());
    }
}
