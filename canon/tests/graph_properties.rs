//! Property-based tests over generated graphs.
//!
//! Graphs mix IRIs, plain, language-tagged and integer literals, blank
//! nodes that nest, share referrers and form cycles, and `rdf:first` /
//! `rdf:rest` lists. Every property runs in all three output formats.

use proptest::prelude::*;
use rdf_canon::isomorphism::first_mismatch;
use rdf_canon::vocab::{RDF_FIRST, RDF_NIL, RDF_REST, RDF_TYPE, XSD_NS};
use rdf_canon::{
    isomorphic, parse_document, write_to_string, Document, Iri, Literal, SourceFormat, Statement,
    TargetFormat, Term, WriterOptions,
};

const EX: &str = "http://example.com/";

const FORMATS: [TargetFormat; 3] =
    [TargetFormat::Turtle, TargetFormat::RdfXml, TargetFormat::JsonLd];

fn reader(format: TargetFormat) -> SourceFormat {
    match format {
        TargetFormat::Turtle => SourceFormat::Turtle,
        TargetFormat::RdfXml => SourceFormat::RdfXml,
        TargetFormat::JsonLd => SourceFormat::JsonLd,
    }
}

fn option_sets() -> [WriterOptions; 2] {
    [
        WriterOptions::default(),
        WriterOptions {
            inline_blank_nodes: true,
            ..WriterOptions::default()
        },
    ]
}

fn ex(local: &str) -> Iri {
    Iri::new(format!("{EX}{local}"))
}

// =============================================================================
// Strategies
// =============================================================================

/// Subjects: four IRIs and six blank nodes, so blank nodes collide often
/// enough to be shared and cyclic.
fn node() -> impl Strategy<Value = Term> {
    prop_oneof![
        (0..4usize).prop_map(|i| Term::Iri(ex(&format!("s{i}")))),
        (0..6usize).prop_map(|i| Term::blank(format!("b{i}"))),
    ]
}

fn literal() -> impl Strategy<Value = Term> {
    prop_oneof![
        "[a-z0-9 '\"<&]{0,6}".prop_map(|s| Term::Literal(Literal::simple(s))),
        ("[a-z]{1,5}", prop::sample::select(vec!["en", "fr"]))
            .prop_map(|(s, lang)| Term::Literal(Literal::lang(s, lang))),
        any::<u16>().prop_map(|n| {
            Term::Literal(Literal::typed(n.to_string(), Iri::new(format!("{XSD_NS}integer"))))
        }),
    ]
}

fn predicate() -> impl Strategy<Value = Iri> {
    prop::sample::select(vec!["p", "q", "r"]).prop_map(ex)
}

fn edge() -> impl Strategy<Value = (Term, Iri, Term)> {
    (node(), predicate(), prop_oneof![node(), literal()])
}

fn typing() -> impl Strategy<Value = (Term, Iri, Term)> {
    (
        node(),
        Just(Iri::new(RDF_TYPE)),
        prop::sample::select(vec!["Widget", "Part"]).prop_map(|c| Term::Iri(ex(c))),
    )
}

fn list() -> impl Strategy<Value = (Term, Vec<Term>)> {
    (
        node(),
        prop::collection::vec(
            prop_oneof![(0..3usize).prop_map(|i| Term::Iri(ex(&format!("m{i}")))), literal()],
            1..4,
        ),
    )
}

/// Appends the cells of list `index` holding `members` and links its head
/// from `owner`.
fn add_list(doc: &mut Document, index: usize, owner: Term, members: Vec<Term>) {
    let cell = |position: usize| Term::blank(format!("l{index}c{position}"));
    let count = members.len();
    for (position, member) in members.into_iter().enumerate() {
        let rest = if position + 1 == count {
            Term::iri(RDF_NIL)
        } else {
            cell(position + 1)
        };
        doc.statements.push(statement(cell(position), Iri::new(RDF_FIRST), member));
        doc.statements.push(statement(cell(position), Iri::new(RDF_REST), rest));
    }
    doc.statements.push(statement(owner, ex("items"), cell(0)));
}

fn statement(subject: Term, predicate: Iri, object: Term) -> Statement {
    match Statement::new(subject, predicate, object) {
        Ok(statement) => statement,
        Err(err) => unreachable!("generated subjects are never literals: {err}"),
    }
}

fn graph() -> impl Strategy<Value = Document> {
    (
        prop::collection::vec(edge(), 0..12),
        prop::collection::vec(typing(), 0..4),
        prop::collection::vec(list(), 0..3),
    )
        .prop_map(|(edges, types, lists)| {
            let mut doc = Document::new();
            doc.prefixes.push(("ex".to_owned(), EX.to_owned()));
            for (s, p, o) in edges.into_iter().chain(types) {
                doc.statements.push(statement(s, p, o));
            }
            for (index, (owner, members)) in lists.into_iter().enumerate() {
                add_list(&mut doc, index, owner, members);
            }
            doc
        })
}

/// A generated graph together with a permutation of its statements.
fn graph_and_permutation() -> impl Strategy<Value = (Document, Document)> {
    graph().prop_flat_map(|doc| {
        let statements = doc.statements.clone();
        (Just(doc.clone()), Just(statements).prop_shuffle()).prop_map(|(doc, statements)| {
            let mut permuted = doc.clone();
            permuted.statements = statements;
            (doc, permuted)
        })
    })
}

// =============================================================================
// Order Independence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Permuting the input statements never changes a byte of the output
    #[test]
    fn prop_output_ignores_statement_order((doc, permuted) in graph_and_permutation()) {
        for format in FORMATS {
            for options in option_sets() {
                let expected = write_to_string(format, &options, &doc);
                let actual = write_to_string(format, &options, &permuted);
                prop_assert!(expected.is_ok(), "{}: {:?}", format, expected);
                prop_assert_eq!(expected.ok(), actual.ok(), "{} output depends on input order", format);
            }
        }
    }
}

// =============================================================================
// Round Trip
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Output parses back to a graph isomorphic to the input
    #[test]
    fn prop_round_trip_preserves_the_graph(doc in graph()) {
        for format in FORMATS {
            for options in option_sets() {
                let output = write_to_string(format, &options, &doc)
                    .map_err(|e| TestCaseError::fail(format!("{format}: {e}")))?;
                let reparsed = parse_document(&output, reader(format))
                    .map_err(|e| TestCaseError::fail(format!("{format}: {e}\n{output}")))?;
                prop_assert!(
                    isomorphic(&doc.statements, &reparsed.statements),
                    "{} round trip changed the graph ({:?}):\n{}",
                    format,
                    first_mismatch(&doc.statements, &reparsed.statements),
                    output
                );
            }
        }
    }
}

// =============================================================================
// Idempotence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Rewriting Turtle output is a fixed point; without inlining every
    /// blank node reads back under the label it was written with
    #[test]
    fn prop_turtle_rewrite_is_a_fixed_point(doc in graph()) {
        let options = WriterOptions::default();
        let first = write_to_string(TargetFormat::Turtle, &options, &doc)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let reparsed = parse_document(&first, SourceFormat::Turtle)
            .map_err(|e| TestCaseError::fail(format!("{e}\n{first}")))?;
        let second = write_to_string(TargetFormat::Turtle, &options, &reparsed)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(first, second);
    }
}
