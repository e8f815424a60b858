//! Graph comparison that ignores blank-node labels.
//!
//! Blank nodes are coloured by iterated refinement: a node's colour is the
//! rank of its sorted edge descriptions, where each edge names its
//! predicate and the other end's IRI, literal or current colour. Refinement
//! stops once no colour class splits. The signature of a graph is its set
//! of statements with every blank node written as its colour. Language
//! tags compare case-insensitively and an untyped literal equals its
//! `xsd:string` form.
//!
//! Isomorphic graphs always have equal signatures. The converse fails only
//! for blank nodes that no neighbourhood tells apart, such as two 2-cycles
//! against one 4-cycle over the same predicate.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::model::{BlankId, Iri, Statement, Term};
use crate::vocab::XSD_STRING;

type Colours<'a> = BTreeMap<&'a BlankId, usize>;

fn render(term: &Term, colours: &Colours<'_>) -> String {
    match term {
        Term::Blank(id) => format!("_:c{}", colours.get(id).copied().unwrap_or_default()),
        Term::Literal(literal) => match literal.language() {
            Some(lang) => format!("{:?}@{}", literal.lexical(), lang.to_ascii_lowercase()),
            None => format!(
                "{:?}^^{}",
                literal.lexical(),
                literal.datatype().map_or(XSD_STRING, Iri::as_str)
            ),
        },
        Term::Iri(iri) => iri.to_string(),
    }
}

fn refine<'a>(statements: &[&'a Statement]) -> Colours<'a> {
    let blanks: BTreeSet<&BlankId> = statements
        .iter()
        .flat_map(|s| [s.subject().as_blank(), s.object().as_blank()])
        .flatten()
        .collect();
    let mut colours: Colours<'a> = blanks.iter().map(|&id| (id, 0)).collect();
    let mut classes = usize::from(!blanks.is_empty());
    loop {
        let mut edges: BTreeMap<&BlankId, Vec<String>> = colours
            .iter()
            .map(|(&id, colour)| (id, vec![format!("c{colour}")]))
            .collect();
        for statement in statements {
            if let Term::Blank(id) = statement.subject() {
                let edge = format!("> {} {}", statement.predicate(), render(statement.object(), &colours));
                edges.entry(id).or_default().push(edge);
            }
            if let Term::Blank(id) = statement.object() {
                let edge = format!("< {} {}", render(statement.subject(), &colours), statement.predicate());
                edges.entry(id).or_default().push(edge);
            }
        }
        for description in edges.values_mut() {
            description.sort_unstable();
        }
        let ranks: BTreeMap<&Vec<String>, usize> = edges
            .values()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(rank, description)| (description, rank))
            .collect();
        let count = ranks.len();
        let refined: Colours<'a> = edges
            .iter()
            .map(|(&id, description)| (id, ranks.get(description).copied().unwrap_or_default()))
            .collect();
        colours = refined;
        if count == classes {
            return colours;
        }
        classes = count;
    }
}

/// The label-independent form of a graph: its distinct statements, sorted,
/// with blank nodes written as their refinement colour.
#[must_use]
pub fn signature(statements: &[Statement]) -> Vec<String> {
    let distinct: Vec<&Statement> = statements
        .iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let colours = refine(&distinct);
    let rendered: BTreeSet<String> = distinct
        .iter()
        .map(|s| {
            format!(
                "{} {} {} .",
                render(s.subject(), &colours),
                s.predicate(),
                render(s.object(), &colours)
            )
        })
        .collect();
    rendered.into_iter().collect()
}

/// Returns true if the two statement sets describe the same graph up to
/// blank-node labels, within the accuracy described in the module docs.
#[must_use]
pub fn isomorphic(a: &[Statement], b: &[Statement]) -> bool {
    signature(a) == signature(b)
}

/// The first signature line present in only one of the two graphs, for
/// diagnostics.
#[must_use]
pub fn first_mismatch(expected: &[Statement], actual: &[Statement]) -> Option<String> {
    let expected = signature(expected);
    let actual = signature(actual);
    let missing = expected.iter().find(|line| actual.binary_search(line).is_err());
    let extra = actual.iter().find(|line| expected.binary_search(line).is_err());
    match (missing, extra) {
        (Some(line), _) => Some(format!("missing: {line}")),
        (None, Some(line)) => Some(format!("unexpected: {line}")),
        (None, None) => None,
    }
}
