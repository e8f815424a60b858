//! Reading RDF input into a [`Document`].
//!
//! Parsing is delegated to the sophia parsers. Prefix declarations come from
//! the parser's own prefix map for Turtle and TriG, so they are resolved
//! against `@base` exactly as the statements are. Statements of every named
//! graph are merged into one graph.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;
use sophia_api::quad::Quad;
use sophia_api::source::{QuadSource, TripleSource};
use sophia_api::term::{Term as SophiaTerm, TermKind};
use sophia_api::triple::Triple;
use sophia_turtle::parser::{nq, nt, trig, turtle};

use crate::error::{FormatError, Result};
use crate::model::{Document, Iri, Literal, Statement, Term};

/// An input syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// Turtle 1.1.
    #[default]
    Turtle,
    /// N-Triples.
    NTriples,
    /// TriG. Named graphs are merged into the default graph.
    TriG,
    /// N-Quads. Named graphs are merged into the default graph.
    NQuads,
    /// RDF/XML.
    RdfXml,
    /// JSON-LD 1.1, expanded without fetching remote contexts.
    JsonLd,
}

impl SourceFormat {
    /// Infers the format from a file extension.
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "ttl" | "turtle" => Some(Self::Turtle),
            "nt" => Some(Self::NTriples),
            "trig" => Some(Self::TriG),
            "nq" => Some(Self::NQuads),
            "rdf" | "owl" | "xml" => Some(Self::RdfXml),
            "jsonld" | "json" => Some(Self::JsonLd),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Turtle => "turtle",
            Self::NTriples => "ntriples",
            Self::TriG => "trig",
            Self::NQuads => "nquads",
            Self::RdfXml => "rdf-xml",
            Self::JsonLd => "json-ld",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Ok(Self::Turtle),
            "ntriples" | "n-triples" | "nt" => Ok(Self::NTriples),
            "trig" => Ok(Self::TriG),
            "nquads" | "n-quads" | "nq" => Ok(Self::NQuads),
            "rdf-xml" | "rdfxml" | "rdf" | "xml" | "owl" => Ok(Self::RdfXml),
            "json-ld" | "jsonld" => Ok(Self::JsonLd),
            other => Err(FormatError::Config(format!("unknown source format '{other}'"))),
        }
    }
}

fn convert_term<T: SophiaTerm>(term: T) -> Option<Term> {
    match term.kind() {
        TermKind::Iri => term.iri().map(|iri| Term::iri(iri.as_str())),
        TermKind::BlankNode => term.bnode_id().map(|id| Term::blank(id.as_str())),
        TermKind::Literal => {
            let lexical = term.lexical_form()?;
            let language = term.language_tag();
            let datatype = term.datatype().map(|dt| Iri::new(dt.as_str()));
            Some(Term::Literal(Literal::new(
                &*lexical,
                language.as_ref().map(|tag| tag.as_str()),
                datatype,
            )))
        }
        _ => None,
    }
}

type Converted = (Option<Term>, Option<Term>, Option<Term>);

fn convert_triple<T: Triple>(t: &T) -> Converted {
    (convert_term(t.s()), convert_term(t.p()), convert_term(t.o()))
}

fn convert_quad<Q: Quad>(q: &Q) -> Converted {
    (convert_term(q.s()), convert_term(q.p()), convert_term(q.o()))
}

fn parse_failed(format: SourceFormat, error: impl fmt::Display) -> FormatError {
    FormatError::Parse {
        format: format.name(),
        message: error.to_string(),
    }
}

/// Prefix bindings in prefix order; a parser keeps only the last binding
/// of each prefix.
fn sorted_prefixes(prefixes: &HashMap<String, String>) -> Vec<(String, String)> {
    let sorted: BTreeMap<&String, &String> = prefixes.iter().collect();
    sorted
        .into_iter()
        .map(|(prefix, namespace)| (prefix.clone(), namespace.clone()))
        .collect()
}

/// Terms of the `@context` objects of a JSON-LD document that JSON-LD
/// itself would expand as prefixes.
fn json_ld_prefixes(text: &str) -> Vec<(String, String)> {
    fn visit(value: &Value, prefixes: &mut BTreeMap<String, String>) {
        match value {
            Value::Array(items) => items.iter().for_each(|item| visit(item, prefixes)),
            Value::Object(node) => {
                for context in node.get("@context").into_iter().flat_map(|c| match c {
                    Value::Array(contexts) => contexts.iter().collect::<Vec<_>>(),
                    other => vec![other],
                }) {
                    let Value::Object(terms) = context else { continue };
                    for (term, namespace) in terms {
                        let Value::String(namespace) = namespace else { continue };
                        let is_prefix = !term.is_empty()
                            && !term.starts_with('@')
                            && !term.contains(':')
                            && namespace.ends_with([':', '/', '?', '#', '[', ']', '@'])
                            && sophia_iri::Iri::new(namespace.as_str()).is_ok();
                        if is_prefix {
                            prefixes.insert(term.clone(), namespace.clone());
                        }
                    }
                }
                if let Some(graph) = node.get("@graph") {
                    visit(graph, prefixes);
                }
            }
            _ => {}
        }
    }

    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return Vec::new();
    };
    let mut prefixes = BTreeMap::new();
    visit(&value, &mut prefixes);
    prefixes.into_iter().collect()
}

/// Parses `text` into a [`Document`].
///
/// Prefixes are those the parser bound (Turtle, TriG) or the prefix terms
/// of the JSON-LD contexts; other syntaxes yield no prefixes. Triples that
/// cannot be represented (literal subjects, triple terms, variables) are
/// skipped with a warning.
///
/// # Errors
///
/// Returns [`FormatError::Parse`] if the text is not valid in `format`.
pub fn parse_document(text: &str, format: SourceFormat) -> Result<Document> {
    let mut triples: Vec<Converted> = Vec::new();
    let mut named = 0usize;
    let prefixes = match format {
        SourceFormat::Turtle => {
            let mut source = turtle::parse_str(text);
            source
                .for_each_triple(|t| triples.push(convert_triple(&t)))
                .map_err(|e| parse_failed(format, e))?;
            sorted_prefixes(source.0.prefixes())
        }
        SourceFormat::NTriples => {
            nt::parse_str(text)
                .for_each_triple(|t| triples.push(convert_triple(&t)))
                .map_err(|e| parse_failed(format, e))?;
            Vec::new()
        }
        SourceFormat::TriG => {
            let mut source = trig::parse_str(text);
            source
                .for_each_quad(|q| {
                    named += usize::from(q.g().is_some());
                    triples.push(convert_quad(&q));
                })
                .map_err(|e| parse_failed(format, e))?;
            sorted_prefixes(source.0.prefixes())
        }
        SourceFormat::NQuads => {
            nq::parse_str(text)
                .for_each_quad(|q| {
                    named += usize::from(q.g().is_some());
                    triples.push(convert_quad(&q));
                })
                .map_err(|e| parse_failed(format, e))?;
            Vec::new()
        }
        SourceFormat::RdfXml => {
            sophia_xml::parser::parse_str(text)
                .for_each_triple(|t| triples.push(convert_triple(&t)))
                .map_err(|e| parse_failed(format, e))?;
            Vec::new()
        }
        SourceFormat::JsonLd => {
            sophia_jsonld::parser::parse_str(text)
                .for_each_quad(|q| {
                    named += usize::from(q.g().is_some());
                    triples.push(convert_quad(&q));
                })
                .map_err(|e| parse_failed(format, e))?;
            json_ld_prefixes(text)
        }
    };
    if named > 0 {
        tracing::warn!(
            statements = named,
            format = format.name(),
            "merged named graph statements into the default graph"
        );
    }

    let mut document = Document::new();
    document.prefixes = prefixes;
    let mut skipped = 0usize;
    for triple in triples {
        let statement = match triple {
            (Some(subject), Some(Term::Iri(predicate)), Some(object)) => {
                Statement::new(subject, predicate, object).ok()
            }
            _ => None,
        };
        match statement {
            Some(statement) => document.statements.push(statement),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, format = format.name(), "skipped unrepresentable triples");
    }
    tracing::debug!(
        statements = document.statements.len(),
        prefixes = document.prefixes.len(),
        "parsed document"
    );
    Ok(document)
}

/// Reads and parses the file at `path`, inferring the format from its
/// extension when `format` is `None`.
///
/// # Errors
///
/// Returns [`FormatError::Io`] if the file cannot be read,
/// [`FormatError::Config`] if the format cannot be inferred, and
/// [`FormatError::Parse`] on syntax errors.
pub fn read_document(path: &Path, format: Option<SourceFormat>) -> Result<Document> {
    let format = match format.or_else(|| SourceFormat::from_extension(path)) {
        Some(format) => format,
        None => {
            return Err(FormatError::Config(format!(
                "cannot infer the input format of {}",
                path.display()
            )))
        }
    };
    let text = std::fs::read_to_string(path)?;
    parse_document(&text, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TURTLE: &str = r#"
@prefix ex: <http://example.com/> .
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
@prefix : <http://example.com/default#> .

ex:A a ex:Widget ;
    rdfs:label "Foo"@en ;
    ex:size 3 ;
    ex:part [ ex:name "inner" ] .
"#;

    fn prefix<'a>(doc: &'a Document, name: &str) -> Option<&'a str> {
        doc.prefixes
            .iter()
            .find(|(p, _)| p == name)
            .map(|(_, namespace)| namespace.as_str())
    }

    #[test]
    fn parses_turtle_with_prefixes() {
        let doc = parse_document(TURTLE, SourceFormat::Turtle).expect("valid turtle");
        assert_eq!(doc.statements.len(), 5);
        assert_eq!(
            doc.prefixes,
            vec![
                (String::new(), "http://example.com/default#".to_owned()),
                ("ex".to_owned(), "http://example.com/".to_owned()),
                ("rdfs".to_owned(), "http://www.w3.org/2000/01/rdf-schema#".to_owned()),
            ]
        );
        let label = doc
            .statements
            .iter()
            .find_map(|s| s.object().as_literal().filter(|l| l.language().is_some()))
            .expect("language literal");
        assert_eq!(label.lexical(), "Foo");
        assert_eq!(label.language(), Some("en"));
        assert!(doc.statements.iter().any(|s| s.object().is_blank()));
    }

    #[test]
    fn relative_prefixes_resolve_against_base() {
        let text = "@base <http://example.com/> .\n@prefix ex: <ns#> .\nex:a ex:b ex:c .\n";
        let doc = parse_document(text, SourceFormat::Turtle).expect("valid turtle");
        assert_eq!(prefix(&doc, "ex"), Some("http://example.com/ns#"));
        assert_eq!(doc.statements[0].subject(), &Term::iri("http://example.com/ns#a"));
    }

    #[test]
    fn prefix_text_inside_literals_is_not_a_declaration() {
        let text = r#"@prefix ex: <http://example.com/> .
ex:a ex:comment """
@prefix ex: <http://evil.org/> .
""" .
"#;
        let doc = parse_document(text, SourceFormat::Turtle).expect("valid turtle");
        assert_eq!(doc.prefixes, vec![("ex".to_owned(), "http://example.com/".to_owned())]);
    }

    #[test]
    fn rebound_prefix_keeps_last_binding() {
        let text = "@prefix ex: <http://one.org/> .\nex:a ex:b ex:c .\n@prefix ex: <http://two.org/> .\n";
        let doc = parse_document(text, SourceFormat::Turtle).expect("valid turtle");
        assert_eq!(prefix(&doc, "ex"), Some("http://two.org/"));
        assert_eq!(doc.statements[0].subject(), &Term::iri("http://one.org/a"));
    }

    #[test]
    fn parses_ntriples() {
        let text = "<http://example.com/s> <http://example.com/p> \"o\" .\n_:b <http://example.com/p> <http://example.com/o> .\n";
        let doc = parse_document(text, SourceFormat::NTriples).expect("valid n-triples");
        assert_eq!(doc.statements.len(), 2);
        assert!(doc.prefixes.is_empty());
    }

    #[test]
    fn named_graphs_are_merged() {
        let trig = "@prefix ex: <http://example.com/> .\nex:a ex:p ex:b .\nex:g { ex:c ex:p ex:d . }\n";
        let doc = parse_document(trig, SourceFormat::TriG).expect("valid trig");
        assert_eq!(doc.statements.len(), 2);
        assert_eq!(prefix(&doc, "ex"), Some("http://example.com/"));

        let nquads = "<http://example.com/a> <http://example.com/p> \"x\" <http://example.com/g> .\n";
        let doc = parse_document(nquads, SourceFormat::NQuads).expect("valid n-quads");
        assert_eq!(doc.statements.len(), 1);
    }

    #[test]
    fn parses_rdf_xml() {
        let text = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
    xmlns:ex="http://example.com/">
    <ex:Widget rdf:about="http://example.com/A">
        <ex:name xml:lang="en">Foo</ex:name>
    </ex:Widget>
</rdf:RDF>
"#;
        let doc = parse_document(text, SourceFormat::RdfXml).expect("valid rdf/xml");
        assert_eq!(doc.statements.len(), 2);
        assert!(doc
            .statements
            .iter()
            .any(|s| s.object().as_literal().and_then(Literal::language) == Some("en")));
    }

    #[test]
    fn parses_json_ld_with_context_prefixes() {
        let text = r#"[ {
    "@id": "http://example.com/A",
    "ex:name": "Foo",
    "@context": { "ex": "http://example.com/", "us": "http://example.com/ns_" }
} ]"#;
        let doc = parse_document(text, SourceFormat::JsonLd).expect("valid json-ld");
        assert_eq!(doc.statements.len(), 1);
        assert_eq!(doc.statements[0].predicate().as_str(), "http://example.com/name");
        assert_eq!(doc.prefixes, vec![("ex".to_owned(), "http://example.com/".to_owned())]);
    }

    #[test]
    fn reports_syntax_errors() {
        let err = parse_document("ex:A ex:b", SourceFormat::Turtle).expect_err("invalid turtle");
        assert!(matches!(err, FormatError::Parse { format: "turtle", .. }));
        let err = parse_document("<a></b>", SourceFormat::RdfXml).expect_err("invalid xml");
        assert!(matches!(err, FormatError::Parse { format: "rdf-xml", .. }));
    }

    #[test]
    fn formats_by_name_and_extension() {
        assert_eq!("nt".parse::<SourceFormat>().expect("known"), SourceFormat::NTriples);
        assert_eq!("rdfxml".parse::<SourceFormat>().expect("known"), SourceFormat::RdfXml);
        assert!("n3".parse::<SourceFormat>().is_err());
        assert_eq!(
            SourceFormat::from_extension(Path::new("a/b.TTL")),
            Some(SourceFormat::Turtle)
        );
        assert_eq!(
            SourceFormat::from_extension(Path::new("a/b.owl")),
            Some(SourceFormat::RdfXml)
        );
        assert_eq!(SourceFormat::from_extension(Path::new("a/b.trig")), Some(SourceFormat::TriG));
        assert_eq!(SourceFormat::from_extension(Path::new("a/b.n3")), None);
    }
}
