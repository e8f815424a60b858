//! Deterministic, diff-friendly RDF serialization.
//!
//! The `rdf-canon` crate writes an RDF graph to Turtle, RDF/XML or JSON-LD
//! so that the same graph always produces the same bytes, whatever order
//! its statements arrived in and whatever blank-node labels the input used.
//! Subjects, predicates and objects are sorted by a structural comparison
//! that looks through blank nodes, blank nodes get fresh labels in that
//! order, and namespace prefixes are chosen the same way every time.
//!
//! # Entry Point
//!
//! ```
//! use rdf_canon::{write_to_string, Document, Iri, Literal, TargetFormat, Term, WriterOptions};
//!
//! let mut doc = Document::new();
//! doc.add_prefix("ex", "http://example.com/");
//! doc.add(
//!     Term::iri("http://example.com/A"),
//!     Iri::new("http://www.w3.org/2000/01/rdf-schema#label"),
//!     Term::Literal(Literal::simple("Foo")),
//! )?;
//! let turtle = write_to_string(TargetFormat::Turtle, &WriterOptions::default(), &doc)?;
//! assert!(turtle.contains("ex:A\n\trdfs:label \"Foo\" ;\n\t.\n"));
//! # Ok::<(), rdf_canon::FormatError>(())
//! ```
//!
//! # Streaming statements
//!
//! ```
//! use rdf_canon::{Iri, SortedRdfWriter, Statement, Term, TurtleAdapter, WriterOptions};
//!
//! let mut writer = SortedRdfWriter::new(Vec::new(), TurtleAdapter::new(), WriterOptions::default())?;
//! writer.start();
//! writer.add_statement(Statement::new(
//!     Term::blank("x"),
//!     Iri::new("http://example.com/p"),
//!     Term::iri("http://example.com/o"),
//! )?)?;
//! writer.finish()?;
//! let bytes = writer.into_inner();
//! assert!(String::from_utf8_lossy(&bytes).contains("_:blank1"));
//! # Ok::<(), rdf_canon::FormatError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod compare;
pub mod error;
pub mod graph;
pub mod indent;
pub mod isomorphism;
pub mod model;
pub mod namespace;
pub mod options;
pub mod rewrite;
pub mod serializer;
#[cfg(feature = "parsers")]
pub mod source;
pub mod text;
pub mod vocab;
pub mod writer;

pub use error::{FormatError, Result};
pub use isomorphism::isomorphic;
pub use model::{BlankId, Document, Iri, Literal, Statement, Term};
pub use options::{ShortIriPreference, StringDataTypeOption, TargetFormat, WriterOptions};
pub use rewrite::{infer_base_iri, IriRewrite};
pub use serializer::{JsonLdAdapter, RdfXmlAdapter, TurtleAdapter};
#[cfg(feature = "parsers")]
pub use source::{parse_document, read_document, SourceFormat};
pub use writer::{write_document, write_to_string, FormatAdapter, SortedRdfWriter};
