//! Format adapters driven by [`SortedRdfWriter`](crate::writer::SortedRdfWriter).
//!
//! - **Turtle** ([`turtle`]): `.ttl`, the primary diff-friendly format
//! - **RDF/XML** ([`rdfxml`]): `.rdf`, with optional DTD entity references
//! - **JSON-LD** ([`jsonld`]): `.jsonld`, one self-contained node object per subject

pub mod jsonld;
pub mod rdfxml;
pub mod turtle;

pub use jsonld::JsonLdAdapter;
pub use rdfxml::RdfXmlAdapter;
pub use turtle::TurtleAdapter;
