//! Built-in Turtle fixtures exercising the parts of the writer that are easy
//! to get wrong: nested blank nodes, collections, cycles and literal forms.

use std::path::Path;

use anyhow::{Context, Result};
use rdf_canon::{parse_document, Document, SourceFormat};

pub mod graphs;

/// A named input graph.
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Name shown in reports.
    pub name: String,
    /// Source text.
    pub text: String,
    /// Syntax of `text`.
    pub format: SourceFormat,
}

impl Fixture {
    /// A Turtle fixture.
    pub fn turtle(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            format: SourceFormat::Turtle,
        }
    }

    /// Loads a corpus file, inferring its syntax from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has an unknown extension.
    pub fn load(path: &Path) -> Result<Self> {
        let format = SourceFormat::from_extension(path)
            .with_context(|| format!("Unknown RDF syntax for {}", path.display()))?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self {
            name: path.display().to_string(),
            text,
            format,
        })
    }

    /// Parses the fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse.
    pub fn document(&self) -> Result<Document> {
        parse_document(&self.text, self.format)
            .with_context(|| format!("Failed to parse fixture {}", self.name))
    }
}

/// Every built-in fixture.
pub fn builtin() -> Vec<Fixture> {
    vec![
        Fixture::turtle("ontology", graphs::ONTOLOGY),
        Fixture::turtle("restrictions", graphs::RESTRICTIONS),
        Fixture::turtle("collections", graphs::COLLECTIONS),
        Fixture::turtle("cycles", graphs::CYCLES),
        Fixture::turtle("literals", graphs::LITERALS),
        Fixture::turtle("unprefixed", graphs::UNPREFIXED),
    ]
}
