//! Writer configuration.
//!
//! [`WriterOptions`] is validated once, before any statement is accepted, so
//! that configuration mistakes never surface halfway through an emission.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sophia_api::term::LanguageTag;

use crate::error::{FormatError, Result};

/// Which short form an IRI should try first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ShortIriPreference {
    /// Qualified name, then base-relative, then absolute.
    #[default]
    Prefix,
    /// Base-relative (when it shortens the IRI), then qualified name, then absolute.
    BaseIri,
}

/// Whether the default datatype of plain and language-tagged strings is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum StringDataTypeOption {
    /// Always write `xsd:string` / `rdf:langString`.
    Explicit,
    /// Omit the datatype when it is implied by the literal.
    #[default]
    Implicit,
}

/// Output syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum TargetFormat {
    /// Turtle 1.1.
    #[default]
    Turtle,
    /// RDF/XML.
    RdfXml,
    /// JSON-LD 1.1.
    JsonLd,
}

impl TargetFormat {
    /// Conventional file extension (without the dot).
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Turtle => "ttl",
            TargetFormat::RdfXml => "rdf",
            TargetFormat::JsonLd => "jsonld",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TargetFormat::Turtle => "turtle",
            TargetFormat::RdfXml => "rdf-xml",
            TargetFormat::JsonLd => "json-ld",
        })
    }
}

impl FromStr for TargetFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Ok(TargetFormat::Turtle),
            "rdf-xml" | "rdfxml" | "rdf" | "xml" => Ok(TargetFormat::RdfXml),
            "json-ld" | "jsonld" => Ok(TargetFormat::JsonLd),
            other => Err(FormatError::Config(format!("unknown target format '{other}'"))),
        }
    }
}

impl FromStr for ShortIriPreference {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "prefix" => Ok(ShortIriPreference::Prefix),
            "base-iri" | "base_iri" => Ok(ShortIriPreference::BaseIri),
            other => Err(FormatError::Config(format!(
                "unknown short IRI preference '{other}'"
            ))),
        }
    }
}

impl FromStr for StringDataTypeOption {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "explicit" => Ok(StringDataTypeOption::Explicit),
            "implicit" => Ok(StringDataTypeOption::Implicit),
            other => Err(FormatError::Config(format!(
                "unknown string data typing '{other}'"
            ))),
        }
    }
}

/// Options consumed by the writer orchestrator and the format adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(default, rename_all = "kebab-case")
)]
pub struct WriterOptions {
    /// Root for base-relative IRIs.
    pub base_iri: Option<String>,
    /// Which short IRI form is tried first.
    pub short_iri_preference: ShortIriPreference,
    /// Declare prefixes as DTD entities in RDF/XML output.
    pub use_dtd_subset: bool,
    /// Render blank nodes and collections at their point of use.
    ///
    /// Only blank nodes referenced exactly once, and not reachable from
    /// themselves through other inlined nodes, are inlined. A blank node
    /// with several referrers or on a cycle keeps its `_:blankN` subject
    /// block, so every statement is written and the output parses back to
    /// the same graph.
    pub inline_blank_nodes: bool,
    /// Comment lines written before the first subject.
    pub leading_comments: Vec<String>,
    /// Comment lines written after the last subject.
    pub trailing_comments: Vec<String>,
    /// Whether implied string datatypes are written.
    pub string_data_type: StringDataTypeOption,
    /// Language tag forced onto every plain string literal.
    pub override_string_language: Option<String>,
    /// One level of indentation.
    pub indent: String,
    /// Line terminator.
    pub line_end: String,
    /// Drop `rdf:type owl:NamedIndividual` statements before writing.
    pub suppress_named_individuals: bool,
    /// RDF/XML only: declare no default `xmlns` namespace. IRIs in the
    /// empty prefix's namespace are written with a generated prefix.
    pub omit_xmlns_namespace: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            base_iri: None,
            short_iri_preference: ShortIriPreference::Prefix,
            use_dtd_subset: false,
            inline_blank_nodes: false,
            leading_comments: Vec::new(),
            trailing_comments: Vec::new(),
            string_data_type: StringDataTypeOption::Implicit,
            override_string_language: None,
            indent: "\t".to_owned(),
            line_end: "\n".to_owned(),
            suppress_named_individuals: false,
            omit_xmlns_namespace: false,
        }
    }
}

impl WriterOptions {
    /// Checks option values and combinations.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Config`] when the base IRI is not absolute, the
    /// `BaseIri` preference is chosen without a base IRI, the indent unit holds
    /// anything but spaces and tabs, the line end is not `\n`, `\r\n` or `\r`,
    /// or the override language is not a BCP 47 language tag. IRIs and tags are
    /// checked by the same rules the RDF parsers apply.
    pub fn validate(&self) -> Result<()> {
        if let Some(base) = &self.base_iri {
            if sophia_iri::Iri::new(base.as_str()).is_err() {
                return Err(FormatError::Config(format!(
                    "base IRI '{base}' is not an absolute IRI"
                )));
            }
        }
        if self.short_iri_preference == ShortIriPreference::BaseIri && self.base_iri.is_none() {
            return Err(FormatError::Config(
                "the base-iri short IRI preference requires a base IRI".to_owned(),
            ));
        }
        if !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(FormatError::Config(format!(
                "indent {:?} may only contain spaces and tabs",
                self.indent
            )));
        }
        if !matches!(self.line_end.as_str(), "\n" | "\r\n" | "\r") {
            return Err(FormatError::Config(format!(
                "line end {:?} must be one of \\n, \\r\\n or \\r",
                self.line_end
            )));
        }
        if let Some(lang) = &self.override_string_language {
            if LanguageTag::new(lang.as_str()).is_err() {
                return Err(FormatError::Config(format!(
                    "override language '{lang}' is not a language tag"
                )));
            }
        }
        Ok(())
    }
}
