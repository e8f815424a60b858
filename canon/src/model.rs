//! RDF term and statement model.
//!
//! Terms are immutable and cheap to clone: every string is held in an
//! `Arc<str>`, so the accumulator, the sorted views and the label tables can
//! all share the same allocations. Equality is by value for IRIs and
//! literals, and by the source document's identifier for blank nodes.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::error::{FormatError, Result};
use crate::vocab::{RDF_LANG_STRING, XSD_STRING};

/// An absolute (or, after rewriting, caller-supplied) IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri(Arc<str>);

impl Iri {
    /// Creates an IRI from its string form.
    pub fn new(iri: impl Into<Arc<str>>) -> Self {
        Self(iri.into())
    }

    /// Returns the IRI string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl Borrow<str> for Iri {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A blank node, identified by the label it carried in the source document.
///
/// The source label is only an identity key. Output labels are assigned
/// afresh from the canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlankId(Arc<str>);

impl BlankId {
    /// Creates a blank node identifier (without the `_:` prefix).
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the source label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// An RDF literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    lexical: Arc<str>,
    language: Option<Arc<str>>,
    datatype: Option<Iri>,
}

impl Literal {
    /// Creates a literal from all three components as given.
    pub fn new(
        lexical: impl Into<Arc<str>>,
        language: Option<&str>,
        datatype: Option<Iri>,
    ) -> Self {
        Self {
            lexical: lexical.into(),
            language: language.map(Arc::from),
            datatype,
        }
    }

    /// Creates a plain string literal typed `xsd:string`.
    pub fn simple(lexical: impl Into<Arc<str>>) -> Self {
        Self::new(lexical, None, Some(Iri::new(XSD_STRING)))
    }

    /// Creates a language-tagged literal typed `rdf:langString`.
    pub fn lang(lexical: impl Into<Arc<str>>, language: &str) -> Self {
        Self::new(lexical, Some(language), Some(Iri::new(RDF_LANG_STRING)))
    }

    /// Creates a literal with an explicit datatype.
    pub fn typed(lexical: impl Into<Arc<str>>, datatype: Iri) -> Self {
        Self::new(lexical, None, Some(datatype))
    }

    /// Returns the lexical form.
    #[must_use]
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// Returns the language tag, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Returns the datatype IRI, if any.
    #[must_use]
    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }

    /// Returns true for a literal without a language tag whose datatype is
    /// absent or `xsd:string`.
    #[must_use]
    pub fn is_plain_string(&self) -> bool {
        self.language.is_none()
            && self
                .datatype
                .as_ref()
                .map_or(true, |dt| dt.as_str() == XSD_STRING)
    }

    /// Returns true when the datatype is the one implied by the literal's
    /// shape (`xsd:string` for plain, `rdf:langString` for tagged literals).
    #[must_use]
    pub fn has_implicit_datatype(&self) -> bool {
        match (&self.language, &self.datatype) {
            (_, None) => true,
            (Some(_), Some(dt)) => dt.as_str() == RDF_LANG_STRING,
            (None, Some(dt)) => dt.as_str() == XSD_STRING,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.lexical.as_ref())?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^{dt}")
        } else {
            Ok(())
        }
    }
}

/// Any RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A named resource.
    Iri(Iri),
    /// An anonymous resource.
    Blank(BlankId),
    /// A literal value.
    Literal(Literal),
}

impl Term {
    /// Shorthand for `Term::Iri(Iri::new(iri))`.
    pub fn iri(iri: impl Into<Arc<str>>) -> Self {
        Term::Iri(Iri::new(iri))
    }

    /// Shorthand for `Term::Blank(BlankId::new(id))`.
    pub fn blank(id: impl Into<Arc<str>>) -> Self {
        Term::Blank(BlankId::new(id))
    }

    /// Returns the IRI if this term is one.
    #[must_use]
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Returns the blank node identifier if this term is one.
    #[must_use]
    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Term::Blank(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the literal if this term is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Returns true for blank nodes.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    /// The string value used by the non-structural comparison: the IRI
    /// string, the literal's lexical form, or the blank node's source label.
    #[must_use]
    pub fn value_str(&self) -> &str {
        match self {
            Term::Iri(iri) => iri.as_str(),
            Term::Blank(id) => id.as_str(),
            Term::Literal(lit) => lit.lexical(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => iri.fmt(f),
            Term::Blank(id) => id.fmt(f),
            Term::Literal(lit) => lit.fmt(f),
        }
    }
}

impl From<Iri> for Term {
    fn from(value: Iri) -> Self {
        Term::Iri(value)
    }
}

impl From<BlankId> for Term {
    fn from(value: BlankId) -> Self {
        Term::Blank(value)
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Term::Literal(value)
    }
}

/// A single triple. The subject is never a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    subject: Term,
    predicate: Iri,
    object: Term,
}

impl Statement {
    /// Creates a statement.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::LiteralSubject`] if `subject` is a literal.
    pub fn new(subject: Term, predicate: Iri, object: Term) -> Result<Self> {
        if let Term::Literal(lit) = &subject {
            return Err(FormatError::LiteralSubject(lit.to_string()));
        }
        Ok(Self {
            subject,
            predicate,
            object,
        })
    }

    /// The subject (an IRI or blank node).
    #[must_use]
    pub fn subject(&self) -> &Term {
        &self.subject
    }

    /// The predicate.
    #[must_use]
    pub fn predicate(&self) -> &Iri {
        &self.predicate
    }

    /// The object.
    #[must_use]
    pub fn object(&self) -> &Term {
        &self.object
    }

    /// Splits the statement into its three terms.
    #[must_use]
    pub fn into_parts(self) -> (Term, Iri, Term) {
        (self.subject, self.predicate, self.object)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// A parsed or assembled document: namespace declarations plus statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// `(prefix, namespace)` declarations, in declaration order.
    pub prefixes: Vec<(String, String)>,
    /// The statements, in any order.
    pub statements: Vec<Statement>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a namespace prefix.
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.push((prefix.into(), namespace.into()));
    }

    /// Adds a statement.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::LiteralSubject`] if `subject` is a literal.
    pub fn add(&mut self, subject: Term, predicate: Iri, object: Term) -> Result<()> {
        self.statements.push(Statement::new(subject, predicate, object)?);
        Ok(())
    }
}
