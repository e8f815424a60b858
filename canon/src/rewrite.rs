//! IRI rewriting and base IRI inference applied before writing.

use regex::Regex;

use crate::error::Result;
use crate::model::{Document, Iri, Statement, Term};
use crate::vocab::{OWL_ONTOLOGY, RDF_TYPE};

/// A regex substitution applied to IRIs. Only the first match in each IRI
/// is replaced; literals and blank nodes are left alone.
#[derive(Debug, Clone)]
pub struct IriRewrite {
    pattern: Regex,
    replacement: String,
}

impl IriRewrite {
    /// Compiles `pattern`. `replacement` may use `$1`-style group references.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Pattern`](crate::FormatError::Pattern) if
    /// `pattern` is not a valid regular expression.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// Rewrites a single IRI string.
    #[must_use]
    pub fn apply(&self, iri: &str) -> String {
        self.pattern.replace(iri, self.replacement.as_str()).into_owned()
    }

    fn apply_term(&self, term: &Term) -> Term {
        match term {
            Term::Iri(iri) => Term::Iri(self.apply_iri(iri)),
            other => other.clone(),
        }
    }

    fn apply_iri(&self, iri: &Iri) -> Iri {
        Iri::new(self.apply(iri.as_str()))
    }

    /// Rewrites the IRIs of one statement.
    #[must_use]
    pub fn apply_statement(&self, statement: &Statement) -> Statement {
        let (subject, predicate, object) = statement.clone().into_parts();
        let subject = self.apply_term(&subject);
        let predicate = self.apply_iri(&predicate);
        let object = self.apply_term(&object);
        // the subject is still an IRI or blank node, so this cannot fail
        Statement::new(subject, predicate, object).unwrap_or_else(|_| statement.clone())
    }

    /// Rewrites every statement and declared namespace of `document`.
    pub fn apply_document(&self, document: &mut Document) {
        for (_, namespace) in &mut document.prefixes {
            *namespace = self.apply(namespace);
        }
        for statement in &mut document.statements {
            *statement = self.apply_statement(statement);
        }
        tracing::debug!(
            pattern = self.pattern.as_str(),
            statements = document.statements.len(),
            "rewrote IRIs"
        );
    }
}

/// The lexically smallest IRI subject typed `owl:Ontology`, if any.
#[must_use]
pub fn infer_base_iri(statements: &[Statement]) -> Option<String> {
    statements
        .iter()
        .filter(|s| {
            s.predicate().as_str() == RDF_TYPE
                && s.object().as_iri().is_some_and(|o| o.as_str() == OWL_ONTOLOGY)
        })
        .filter_map(|s| s.subject().as_iri())
        .map(Iri::as_str)
        .min()
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Literal;
    use crate::vocab::RDFS_LABEL;

    #[test]
    fn rewrites_first_match_in_iris_only() {
        let rewrite = IriRewrite::new("http://old\\.org/", "https://new.org/").expect("valid pattern");
        let mut doc = Document::new();
        doc.add_prefix("o", "http://old.org/");
        doc.add(
            Term::iri("http://old.org/a#http://old.org/"),
            Iri::new("http://old.org/p"),
            Term::Literal(Literal::simple("http://old.org/")),
        )
        .expect("valid");
        doc.add(Term::blank("b"), Iri::new(RDFS_LABEL), Term::iri("http://old.org/o"))
            .expect("valid");
        rewrite.apply_document(&mut doc);

        assert_eq!(doc.prefixes[0].1, "https://new.org/");
        let first = &doc.statements[0];
        assert_eq!(first.subject().value_str(), "https://new.org/a#http://old.org/");
        assert_eq!(first.predicate().as_str(), "https://new.org/p");
        assert_eq!(first.object().value_str(), "http://old.org/");
        let second = &doc.statements[1];
        assert_eq!(second.subject(), &Term::blank("b"));
        assert_eq!(second.object().value_str(), "https://new.org/o");
    }

    #[test]
    fn group_references_are_expanded() {
        let rewrite = IriRewrite::new(r"^http://(\w+)\.org/", "urn:$1:").expect("valid pattern");
        assert_eq!(rewrite.apply("http://vocab.org/x"), "urn:vocab:x");
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert!(matches!(
            IriRewrite::new("(", ""),
            Err(crate::FormatError::Pattern(_))
        ));
    }

    #[test]
    fn base_is_the_smallest_ontology_iri() {
        let statements = vec![
            Statement::new(Term::iri("http://b.org/"), Iri::new(RDF_TYPE), Term::iri(OWL_ONTOLOGY))
                .expect("valid"),
            Statement::new(Term::iri("http://a.org/"), Iri::new(RDF_TYPE), Term::iri(OWL_ONTOLOGY))
                .expect("valid"),
            Statement::new(Term::blank("x"), Iri::new(RDF_TYPE), Term::iri(OWL_ONTOLOGY))
                .expect("valid"),
        ];
        assert_eq!(infer_base_iri(&statements).as_deref(), Some("http://a.org/"));
        assert_eq!(infer_base_iri(&statements[2..]), None);
    }
}
