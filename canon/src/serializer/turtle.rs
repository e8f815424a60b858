//! Turtle 1.1 adapter.
//!
//! Each subject starts its own line, predicates are indented one unit and
//! multi-valued objects sit one per line a further unit in. The block is
//! closed by an indented `.` so that adding or removing a predicate touches
//! only its own lines.

use std::io::Write;

use crate::error::Result;
use crate::indent::IndentingWriter;
use crate::model::{BlankId, Iri, Literal, Term};
use crate::namespace::{NameSyntax, ShortIri};
use crate::text::turtle_string;
use crate::vocab::RDF_TYPE;
use crate::writer::{FormatAdapter, InlineForm, WriteSession};

/// Renders the sorted graph as Turtle.
#[derive(Debug, Default)]
pub struct TurtleAdapter;

impl TurtleAdapter {
    /// Creates the adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn write_term<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        term: &Term,
    ) -> Result<()> {
        match term {
            Term::Blank(id) => {
                let label = session.blank_label(id)?;
                out.write_str(&format!("_:{label}"))?;
                Ok(())
            }
            other => self.write_object(session, out, other),
        }
    }
}

/// The Turtle form of `iri`: a prefixed name, or an `<..>` reference.
#[must_use]
pub fn iri_text(session: &WriteSession, iri: &str) -> String {
    match session.resolver().shorten(iri, NameSyntax::Turtle) {
        ShortIri::QName(qname) => qname.to_string(),
        ShortIri::Relative(rel) => iri_ref(&rel),
        ShortIri::Absolute(abs) => iri_ref(abs),
    }
}

fn iri_ref(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len() + 2);
    out.push('<');
    for c in iri.chars() {
        if c <= ' ' || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\') {
            out.push_str(&format!("\\u{:04X}", u32::from(c)));
        } else {
            out.push(c);
        }
    }
    out.push('>');
    out
}

impl FormatAdapter for TurtleAdapter {
    fn write_header<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        imports: &[&Term],
        leading_comments: &[String],
    ) -> Result<()> {
        for comment in leading_comments {
            for line in comment.lines() {
                out.write_line(&format!("# {line}"))?;
            }
        }
        let base = session.options().base_iri.as_deref();
        if let Some(base) = base {
            out.write_line(&format!("# baseURI: {base}"))?;
        }
        for import in imports {
            out.write_line(&format!("# imports: {}", import.value_str()))?;
        }
        if !leading_comments.is_empty() || base.is_some() || !imports.is_empty() {
            out.eol()?;
        }

        if let Some(base) = base {
            out.write_line(&format!("@base {} .", iri_ref(base)))?;
        }
        for (prefix, namespace) in session.namespaces().iter() {
            out.write_line(&format!("@prefix {prefix}: {} .", iri_ref(namespace)))?;
        }
        if session.has_subjects() {
            out.eol()?;
        }
        Ok(())
    }

    fn write_subject<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        subject: &Term,
    ) -> Result<()> {
        self.write_term(session, out, subject)?;
        out.eol()?;
        out.indent();
        self.write_predicates(session, out, subject)?;
        out.write_line(".")?;
        out.outdent();
        Ok(())
    }

    fn write_subject_separator<W: Write>(
        &mut self,
        _session: &WriteSession,
        out: &mut IndentingWriter<W>,
    ) -> Result<()> {
        out.eol()?;
        Ok(())
    }

    fn write_predicate_and_objects<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        predicate: &Iri,
        objects: &[Term],
    ) -> Result<()> {
        if predicate.as_str() == RDF_TYPE {
            out.write_str("a")?;
        } else {
            out.write_str(&iri_text(session, predicate.as_str()))?;
        }
        match objects {
            [single] => {
                out.write_str(" ")?;
                self.write_object(session, out, single)?;
                out.write_line(" ;")?;
            }
            _ => {
                out.eol()?;
                out.indent();
                for (i, object) in objects.iter().enumerate() {
                    self.write_object(session, out, object)?;
                    out.write_line(if i + 1 == objects.len() { " ;" } else { " ," })?;
                }
                out.outdent();
            }
        }
        Ok(())
    }

    fn write_footer<W: Write>(
        &mut self,
        _session: &WriteSession,
        out: &mut IndentingWriter<W>,
        trailing_comments: &[String],
    ) -> Result<()> {
        if trailing_comments.is_empty() {
            return Ok(());
        }
        out.eol()?;
        for comment in trailing_comments {
            for line in comment.lines() {
                out.write_line(&format!("# {line}"))?;
            }
        }
        Ok(())
    }

    fn write_iri<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        iri: &Iri,
    ) -> Result<()> {
        out.write_str(&iri_text(session, iri.as_str()))?;
        Ok(())
    }

    fn write_blank_node<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        id: &BlankId,
    ) -> Result<()> {
        match session.inline_form(id)? {
            None => {
                let label = session.blank_label(id)?;
                out.write_str(&format!("_:{label}"))?;
            }
            Some(InlineForm::Collection(members)) => {
                out.write_line("(")?;
                out.indent();
                for member in &members {
                    self.write_object(session, out, member)?;
                    out.eol()?;
                }
                out.outdent();
                out.write_str(")")?;
            }
            Some(InlineForm::Node) => {
                let subject = Term::Blank(id.clone());
                if !session.has_predicates(&subject) {
                    out.write_str("[]")?;
                    return Ok(());
                }
                out.write_line("[")?;
                out.indent();
                self.write_predicates(session, out, &subject)?;
                out.outdent();
                out.write_str("]")?;
            }
        }
        Ok(())
    }

    fn write_literal<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        literal: &Literal,
    ) -> Result<()> {
        let mut text = turtle_string(literal.lexical());
        if let Some(lang) = literal.language() {
            text.push('@');
            text.push_str(lang);
        } else if let Some(datatype) = session.rendered_datatype(literal) {
            text.push_str("^^");
            text.push_str(&iri_text(session, datatype.as_str()));
        }
        out.write_str(&text)?;
        Ok(())
    }
}
