//! JSON-LD 1.1 adapter.
//!
//! Produces a top-level array of node objects. Each node object is
//! self-contained: it carries its own `@context` naming exactly the
//! prefixes it uses, so moving or deleting a node never invalidates
//! another one.

use std::collections::BTreeSet;
use std::io::Write;

use crate::error::Result;
use crate::indent::IndentingWriter;
use crate::model::{BlankId, Iri, Literal, Term};
use crate::namespace::{NameSyntax, ShortIri};
use crate::text::json_string;
use crate::vocab::RDF_TYPE;
use crate::writer::{FormatAdapter, InlineForm, WriteSession};

/// Renders the sorted graph as JSON-LD.
#[derive(Debug, Default)]
pub struct JsonLdAdapter {
    // one entry per open object or array: true until its first member
    frames: Vec<bool>,
    used: BTreeSet<String>,
}

impl JsonLdAdapter {
    /// Creates the adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn open<W: Write>(&mut self, out: &mut IndentingWriter<W>, bracket: &str) -> Result<()> {
        out.write_str(bracket)?;
        out.indent();
        self.frames.push(true);
        Ok(())
    }

    fn member<W: Write>(&mut self, out: &mut IndentingWriter<W>) -> Result<()> {
        if let Some(first) = self.frames.last_mut() {
            if !*first {
                out.write_str(",")?;
            }
            *first = false;
        }
        out.eol()?;
        Ok(())
    }

    fn close<W: Write>(&mut self, out: &mut IndentingWriter<W>, bracket: &str) -> Result<()> {
        let empty = self.frames.pop().unwrap_or(true);
        out.outdent();
        if !empty {
            out.eol()?;
        }
        out.write_str(bracket)?;
        Ok(())
    }

    fn key<W: Write>(&mut self, out: &mut IndentingWriter<W>, key: &str) -> Result<()> {
        self.member(out)?;
        out.write_str(&format!("{} : ", json_string(key)))?;
        Ok(())
    }

    /// An IRI as a compact IRI, a base-relative reference or in full.
    fn reference(&mut self, session: &WriteSession, iri: &str) -> String {
        match session.resolver().shorten(iri, NameSyntax::JsonLd) {
            ShortIri::QName(qname) if !qname.prefix.is_empty() => {
                self.used.insert(qname.prefix.clone());
                qname.to_string()
            }
            ShortIri::Relative(rel) => rel,
            _ => iri.to_owned(),
        }
    }

    /// A predicate key. Relative keys would be dropped by JSON-LD
    /// processors, so only compact or absolute forms are used.
    fn property_key(&mut self, session: &WriteSession, iri: &str) -> String {
        match session.resolver().qname(iri, NameSyntax::JsonLd) {
            Some(qname) if !qname.prefix.is_empty() => {
                self.used.insert(qname.prefix.clone());
                qname.to_string()
            }
            _ => iri.to_owned(),
        }
    }

    fn write_values<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        values: &[Term],
        write_one: fn(&mut Self, &WriteSession, &mut IndentingWriter<W>, &Term) -> Result<()>,
    ) -> Result<()> {
        if let [single] = values {
            return write_one(self, session, out, single);
        }
        self.open(out, "[")?;
        for value in values {
            self.member(out)?;
            write_one(self, session, out, value)?;
        }
        self.close(out, "]")
    }

    fn write_type_value<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        value: &Term,
    ) -> Result<()> {
        let text = self.reference(session, value.value_str());
        out.write_str(&json_string(&text))?;
        Ok(())
    }

    fn write_context<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
    ) -> Result<()> {
        let used = std::mem::take(&mut self.used);
        self.key(out, "@context")?;
        self.open(out, "{")?;
        if let Some(base) = session.options().base_iri.as_deref() {
            self.key(out, "@base")?;
            out.write_str(&json_string(base))?;
        }
        for prefix in &used {
            if let Some(namespace) = session.namespaces().get(prefix) {
                self.key(out, prefix)?;
                out.write_str(&json_string(namespace))?;
            }
        }
        self.close(out, "}")
    }

    fn write_node_body<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        node: &Term,
    ) -> Result<()> {
        self.open(out, "{")?;
        self.write_predicates(session, out, node)?;
        self.close(out, "}")
    }
}

impl FormatAdapter for JsonLdAdapter {
    fn write_header<W: Write>(
        &mut self,
        _session: &WriteSession,
        out: &mut IndentingWriter<W>,
        _imports: &[&Term],
        leading_comments: &[String],
    ) -> Result<()> {
        if !leading_comments.is_empty() {
            tracing::warn!(
                count = leading_comments.len(),
                "JSON-LD cannot carry comments, leading comments ignored"
            );
        }
        self.frames.clear();
        self.open(out, "[")
    }

    fn write_subject<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        subject: &Term,
    ) -> Result<()> {
        self.member(out)?;
        self.used.clear();
        self.open(out, "{")?;
        self.key(out, "@id")?;
        let id = match subject {
            Term::Blank(id) => format!("_:{}", session.blank_label(id)?),
            other => self.reference(session, other.value_str()),
        };
        out.write_str(&json_string(&id))?;
        self.write_predicates(session, out, subject)?;
        self.write_context(session, out)?;
        self.close(out, "}")
    }

    fn write_subject_separator<W: Write>(
        &mut self,
        _session: &WriteSession,
        _out: &mut IndentingWriter<W>,
    ) -> Result<()> {
        Ok(())
    }

    fn write_predicate_and_objects<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        predicate: &Iri,
        objects: &[Term],
    ) -> Result<()> {
        if predicate.as_str() == RDF_TYPE && objects.iter().all(|o| o.as_iri().is_some()) {
            self.key(out, "@type")?;
            return self.write_values(session, out, objects, Self::write_type_value);
        }
        let key = self.property_key(session, predicate.as_str());
        self.key(out, &key)?;
        self.write_values(session, out, objects, Self::write_object)
    }

    fn write_footer<W: Write>(
        &mut self,
        _session: &WriteSession,
        out: &mut IndentingWriter<W>,
        trailing_comments: &[String],
    ) -> Result<()> {
        if !trailing_comments.is_empty() {
            tracing::warn!(
                count = trailing_comments.len(),
                "JSON-LD cannot carry comments, trailing comments ignored"
            );
        }
        self.close(out, "]")?;
        out.eol()?;
        Ok(())
    }

    fn write_iri<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        iri: &Iri,
    ) -> Result<()> {
        let text = self.reference(session, iri.as_str());
        out.write_str(&format!("{{ \"@id\" : {} }}", json_string(&text)))?;
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
                let label = format!("_:{}", session.blank_label(id)?);
                out.write_str(&format!("{{ \"@id\" : {} }}", json_string(&label)))?;
                Ok(())
            }
            Some(InlineForm::Collection(members)) => {
                self.open(out, "{")?;
                self.key(out, "@list")?;
                self.open(out, "[")?;
                for member in &members {
                    self.member(out)?;
                    self.write_object(session, out, member)?;
                }
                self.close(out, "]")?;
                self.close(out, "}")
            }
            Some(InlineForm::Node) => self.write_node_body(session, out, &Term::Blank(id.clone())),
        }
    }

    fn write_literal<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        literal: &Literal,
    ) -> Result<()> {
        let value = json_string(literal.lexical());
        let text = if let Some(lang) = literal.language() {
            format!("{{ \"@value\" : {value}, \"@language\" : {} }}", json_string(lang))
        } else if let Some(datatype) = session.rendered_datatype(literal) {
            let datatype = self.reference(session, datatype.as_str());
            format!("{{ \"@value\" : {value}, \"@type\" : {} }}", json_string(&datatype))
        } else {
            value
        };
        out.write_str(&text)?;
        Ok(())
    }
}
