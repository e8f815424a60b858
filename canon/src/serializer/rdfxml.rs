//! RDF/XML adapter.
//!
//! Every object gets its own property element, so a changed value shows up
//! as a single changed line. Subjects with a single expressible `rdf:type`
//! become typed node elements.

use std::io::Write;

use crate::error::{FormatError, Result};
use crate::indent::IndentingWriter;
use crate::model::{BlankId, Iri, Literal, Term};
use crate::namespace::{NameSyntax, NamespaceTable, QName};
use crate::options::{ShortIriPreference, WriterOptions};
use crate::text::{xml_attribute, xml_comment, xml_text};
use crate::vocab::{RDF_NS, RDF_TYPE};
use crate::writer::{FormatAdapter, InlineForm, WriteSession};

/// Renders the sorted graph as RDF/XML.
#[derive(Debug)]
pub struct RdfXmlAdapter {
    rdf: String,
    property: String,
}

impl Default for RdfXmlAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RdfXmlAdapter {
    /// Creates the adapter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rdf: "rdf".to_owned(),
            property: String::new(),
        }
    }

    fn rdf_name(&self, local: &str) -> String {
        format!("{}:{local}", self.rdf)
    }

    fn subject_attribute(&self, session: &WriteSession, subject: &Term) -> Result<String> {
        Ok(match subject {
            Term::Blank(id) => format!(
                "{}=\"{}\"",
                self.rdf_name("nodeID"),
                session.blank_label(id)?
            ),
            other => format!(
                "{}=\"{}\"",
                self.rdf_name("about"),
                resource_value(session, other.value_str())
            ),
        })
    }

    /// The element name for a subject: its single `rdf:type`, when that
    /// type has an XML name, or `rdf:Description`.
    fn node_element_name(&self, session: &WriteSession, subject: &Term) -> (String, bool) {
        let types: Vec<&Term> = session
            .graph()
            .ordered_predicates(subject)
            .into_iter()
            .filter(|(p, _)| p.as_str() == RDF_TYPE)
            .flat_map(|(_, objects)| objects.iter())
            .collect();
        if let [Term::Iri(ty)] = types.as_slice() {
            if let Some(qname) = session.resolver().qname(ty.as_str(), NameSyntax::Xml) {
                return (element_name(&qname), true);
            }
        }
        (self.rdf_name("Description"), false)
    }

    fn write_properties<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        subject: &Term,
        skip_type: bool,
    ) -> Result<()> {
        for (predicate, objects) in session.graph().ordered_predicates(subject) {
            if skip_type && predicate.as_str() == RDF_TYPE {
                continue;
            }
            self.write_predicate_and_objects(session, out, predicate, objects)?;
        }
        Ok(())
    }

    /// Writes `subject` as a node element, with its properties nested.
    fn write_node_element<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        subject: &Term,
        attribute: Option<String>,
    ) -> Result<()> {
        let (name, typed) = self.node_element_name(session, subject);
        let open = match attribute {
            Some(attribute) => format!("<{name} {attribute}"),
            None => format!("<{name}"),
        };
        let property_count = session
            .graph()
            .ordered_predicates(subject)
            .iter()
            .filter(|(p, _)| !(typed && p.as_str() == RDF_TYPE))
            .count();
        if property_count == 0 {
            out.write_line(&format!("{open}/>"))?;
            return Ok(());
        }
        out.write_line(&format!("{open}>"))?;
        out.indent();
        self.write_properties(session, out, subject, typed)?;
        out.outdent();
        out.write_line(&format!("</{name}>"))?;
        Ok(())
    }

    fn write_collection_member<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        member: &Term,
    ) -> Result<()> {
        match member {
            Term::Blank(id) if session.graph().is_inlined(id) => {
                self.write_node_element(session, out, member, None)
            }
            other => {
                let attribute = self.subject_attribute(session, other)?;
                out.write_line(&format!("<{} {attribute}/>", self.rdf_name("Description")))?;
                Ok(())
            }
        }
    }
}

fn element_name(qname: &QName) -> String {
    if qname.prefix.is_empty() {
        qname.local.clone()
    } else {
        format!("{}:{}", qname.prefix, qname.local)
    }
}

/// The attribute value naming `iri`: an entity reference when the DTD
/// subset is on, a relative reference against the base, or the IRI itself.
fn resource_value(session: &WriteSession, iri: &str) -> String {
    let resolver = session.resolver();
    let entity = session
        .options()
        .use_dtd_subset
        .then(|| resolver.qname(iri, NameSyntax::Xml))
        .flatten()
        .filter(|q| !q.prefix.is_empty())
        .map(|q| format!("&{};{}", q.prefix, xml_attribute(&q.local)));
    let relative = resolver.relative(iri).map(|rel| xml_attribute(&rel));
    let short = match session.options().short_iri_preference {
        ShortIriPreference::Prefix => entity.or(relative),
        ShortIriPreference::BaseIri => relative.or(entity),
    };
    short.unwrap_or_else(|| xml_attribute(iri))
}

impl FormatAdapter for RdfXmlAdapter {
    /// Without a default `xmlns` declaration, the empty prefix's namespace
    /// gets a generated prefix like any other unbound predicate namespace.
    fn adjust_namespaces(&self, options: &WriterOptions, namespaces: &mut NamespaceTable) {
        if options.omit_xmlns_namespace {
            if let Some(namespace) = namespaces.remove("") {
                tracing::debug!(namespace, "omitting the default xmlns namespace");
            }
        }
    }

    fn write_header<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        _imports: &[&Term],
        leading_comments: &[String],
    ) -> Result<()> {
        let namespaces = session.namespaces();
        let bound_rdf = namespaces
            .iter()
            .filter(|(prefix, namespace)| !prefix.is_empty() && *namespace == RDF_NS)
            .map(|(prefix, _)| prefix.to_owned())
            .last();
        let mut declarations: Vec<String> = Vec::new();
        self.rdf = match bound_rdf {
            Some(prefix) => prefix,
            None => {
                let mut candidate = "rdf".to_owned();
                let mut n = 1;
                while namespaces.get(&candidate).is_some() {
                    candidate = format!("rdf{n}");
                    n += 1;
                }
                declarations.push(format!("xmlns:{candidate}=\"{RDF_NS}\""));
                candidate
            }
        };

        out.write_line("<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        if session.options().use_dtd_subset {
            out.write_line(&format!("<!DOCTYPE {} [", self.rdf_name("RDF")))?;
            out.indent();
            for (prefix, namespace) in namespaces.iter().filter(|(p, _)| !p.is_empty()) {
                out.write_line(&format!(
                    "<!ENTITY {prefix} \"{}\">",
                    xml_attribute(namespace)
                ))?;
            }
            out.outdent();
            out.write_line("]>")?;
        }
        for comment in leading_comments {
            out.write_line(&format!("<!-- {} -->", xml_comment(comment)))?;
        }

        for (prefix, namespace) in namespaces.iter() {
            let value = xml_attribute(namespace);
            if prefix.is_empty() {
                declarations.push(format!("xmlns=\"{value}\""));
            } else {
                declarations.push(format!("xmlns:{prefix}=\"{value}\""));
            }
        }
        if let Some(base) = session.options().base_iri.as_deref() {
            declarations.push(format!("xml:base=\"{}\"", xml_attribute(base)));
        }

        out.write_line(&format!("<{}", self.rdf_name("RDF")))?;
        out.indent();
        for (i, declaration) in declarations.iter().enumerate() {
            if i + 1 == declarations.len() {
                out.write_line(&format!("{declaration}>"))?;
            } else {
                out.write_line(declaration)?;
            }
        }
        if declarations.is_empty() {
            out.write_line(">")?;
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
        let attribute = self.subject_attribute(session, subject)?;
        self.write_node_element(session, out, subject, Some(attribute))
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
        let Some(qname) = session.resolver().qname(predicate.as_str(), NameSyntax::Xml) else {
            tracing::error!(%predicate, "predicate has no XML qualified name");
            return Err(FormatError::UnrepresentablePredicate(predicate.as_str().to_owned()));
        };
        let name = element_name(&qname);
        for object in objects {
            self.property.clone_from(&name);
            self.write_object(session, out, object)?;
        }
        Ok(())
    }

    fn write_footer<W: Write>(
        &mut self,
        _session: &WriteSession,
        out: &mut IndentingWriter<W>,
        trailing_comments: &[String],
    ) -> Result<()> {
        out.outdent();
        out.write_line(&format!("</{}>", self.rdf_name("RDF")))?;
        for comment in trailing_comments {
            out.write_line(&format!("<!-- {} -->", xml_comment(comment)))?;
        }
        Ok(())
    }

    fn write_iri<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        iri: &Iri,
    ) -> Result<()> {
        out.write_line(&format!(
            "<{} {}=\"{}\"/>",
            self.property,
            self.rdf_name("resource"),
            resource_value(session, iri.as_str())
        ))?;
        Ok(())
    }

    fn write_blank_node<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        id: &BlankId,
    ) -> Result<()> {
        let property = self.property.clone();
        let node = Term::Blank(id.clone());
        match session.inline_form(id)? {
            None => {
                out.write_line(&format!(
                    "<{property} {}=\"{}\"/>",
                    self.rdf_name("nodeID"),
                    session.blank_label(id)?
                ))?;
            }
            Some(InlineForm::Collection(members))
                if members.iter().all(|m| m.as_literal().is_none()) =>
            {
                out.write_line(&format!(
                    "<{property} {}=\"Collection\">",
                    self.rdf_name("parseType")
                ))?;
                out.indent();
                for member in &members {
                    self.write_collection_member(session, out, member)?;
                }
                out.outdent();
                out.write_line(&format!("</{property}>"))?;
            }
            Some(_) if !session.has_predicates(&node) => {
                out.write_line(&format!(
                    "<{property} {}=\"Resource\"/>",
                    self.rdf_name("parseType")
                ))?;
            }
            Some(_) => {
                out.write_line(&format!(
                    "<{property} {}=\"Resource\">",
                    self.rdf_name("parseType")
                ))?;
                out.indent();
                self.write_properties(session, out, &node, false)?;
                out.outdent();
                out.write_line(&format!("</{property}>"))?;
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
        let mut open = format!("<{}", self.property);
        if let Some(lang) = literal.language() {
            open.push_str(&format!(" xml:lang=\"{}\"", xml_attribute(lang)));
        } else if let Some(datatype) = session.rendered_datatype(literal) {
            open.push_str(&format!(
                " {}=\"{}\"",
                self.rdf_name("datatype"),
                resource_value(session, datatype.as_str())
            ));
        }
        out.write_line(&format!(
            "{open}>{}</{}>",
            xml_text(literal.lexical()),
            self.property
        ))?;
        Ok(())
    }
}
