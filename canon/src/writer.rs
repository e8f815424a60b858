//! The sort-then-emit writer shared by every output format.
//!
//! [`SortedRdfWriter`] accepts statements in any order, and on
//! [`finish`](SortedRdfWriter::finish) sorts them, labels blank nodes,
//! completes the namespace table and drives a [`FormatAdapter`] through the
//! subject blocks:
//!
//! 1. header (imports, leading comments);
//! 2. ontology subjects;
//! 3. other named subjects;
//! 4. blank-node subjects that are not rendered inline;
//! 5. footer (trailing comments);
//! 6. flush.

use std::io::Write;

use crate::error::{FormatError, Result};
use crate::graph::{FinishedGraph, UnsortedGraph};
use crate::indent::IndentingWriter;
use crate::model::{BlankId, Document, Iri, Literal, Statement, Term};
use crate::namespace::{IriResolver, NamespaceTable};
use crate::options::{StringDataTypeOption, TargetFormat, WriterOptions};
use crate::serializer::{jsonld::JsonLdAdapter, rdfxml::RdfXmlAdapter, turtle::TurtleAdapter};
use crate::vocab::{OWL_NAMED_INDIVIDUAL, RDF_TYPE, XSD_STRING};

/// Format-specific rendering driven by [`SortedRdfWriter`].
///
/// Adapters write through an [`IndentingWriter`] and read everything else
/// (options, labels, the sorted graph, the IRI resolver) from the
/// [`WriteSession`].
pub trait FormatAdapter {
    /// Adjusts the declared namespaces before default and generated
    /// prefixes are added. Does nothing unless a format overrides it.
    fn adjust_namespaces(&self, _options: &WriterOptions, _namespaces: &mut NamespaceTable) {}

    /// Writes everything before the first subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    fn write_header<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        imports: &[&Term],
        leading_comments: &[String],
    ) -> Result<()>;

    /// Writes one subject block: the subject term and all its predicates.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails or a term cannot be expressed.
    fn write_subject<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        subject: &Term,
    ) -> Result<()>;

    /// Writes whatever separates two subject blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    fn write_subject_separator<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
    ) -> Result<()>;

    /// Writes one predicate with its (canonically ordered) objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails or a term cannot be expressed.
    fn write_predicate_and_objects<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        predicate: &Iri,
        objects: &[Term],
    ) -> Result<()>;

    /// Writes everything after the last subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    fn write_footer<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        trailing_comments: &[String],
    ) -> Result<()>;

    /// Writes an IRI in object position.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    fn write_iri<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        iri: &Iri,
    ) -> Result<()>;

    /// Writes a blank node in object position, inline or by label.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails or the node has no label.
    fn write_blank_node<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        id: &BlankId,
    ) -> Result<()>;

    /// Writes a literal in object position.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    fn write_literal<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        literal: &Literal,
    ) -> Result<()>;

    /// Dispatches an object to the matching term writer.
    ///
    /// # Errors
    ///
    /// Propagates the term writer's error.
    fn write_object<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        object: &Term,
    ) -> Result<()> {
        match object {
            Term::Iri(iri) => self.write_iri(session, out, iri),
            Term::Blank(id) => self.write_blank_node(session, out, id),
            Term::Literal(literal) => self.write_literal(session, out, literal),
        }
    }

    /// Writes every predicate of `subject` in rendering order.
    ///
    /// # Errors
    ///
    /// Propagates [`write_predicate_and_objects`](Self::write_predicate_and_objects) errors.
    fn write_predicates<W: Write>(
        &mut self,
        session: &WriteSession,
        out: &mut IndentingWriter<W>,
        subject: &Term,
    ) -> Result<()> {
        for (predicate, objects) in session.graph().ordered_predicates(subject) {
            self.write_predicate_and_objects(session, out, predicate, objects)?;
        }
        Ok(())
    }
}

/// How an inlined blank node is rendered at its point of use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineForm {
    /// An RDF collection, with its members in list order.
    Collection(Vec<Term>),
    /// A nested block of the node's own predicates.
    Node,
}

/// State owned by one write: options, the finished graph and the resolved
/// namespaces. Never shared between writes.
#[derive(Debug)]
pub struct WriteSession {
    options: WriterOptions,
    namespaces: NamespaceTable,
    resolver: IriResolver,
    graph: FinishedGraph,
}

impl WriteSession {
    /// Finalizes an accumulated graph: sorts it, labels blank nodes, adds
    /// default and generated prefixes.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::SortInvariant`] if sorting changed the triple count.
    pub fn prepare(
        options: WriterOptions,
        graph: UnsortedGraph,
        mut namespaces: NamespaceTable,
    ) -> Result<Self> {
        let graph = FinishedGraph::build(graph, options.inline_blank_nodes)?;
        namespaces.add_defaults();
        namespaces.add_predicate_namespaces(graph.unsorted().predicates());
        let resolver = IriResolver::new(
            &namespaces,
            options.base_iri.as_deref(),
            options.short_iri_preference,
        );
        Ok(Self {
            options,
            namespaces,
            resolver,
            graph,
        })
    }

    /// The writer options.
    #[must_use]
    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// The completed namespace table.
    #[must_use]
    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    /// The IRI resolver for this write.
    #[must_use]
    pub fn resolver(&self) -> &IriResolver {
        &self.resolver
    }

    /// The sorted graph and its indexes.
    #[must_use]
    pub fn graph(&self) -> &FinishedGraph {
        &self.graph
    }

    /// The canonical label of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::MalformedCollection`] if the node was never
    /// seen by the accumulator, which only happens for nodes reached
    /// through a broken collection walk.
    pub fn blank_label(&self, id: &BlankId) -> Result<&str> {
        self.graph
            .labels()
            .get(id)
            .ok_or_else(|| FormatError::MalformedCollection(id.to_string()))
    }

    /// Whether `id` is rendered inline, and how.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::MalformedCollection`] if a node detected as a
    /// collection cannot be walked.
    pub fn inline_form(&self, id: &BlankId) -> Result<Option<InlineForm>> {
        if !self.graph.is_inlined(id) {
            return Ok(None);
        }
        let ctx = self.graph.context();
        if ctx.is_collection(id) {
            let members = ctx.collection_members(id).ok_or_else(|| {
                tracing::error!(node = %id, "collection detected but not walkable");
                FormatError::MalformedCollection(id.to_string())
            })?;
            return Ok(Some(InlineForm::Collection(members)));
        }
        Ok(Some(InlineForm::Node))
    }

    /// Returns true if `subject` has statements of its own.
    #[must_use]
    pub fn has_predicates(&self, subject: &Term) -> bool {
        self.graph.sorted().get(subject).is_some_and(|p| !p.is_empty())
    }

    /// Returns true if at least one subject block will be written.
    #[must_use]
    pub fn has_subjects(&self) -> bool {
        !self.graph.emission_order().is_empty()
    }

    /// The datatype to write for `literal`, if any. Language-tagged
    /// literals never carry one; `xsd:string` is written only when string
    /// typing is explicit.
    #[must_use]
    pub fn rendered_datatype(&self, literal: &Literal) -> Option<Iri> {
        if literal.language().is_some() {
            return None;
        }
        let explicit = self.options.string_data_type == StringDataTypeOption::Explicit;
        match literal.datatype() {
            None if explicit => Some(Iri::new(XSD_STRING)),
            None => None,
            Some(dt) if dt.as_str() == XSD_STRING && !explicit => None,
            Some(dt) => Some(dt.clone()),
        }
    }
}

enum WriterState {
    Ready,
    Accumulating {
        graph: UnsortedGraph,
        namespaces: NamespaceTable,
    },
    Finished,
}

impl WriterState {
    fn name(&self) -> &'static str {
        match self {
            WriterState::Ready => "not started",
            WriterState::Accumulating { .. } => "accumulating",
            WriterState::Finished => "finished",
        }
    }
}

/// Accumulates statements and writes them sorted through a format adapter.
pub struct SortedRdfWriter<W: Write, A: FormatAdapter> {
    out: IndentingWriter<W>,
    adapter: A,
    options: WriterOptions,
    state: WriterState,
}

impl<W: Write, A: FormatAdapter> SortedRdfWriter<W, A> {
    /// Creates a writer over `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Config`] if `options` fail validation.
    pub fn new(sink: W, adapter: A, options: WriterOptions) -> Result<Self> {
        options.validate()?;
        let out = IndentingWriter::new(sink, options.indent.clone(), options.line_end.clone());
        Ok(Self {
            out,
            adapter,
            options,
            state: WriterState::Ready,
        })
    }

    /// Starts a new graph, discarding anything accumulated before.
    pub fn start(&mut self) {
        self.state = WriterState::Accumulating {
            graph: UnsortedGraph::new(),
            namespaces: NamespaceTable::new(),
        };
    }

    /// Declares a namespace prefix.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidState`] unless the writer was started.
    pub fn add_namespace(&mut self, prefix: &str, namespace: &str) -> Result<()> {
        match &mut self.state {
            WriterState::Accumulating { namespaces, .. } => {
                namespaces.insert(prefix, namespace);
                Ok(())
            }
            other => Err(FormatError::InvalidState {
                state: other.name(),
                operation: "add a namespace",
            }),
        }
    }

    /// Adds a statement.
    ///
    /// The override language is applied here, before the statement reaches
    /// the accumulator, so that sorting and de-duplication see the literal
    /// as it will be written.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidState`] unless the writer was started.
    pub fn add_statement(&mut self, statement: Statement) -> Result<()> {
        let suppress = self.options.suppress_named_individuals;
        let language = self.options.override_string_language.as_deref();
        match &mut self.state {
            WriterState::Accumulating { graph, .. } => {
                if suppress && is_named_individual_typing(&statement) {
                    return Ok(());
                }
                graph.add_statement(with_string_language(statement, language)?);
                Ok(())
            }
            other => Err(FormatError::InvalidState {
                state: other.name(),
                operation: "add a statement",
            }),
        }
    }

    /// Sorts the accumulated graph and writes it out.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidState`] unless the writer is
    /// accumulating, and propagates sorting, rendering and I/O errors. After
    /// an error the output is incomplete and should be discarded.
    pub fn finish(&mut self) -> Result<()> {
        let (graph, mut namespaces) = match std::mem::replace(&mut self.state, WriterState::Finished) {
            WriterState::Accumulating { graph, namespaces } => (graph, namespaces),
            other => {
                let state = other.name();
                self.state = other;
                return Err(FormatError::InvalidState {
                    state,
                    operation: "finish",
                });
            }
        };
        self.adapter.adjust_namespaces(&self.options, &mut namespaces);
        let session = WriteSession::prepare(self.options.clone(), graph, namespaces)?;
        emit(&mut self.adapter, &session, &mut self.out)
    }

    /// Returns the sink.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

fn emit<W: Write, A: FormatAdapter>(
    adapter: &mut A,
    session: &WriteSession,
    out: &mut IndentingWriter<W>,
) -> Result<()> {
    let imports = session.graph().imports();
    adapter.write_header(session, out, &imports, &session.options().leading_comments)?;

    let subjects = session.graph().emission_order();
    for (i, subject) in subjects.iter().enumerate() {
        adapter.write_subject(session, out, subject)?;
        if i + 1 < subjects.len() {
            adapter.write_subject_separator(session, out)?;
        }
    }

    adapter.write_footer(session, out, &session.options().trailing_comments)?;
    out.flush()?;
    tracing::debug!(subjects = subjects.len(), "graph written");
    Ok(())
}

/// Tags a plain string object with `language`.
fn with_string_language(statement: Statement, language: Option<&str>) -> Result<Statement> {
    let Some(language) = language else {
        return Ok(statement);
    };
    if !statement.object().as_literal().is_some_and(Literal::is_plain_string) {
        return Ok(statement);
    }
    let (subject, predicate, object) = statement.into_parts();
    let object = Term::Literal(Literal::lang(object.value_str(), language));
    Statement::new(subject, predicate, object)
}

fn is_named_individual_typing(statement: &Statement) -> bool {
    statement.predicate().as_str() == RDF_TYPE
        && statement
            .object()
            .as_iri()
            .is_some_and(|o| o.as_str() == OWL_NAMED_INDIVIDUAL)
}

/// Writes `document` to `sink` in `format`.
///
/// # Errors
///
/// Returns configuration, sorting, rendering and I/O errors.
pub fn write_document<W: Write>(
    sink: W,
    format: TargetFormat,
    options: &WriterOptions,
    document: &Document,
) -> Result<W> {
    let options = options.clone();
    match format {
        TargetFormat::Turtle => run(SortedRdfWriter::new(sink, TurtleAdapter::new(), options)?, document),
        TargetFormat::RdfXml => run(SortedRdfWriter::new(sink, RdfXmlAdapter::new(), options)?, document),
        TargetFormat::JsonLd => run(SortedRdfWriter::new(sink, JsonLdAdapter::new(), options)?, document),
    }
}

/// Writes `document` in `format` and returns the output as a string.
///
/// # Errors
///
/// Returns configuration, sorting and rendering errors.
pub fn write_to_string(
    format: TargetFormat,
    options: &WriterOptions,
    document: &Document,
) -> Result<String> {
    let bytes = write_document(Vec::new(), format, options, document)?;
    String::from_utf8(bytes)
        .map_err(|e| FormatError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

fn run<W: Write, A: FormatAdapter>(
    mut writer: SortedRdfWriter<W, A>,
    document: &Document,
) -> Result<W> {
    writer.start();
    for (prefix, namespace) in &document.prefixes {
        writer.add_namespace(prefix, namespace)?;
    }
    for statement in &document.statements {
        writer.add_statement(statement.clone())?;
    }
    writer.finish()?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{OWL_NAMED_INDIVIDUAL, RDFS_LABEL};

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://example.com/{local}"))
    }

    #[test]
    fn lifecycle_is_enforced() {
        let mut writer = SortedRdfWriter::new(Vec::new(), TurtleAdapter::new(), WriterOptions::default())
            .expect("valid options");
        let statement = Statement::new(ex("a"), Iri::new(RDFS_LABEL), Term::Literal(Literal::simple("A")))
            .expect("valid statement");
        assert!(matches!(
            writer.add_statement(statement.clone()),
            Err(FormatError::InvalidState { .. })
        ));
        assert!(writer.finish().is_err());

        writer.start();
        writer.add_statement(statement.clone()).expect("accumulating");
        writer.finish().expect("writes");
        assert!(matches!(
            writer.add_statement(statement),
            Err(FormatError::InvalidState { state: "finished", .. })
        ));
        assert!(writer.finish().is_err());
    }

    #[test]
    fn invalid_options_are_rejected_before_writing() {
        let options = WriterOptions {
            line_end: "x".to_owned(),
            ..WriterOptions::default()
        };
        assert!(matches!(
            SortedRdfWriter::new(Vec::new(), TurtleAdapter::new(), options),
            Err(FormatError::Config(_))
        ));
    }

    #[test]
    fn named_individual_typing_can_be_suppressed() {
        let mut document = Document::new();
        document
            .add(ex("i"), Iri::new(RDF_TYPE), Term::iri(OWL_NAMED_INDIVIDUAL))
            .expect("valid");
        document
            .add(ex("i"), Iri::new(RDF_TYPE), ex("Thing"))
            .expect("valid");
        let options = WriterOptions {
            suppress_named_individuals: true,
            ..WriterOptions::default()
        };
        let out = write_to_string(TargetFormat::Turtle, &options, &document).expect("writes");
        assert!(!out.contains("NamedIndividual"));
        assert!(out.contains("a <http://example.com/Thing>"));
    }

    #[test]
    fn explicit_string_typing() {
        let literal = Literal::simple("A");
        let implicit =
            WriteSession::prepare(WriterOptions::default(), UnsortedGraph::new(), NamespaceTable::new())
                .expect("prepares");
        assert_eq!(implicit.rendered_datatype(&literal), None);

        let explicit = WriterOptions {
            string_data_type: StringDataTypeOption::Explicit,
            ..WriterOptions::default()
        };
        let session = WriteSession::prepare(explicit, UnsortedGraph::new(), NamespaceTable::new())
            .expect("prepares");
        assert_eq!(session.rendered_datatype(&literal), Some(Iri::new(XSD_STRING)));
        assert_eq!(session.rendered_datatype(&Literal::lang("A", "en")), None);
    }

    fn labels(document: &Document, options: &WriterOptions) -> String {
        write_to_string(TargetFormat::Turtle, options, document).expect("writes")
    }

    #[test]
    fn override_language_is_applied_before_sorting() {
        let options = WriterOptions {
            override_string_language: Some("en".to_owned()),
            ..WriterOptions::default()
        };
        let mut document = Document::new();
        document
            .add(ex("s"), Iri::new(RDFS_LABEL), Term::Literal(Literal::lang("a", "fr")))
            .expect("valid");
        document
            .add(ex("s"), Iri::new(RDFS_LABEL), Term::Literal(Literal::simple("a")))
            .expect("valid");
        let first = labels(&document, &options);
        assert!(first.contains("\t\t\"a\"@en ,\n\t\t\"a\"@fr ;\n"), "{first}");

        // the already-tagged output is a fixed point
        let mut rewritten = Document::new();
        rewritten
            .add(ex("s"), Iri::new(RDFS_LABEL), Term::Literal(Literal::lang("a", "en")))
            .expect("valid");
        rewritten
            .add(ex("s"), Iri::new(RDFS_LABEL), Term::Literal(Literal::lang("a", "fr")))
            .expect("valid");
        assert_eq!(labels(&rewritten, &options), first);
    }

    #[test]
    fn override_language_merges_equal_literals() {
        let options = WriterOptions {
            override_string_language: Some("en".to_owned()),
            ..WriterOptions::default()
        };
        let mut document = Document::new();
        document
            .add(ex("s"), Iri::new(RDFS_LABEL), Term::Literal(Literal::lang("a", "en")))
            .expect("valid");
        document
            .add(ex("s"), Iri::new(RDFS_LABEL), Term::Literal(Literal::simple("a")))
            .expect("valid");
        let out = labels(&document, &options);
        assert_eq!(out.matches("\"a\"@en").count(), 1, "{out}");
        let typed = Literal::typed("1", Iri::new("http://www.w3.org/2001/XMLSchema#integer"));
        let mut document = Document::new();
        document
            .add(ex("s"), Iri::new(RDFS_LABEL), Term::Literal(typed))
            .expect("valid");
        assert!(labels(&document, &options).contains("rdfs:label \"1\"^^xsd:integer ;"));
    }
}
