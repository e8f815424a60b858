//! Statement accumulation and the sorted views built from it.
//!
//! [`UnsortedGraph`] ingests statements one at a time. [`FinishedGraph::build`]
//! runs once, after the last statement, and produces the canonical
//! [`SortedGraph`], the blank-node labels and the inlining plan that the
//! writer emits from.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use crate::compare::{merge_sort_by, ComparisonContext};
use crate::error::{FormatError, Result};
use crate::model::{BlankId, Iri, Statement, Term};
use crate::vocab::{FIRST_PREDICATES, OWL_IMPORTS, OWL_ONTOLOGY, RDF_TYPE};

/// Predicate → object set of one subject.
pub type PredicateObjectMap = BTreeMap<Iri, BTreeSet<Term>>;

/// Subject → predicate → object set, as accumulated.
///
/// The `BTree` containers only give iteration a reproducible order; the
/// canonical order is applied by [`FinishedGraph::build`].
#[derive(Debug, Default, Clone)]
pub struct UnsortedGraph {
    subjects: BTreeMap<Term, PredicateObjectMap>,
    ontologies: BTreeSet<Term>,
    blank_nodes: BTreeSet<BlankId>,
    object_references: BTreeMap<BlankId, usize>,
    referrers: BTreeMap<BlankId, Term>,
    predicates: BTreeSet<Iri>,
    triple_count: usize,
}

impl UnsortedGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a statement. Returns false if the triple was already present.
    pub fn add_statement(&mut self, statement: Statement) -> bool {
        let (subject, predicate, object) = statement.into_parts();

        let is_new = self
            .subjects
            .entry(subject.clone())
            .or_default()
            .entry(predicate.clone())
            .or_default()
            .insert(object.clone());
        if !is_new {
            return false;
        }
        self.triple_count += 1;

        if predicate.as_str() == RDF_TYPE && object.as_iri().is_some_and(|o| o.as_str() == OWL_ONTOLOGY) {
            self.ontologies.insert(subject.clone());
        }
        if let Term::Blank(id) = &subject {
            self.blank_nodes.insert(id.clone());
        }
        if let Term::Blank(id) = &object {
            self.blank_nodes.insert(id.clone());
            *self.object_references.entry(id.clone()).or_default() += 1;
            self.referrers.entry(id.clone()).or_insert(subject);
        }
        self.predicates.insert(predicate);
        true
    }

    /// The predicate/object map of `subject`.
    #[must_use]
    pub fn predicate_objects(&self, subject: &Term) -> Option<&PredicateObjectMap> {
        self.subjects.get(subject)
    }

    /// The predicate/object map of a blank node subject.
    #[must_use]
    pub fn blank_predicate_objects(&self, id: &BlankId) -> Option<&PredicateObjectMap> {
        self.subjects.get(&Term::Blank(id.clone()))
    }

    /// All subjects.
    pub fn subjects(&self) -> impl Iterator<Item = &Term> {
        self.subjects.keys()
    }

    /// Subjects typed `owl:Ontology`.
    #[must_use]
    pub fn ontologies(&self) -> &BTreeSet<Term> {
        &self.ontologies
    }

    /// Every blank node, in subject or object position.
    #[must_use]
    pub fn blank_nodes(&self) -> &BTreeSet<BlankId> {
        &self.blank_nodes
    }

    /// Every predicate IRI seen.
    #[must_use]
    pub fn predicates(&self) -> &BTreeSet<Iri> {
        &self.predicates
    }

    /// Number of distinct triples whose object is `id`.
    #[must_use]
    pub fn object_reference_count(&self, id: &BlankId) -> usize {
        self.object_references.get(id).copied().unwrap_or(0)
    }

    /// Blank nodes that appear in object position at least once.
    pub fn referenced_blank_nodes(&self) -> impl Iterator<Item = &BlankId> {
        self.object_references.keys()
    }

    /// A subject that references `id` as an object. Unique when the
    /// reference count is one.
    #[must_use]
    pub fn referrer(&self, id: &BlankId) -> Option<&Term> {
        self.referrers.get(id)
    }

    /// Total number of distinct triples.
    #[must_use]
    pub fn triple_count(&self) -> usize {
        self.triple_count
    }

    /// Returns true if no statement was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triple_count == 0
    }
}

/// A map whose entries keep the order they were sorted into.
#[derive(Debug, Clone)]
pub struct SortedMap<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K: Clone + Eq + Hash, V> SortedMap<K, V> {
    /// Sorts `entries` by key with the supplied comparator.
    pub fn from_unsorted<F>(entries: impl IntoIterator<Item = (K, V)>, mut compare: F) -> Self
    where
        F: FnMut(&K, &K) -> Ordering,
    {
        let entries = merge_sort_by(entries.into_iter().collect(), |a, b| compare(&a.0, &b.0));
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.clone(), i))
            .collect();
        Self { entries, index }
    }

    /// Looks up the value for `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Predicate → canonically ordered objects.
pub type SortedPredicateObjects = SortedMap<Iri, Vec<Term>>;

/// Subject → predicate → object list, every level in canonical order.
pub type SortedGraph = SortedMap<Term, SortedPredicateObjects>;

/// Total number of triples in a sorted graph.
#[must_use]
pub fn sorted_triple_count(graph: &SortedGraph) -> usize {
    graph
        .iter()
        .flat_map(|(_, predicates)| predicates.iter())
        .map(|(_, objects)| objects.len())
        .sum()
}

/// Canonical output labels for blank nodes.
#[derive(Debug, Clone, Default)]
pub struct BlankNodeLabels {
    labels: HashMap<BlankId, String>,
}

impl BlankNodeLabels {
    /// Labels `ordered` as `blank1`, `blank2`, … with every number padded to
    /// the digit count of the total.
    pub fn assign<'a>(ordered: impl IntoIterator<Item = &'a BlankId>) -> Self {
        let ordered: Vec<&BlankId> = ordered.into_iter().collect();
        let width = ordered.len().to_string().len();
        let labels = ordered
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), format!("blank{:0width$}", i + 1)))
            .collect();
        Self { labels }
    }

    /// The output label of `id`.
    #[must_use]
    pub fn get(&self, id: &BlankId) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// Number of labelled nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if no node was labelled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Decides which blank nodes are rendered at their point of use.
///
/// A node qualifies when exactly one triple references it and following
/// its referrers upward reaches a node that is rendered on its own. Nodes on
/// a referrer cycle are all rendered on their own and referenced by label.
#[must_use]
pub fn plan_inlining(graph: &UnsortedGraph) -> BTreeSet<BlankId> {
    let candidates: BTreeSet<&BlankId> = graph
        .referenced_blank_nodes()
        .filter(|id| graph.object_reference_count(id) == 1)
        .collect();

    // true: inlined; false: rendered on its own despite a single reference
    let mut decided: BTreeMap<&BlankId, bool> = BTreeMap::new();
    for &start in &candidates {
        if decided.contains_key(start) {
            continue;
        }
        let mut path: Vec<&BlankId> = Vec::new();
        let mut current = start;
        loop {
            path.push(current);
            let parent = match graph.referrer(current) {
                Some(Term::Blank(parent)) if candidates.contains(parent) => parent,
                _ => {
                    decided.extend(path.iter().map(|&id| (id, true)));
                    break;
                }
            };
            if decided.contains_key(parent) {
                decided.extend(path.iter().map(|&id| (id, true)));
                break;
            }
            if let Some(pos) = path.iter().position(|&id| id == parent) {
                tracing::debug!(
                    cycle_len = path.len() - pos,
                    "blank node reference cycle prevents inlining"
                );
                decided.extend(path[pos..].iter().map(|&id| (id, false)));
                decided.extend(path[..pos].iter().map(|&id| (id, true)));
                break;
            }
            current = parent;
        }
    }

    decided
        .into_iter()
        .filter_map(|(id, inline)| inline.then(|| id.clone()))
        .collect()
}

/// Everything the emission pass needs, computed once after accumulation.
#[derive(Debug)]
pub struct FinishedGraph {
    graph: UnsortedGraph,
    sorted: SortedGraph,
    labels: BlankNodeLabels,
    inlined: BTreeSet<BlankId>,
    inline_blank_nodes: bool,
}

impl FinishedGraph {
    /// Sorts `graph` canonically, labels its blank nodes and plans inlining.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::SortInvariant`] in debug builds if the sorted
    /// graph does not hold exactly the accumulated triples.
    pub fn build(graph: UnsortedGraph, inline_blank_nodes: bool) -> Result<Self> {
        let inlined = if inline_blank_nodes {
            plan_inlining(&graph)
        } else {
            BTreeSet::new()
        };

        let (sorted, labels) = {
            let ctx = ComparisonContext::new(&graph, inline_blank_nodes, &inlined);
            let subjects = graph.subjects().map(|subject| {
                let predicates = graph
                    .predicate_objects(subject)
                    .into_iter()
                    .flatten()
                    .map(|(predicate, objects)| {
                        (predicate.clone(), ctx.sort_terms(objects.iter().cloned()))
                    });
                (
                    subject.clone(),
                    SortedMap::from_unsorted(predicates, |a: &Iri, b: &Iri| a.cmp(b)),
                )
            });
            let sorted = SortedMap::from_unsorted(subjects, |a, b| ctx.compare(a, b));

            let blank_order = ctx.sort_terms(graph.blank_nodes().iter().cloned().map(Term::Blank));
            let labels = BlankNodeLabels::assign(blank_order.iter().filter_map(Term::as_blank));
            (sorted, labels)
        };

        if cfg!(debug_assertions) {
            let sorted_count = sorted_triple_count(&sorted);
            if sorted_count != graph.triple_count() {
                tracing::error!(
                    unsorted = graph.triple_count(),
                    sorted = sorted_count,
                    subjects = graph.subjects().count(),
                    "canonical sort changed the triple count"
                );
                return Err(FormatError::SortInvariant {
                    unsorted: graph.triple_count(),
                    sorted: sorted_count,
                });
            }
        }
        tracing::debug!(
            subjects = sorted.len(),
            triples = graph.triple_count(),
            blank_nodes = labels.len(),
            inlined = inlined.len(),
            "sorted graph"
        );

        Ok(Self {
            graph,
            sorted,
            labels,
            inlined,
            inline_blank_nodes,
        })
    }

    /// The accumulated graph.
    #[must_use]
    pub fn unsorted(&self) -> &UnsortedGraph {
        &self.graph
    }

    /// The canonical graph.
    #[must_use]
    pub fn sorted(&self) -> &SortedGraph {
        &self.sorted
    }

    /// Canonical blank-node labels.
    #[must_use]
    pub fn labels(&self) -> &BlankNodeLabels {
        &self.labels
    }

    /// A comparison context over the accumulated graph, for collection
    /// detection at render time.
    #[must_use]
    pub fn context(&self) -> ComparisonContext<'_> {
        ComparisonContext::new(&self.graph, self.inline_blank_nodes, &self.inlined)
    }

    /// Returns true if `id` is rendered at its point of use.
    #[must_use]
    pub fn is_inlined(&self, id: &BlankId) -> bool {
        self.inline_blank_nodes && self.inlined.contains(id)
    }

    /// Non-blank ontology subjects in canonical order.
    pub fn ontology_subjects(&self) -> impl Iterator<Item = &Term> {
        self.sorted
            .keys()
            .filter(|s| !s.is_blank() && self.graph.ontologies().contains(*s))
    }

    /// Subjects in emission order: ontologies, other named subjects, then
    /// blank nodes that are not rendered inline.
    #[must_use]
    pub fn emission_order(&self) -> Vec<&Term> {
        let ontologies = self.graph.ontologies();
        let mut order: Vec<&Term> = self.ontology_subjects().collect();
        order.extend(
            self.sorted
                .keys()
                .filter(|s| !s.is_blank() && !ontologies.contains(*s)),
        );
        order.extend(self.sorted.keys().filter(|s| match s {
            Term::Blank(id) => !self.is_inlined(id),
            _ => false,
        }));
        order
    }

    /// Objects of `owl:imports` on the ontology subjects, deduplicated, in
    /// canonical order.
    #[must_use]
    pub fn imports(&self) -> Vec<&Term> {
        let imports = Iri::new(OWL_IMPORTS);
        let mut seen = BTreeSet::new();
        self.ontology_subjects()
            .filter_map(|s| self.sorted.get(s))
            .filter_map(|predicates| predicates.get(&imports))
            .flatten()
            .filter(|o| seen.insert(*o))
            .collect()
    }

    /// The predicates of `subject` in rendering order: the priority
    /// predicates first, then the rest in canonical order.
    #[must_use]
    pub fn ordered_predicates(&self, subject: &Term) -> Vec<(&Iri, &[Term])> {
        let Some(predicates) = self.sorted.get(subject) else {
            return Vec::new();
        };
        let mut ordered: Vec<(&Iri, &[Term])> = FIRST_PREDICATES
            .iter()
            .filter_map(|first| {
                predicates
                    .iter()
                    .find(|(p, _)| p.as_str() == *first)
                    .map(|(p, objects)| (p, objects.as_slice()))
            })
            .collect();
        ordered.extend(
            predicates
                .iter()
                .filter(|(p, _)| !FIRST_PREDICATES.contains(&p.as_str()))
                .map(|(p, objects)| (p, objects.as_slice())),
        );
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Literal;
    use crate::vocab::{OWL_SAME_AS, RDFS_LABEL, RDF_FIRST, RDF_NIL, RDF_REST};

    const EX: &str = "http://example.com/";

    fn ex(local: &str) -> Term {
        Term::iri(format!("{EX}{local}"))
    }

    fn add(graph: &mut UnsortedGraph, s: Term, p: &str, o: Term) {
        graph.add_statement(Statement::new(s, Iri::new(p), o).expect("valid statement"));
    }

    #[test]
    fn duplicate_triples_collapse() {
        let mut g = UnsortedGraph::new();
        add(&mut g, ex("a"), RDFS_LABEL, Term::Literal(Literal::simple("A")));
        add(&mut g, ex("a"), RDFS_LABEL, Term::Literal(Literal::simple("A")));
        assert_eq!(g.triple_count(), 1);
    }

    #[test]
    fn tracks_ontologies_blank_nodes_and_predicates() {
        let mut g = UnsortedGraph::new();
        add(&mut g, ex("onto"), RDF_TYPE, Term::iri(OWL_ONTOLOGY));
        add(&mut g, ex("a"), "http://example.com/p", Term::blank("b"));
        add(&mut g, Term::blank("c"), "http://example.com/q", ex("a"));
        assert!(g.ontologies().contains(&ex("onto")));
        assert_eq!(g.blank_nodes().len(), 2);
        assert_eq!(g.object_reference_count(&BlankId::new("b")), 1);
        assert_eq!(g.object_reference_count(&BlankId::new("c")), 0);
        assert_eq!(g.predicates().len(), 3);
    }

    #[test]
    fn label_width_follows_blank_node_count() {
        let ids: Vec<BlankId> = (0..12).map(|i| BlankId::new(format!("n{i:02}"))).collect();
        let labels = BlankNodeLabels::assign(ids.iter());
        assert_eq!(labels.get(&ids[0]), Some("blank01"));
        assert_eq!(labels.get(&ids[11]), Some("blank12"));

        let one = [BlankId::new("x")];
        assert_eq!(BlankNodeLabels::assign(one.iter()).get(&one[0]), Some("blank1"));
    }

    #[test]
    fn sorting_preserves_triple_count() {
        let mut g = UnsortedGraph::new();
        add(&mut g, Term::blank("x"), OWL_SAME_AS, Term::blank("y"));
        add(&mut g, Term::blank("y"), OWL_SAME_AS, Term::blank("x"));
        add(&mut g, ex("a"), RDFS_LABEL, Term::Literal(Literal::lang("A", "en")));
        add(&mut g, ex("a"), RDFS_LABEL, Term::Literal(Literal::simple("A")));
        for inline in [false, true] {
            let finished = FinishedGraph::build(g.clone(), inline).expect("sorts");
            assert_eq!(sorted_triple_count(finished.sorted()), 4);
            assert_eq!(finished.labels().len(), 2);
        }
    }

    #[test]
    fn emission_order_puts_ontologies_first_and_blank_nodes_last() {
        let mut g = UnsortedGraph::new();
        add(&mut g, Term::blank("b"), RDFS_LABEL, Term::Literal(Literal::simple("b")));
        add(&mut g, ex("a"), RDFS_LABEL, Term::Literal(Literal::simple("a")));
        add(&mut g, ex("z-onto"), RDF_TYPE, Term::iri(OWL_ONTOLOGY));
        add(&mut g, ex("z-onto"), OWL_IMPORTS, ex("other"));
        let finished = FinishedGraph::build(g, false).expect("sorts");
        let order = finished.emission_order();
        assert_eq!(order, vec![&ex("z-onto"), &ex("a"), &Term::blank("b")]);
        assert_eq!(finished.imports(), vec![&ex("other")]);
    }

    #[test]
    fn inlining_suppresses_singly_referenced_blank_subjects() {
        let mut g = UnsortedGraph::new();
        add(&mut g, ex("a"), "http://example.com/p", Term::blank("inner"));
        add(&mut g, Term::blank("inner"), RDFS_LABEL, Term::Literal(Literal::simple("i")));
        add(&mut g, ex("a"), "http://example.com/p", Term::blank("shared"));
        add(&mut g, ex("b"), "http://example.com/p", Term::blank("shared"));
        add(&mut g, Term::blank("shared"), RDFS_LABEL, Term::Literal(Literal::simple("s")));
        let finished = FinishedGraph::build(g, true).expect("sorts");
        assert!(finished.is_inlined(&BlankId::new("inner")));
        assert!(!finished.is_inlined(&BlankId::new("shared")));
        assert!(finished.emission_order().contains(&&Term::blank("shared")));
        assert!(!finished.emission_order().contains(&&Term::blank("inner")));
    }

    #[test]
    fn reference_cycles_are_not_inlined() {
        let mut g = UnsortedGraph::new();
        add(&mut g, Term::blank("x"), OWL_SAME_AS, Term::blank("y"));
        add(&mut g, Term::blank("y"), OWL_SAME_AS, Term::blank("x"));
        add(&mut g, Term::blank("y"), "http://example.com/p", Term::blank("leaf"));
        let plan = plan_inlining(&g);
        assert!(!plan.contains(&BlankId::new("x")));
        assert!(!plan.contains(&BlankId::new("y")));
        assert!(plan.contains(&BlankId::new("leaf")));
    }

    #[test]
    fn priority_predicates_come_first() {
        let mut g = UnsortedGraph::new();
        add(&mut g, ex("a"), "http://example.com/aaa", ex("v"));
        add(&mut g, ex("a"), RDFS_LABEL, Term::Literal(Literal::simple("Foo")));
        add(&mut g, ex("a"), RDF_TYPE, ex("Widget"));
        let finished = FinishedGraph::build(g, false).expect("sorts");
        let order: Vec<&str> = finished
            .ordered_predicates(&ex("a"))
            .into_iter()
            .map(|(p, _)| p.as_str())
            .collect();
        assert_eq!(order, vec![RDF_TYPE, RDFS_LABEL, "http://example.com/aaa"]);
    }

    #[test]
    fn collection_cells_are_inlined() {
        let mut g = UnsortedGraph::new();
        add(&mut g, ex("s"), "http://example.com/list", Term::blank("l1"));
        add(&mut g, Term::blank("l1"), RDF_FIRST, ex("one"));
        add(&mut g, Term::blank("l1"), RDF_REST, Term::blank("l2"));
        add(&mut g, Term::blank("l2"), RDF_FIRST, ex("two"));
        add(&mut g, Term::blank("l2"), RDF_REST, Term::iri(RDF_NIL));
        let finished = FinishedGraph::build(g, true).expect("sorts");
        let ctx = finished.context();
        assert_eq!(
            ctx.collection_members(&BlankId::new("l1")),
            Some(vec![ex("one"), ex("two")])
        );
        assert_eq!(finished.emission_order(), vec![&ex("s")]);
    }
}
