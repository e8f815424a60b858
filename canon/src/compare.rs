//! Canonical ordering of terms, predicate/object maps and blank nodes.
//!
//! Every comparison here threads an [`Exclusions`] set through the call
//! chain. A blank node is added to the set before its structure is
//! descended into; meeting it again later in the same chain treats it as
//! excluded instead of recursing, so comparison terminates on any finite
//! graph, cycles included.
//!
//! Ordering, most significant rule first:
//!
//! 1. an absent or excluded term sorts before any other; two such terms tie;
//! 2. IRIs and literals sort before blank nodes;
//! 3. two literals compare by lexical form, then language tag, then datatype
//!    (a present tag or datatype sorts before an absent one); any other pair
//!    of non-blank terms compares by string value;
//! 4. two blank nodes compare structurally (collections member by member
//!    when inlining, otherwise by predicate/object map) and fall back to their
//!    source labels on a tie, numbers within labels compared by value;
//! 5. predicate/object maps compare predicate by predicate, then by the
//!    canonically sorted object lists; the shorter map sorts first.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::graph::{PredicateObjectMap, UnsortedGraph};
use crate::model::{BlankId, Literal, Term};
use crate::vocab::{RDF_FIRST, RDF_NIL, RDF_REST};

/// Blank nodes already being compared in the current call chain.
#[derive(Debug, Default, Clone)]
pub struct Exclusions(BTreeSet<BlankId>);

impl Exclusions {
    /// Creates an empty exclusion set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `id` is excluded.
    #[must_use]
    pub fn contains(&self, id: &BlankId) -> bool {
        self.0.contains(id)
    }

    /// Excludes `id` for the rest of the call chain.
    pub fn insert(&mut self, id: &BlankId) {
        if !self.0.contains(id) {
            self.0.insert(id.clone());
        }
    }

    /// Number of excluded nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-write state consumed by the comparison functions.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonContext<'g> {
    graph: &'g UnsortedGraph,
    inline_blank_nodes: bool,
    inlined: &'g BTreeSet<BlankId>,
}

impl<'g> ComparisonContext<'g> {
    /// Creates a context over `graph`.
    ///
    /// `inlined` is the set of blank nodes that will be rendered at their
    /// point of use; it decides which list tails count as collection cells.
    #[must_use]
    pub fn new(
        graph: &'g UnsortedGraph,
        inline_blank_nodes: bool,
        inlined: &'g BTreeSet<BlankId>,
    ) -> Self {
        Self {
            graph,
            inline_blank_nodes,
            inlined,
        }
    }

    /// Whether blank nodes are being inlined in this write.
    #[must_use]
    pub fn inline_blank_nodes(&self) -> bool {
        self.inline_blank_nodes
    }

    /// Compares two terms with a fresh exclusion set.
    #[must_use]
    pub fn compare(&self, a: &Term, b: &Term) -> Ordering {
        self.compare_terms(Some(a), Some(b), &mut Exclusions::new())
    }

    /// Compares two possibly absent terms within an ongoing call chain.
    pub fn compare_terms(
        &self,
        a: Option<&Term>,
        b: Option<&Term>,
        excluded: &mut Exclusions,
    ) -> Ordering {
        match (is_excluded(a, excluded), is_excluded(b, excluded)) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        let (Some(a), Some(b)) = (a, b) else {
            return Ordering::Equal;
        };
        if a == b {
            return Ordering::Equal;
        }
        match (a, b) {
            (Term::Blank(x), Term::Blank(y)) => self
                .compare_blank_nodes(x, y, excluded)
                .then_with(|| compare_labels(x.as_str(), y.as_str())),
            (Term::Blank(_), _) => Ordering::Greater,
            (_, Term::Blank(_)) => Ordering::Less,
            (Term::Literal(x), Term::Literal(y)) => compare_literals(x, y),
            _ => a
                .value_str()
                .cmp(b.value_str())
                .then_with(|| kind_rank(a).cmp(&kind_rank(b))),
        }
    }

    /// Structural comparison of two blank nodes. Returns `Equal` on a
    /// structural tie; callers break the tie on the source labels.
    pub fn compare_blank_nodes(
        &self,
        a: &BlankId,
        b: &BlankId,
        excluded: &mut Exclusions,
    ) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let a_map = self.graph.blank_predicate_objects(a);
        let b_map = self.graph.blank_predicate_objects(b);
        // A node without statements of its own has no structure to compare.
        let a_out = excluded.contains(a) || a_map.is_none();
        let b_out = excluded.contains(b) || b_map.is_none();
        match (a_out, b_out) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        if self.inline_blank_nodes {
            match (self.is_collection(a), self.is_collection(b)) {
                (true, true) => {
                    excluded.insert(a);
                    excluded.insert(b);
                    let a_members = self.collection_members(a).unwrap_or_default();
                    let b_members = self.collection_members(b).unwrap_or_default();
                    return self.compare_object_lists(&a_members, &b_members, excluded);
                }
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                (false, false) => {}
            }
        }

        excluded.insert(a);
        excluded.insert(b);
        self.compare_predicate_object_maps(a_map, b_map, excluded)
    }

    /// Compares two predicate/object maps.
    pub fn compare_predicate_object_maps(
        &self,
        a: Option<&PredicateObjectMap>,
        b: Option<&PredicateObjectMap>,
        excluded: &mut Exclusions,
    ) -> Ordering {
        let (a, b) = match (a, b) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => (a, b),
        };
        let mut a_entries = a.iter();
        let mut b_entries = b.iter();
        loop {
            match (a_entries.next(), b_entries.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some((a_pred, a_objects)), Some((b_pred, b_objects))) => {
                    let by_predicate = a_pred.cmp(b_pred);
                    if by_predicate != Ordering::Equal {
                        return by_predicate;
                    }
                    let a_list = self.comparable_objects(a_objects, excluded);
                    let b_list = self.comparable_objects(b_objects, excluded);
                    let by_objects = self.compare_object_lists(&a_list, &b_list, excluded);
                    if by_objects != Ordering::Equal {
                        return by_objects;
                    }
                }
            }
        }
    }

    /// Compares two object lists element-wise, then by length.
    pub fn compare_object_lists(
        &self,
        a: &[Term],
        b: &[Term],
        excluded: &mut Exclusions,
    ) -> Ordering {
        for (x, y) in a.iter().zip(b) {
            let c = self.compare_terms(Some(x), Some(y), excluded);
            if c != Ordering::Equal {
                return c;
            }
        }
        a.len().cmp(&b.len())
    }

    /// Sorts terms canonically, each pairwise comparison starting from a
    /// fresh exclusion set.
    #[must_use]
    pub fn sort_terms(&self, terms: impl IntoIterator<Item = Term>) -> Vec<Term> {
        merge_sort_by(terms.into_iter().collect(), |a, b| self.compare(a, b))
    }

    /// Returns true if `node` heads a well-formed RDF collection.
    ///
    /// The node must carry exactly one `rdf:first` and one `rdf:rest` and
    /// nothing else, every following cell must do the same and be rendered
    /// inline, and the `rdf:rest` chain must reach `rdf:nil` without
    /// revisiting a cell.
    #[must_use]
    pub fn is_collection(&self, node: &BlankId) -> bool {
        self.walk_collection(node).is_some()
    }

    /// Members of the collection headed by `node`, in list order.
    ///
    /// Returns `None` when `node` is not a collection.
    #[must_use]
    pub fn collection_members(&self, node: &BlankId) -> Option<Vec<Term>> {
        self.walk_collection(node)
    }

    fn walk_collection(&self, node: &BlankId) -> Option<Vec<Term>> {
        let mut visited: BTreeSet<&BlankId> = BTreeSet::new();
        let mut members = Vec::new();
        let mut current = node;
        loop {
            if !visited.insert(current) {
                return None;
            }
            let map = self.graph.blank_predicate_objects(current)?;
            if map.len() != 2 {
                return None;
            }
            let first = single(map.get(RDF_FIRST)?)?;
            let rest = single(map.get(RDF_REST)?)?;
            members.push(first.clone());
            match rest {
                Term::Iri(iri) if iri.as_str() == RDF_NIL => return Some(members),
                Term::Blank(next) if self.inlined.contains(next) => current = next,
                _ => return None,
            }
        }
    }

    /// The objects of one predicate as they take part in a map comparison:
    /// blank nodes are left out unless inlining, and the rest is sorted with
    /// the caller's exclusions.
    fn comparable_objects(&self, objects: &BTreeSet<Term>, excluded: &mut Exclusions) -> Vec<Term> {
        let candidates: Vec<Term> = objects
            .iter()
            .filter(|o| self.inline_blank_nodes || !o.is_blank())
            .cloned()
            .collect();
        merge_sort_by(candidates, |a, b| self.compare_terms(Some(a), Some(b), excluded))
    }
}

/// Blank-node label ordering, with runs of digits compared by value so that
/// `blank9` sorts before `blank10`. Labels equal by value (`b01`, `b1`)
/// fall back to plain string order.
#[must_use]
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    fn digit_run(s: &str) -> (&str, &str) {
        let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        s.split_at(end)
    }

    let (mut a_rest, mut b_rest) = (a, b);
    loop {
        match (a_rest.chars().next(), b_rest.chars().next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let (a_digits, a_tail) = digit_run(a_rest);
                let (b_digits, b_tail) = digit_run(b_rest);
                let a_value = a_digits.trim_start_matches('0');
                let b_value = b_digits.trim_start_matches('0');
                let by_value = a_value
                    .len()
                    .cmp(&b_value.len())
                    .then_with(|| a_value.cmp(b_value));
                if by_value != Ordering::Equal {
                    return by_value;
                }
                a_rest = a_tail;
                b_rest = b_tail;
            }
            (Some(x), Some(y)) if x != y => return x.cmp(&y),
            (Some(x), Some(_)) => {
                a_rest = &a_rest[x.len_utf8()..];
                b_rest = &b_rest[x.len_utf8()..];
            }
        }
    }
}

/// Literal ordering: lexical form, then language tag, then datatype.
#[must_use]
pub fn compare_literals(a: &Literal, b: &Literal) -> Ordering {
    a.lexical()
        .cmp(b.lexical())
        .then_with(|| present_first(a.language(), b.language()))
        .then_with(|| {
            present_first(
                a.datatype().map(|dt| dt.as_str()),
                b.datatype().map(|dt| dt.as_str()),
            )
        })
}

/// Stable merge sort.
///
/// The standard library's sort may panic when a comparator is not a total
/// order, and exclusion-based cycle breaking gives no transitivity guarantee.
pub fn merge_sort_by<T, F>(items: Vec<T>, mut cmp: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    merge_sort_inner(items, &mut cmp)
}

fn merge_sort_inner<T, F>(mut items: Vec<T>, cmp: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort_inner(items, cmp);
    let right = merge_sort_inner(right, cmp);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(l, r) != Ordering::Greater,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        merged.extend(next);
    }
    merged
}

fn is_excluded(term: Option<&Term>, excluded: &Exclusions) -> bool {
    match term {
        None => true,
        Some(Term::Blank(id)) => excluded.contains(id),
        Some(_) => false,
    }
}

fn kind_rank(term: &Term) -> u8 {
    match term {
        Term::Iri(_) => 0,
        Term::Literal(_) => 1,
        Term::Blank(_) => 2,
    }
}

fn present_first(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn single(objects: &BTreeSet<Term>) -> Option<&Term> {
    if objects.len() == 1 {
        objects.iter().next()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Iri, Statement};

    const EX: &str = "http://example.com/";

    fn ex(local: &str) -> Term {
        Term::iri(format!("{EX}{local}"))
    }

    fn graph(triples: &[(Term, &str, Term)]) -> UnsortedGraph {
        let mut graph = UnsortedGraph::new();
        for (s, p, o) in triples {
            let statement =
                Statement::new(s.clone(), Iri::new(*p), o.clone()).expect("valid fixture statement");
            graph.add_statement(statement);
        }
        graph
    }

    #[test]
    fn non_blank_terms_sort_before_blank_nodes() {
        let g = UnsortedGraph::new();
        let inlined = BTreeSet::new();
        let ctx = ComparisonContext::new(&g, false, &inlined);
        assert_eq!(ctx.compare(&ex("z"), &Term::blank("a")), Ordering::Less);
        assert_eq!(
            ctx.compare(&Term::Literal(Literal::simple("z")), &Term::blank("a")),
            Ordering::Less
        );
    }

    #[test]
    fn absent_and_excluded_sort_first() {
        let g = UnsortedGraph::new();
        let inlined = BTreeSet::new();
        let ctx = ComparisonContext::new(&g, false, &inlined);
        let mut excluded = Exclusions::new();
        assert_eq!(
            ctx.compare_terms(None, Some(&ex("a")), &mut excluded),
            Ordering::Less
        );
        assert_eq!(ctx.compare_terms(None, None, &mut excluded), Ordering::Equal);

        let blank = Term::blank("b");
        excluded.insert(&BlankId::new("b"));
        assert_eq!(
            ctx.compare_terms(Some(&blank), Some(&ex("a")), &mut excluded),
            Ordering::Less
        );
    }

    #[test]
    fn literal_ordering_rules() {
        let plain = Literal::new("a", None, None);
        let tagged = Literal::lang("a", "en");
        let typed = Literal::typed("a", Iri::new("http://www.w3.org/2001/XMLSchema#token"));
        assert_eq!(compare_literals(&tagged, &plain), Ordering::Less);
        assert_eq!(compare_literals(&typed, &plain), Ordering::Less);
        assert_eq!(
            compare_literals(&Literal::simple("a"), &Literal::simple("b")),
            Ordering::Less
        );
        assert_eq!(
            compare_literals(&Literal::lang("a", "de"), &Literal::lang("a", "en")),
            Ordering::Less
        );
    }

    #[test]
    fn iri_and_literal_compare_by_string_value() {
        let g = UnsortedGraph::new();
        let inlined = BTreeSet::new();
        let ctx = ComparisonContext::new(&g, false, &inlined);
        let lit = Term::Literal(Literal::simple("http://example.com/b"));
        assert_eq!(ctx.compare(&ex("a"), &lit), Ordering::Less);
        assert_eq!(ctx.compare(&ex("c"), &lit), Ordering::Greater);
        let same = Term::Literal(Literal::simple("http://example.com/a"));
        assert_eq!(ctx.compare(&ex("a"), &same), Ordering::Less);
    }

    #[test]
    fn blank_nodes_compare_by_structure_not_label() {
        let g = graph(&[
            (Term::blank("zz"), "http://example.com/p", ex("a")),
            (Term::blank("aa"), "http://example.com/p", ex("b")),
        ]);
        let inlined = BTreeSet::new();
        let ctx = ComparisonContext::new(&g, false, &inlined);
        assert_eq!(
            ctx.compare(&Term::blank("zz"), &Term::blank("aa")),
            Ordering::Less,
            "structure must outrank the source label"
        );
    }

    #[test]
    fn structural_tie_falls_back_to_label() {
        let g = graph(&[
            (Term::blank("b2"), "http://example.com/p", ex("a")),
            (Term::blank("b1"), "http://example.com/p", ex("a")),
        ]);
        let inlined = BTreeSet::new();
        let ctx = ComparisonContext::new(&g, false, &inlined);
        assert_eq!(ctx.compare(&Term::blank("b1"), &Term::blank("b2")), Ordering::Less);
        assert_eq!(ctx.compare(&Term::blank("b2"), &Term::blank("b1")), Ordering::Greater);
    }

    #[test]
    fn labels_compare_numbers_by_value() {
        assert_eq!(compare_labels("blank9", "blank10"), Ordering::Less);
        assert_eq!(compare_labels("blank10", "blank9"), Ordering::Greater);
        assert_eq!(compare_labels("b2x", "b2y"), Ordering::Less);
        assert_eq!(compare_labels("b", "b1"), Ordering::Less);
        assert_eq!(compare_labels("b1", "b01"), "b1".cmp("b01"));
        assert_eq!(compare_labels("x", "x"), Ordering::Equal);

        let g = graph(&[
            (Term::blank("blank10"), "http://example.com/p", ex("a")),
            (Term::blank("blank9"), "http://example.com/p", ex("a")),
        ]);
        let inlined = BTreeSet::new();
        let ctx = ComparisonContext::new(&g, false, &inlined);
        assert_eq!(
            ctx.compare(&Term::blank("blank9"), &Term::blank("blank10")),
            Ordering::Less
        );
    }

    #[test]
    fn two_cycle_terminates_and_is_antisymmetric() {
        let same_as = "http://www.w3.org/2002/07/owl#sameAs";
        let g = graph(&[
            (Term::blank("x"), same_as, Term::blank("y")),
            (Term::blank("y"), same_as, Term::blank("x")),
        ]);
        let inlined = BTreeSet::new();
        for inline in [false, true] {
            let ctx = ComparisonContext::new(&g, inline, &inlined);
            let xy = ctx.compare(&Term::blank("x"), &Term::blank("y"));
            let yx = ctx.compare(&Term::blank("y"), &Term::blank("x"));
            assert_ne!(xy, Ordering::Equal);
            assert_eq!(xy, yx.reverse());
            assert_eq!(ctx.compare(&Term::blank("x"), &Term::blank("x")), Ordering::Equal);
        }
    }

    #[test]
    fn shorter_predicate_map_sorts_first() {
        let g = graph(&[
            (Term::blank("a"), "http://example.com/p", ex("v")),
            (Term::blank("b"), "http://example.com/p", ex("v")),
            (Term::blank("b"), "http://example.com/q", ex("v")),
        ]);
        let inlined = BTreeSet::new();
        let ctx = ComparisonContext::new(&g, false, &inlined);
        assert_eq!(ctx.compare(&Term::blank("b"), &Term::blank("a")), Ordering::Greater);
    }

    #[test]
    fn collections_are_detected_and_walked_in_order() {
        let g = graph(&[
            (ex("s"), "http://example.com/list", Term::blank("l1")),
            (Term::blank("l1"), RDF_FIRST, ex("c")),
            (Term::blank("l1"), RDF_REST, Term::blank("l2")),
            (Term::blank("l2"), RDF_FIRST, ex("a")),
            (Term::blank("l2"), RDF_REST, Term::iri(RDF_NIL)),
        ]);
        let inlined: BTreeSet<BlankId> = [BlankId::new("l1"), BlankId::new("l2")].into();
        let ctx = ComparisonContext::new(&g, true, &inlined);
        assert!(ctx.is_collection(&BlankId::new("l1")));
        assert_eq!(
            ctx.collection_members(&BlankId::new("l1")),
            Some(vec![ex("c"), ex("a")])
        );

        let not_inlined = BTreeSet::new();
        let ctx = ComparisonContext::new(&g, true, &not_inlined);
        assert!(
            !ctx.is_collection(&BlankId::new("l1")),
            "a list cell rendered elsewhere cannot be folded into the list"
        );
    }

    #[test]
    fn cyclic_rest_chain_is_not_a_collection() {
        let g = graph(&[
            (Term::blank("l1"), RDF_FIRST, ex("a")),
            (Term::blank("l1"), RDF_REST, Term::blank("l2")),
            (Term::blank("l2"), RDF_FIRST, ex("b")),
            (Term::blank("l2"), RDF_REST, Term::blank("l1")),
        ]);
        let inlined: BTreeSet<BlankId> = [BlankId::new("l1"), BlankId::new("l2")].into();
        let ctx = ComparisonContext::new(&g, true, &inlined);
        assert!(!ctx.is_collection(&BlankId::new("l1")));
    }

    #[test]
    fn collection_sorts_before_other_blank_nodes_when_inlining() {
        let g = graph(&[
            (Term::blank("a"), "http://example.com/p", ex("v")),
            (Term::blank("l"), RDF_FIRST, ex("v")),
            (Term::blank("l"), RDF_REST, Term::iri(RDF_NIL)),
        ]);
        let inlined = BTreeSet::new();
        let ctx = ComparisonContext::new(&g, true, &inlined);
        assert_eq!(ctx.compare(&Term::blank("l"), &Term::blank("a")), Ordering::Less);
    }

    #[test]
    fn merge_sort_is_stable() {
        let items = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')];
        let sorted = merge_sort_by(items, |x, y| x.0.cmp(&y.0));
        assert_eq!(sorted, vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c')]);
    }
}
