//! Namespace prefixes and short IRI forms.
//!
//! A [`NamespaceTable`] collects the declared prefixes, the default ones and
//! the serializer-generated `zzznsNNNN` ones. [`IriResolver`] turns it into
//! a reverse table, longest namespace first, and picks the short form of an
//! IRI for a given output syntax.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::model::Iri;
use crate::options::ShortIriPreference;
use crate::text::{is_turtle_local_name, is_xml_ncname};
use crate::vocab::DEFAULT_PREFIXES;

/// Prefix → namespace IRI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    prefixes: BTreeMap<String, String>,
    generated: BTreeSet<String>,
}

impl NamespaceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `prefix` to `namespace`, replacing an earlier binding.
    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        self.generated.remove(&prefix);
        self.prefixes.insert(prefix, namespace.into());
    }

    /// Unbinds `prefix`, returning its namespace.
    pub fn remove(&mut self, prefix: &str) -> Option<String> {
        self.generated.remove(prefix);
        self.prefixes.remove(prefix)
    }

    /// The namespace bound to `prefix`.
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Returns true if some prefix is bound to `namespace`.
    #[must_use]
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.prefixes.values().any(|ns| ns == namespace)
    }

    /// Returns true if `prefix` was generated by [`add_predicate_namespaces`](Self::add_predicate_namespaces).
    #[must_use]
    pub fn is_generated(&self, prefix: &str) -> bool {
        self.generated.contains(prefix)
    }

    /// Bindings in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Binds `rdf`, `rdfs`, `owl` and `xsd` when neither their namespace nor
    /// their prefix is already in use.
    pub fn add_defaults(&mut self) {
        for (prefix, namespace) in DEFAULT_PREFIXES {
            if !self.contains_namespace(namespace) && !self.prefixes.contains_key(*prefix) {
                self.insert(*prefix, *namespace);
            }
        }
    }

    /// Generates a `zzznsNNNN` prefix for the namespace of every predicate
    /// whose namespace (up to its last `/` or `#`) is unbound.
    ///
    /// Predicates are visited in IRI order, so the numbering is stable.
    pub fn add_predicate_namespaces<'a>(&mut self, predicates: impl IntoIterator<Item = &'a Iri>) {
        let mut counter = 1usize;
        for predicate in predicates {
            let iri = predicate.as_str();
            let Some(end) = iri.rfind(['/', '#']) else {
                continue;
            };
            let namespace = &iri[..=end];
            if self.contains_namespace(namespace) {
                continue;
            }
            let prefix = loop {
                let candidate = format!("zzzns{counter:04}");
                counter += 1;
                if !self.prefixes.contains_key(&candidate) {
                    break candidate;
                }
            };
            tracing::debug!(%prefix, namespace, "generated namespace prefix");
            self.prefixes.insert(prefix.clone(), namespace.to_owned());
            self.generated.insert(prefix);
        }
    }

    /// Applies `rewrite` to every namespace IRI.
    pub fn map_namespaces(&mut self, mut rewrite: impl FnMut(&str) -> String) {
        for namespace in self.prefixes.values_mut() {
            *namespace = rewrite(namespace);
        }
    }
}

/// A `prefix:local` form of an IRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    /// The prefix (possibly empty).
    pub prefix: String,
    /// The local part.
    pub local: String,
    /// The namespace IRI the prefix stands for.
    pub namespace: String,
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

/// The output syntax a short IRI is chosen for. Each has its own
/// local-name grammar and its own use of generated prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSyntax {
    /// Turtle prefixed names.
    Turtle,
    /// XML qualified names (element names).
    Xml,
    /// JSON-LD compact IRIs; generated prefixes are never used.
    JsonLd,
}

impl NameSyntax {
    fn accepts_local(self, local: &str) -> bool {
        match self {
            NameSyntax::Turtle | NameSyntax::JsonLd => is_turtle_local_name(local),
            NameSyntax::Xml => is_xml_ncname(local),
        }
    }

    fn uses_generated_prefixes(self) -> bool {
        !matches!(self, NameSyntax::JsonLd)
    }

    /// JSON-LD 1.1 only expands a simple term as a prefix when its IRI ends
    /// in a gen-delim character; anything else reads as an absolute IRI.
    fn accepts_namespace(self, namespace: &str) -> bool {
        !matches!(self, NameSyntax::JsonLd)
            || namespace.ends_with([':', '/', '?', '#', '[', ']', '@'])
    }
}

/// The chosen textual form of an IRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortIri<'a> {
    /// A prefixed name.
    QName(QName),
    /// A reference relative to the base IRI.
    Relative(String),
    /// The IRI itself.
    Absolute(&'a str),
}

/// Resolves IRIs to their shortest acceptable form for one write.
#[derive(Debug, Clone)]
pub struct IriResolver {
    reverse: Vec<(String, String)>,
    generated: BTreeSet<String>,
    base: Option<String>,
    preference: ShortIriPreference,
}

impl IriResolver {
    /// Builds the reverse table from `table`.
    ///
    /// When several prefixes share a namespace the last in prefix order
    /// wins. Entries are ordered longest namespace first, then by namespace.
    #[must_use]
    pub fn new(table: &NamespaceTable, base: Option<&str>, preference: ShortIriPreference) -> Self {
        let mut by_namespace: BTreeMap<&str, &str> = BTreeMap::new();
        for (prefix, namespace) in table.iter() {
            by_namespace.insert(namespace, prefix);
        }
        let mut reverse: Vec<(String, String)> = by_namespace
            .into_iter()
            .map(|(ns, prefix)| (ns.to_owned(), prefix.to_owned()))
            .collect();
        reverse.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self {
            reverse,
            generated: table.generated.clone(),
            base: base.map(str::to_owned),
            preference,
        }
    }

    /// The configured base IRI.
    #[must_use]
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// The prefixed form of `iri`, if some namespace yields a valid local
    /// part. Longer namespaces are tried first.
    #[must_use]
    pub fn qname(&self, iri: &str, syntax: NameSyntax) -> Option<QName> {
        self.reverse
            .iter()
            .filter(|(namespace, prefix)| {
                syntax.accepts_namespace(namespace)
                    && (syntax.uses_generated_prefixes() || !self.generated.contains(prefix))
            })
            .find_map(|(namespace, prefix)| {
                let local = iri.strip_prefix(namespace.as_str())?;
                syntax.accepts_local(local).then(|| QName {
                    prefix: prefix.clone(),
                    local: local.to_owned(),
                    namespace: namespace.clone(),
                })
            })
    }

    /// The base-relative form of `iri`, if it is shorter than `iri`.
    #[must_use]
    pub fn relative(&self, iri: &str) -> Option<String> {
        let base = self.base.as_deref()?;
        relativize(base, iri).filter(|rel| rel.len() < iri.len())
    }

    /// The preferred short form of `iri`.
    #[must_use]
    pub fn shorten<'a>(&self, iri: &'a str, syntax: NameSyntax) -> ShortIri<'a> {
        let short = match self.preference {
            ShortIriPreference::Prefix => self
                .qname(iri, syntax)
                .map(ShortIri::QName)
                .or_else(|| self.relative(iri).map(ShortIri::Relative)),
            ShortIriPreference::BaseIri => self
                .relative(iri)
                .map(ShortIri::Relative)
                .or_else(|| self.qname(iri, syntax).map(ShortIri::QName)),
        };
        short.unwrap_or(ShortIri::Absolute(iri))
    }
}

struct UriParts<'a> {
    scheme: &'a str,
    authority: Option<&'a str>,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

fn split_uri(uri: &str) -> Option<UriParts<'_>> {
    let colon = uri.find(':')?;
    let scheme = &uri[..colon];
    let mut scheme_chars = scheme.chars();
    if !scheme_chars.next()?.is_ascii_alphabetic()
        || !scheme_chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }
    let rest = &uri[colon + 1..];
    let (rest, fragment) = match rest.split_once('#') {
        Some((r, f)) => (r, Some(f)),
        None => (rest, None),
    };
    let (rest, query) = match rest.split_once('?') {
        Some((r, q)) => (r, Some(q)),
        None => (rest, None),
    };
    let (authority, path) = match rest.strip_prefix("//") {
        Some(after) => {
            let end = after.find('/').unwrap_or(after.len());
            (Some(&after[..end]), &after[end..])
        }
        None => (None, rest),
    };
    Some(UriParts {
        scheme,
        authority,
        path,
        query,
        fragment,
    })
}

/// Expresses `iri` as a reference relative to `base`.
///
/// Only references that resolve back to `iri` against `base` are produced:
/// same scheme and authority, and a path below the base's directory (or the
/// base document itself, giving `?query` or `#fragment` references).
/// Returns `None` when no such reference exists or it would be empty.
#[must_use]
pub fn relativize(base: &str, iri: &str) -> Option<String> {
    let b = split_uri(base)?;
    let c = split_uri(iri)?;
    if !b.scheme.eq_ignore_ascii_case(c.scheme) || b.authority.is_none() || b.authority != c.authority {
        return None;
    }

    let mut rel = String::new();
    if c.path == b.path {
        match (c.query, b.query) {
            (Some(q), _) => {
                rel.push('?');
                rel.push_str(q);
            }
            (None, Some(_)) => return None,
            (None, None) => {}
        }
    } else {
        let directory = match b.path.rfind('/') {
            Some(i) => &b.path[..=i],
            None => "/",
        };
        let tail = c.path.strip_prefix(directory)?;
        let first_segment = tail.split('/').next().unwrap_or_default();
        if tail.is_empty()
            || tail.starts_with('/')
            || first_segment.contains(':')
            || first_segment == "."
            || first_segment == ".."
        {
            return None;
        }
        rel.push_str(tail);
        if let Some(q) = c.query {
            rel.push('?');
            rel.push_str(q);
        }
    }
    if let Some(f) = c.fragment {
        rel.push('#');
        rel.push_str(f);
    }
    if rel.is_empty() {
        None
    } else {
        Some(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NamespaceTable {
        let mut table = NamespaceTable::new();
        table.insert("ex", "http://example.com/");
        table.insert("exo", "http://example.com/onto#");
        table.add_defaults();
        table
    }

    #[test]
    fn defaults_fill_missing_namespaces_only() {
        let mut table = NamespaceTable::new();
        table.insert("x", "http://www.w3.org/2001/XMLSchema#");
        table.add_defaults();
        assert_eq!(table.get("xsd"), None);
        assert_eq!(table.get("owl"), Some("http://www.w3.org/2002/07/owl#"));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn longest_namespace_wins() {
        let resolver = IriResolver::new(&table(), None, ShortIriPreference::Prefix);
        let q = resolver.qname("http://example.com/onto#Widget", NameSyntax::Turtle);
        assert_eq!(q.map(|q| q.to_string()), Some("exo:Widget".to_owned()));
    }

    #[test]
    fn invalid_local_part_falls_back_to_shorter_namespace() {
        let resolver = IriResolver::new(&table(), None, ShortIriPreference::Prefix);
        assert_eq!(resolver.qname("http://example.com/onto#a/b", NameSyntax::Turtle), None);
        assert_eq!(
            resolver
                .qname("http://example.com/12", NameSyntax::Turtle)
                .map(|q| q.to_string()),
            Some("ex:12".to_owned())
        );
        assert_eq!(resolver.qname("http://example.com/12", NameSyntax::Xml), None);
    }

    #[test]
    fn generated_prefixes_are_stable_and_hidden_from_json_ld() {
        let mut table = table();
        let predicates: BTreeSet<Iri> = [
            Iri::new("http://other.org/vocab/p"),
            Iri::new("http://another.org/ns#q"),
            Iri::new("http://example.com/r"),
        ]
        .into();
        table.add_predicate_namespaces(&predicates);
        assert_eq!(table.get("zzzns0001"), Some("http://another.org/ns#"));
        assert_eq!(table.get("zzzns0002"), Some("http://other.org/vocab/"));
        assert!(table.is_generated("zzzns0001"));

        let resolver = IriResolver::new(&table, None, ShortIriPreference::Prefix);
        assert!(resolver.qname("http://other.org/vocab/p", NameSyntax::Xml).is_some());
        assert!(resolver.qname("http://other.org/vocab/p", NameSyntax::JsonLd).is_none());
    }

    #[test]
    fn json_ld_prefixes_need_a_gen_delim_namespace() {
        let mut table = table();
        table.insert("us", "http://example.com/ns_");
        let resolver = IriResolver::new(&table, None, ShortIriPreference::Prefix);
        assert_eq!(
            resolver
                .qname("http://example.com/ns_A", NameSyntax::Turtle)
                .map(|q| q.to_string()),
            Some("us:A".to_owned())
        );
        assert_eq!(
            resolver
                .qname("http://example.com/ns_A", NameSyntax::JsonLd)
                .map(|q| q.to_string()),
            Some("ex:ns_A".to_owned())
        );
        let mut table = NamespaceTable::new();
        table.insert("us", "http://example.com/ns_");
        let resolver = IriResolver::new(&table, None, ShortIriPreference::Prefix);
        assert_eq!(
            resolver.shorten("http://example.com/ns_A", NameSyntax::JsonLd),
            ShortIri::Absolute("http://example.com/ns_A")
        );
    }

    #[test]
    fn base_preference_orders_forms() {
        let table = table();
        let base = Some("http://example.com/onto");
        let prefix_first = IriResolver::new(&table, base, ShortIriPreference::Prefix);
        assert!(matches!(
            prefix_first.shorten("http://example.com/onto#A", NameSyntax::Turtle),
            ShortIri::QName(_)
        ));
        let base_first = IriResolver::new(&table, base, ShortIriPreference::BaseIri);
        assert_eq!(
            base_first.shorten("http://example.com/onto#A", NameSyntax::Turtle),
            ShortIri::Relative("#A".to_owned())
        );
        assert_eq!(
            base_first.shorten("http://elsewhere.org/x y", NameSyntax::Turtle),
            ShortIri::Absolute("http://elsewhere.org/x y")
        );
    }

    #[test]
    fn relativization() {
        let base = "http://topbraid.org/countries";
        assert_eq!(relativize(base, "http://topbraid.org/countries#AD"), Some("#AD".to_owned()));
        assert_eq!(relativize(base, "http://topbraid.org/regions"), Some("regions".to_owned()));
        assert_eq!(relativize(base, base), None);
        assert_eq!(relativize(base, "https://topbraid.org/countries#AD"), None);
        assert_eq!(relativize(base, "http://other.org/countries#AD"), None);
        assert_eq!(
            relativize("http://ex.com/a/", "http://ex.com/a/b/c?q=1"),
            Some("b/c?q=1".to_owned())
        );
        assert_eq!(relativize("http://ex.com/a/", "http://ex.com/a/x:y"), None);
        assert_eq!(relativize("http://ex.com/a/b", "http://ex.com/a/"), None);
        assert_eq!(relativize("urn:x:y", "urn:x:z"), None);
    }
}
