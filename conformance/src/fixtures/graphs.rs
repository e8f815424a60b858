//! Fixture graphs.

/// A small OWL ontology with an import, classes, properties and individuals.
pub const ONTOLOGY: &str = r#"@prefix ex: <http://example.com/shapes/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

<http://example.com/shapes> a owl:Ontology ;
    rdfs:label "Shapes" ;
    owl:imports <http://example.com/units> , <http://example.com/base> .

ex:Shape a owl:Class ;
    rdfs:label "shape"@en , "forme"@fr ;
    rdfs:comment "Anything with an outline." .

ex:Circle a owl:Class ;
    rdfs:subClassOf ex:Shape ;
    rdfs:label "circle"@en .

ex:radius a owl:DatatypeProperty , owl:FunctionalProperty ;
    rdfs:domain ex:Circle ;
    rdfs:range xsd:decimal .

ex:unitCircle a owl:NamedIndividual , ex:Circle ;
    ex:radius 1.0 ;
    owl:sameAs ex:theUnitCircle .
"#;

/// Structurally similar anonymous restrictions that only differ deep down.
pub const RESTRICTIONS: &str = r#"@prefix ex: <http://example.com/r/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

ex:Car rdfs:subClassOf
    [ a owl:Restriction ; owl:onProperty ex:hasPart ;
      owl:someValuesFrom [ a owl:Class ; owl:unionOf ( ex:Wheel ex:Tyre ) ] ] ,
    [ a owl:Restriction ; owl:onProperty ex:hasPart ;
      owl:someValuesFrom [ a owl:Class ; owl:unionOf ( ex:Wheel ex:Rim ) ] ] ,
    [ a owl:Restriction ; owl:onProperty ex:hasPart ;
      owl:onClass ex:Engine ; owl:qualifiedCardinality 1 ] .
"#;

/// Lists of IRIs, literals and nested lists, plus an empty list.
pub const COLLECTIONS: &str = r#"@prefix ex: <http://example.com/c/> .

ex:s ex:numbers ( 1 2 3 ) ;
    ex:names ( "b" "a" "b" ) ;
    ex:nested ( ( ex:x ) ( ex:y ex:z ) ) ;
    ex:empty () .
ex:t ex:numbers ( 1 2 3 ) .
"#;

/// Blank nodes that reference each other, and one shared by two subjects.
pub const CYCLES: &str = r#"@prefix ex: <http://example.com/y/> .

_:a ex:next _:b .
_:b ex:next _:c .
_:c ex:next _:a .
_:self ex:next _:self .
ex:one ex:shares _:shared .
ex:two ex:shares _:shared .
_:shared ex:value "shared" .
"#;

/// Literal forms: quoting, long strings, languages and datatypes.
pub const LITERALS: &str = r#"@prefix ex: <http://example.com/l/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

ex:s ex:plain "plain" ;
    ex:quoted "say \"hi\"" ;
    ex:both "it's \"both\"" ;
    ex:backslash "a\\b" ;
    ex:long """line one
line two""" ;
    ex:lang "colour"@en-GB ;
    ex:typed "2024-01-01"^^xsd:date , true , 42 ;
    ex:explicit "x"^^xsd:string ;
    ex:markup "<b>&amp;</b>" .
"#;

/// Predicates in namespaces with no declared prefix.
pub const UNPREFIXED: &str = r#"<http://one.example.org/s> <http://one.example.org/vocab#p> <http://two.example.org/o> ;
    <http://two.example.org/terms/q> "v" .
"#;
