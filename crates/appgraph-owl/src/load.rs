//! Read a saved ontology back through an RDF/XML parser.
//!
//! The result is a summary model (classes, object properties, individuals
//! with their types and property values), enough to inspect a file written
//! by [`crate::rdfxml`] or a compatible OWL tool.

use crate::schema::PropertyCharacteristic;
use crate::{OntologyError, OWL_NS, RDFS_NS, RDF_NS};
use serde::{Deserialize, Serialize};
use sophia::api::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// ============================================================================
// Summary model
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadedOntology {
    pub iri: Option<String>,
    pub classes: Vec<OwlClass>,
    pub properties: Vec<OwlProperty>,
    pub individuals: Vec<OwlIndividual>,
    pub triples: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwlClass {
    pub iri: String,
    pub subclass_of: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwlProperty {
    pub iri: String,
    pub domain: Vec<String>,
    pub range: Vec<String>,
    pub characteristics: Vec<PropertyCharacteristic>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwlIndividual {
    pub iri: String,
    pub label: Option<String>,
    pub types: Vec<String>,
    /// `(property IRI, object IRI)` in document order.
    pub properties: Vec<(String, String)>,
}

impl LoadedOntology {
    /// The individual carrying `rdfs:label` `label`, falling back to the IRI
    /// local name.
    pub fn individual(&self, label: &str) -> Option<&OwlIndividual> {
        self.individuals
            .iter()
            .find(|i| i.label.as_deref() == Some(label))
            .or_else(|| self.individuals.iter().find(|i| local_name(&i.iri) == label))
    }

    /// Individuals typed with a class whose local name is `class`.
    pub fn individuals_of<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a OwlIndividual> {
        self.individuals
            .iter()
            .filter(move |i| i.types.iter().any(|t| local_name(t) == class))
    }

    /// The individual of `class` (local name) labelled `label`.
    pub fn find<'a>(&'a self, class: &'a str, label: &str) -> Option<&'a OwlIndividual> {
        self.individuals_of(class)
            .find(|i| i.label.as_deref() == Some(label))
    }
}

impl OwlIndividual {
    /// Object IRIs asserted through the property with local name `property`.
    pub fn values<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a str> {
        self.properties
            .iter()
            .filter(move |(p, _)| local_name(p) == property)
            .map(|(_, o)| o.as_str())
    }
}

pub fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}

// ============================================================================
// Parsing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Iri(String),
    BlankNode(String),
    Literal(String),
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct SinkError {
    message: String,
}

pub fn load_rdfxml(path: &Path) -> Result<LoadedOntology, OntologyError> {
    let file = File::open(path).map_err(|source| OntologyError::Storage {
        path: path.to_path_buf(),
        source,
    })?;
    let ontology = load_rdfxml_from(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), triples = ontology.triples, "loaded ontology");
    Ok(ontology)
}

pub fn load_rdfxml_from<R: BufRead>(reader: R) -> Result<LoadedOntology, OntologyError> {
    let mut triples: Vec<(Term, String, Term)> = Vec::new();
    let mut parser = sophia::xml::parser::parse_bufread(reader);
    parser
        .try_for_each_triple(|t| -> Result<(), SinkError> {
            let subject = parse_term_display(&t.s().to_string())?;
            let Term::Iri(predicate) = parse_term_display(&t.p().to_string())? else {
                return Ok(());
            };
            let object = parse_term_display(&t.o().to_string())?;
            triples.push((subject, predicate, object));
            Ok(())
        })
        .map_err(|e| OntologyError::Parse(format!("failed to parse RDF/XML: {e}")))?;

    Ok(summarize(&triples))
}

fn summarize(triples: &[(Term, String, Term)]) -> LoadedOntology {
    let rdf_type = format!("{RDF_NS}type");
    let owl_ontology = format!("{OWL_NS}Ontology");
    let owl_class = format!("{OWL_NS}Class");
    let owl_object_property = format!("{OWL_NS}ObjectProperty");
    let owl_named_individual = format!("{OWL_NS}NamedIndividual");
    let subclass_of = format!("{RDFS_NS}subClassOf");
    let domain = format!("{RDFS_NS}domain");
    let range = format!("{RDFS_NS}range");
    let label = format!("{RDFS_NS}label");

    let mut ontology = LoadedOntology {
        triples: triples.len(),
        ..LoadedOntology::default()
    };
    let mut classes: BTreeMap<String, OwlClass> = BTreeMap::new();
    let mut properties: BTreeMap<String, OwlProperty> = BTreeMap::new();
    let mut individuals: BTreeMap<String, OwlIndividual> = BTreeMap::new();
    let mut declared_individuals: BTreeSet<String> = BTreeSet::new();

    // Pass 1: declarations.
    for (s, p, o) in triples {
        let (Term::Iri(s), Term::Iri(o)) = (s, o) else {
            continue;
        };
        if *p != rdf_type {
            continue;
        }
        if *o == owl_ontology {
            ontology.iri = Some(s.clone());
        } else if *o == owl_class {
            classes.entry(s.clone()).or_insert_with(|| OwlClass {
                iri: s.clone(),
                ..OwlClass::default()
            });
        } else if *o == owl_object_property {
            properties.entry(s.clone()).or_insert_with(|| OwlProperty {
                iri: s.clone(),
                ..OwlProperty::default()
            });
        } else if *o == owl_named_individual {
            declared_individuals.insert(s.clone());
        }
    }
    for iri in &declared_individuals {
        individuals.insert(
            iri.clone(),
            OwlIndividual {
                iri: iri.clone(),
                ..OwlIndividual::default()
            },
        );
    }

    // Pass 2: everything hanging off those declarations.
    for (s, p, o) in triples {
        let Term::Iri(s) = s else {
            continue;
        };
        match o {
            Term::Literal(text) => {
                if *p == label {
                    if let Some(ind) = individuals.get_mut(s) {
                        ind.label = Some(text.clone());
                    }
                }
            }
            Term::Iri(o) => {
                if *p == rdf_type {
                    if let Some(prop) = properties.get_mut(s) {
                        let local = o.strip_prefix(OWL_NS).unwrap_or_default();
                        if let Some(c) = PropertyCharacteristic::from_owl_local_name(local) {
                            prop.characteristics.push(c);
                        }
                    }
                    if let Some(ind) = individuals.get_mut(s) {
                        if *o != owl_named_individual {
                            ind.types.push(o.clone());
                        }
                    }
                } else if *p == subclass_of {
                    if let Some(class) = classes.get_mut(s) {
                        class.subclass_of.push(o.clone());
                    }
                } else if *p == domain {
                    if let Some(prop) = properties.get_mut(s) {
                        prop.domain.push(o.clone());
                    }
                } else if *p == range {
                    if let Some(prop) = properties.get_mut(s) {
                        prop.range.push(o.clone());
                    }
                } else if let Some(ind) = individuals.get_mut(s) {
                    ind.properties.push((p.clone(), o.clone()));
                }
            }
            Term::BlankNode(_) => {}
        }
    }

    ontology.classes = classes.into_values().collect();
    ontology.properties = properties.into_values().collect();
    ontology.individuals = individuals.into_values().collect();
    ontology
}

fn parse_term_display(term: &str) -> Result<Term, SinkError> {
    let s = term.trim();

    if let Some(rest) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(Term::Iri(rest.to_string()));
    }

    if let Some(rest) = s.strip_prefix("_:") {
        return Ok(Term::BlankNode(rest.to_string()));
    }

    if s.starts_with('"') {
        // Lexical form up to the first unescaped closing quote; language tag
        // and datatype are dropped.
        let mut end_quote = None;
        let mut escaped = false;
        for (i, ch) in s.char_indices().skip(1) {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                end_quote = Some(i);
                break;
            }
        }
        let Some(end) = end_quote else {
            return Err(SinkError {
                message: format!("invalid literal term (missing closing quote): {s}"),
            });
        };
        return Ok(Term::Literal(unescape_literal(&s[1..end])));
    }

    Err(SinkError {
        message: format!("unsupported RDF term form: {s}"),
    })
}

fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
