//! Application ontology: schema, population and RDF/XML output.
//!
//! The ontology is built in two phases through an explicit
//! [`OntologyBuilder`] handle:
//!
//! 1. [`OntologyBuilder::define_schema`] installs the fixed [`Schema`]
//!    (six classes under `owl:Thing`, five functional object properties
//!    whose domain is `Application`).
//! 2. [`OntologyBuilder::populate`] walks table rows in order, creating one
//!    individual per distinct `(class, label)` and pointing each application
//!    at its developer, operating system, language, license and copyright
//!    status. A later row for the same application replaces its earlier
//!    edges.
//!
//! The finished [`OntologyGraph`] is written with [`save_rdfxml`] and can be
//! read back with [`load_rdfxml`].

pub mod graph;
pub mod load;
pub mod rdfxml;
pub mod schema;

use std::path::PathBuf;

pub use crate::graph::{Individual, IndividualId, OntologyBuilder, OntologyGraph};
pub use crate::load::{load_rdfxml, load_rdfxml_from, LoadedOntology};
pub use crate::rdfxml::{save_rdfxml, write_rdfxml};
pub use crate::schema::{EntityClass, PropertyCharacteristic, Relation, Schema};

/// Namespace of the ontology when none is configured.
pub const DEFAULT_NAMESPACE: &str = "http://test.org/apps.owl";

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    #[error("schema must be defined before individuals are created")]
    UninitializedSchema,
    #[error("unknown individual #{0}")]
    UnknownIndividual(usize),
    #[error("{relation} expects a subject of class {expected}, got {found}")]
    DomainViolation {
        relation: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{relation} expects an object of class {expected}, got {found}")]
    RangeViolation {
        relation: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("storage failure on {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("XML error: {0}")]
    Xml(String),
    #[error("{0}")]
    Parse(String),
}

/// Define the schema, populate from `rows`, and return the graph.
pub fn build_ontology<'a, I>(namespace: &str, rows: I) -> Result<OntologyGraph, OntologyError>
where
    I: IntoIterator<Item = &'a appgraph_tabular::Row>,
{
    let mut builder = OntologyBuilder::new(namespace);
    builder.define_schema();
    builder.populate(rows)?;
    builder.finish()
}
