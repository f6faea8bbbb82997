//! RDF/XML serialization of a populated [`OntologyGraph`].
//!
//! Layout follows the usual OWL tool output: the ontology header, class
//! declarations, object property declarations, then one
//! `owl:NamedIndividual` element per individual. All `rdf:about` and
//! `rdf:resource` values are absolute IRIs.

use crate::graph::OntologyGraph;
use crate::{OntologyError, OWL_NS, RDFS_NS, RDF_NS, XSD_NS};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serialize `graph` to `path`, replacing any existing file.
pub fn save_rdfxml(graph: &OntologyGraph, path: &Path) -> Result<(), OntologyError> {
    let storage = |source| OntologyError::Storage {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(storage)?;
    let mut out = BufWriter::new(file);
    write_rdfxml(graph, &mut out)?;
    out.flush().map_err(storage)?;

    tracing::info!(
        path = %path.display(),
        individuals = graph.len(),
        edges = graph.edge_count(),
        "saved ontology"
    );
    Ok(())
}

/// Serialize `graph` as RDF/XML into `out`.
pub fn write_rdfxml<W: Write>(graph: &OntologyGraph, out: W) -> Result<(), OntologyError> {
    let schema = graph.schema();
    let ns = schema.namespace();
    let default_ns = format!("{ns}#");
    let owl = |local: &str| format!("{OWL_NS}{local}");

    let mut w = Writer::new_with_indent(out, b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let root = BytesStart::new("rdf:RDF").with_attributes([
        ("xmlns:rdf", RDF_NS),
        ("xmlns:rdfs", RDFS_NS),
        ("xmlns:owl", OWL_NS),
        ("xmlns:xsd", XSD_NS),
        ("xml:base", ns),
        ("xmlns", default_ns.as_str()),
    ]);
    w.write_event(Event::Start(root)).map_err(xml_error)?;

    empty(&mut w, "owl:Ontology", &[("rdf:about", ns)])?;

    for class in schema.classes() {
        start(&mut w, "owl:Class", &class.iri)?;
        empty(&mut w, "rdfs:subClassOf", &[("rdf:resource", class.super_class)])?;
        end(&mut w, "owl:Class")?;
    }

    for relation in schema.relations() {
        start(&mut w, "owl:ObjectProperty", &relation.iri)?;
        for characteristic in &relation.characteristics {
            let ty = owl(characteristic.owl_local_name());
            empty(&mut w, "rdf:type", &[("rdf:resource", ty.as_str())])?;
        }
        let domain = &schema.class(relation.domain).iri;
        let range = &schema.class(relation.range).iri;
        empty(&mut w, "rdfs:domain", &[("rdf:resource", domain.as_str())])?;
        empty(&mut w, "rdfs:range", &[("rdf:resource", range.as_str())])?;
        end(&mut w, "owl:ObjectProperty")?;
    }

    for (_, individual) in graph.individuals() {
        let iri = schema.individual_iri(individual.class, &individual.label);
        start(&mut w, "owl:NamedIndividual", &iri)?;

        let class_iri = &schema.class(individual.class).iri;
        empty(&mut w, "rdf:type", &[("rdf:resource", class_iri.as_str())])?;

        w.write_event(Event::Start(BytesStart::new("rdfs:label")))
            .map_err(xml_error)?;
        w.write_event(Event::Text(BytesText::new(&individual.label)))
            .map_err(xml_error)?;
        end(&mut w, "rdfs:label")?;

        for (relation, target) in &individual.relations {
            let Some(target) = graph.get(*target) else {
                return Err(OntologyError::UnknownIndividual(target.index()));
            };
            let target_iri = schema.individual_iri(target.class, &target.label);
            empty(&mut w, relation.name(), &[("rdf:resource", target_iri.as_str())])?;
        }

        end(&mut w, "owl:NamedIndividual")?;
    }

    end(&mut w, "rdf:RDF")?;
    Ok(())
}

fn xml_error<E: std::fmt::Display>(e: E) -> OntologyError {
    OntologyError::Xml(e.to_string())
}

fn start<W: Write>(w: &mut Writer<W>, name: &str, about: &str) -> Result<(), OntologyError> {
    let elem = BytesStart::new(name).with_attributes([("rdf:about", about)]);
    w.write_event(Event::Start(elem)).map_err(xml_error)
}

fn empty<W: Write>(
    w: &mut Writer<W>,
    name: &str,
    attrs: &[(&str, &str)],
) -> Result<(), OntologyError> {
    let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
    w.write_event(Event::Empty(elem)).map_err(xml_error)
}

fn end<W: Write>(w: &mut Writer<W>, name: &str) -> Result<(), OntologyError> {
    w.write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)
}
