//! The three pipeline stages, strictly in sequence:
//! fetch → CSV write, CSV read → ontology build → RDF/XML write.

use crate::config::FetchConfig;
use anyhow::{Context, Result};
use appgraph_owl::{EntityClass, OntologyGraph};
use appgraph_sparql::SparqlClient;
use appgraph_tabular::{Column, Row};
use std::collections::BTreeSet;
use std::path::Path;

/// Fetch rows from the endpoint and persist them to `csv`.
pub fn fetch_to_csv(config: &FetchConfig, csv: &Path) -> Result<Vec<Row>> {
    let client = SparqlClient::new(&config.sparql).context("failed to set up SPARQL client")?;
    let rows = client
        .select_rows(&config.query)
        .with_context(|| format!("fetch from {} failed", client.endpoint()))?;
    save_rows(&rows, csv)?;
    Ok(rows)
}

pub fn save_rows(rows: &[Row], csv: &Path) -> Result<()> {
    appgraph_tabular::write_rows(csv, rows)
        .with_context(|| format!("failed to save rows to {}", csv.display()))
}

/// Re-read `csv`, build the ontology under `namespace`, and save it to `owl`.
pub fn build_from_csv(csv: &Path, owl: &Path, namespace: &str) -> Result<OntologyGraph> {
    let table = appgraph_tabular::read_table(csv)
        .with_context(|| format!("failed to load {}", csv.display()))?;
    let applications: BTreeSet<&str> = table
        .column(Column::App.name())
        .unwrap_or_default()
        .into_iter()
        .collect();
    tracing::debug!(applications = applications.len(), "distinct applications in table");

    let graph = appgraph_owl::build_ontology(namespace, table.rows())
        .context("failed to build ontology")?;
    appgraph_owl::save_rdfxml(&graph, owl)
        .with_context(|| format!("failed to save ontology to {}", owl.display()))?;
    Ok(graph)
}

/// One line per class: `Application: 3`.
pub fn class_summary(graph: &OntologyGraph) -> Vec<String> {
    graph
        .class_counts()
        .into_iter()
        .map(|(class, n)| format!("{}: {n}", class.name()))
        .collect()
}

pub fn application_count(graph: &OntologyGraph) -> usize {
    graph.individuals_of(EntityClass::Application).count()
}
