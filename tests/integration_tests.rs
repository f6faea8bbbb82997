//! Integration tests for the complete Appgraph pipeline
//!
//! These tests verify end-to-end functionality across crates without
//! touching the network:
//! - SPARQL JSON results → rows → `Apps.csv`
//! - `Apps.csv` → ontology graph → `App.owl`
//! - `App.owl` → RDF/XML read-back
//!
//! Run with: cargo test --test integration_tests

use appgraph_owl::{EntityClass, Relation};
use appgraph_tabular::{Column, Row, HEADER};
use tempfile::tempdir;

const NS: &str = appgraph_owl::DEFAULT_NAMESPACE;

fn iri(class: EntityClass, label: &str) -> String {
    format!("{NS}#{}/{label}", class.name())
}

// ============================================================================
// SPARQL results → CSV
// ============================================================================

fn results_json(rows: &[[&str; 6]]) -> String {
    let bindings: Vec<serde_json::Value> = rows
        .iter()
        .map(|fields| {
            let mut binding = serde_json::Map::new();
            for (column, value) in Column::ALL.into_iter().zip(fields.iter()) {
                binding.insert(
                    appgraph_sparql::result_variable(column).to_string(),
                    serde_json::json!({ "type": "literal", "xml:lang": "en", "value": value }),
                );
            }
            serde_json::Value::Object(binding)
        })
        .collect();

    serde_json::json!({
        "head": { "vars": appgraph_sparql::RESULT_VARIABLES },
        "results": { "bindings": bindings }
    })
    .to_string()
}

#[test]
fn test_results_document_to_csv() {
    let body = results_json(&[
        ["AppA", "DevX", "Linux", "C++", "MIT", "Copyrighted"],
        ["Tool, Pro", "Acme \"Labs\"", "Windows", "Rust", "Apache-2.0", "copyrighted"],
    ]);
    let rows = appgraph_sparql::parse_select_results(&body).expect("results should decode");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].developer, "Acme \"Labs\"");

    let dir = tempdir().unwrap();
    let csv = dir.path().join("Apps.csv");
    appgraph_tabular::write_rows(&csv, &rows).unwrap();

    let text = std::fs::read_to_string(&csv).unwrap();
    assert!(text.starts_with("App,Developer,OperatingSystem,Language,License,CopyrightStatus\r\n"));
    assert!(text.contains("\"Tool, Pro\",\"Acme \"\"Labs\"\"\""));

    let table = appgraph_tabular::read_table(&csv).unwrap();
    assert_eq!(table.columns(), HEADER);
    assert_eq!(table.rows(), rows.as_slice());
}

#[test]
fn test_empty_results_yield_header_only_csv() {
    let rows = appgraph_sparql::parse_select_results(&results_json(&[])).unwrap();
    assert!(rows.is_empty());

    let dir = tempdir().unwrap();
    let csv = dir.path().join("Apps.csv");
    appgraph_tabular::write_rows(&csv, &rows).unwrap();

    let table = appgraph_tabular::read_table(&csv).unwrap();
    assert!(table.is_empty());

    let graph = appgraph_owl::build_ontology(NS, table.rows()).unwrap();
    assert!(graph.is_empty());
    assert_eq!(graph.schema().classes().len(), 6);
    assert_eq!(graph.schema().relations().len(), 5);
}

// ============================================================================
// CSV → ontology → RDF/XML
// ============================================================================

#[test]
fn test_single_row_end_to_end() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("Apps.csv");
    let owl = dir.path().join("App.owl");

    let row = Row::new("AppA", "DevX", "Linux", "C++", "MIT", "Copyrighted");
    appgraph_tabular::write_rows(&csv, std::slice::from_ref(&row)).unwrap();

    let text = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(text.lines().count(), 2, "header plus exactly one data row");

    let table = appgraph_tabular::read_table(&csv).unwrap();
    let graph = appgraph_owl::build_ontology(NS, table.rows()).unwrap();
    assert_eq!(graph.len(), 6);
    assert_eq!(graph.edge_count(), 5);

    let app = graph.find(EntityClass::Application, "AppA").unwrap();
    assert_eq!(graph.relation_label(app, Relation::DevelopedBy), Some("DevX"));
    assert_eq!(graph.relation_label(app, Relation::RunsOn), Some("Linux"));
    assert_eq!(graph.relation_label(app, Relation::WrittenIn), Some("C++"));
    assert_eq!(graph.relation_label(app, Relation::LicensedUnder), Some("MIT"));
    assert_eq!(
        graph.relation_label(app, Relation::CopyrightStatusOf),
        Some("Copyrighted")
    );

    appgraph_owl::save_rdfxml(&graph, &owl).unwrap();
    let loaded = appgraph_owl::load_rdfxml(&owl).expect("saved ontology should parse");

    assert_eq!(loaded.iri.as_deref(), Some(NS));
    assert_eq!(loaded.classes.len(), 6);
    assert_eq!(loaded.properties.len(), 5);
    assert_eq!(loaded.individuals.len(), 6);

    let app = loaded.individual("AppA").unwrap();
    let expect = [
        (Relation::DevelopedBy, "DevX"),
        (Relation::RunsOn, "Linux"),
        (Relation::WrittenIn, "C++"),
        (Relation::LicensedUnder, "MIT"),
        (Relation::CopyrightStatusOf, "Copyrighted"),
    ];
    for (relation, label) in expect {
        let values: Vec<&str> = app.values(relation.name()).collect();
        let target = iri(relation.range(), label);
        assert_eq!(values, vec![target.as_str()], "{}", relation.name());
    }
}

#[test]
fn test_shared_entities_are_deduplicated() {
    let rows = vec![
        Row::new("AppA", "DevX", "Linux", "C++", "MIT", "Copyrighted"),
        Row::new("AppB", "DevX", "Linux", "Rust", "MIT", "Copyrighted"),
        Row::new("AppC", "DevY", "Windows", "C++", "GPL", "Copyrighted"),
    ];
    let graph = appgraph_owl::build_ontology(NS, &rows).unwrap();

    let counts: Vec<(EntityClass, usize)> = graph.class_counts();
    assert_eq!(
        counts,
        vec![
            (EntityClass::Application, 3),
            (EntityClass::Developer, 2),
            (EntityClass::OperatingSystem, 2),
            (EntityClass::Language, 2),
            (EntityClass::License, 2),
            (EntityClass::CopyrightStatus, 1),
        ]
    );
    assert_eq!(graph.edge_count(), 15);
}

#[test]
fn test_repeated_application_keeps_last_values() {
    let dir = tempdir().unwrap();
    let owl = dir.path().join("App.owl");

    let rows = vec![
        Row::new("AppA", "DevX", "Linux", "C++", "MIT", "Copyrighted"),
        Row::new("AppA", "DevX", "Windows", "C++", "MIT", "Copyrighted"),
    ];
    let graph = appgraph_owl::build_ontology(NS, &rows).unwrap();
    assert_eq!(graph.individuals_of(EntityClass::Application).count(), 1);

    let app = graph.find(EntityClass::Application, "AppA").unwrap();
    assert_eq!(graph.relation_label(app, Relation::RunsOn), Some("Windows"));
    // Linux was created by the first row and stays an individual.
    assert!(graph.find(EntityClass::OperatingSystem, "Linux").is_some());

    appgraph_owl::save_rdfxml(&graph, &owl).unwrap();
    let loaded = appgraph_owl::load_rdfxml(&owl).unwrap();
    let app = loaded.individual("AppA").unwrap();
    let os: Vec<&str> = app.values("runs_on").collect();
    assert_eq!(os, vec![iri(EntityClass::OperatingSystem, "Windows").as_str()]);
}

#[test]
fn test_saved_ontology_reproduces_the_built_graph() {
    let dir = tempdir().unwrap();
    let owl = dir.path().join("App.owl");

    // App shares its label with its OS, and the license is named after a class.
    let rows = vec![
        Row::new("Linux", "DevX", "Linux", "C", "License", "Copyrighted"),
        Row::new("AppB", "DevX", "Windows", "C", "MIT", "Copyrighted"),
    ];
    let graph = appgraph_owl::build_ontology(NS, &rows).unwrap();
    appgraph_owl::save_rdfxml(&graph, &owl).unwrap();
    let loaded = appgraph_owl::load_rdfxml(&owl).unwrap();

    assert_eq!(loaded.classes.len(), 6);
    assert_eq!(loaded.individuals.len(), graph.len());
    for (class, n) in graph.class_counts() {
        assert_eq!(loaded.individuals_of(class.name()).count(), n, "{}", class.name());
    }

    let app = loaded.find("Application", "Linux").unwrap();
    let runs_on: Vec<&str> = app.values("runs_on").collect();
    assert_eq!(runs_on, vec![iri(EntityClass::OperatingSystem, "Linux").as_str()]);
    assert_ne!(app.iri, runs_on[0]);

    let license = loaded.find("License", "License").unwrap();
    assert_eq!(license.types, vec![format!("{NS}#License")]);
}

#[test]
fn test_schema_mismatch_stops_before_ontology() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("Apps.csv");
    std::fs::write(&csv, "App,Developer,OS,Language,License,CopyrightStatus\r\n").unwrap();

    let err = appgraph_tabular::read_table(&csv).unwrap_err();
    assert!(matches!(
        err,
        appgraph_tabular::TabularError::SchemaMismatch { .. }
    ));
}
