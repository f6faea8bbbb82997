//! Appgraph CLI
//!
//! Builds an OWL ontology of software applications from Wikidata:
//! - `fetch`: run the SPARQL query and save the rows to `Apps.csv`
//! - `build`: read `Apps.csv` back and write the ontology to `App.owl`
//! - `run`: both, in sequence
//! - `inspect`: summarize a saved ontology
//! - `query`: print the SPARQL text that `fetch` would send

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

mod config;
mod logging;
mod pipeline;

use config::{FetchArgs, DEFAULT_CSV_PATH, DEFAULT_OWL_PATH};

#[derive(Parser)]
#[command(name = "appgraph")]
#[command(
    author,
    version,
    about = "Appgraph: software application facts from Wikidata as an OWL ontology"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct CsvArg {
    /// Tabular artifact path
    #[arg(long, default_value = DEFAULT_CSV_PATH)]
    csv: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct OntologyArgs {
    /// Ontology artifact path
    #[arg(long, default_value = DEFAULT_OWL_PATH)]
    owl: PathBuf,

    /// Ontology namespace IRI
    #[arg(long, default_value = appgraph_owl::DEFAULT_NAMESPACE)]
    namespace: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, save the table, then build and save the ontology.
    Run {
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        csv: CsvArg,
        #[command(flatten)]
        ontology: OntologyArgs,
    },

    /// Fetch rows from the SPARQL endpoint and save them as CSV.
    Fetch {
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        csv: CsvArg,
    },

    /// Build the ontology from a previously saved CSV.
    Build {
        #[command(flatten)]
        csv: CsvArg,
        #[command(flatten)]
        ontology: OntologyArgs,
    },

    /// Summarize a saved ontology file.
    Inspect {
        /// Ontology file to read
        #[arg(default_value = DEFAULT_OWL_PATH)]
        owl: PathBuf,

        /// Print the full summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the SPARQL query text.
    Query {
        #[command(flatten)]
        fetch: FetchArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Run {
            fetch,
            csv,
            ontology,
        } => {
            cmd_fetch(&fetch, &csv.csv)?;
            cmd_build(&csv.csv, &ontology.owl, &ontology.namespace)?;
        }
        Commands::Fetch { fetch, csv } => cmd_fetch(&fetch, &csv.csv)?,
        Commands::Build { csv, ontology } => {
            cmd_build(&csv.csv, &ontology.owl, &ontology.namespace)?
        }
        Commands::Inspect { owl, json } => cmd_inspect(&owl, json)?,
        Commands::Query { fetch } => {
            let config = fetch.resolve()?;
            print!("{}", config.query);
        }
    }
    Ok(())
}

fn cmd_fetch(args: &FetchArgs, csv: &Path) -> Result<()> {
    let config = args.resolve()?;
    tracing::info!(endpoint = %config.sparql.endpoint, "querying");

    let rows = pipeline::fetch_to_csv(&config, csv)?;
    tracing::info!(rows = rows.len(), "fetched rows");
    println!("{} {}", "SPARQL results saved to".green().bold(), csv.display());
    Ok(())
}

fn cmd_build(csv: &Path, owl: &Path, namespace: &str) -> Result<()> {
    let graph = pipeline::build_from_csv(csv, owl, namespace)?;
    tracing::info!(
        applications = pipeline::application_count(&graph),
        "ontology populated"
    );
    for line in pipeline::class_summary(&graph) {
        tracing::info!("{line}");
    }
    println!("{} {}", "Ontology saved to".green().bold(), owl.display());
    Ok(())
}

fn cmd_inspect(owl: &Path, json: bool) -> Result<()> {
    let ontology = appgraph_owl::load_rdfxml(owl)
        .with_context(|| format!("failed to read ontology {}", owl.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ontology)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Ontology".green().bold(),
        ontology.iri.as_deref().unwrap_or("<unnamed>")
    );
    println!("  triples:     {}", ontology.triples);
    println!("  classes:     {}", ontology.classes.len());
    println!("  properties:  {}", ontology.properties.len());
    println!("  individuals: {}", ontology.individuals.len());
    for class in appgraph_owl::EntityClass::ALL {
        let n = ontology.individuals_of(class.name()).count();
        println!("    {}: {n}", class.name());
    }
    Ok(())
}
