//! Effective run configuration.
//!
//! Every setting resolves with the same precedence:
//! 1) explicit command-line flag
//! 2) environment variable
//! 3) built-in default

use anyhow::{anyhow, Context, Result};
use appgraph_sparql::{SparqlConfig, DEFAULT_ENDPOINT, DEFAULT_LANGUAGE, DEFAULT_USER_AGENT};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const APPGRAPH_SPARQL_ENDPOINT_ENV: &str = "APPGRAPH_SPARQL_ENDPOINT";
pub const APPGRAPH_LABEL_LANGUAGE_ENV: &str = "APPGRAPH_LABEL_LANGUAGE";
pub const APPGRAPH_USER_AGENT_ENV: &str = "APPGRAPH_USER_AGENT";
pub const APPGRAPH_HTTP_TIMEOUT_SECS_ENV: &str = "APPGRAPH_HTTP_TIMEOUT_SECS";

pub const DEFAULT_CSV_PATH: &str = "Apps.csv";
pub const DEFAULT_OWL_PATH: &str = "App.owl";

#[derive(Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// SPARQL endpoint URL (env: APPGRAPH_SPARQL_ENDPOINT).
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Label language for the query (env: APPGRAPH_LABEL_LANGUAGE).
    #[arg(long)]
    pub language: Option<String>,

    /// HTTP User-Agent (env: APPGRAPH_USER_AGENT).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds; 0 waits forever (env: APPGRAPH_HTTP_TIMEOUT_SECS).
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Read the query text from a file instead of the built-in query.
    #[arg(long)]
    pub query_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub sparql: SparqlConfig,
    pub query: String,
}

impl FetchArgs {
    pub fn resolve(&self) -> Result<FetchConfig> {
        let endpoint = setting(self.endpoint.clone(), APPGRAPH_SPARQL_ENDPOINT_ENV)?
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let user_agent = setting(self.user_agent.clone(), APPGRAPH_USER_AGENT_ENV)?
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let timeout = http_timeout(self.timeout_secs)?;

        let query = match &self.query_file {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read query file {}", path.display()))?,
            None => {
                let language = setting(self.language.clone(), APPGRAPH_LABEL_LANGUAGE_ENV)?
                    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
                appgraph_sparql::software_query(&language)
            }
        };

        Ok(FetchConfig {
            sparql: SparqlConfig {
                endpoint,
                user_agent,
                timeout,
            },
            query,
        })
    }
}

/// Flag value, else a non-empty env var, else `None`.
fn setting(flag: Option<String>, env: &str) -> Result<Option<String>> {
    if flag.is_some() {
        return Ok(flag);
    }
    match std::env::var(env) {
        Ok(v) if v.trim().is_empty() => Ok(None),
        Ok(v) => Ok(Some(v.trim().to_string())),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(anyhow!("failed to read {env}: {e}")),
    }
}

/// Semantics: `0` (or unset) disables the timeout.
fn http_timeout(flag: Option<u64>) -> Result<Option<Duration>> {
    let secs = match flag {
        Some(v) => v,
        None => match setting(None, APPGRAPH_HTTP_TIMEOUT_SECS_ENV)? {
            Some(v) => v.parse::<u64>().map_err(|_| {
                anyhow!(
                    "invalid {APPGRAPH_HTTP_TIMEOUT_SECS_ENV}={v:?} (expected integer seconds; 0 disables)"
                )
            })?,
            None => 0,
        },
    };
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
