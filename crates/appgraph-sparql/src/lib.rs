//! SPARQL endpoint client (network boundary).
//!
//! Issues one blocking SELECT request against a SPARQL 1.1 endpoint and maps
//! the JSON result bindings onto [`Row`]s. There is no retry, pagination or
//! caching: a failure anywhere surfaces as a single [`FetchError`].
//!
//! The default query targets Wikidata and asks for six labels per software
//! item. Every variable is bound through a required pattern, so a result
//! missing any of them is treated as a contract violation rather than a gap.

pub mod query;

use appgraph_tabular::{Column, Row};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

pub use crate::query::{software_query, DEFAULT_LANGUAGE};

pub const DEFAULT_ENDPOINT: &str = "https://query.wikidata.org/sparql";
pub const DEFAULT_USER_AGENT: &str = concat!("appgraph/", env!("CARGO_PKG_VERSION"));
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Result variable bound for each column, in header order.
pub const RESULT_VARIABLES: [&str; 6] = [
    "AppLabel",
    "DeveloperLabel",
    "OSLabel",
    "LanguageLabel",
    "LicenseLabel",
    "CopyrightStatusLabel",
];

pub fn result_variable(column: Column) -> &'static str {
    RESULT_VARIABLES[column.index()]
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid endpoint url {url:?}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid user agent {value:?}: {source}")]
    InvalidUserAgent {
        value: String,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("endpoint returned http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed SPARQL results: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("result {index} has no binding for ?{variable}")]
    MissingBinding { index: usize, variable: &'static str },
}

// ============================================================================
// Response model (SPARQL 1.1 Query Results JSON)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SelectResponse {
    results: SelectResults,
}

#[derive(Debug, Deserialize)]
struct SelectResults {
    bindings: Vec<HashMap<String, BindingValue>>,
}

#[derive(Debug, Deserialize)]
struct BindingValue {
    value: String,
}

/// Decode a SPARQL JSON results document into rows, preserving endpoint order.
pub fn parse_select_results(body: &str) -> Result<Vec<Row>, FetchError> {
    let response: SelectResponse = serde_json::from_str(body)?;

    let mut rows = Vec::with_capacity(response.results.bindings.len());
    for (index, mut binding) in response.results.bindings.into_iter().enumerate() {
        let mut take = |column: Column| -> Result<String, FetchError> {
            let variable = result_variable(column);
            binding
                .remove(variable)
                .map(|v| v.value)
                .ok_or(FetchError::MissingBinding { index, variable })
        };
        rows.push(Row {
            app: take(Column::App)?,
            developer: take(Column::Developer)?,
            operating_system: take(Column::OperatingSystem)?,
            language: take(Column::Language)?,
            license: take(Column::License)?,
            copyright_status: take(Column::CopyrightStatus)?,
        });
    }
    Ok(rows)
}

// ============================================================================
// Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct SparqlConfig {
    pub endpoint: String,
    pub user_agent: String,
    /// `None` blocks until the endpoint answers.
    pub timeout: Option<Duration>,
}

impl Default for SparqlConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

pub struct SparqlClient {
    client: Client,
    endpoint: Url,
}

impl SparqlClient {
    pub fn new(config: &SparqlConfig) -> Result<Self, FetchError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|source| FetchError::InvalidEndpoint {
            url: config.endpoint.clone(),
            source,
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(SPARQL_RESULTS_JSON));
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|source| {
            FetchError::InvalidUserAgent {
                value: config.user_agent.clone(),
                source,
            }
        })?;
        headers.insert(USER_AGENT, user_agent);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| FetchError::Http {
            endpoint: endpoint.to_string(),
            source,
        })?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Request URL for `query`: the endpoint with `query` and `format` params.
    pub fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("format", "json");
        url
    }

    /// Run `query` and decode its bindings.
    pub fn select_rows(&self, query: &str) -> Result<Vec<Row>, FetchError> {
        let url = self.request_url(query);
        tracing::debug!(endpoint = %self.endpoint, bytes = query.len(), "sending SPARQL query");

        let http = |source| FetchError::Http {
            endpoint: self.endpoint.to_string(),
            source,
        };
        let resp = self.client.get(url).send().map_err(http)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().map_err(http)?;
        let rows = parse_select_results(&body)?;
        tracing::info!(endpoint = %self.endpoint, rows = rows.len(), "fetched SPARQL results");
        Ok(rows)
    }
}
