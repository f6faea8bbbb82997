//! Tabular persistence for fetched application rows.
//!
//! Rows travel from the SPARQL fetcher to the ontology builder through a CSV
//! file (`Apps.csv`), not through memory:
//!
//! - [`write_rows`] writes the fixed six-column header and one record per row
//!   (RFC 4180 quoting, CRLF record terminators).
//! - [`read_table`] parses the file back into a [`Table`] indexed by column
//!   name, rejecting anything that does not expose exactly the six expected
//!   columns.
//!
//! All fields are text. Nothing is coerced on the way back in.

pub mod csv;

use std::path::PathBuf;

pub use crate::csv::{read_table, read_table_str, write_rows, write_rows_to};

/// Column names of the persisted table, in order.
pub const HEADER: [&str; 6] = [
    "App",
    "Developer",
    "OperatingSystem",
    "Language",
    "License",
    "CopyrightStatus",
];

// ============================================================================
// Row model
// ============================================================================

/// One of the six fixed columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    App,
    Developer,
    OperatingSystem,
    Language,
    License,
    CopyrightStatus,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::App,
        Column::Developer,
        Column::OperatingSystem,
        Column::Language,
        Column::License,
        Column::CopyrightStatus,
    ];

    pub fn name(self) -> &'static str {
        HEADER[self.index()]
    }

    pub fn index(self) -> usize {
        match self {
            Column::App => 0,
            Column::Developer => 1,
            Column::OperatingSystem => 2,
            Column::Language => 3,
            Column::License => 4,
            Column::CopyrightStatus => 5,
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// One fetched record. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    pub app: String,
    pub developer: String,
    pub operating_system: String,
    pub language: String,
    pub license: String,
    pub copyright_status: String,
}

impl Row {
    pub fn new(
        app: impl Into<String>,
        developer: impl Into<String>,
        operating_system: impl Into<String>,
        language: impl Into<String>,
        license: impl Into<String>,
        copyright_status: impl Into<String>,
    ) -> Self {
        Self {
            app: app.into(),
            developer: developer.into(),
            operating_system: operating_system.into(),
            language: language.into(),
            license: license.into(),
            copyright_status: copyright_status.into(),
        }
    }

    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::App => &self.app,
            Column::Developer => &self.developer,
            Column::OperatingSystem => &self.operating_system,
            Column::Language => &self.language,
            Column::License => &self.license,
            Column::CopyrightStatus => &self.copyright_status,
        }
    }

    /// Fields in header order.
    pub fn fields(&self) -> [&str; 6] {
        Column::ALL.map(|c| self.get(c))
    }

    fn from_fields(mut fields: Vec<String>) -> Option<Self> {
        if fields.len() != HEADER.len() {
            return None;
        }
        let copyright_status = fields.pop()?;
        let license = fields.pop()?;
        let language = fields.pop()?;
        let operating_system = fields.pop()?;
        let developer = fields.pop()?;
        let app = fields.pop()?;
        Some(Self {
            app,
            developer,
            operating_system,
            language,
            license,
            copyright_status,
        })
    }
}

// ============================================================================
// Table
// ============================================================================

/// Rows read back from storage, addressable by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// All values of one column, in row order. The header was checked on
    /// load, so every [`HEADER`] name resolves.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let column = Column::from_name(name)?;
        Some(self.rows.iter().map(|r| r.get(column)).collect())
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TabularError {
    #[error("storage failure on {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schema mismatch: expected columns {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("malformed record {record}: {reason}")]
    Malformed { record: usize, reason: String },
}
