use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::schema::ColumnType;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Parsing {path:?} as JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path:?} does not contain an array of beatmap records (found {found})")]
    NotRecordArray { path: PathBuf, found: &'static str },
    #[error("Record {index} in {path:?} is {found}, expected an object")]
    NotAnObject {
        path: PathBuf,
        index: usize,
        found: &'static str,
    },
    #[error("Reading CSV cache {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Spread taxonomy needs at least one boundary")]
    EmptyTaxonomy,
    #[error("Spread taxonomy has {boundaries} boundaries but {labels} labels")]
    LabelCountMismatch { boundaries: usize, labels: usize },
    #[error("Spread boundaries must be finite and strictly ascending (offending value {0})")]
    UnorderedBoundaries(f64),
    #[error("Bin spec '{name}' is invalid: {reason}")]
    InvalidBins { name: String, reason: String },
    #[error("Setting '{name}' is invalid: {reason}")]
    InvalidSetting { name: String, reason: String },
    #[error("Reading configuration {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Parsing configuration {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A declared column cell that failed to parse and was kept as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionWarning {
    pub column: String,
    /// 1-based position of the record after deduplication.
    pub record: usize,
    pub raw: String,
    pub expected: ColumnType,
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record {} column '{}': '{}' is not a valid {}",
            self.record, self.column, self.raw, self.expected
        )
    }
}
