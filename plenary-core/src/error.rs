//! Error types for the extraction pipeline.
//!
//! `ParseError` is always scoped to a single input file and is recorded by the
//! batch processor instead of aborting the run. `WriteError` and `BatchError`
//! are fatal for the whole run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Unrecognized schema in {}: root element <{root}>", file.display())]
    UnrecognizedSchema { file: PathBuf, root: String },

    #[error("Required field `{field}` is missing or empty")]
    MissingField { field: String },

    #[error("Malformed date `{input}`: {reason}")]
    MalformedDate { input: String, reason: String },

    #[error("Field `{field}` is not a positive integer: `{value}`")]
    InvalidInteger { field: String, value: String },
}

impl ParseError {
    pub fn missing(field: &str) -> Self {
        ParseError::MissingField {
            field: field.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ParseError::Io(_) => FailureKind::Io,
            ParseError::Xml(_) => FailureKind::MalformedXml,
            ParseError::UnrecognizedSchema { .. } => FailureKind::UnrecognizedSchema,
            ParseError::MissingField { .. } => FailureKind::MissingField,
            ParseError::MalformedDate { .. } => FailureKind::MalformedDate,
            ParseError::InvalidInteger { .. } => FailureKind::InvalidInteger,
        }
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::Xml(err.to_string())
    }
}

/// Classification of a per-file failure, as written to the failure report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Io,
    MalformedXml,
    UnrecognizedSchema,
    MissingField,
    MalformedDate,
    InvalidInteger,
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Cannot create output file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed writing to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to finalize {}: {source}", path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to discover input files under {}: {source}", dir.display())]
    Discovery {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Batch cancelled after {processed} of {total} files")]
    Cancelled { processed: usize, total: usize },

    #[error("Worker thread panicked while processing files {start}..{end}")]
    WorkerPanicked { start: usize, end: usize },
}
