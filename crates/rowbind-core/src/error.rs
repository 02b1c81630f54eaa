//! Error types for rowbind-core

use crate::coerce::{CoercionError, DataType};
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rowbind-core
#[derive(Debug, Error)]
pub enum Error {
    /// The target type does not carry the binding-eligibility marker
    #[error("type '{type_name}' is not marked as bindable")]
    NotBindable { type_name: String },

    /// A column index literal could not be parsed
    #[error("malformed column index '{literal}' on field '{field}': {source}")]
    MalformedLocator {
        field: String,
        literal: String,
        #[source]
        source: ParseIntError,
    },

    /// A field declares a data type the coercer does not know
    #[error("unknown data type '{name}' on field '{field}'")]
    UnknownDataType { field: String, name: String },

    /// A cell value could not be converted to the field's declared type
    #[error("row {row}, column {column}: cannot convert '{value}' to {data_type} for field '{field}': {source}")]
    Coercion {
        row: usize,
        column: usize,
        field: String,
        value: String,
        data_type: DataType,
        #[source]
        source: CoercionError,
    },

    /// A field setter received a value of the wrong scalar type
    #[error("field '{field}' expects {expected}, got a {found} value")]
    FieldType {
        field: String,
        expected: &'static str,
        found: DataType,
    },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
