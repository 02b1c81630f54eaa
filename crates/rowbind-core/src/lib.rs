//! rowbind-core: Core library for binding tabular rows to typed objects
//!
//! This library provides functionality to:
//! - Declare which fields of a type bind to which columns, by index or header
//! - Resolve those declarations once into a column-keyed binding table
//! - Bind a sequence of rows into objects, coercing cells to declared types
//! - Read rows from CSV and describe record types in a JSON config

pub mod binder;
pub mod coerce;
pub mod config;
pub mod error;
pub mod resolver;
pub mod schema;
pub mod source;
pub mod table;

pub use binder::{BindOptions, RowBinder};
pub use coerce::{coerce, DataType, FromValue, Value, DATE_FORMAT};
pub use config::{BindingConfig, FieldConfig, Record};
pub use error::{Error, Result};
pub use resolver::{resolve, BindingTable, ColumnKey, ExtractionMode, FieldBinding};
pub use schema::{Bindable, ColumnSpec, FieldDef, SchemaBuilder, TypeSchema};
pub use source::{read_csv, read_csv_str, CsvSourceOptions};
pub use table::{CellValue, Row};
