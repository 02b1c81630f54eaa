//! Field-metadata resolution into a column-keyed binding table

use crate::coerce::DataType;
use crate::error::{Error, Result};
use crate::schema::TypeSchema;
use crate::table::Row;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Whether fields are located by column position or by header text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Fields carry a zero-based column index
    #[default]
    #[serde(alias = "index")]
    ColumnIndex,
    /// Fields carry a header string, resolved against the first row
    #[serde(alias = "header")]
    ColumnHeader,
}

/// Key of a binding table entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKey {
    /// Resolved physical column
    Index(usize),
    /// Header text not yet matched against a header row
    Header(String),
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Index(i) => write!(f, "#{}", i),
            ColumnKey::Header(h) => write!(f, "'{}'", h),
        }
    }
}

/// How one column is written into a bound object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    /// Position of the field in the schema's declaration order
    pub field: usize,
    /// Field name, for diagnostics
    pub field_name: String,
    /// Declared data type
    pub data_type: DataType,
    /// Literal substituted for missing or blank cells
    pub default_value: String,
}

/// Lookup from column to field binding, built once per type and mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    mode: ExtractionMode,
    entries: HashMap<ColumnKey, FieldBinding>,
}

impl BindingTable {
    /// Extraction mode this table was resolved for
    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    /// Number of bound fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field is bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binding for a physical column
    pub fn get(&self, column: usize) -> Option<&FieldBinding> {
        self.entries.get(&ColumnKey::Index(column))
    }

    /// Binding still keyed by header text
    pub fn get_header(&self, header: &str) -> Option<&FieldBinding> {
        self.entries.get(&ColumnKey::Header(header.to_string()))
    }

    /// All entries, sorted by key (indexes first, then headers)
    pub fn entries(&self) -> Vec<(&ColumnKey, &FieldBinding)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Bindings keyed by a resolved column, in column order
    pub fn columns(&self) -> Vec<(usize, &FieldBinding)> {
        let mut columns: Vec<(usize, &FieldBinding)> = self
            .entries
            .iter()
            .filter_map(|(k, b)| match k {
                ColumnKey::Index(i) => Some((*i, b)),
                ColumnKey::Header(_) => None,
            })
            .collect();
        columns.sort_unstable_by_key(|(i, _)| *i);
        columns
    }

    /// Header keys that have not been matched to a column
    pub fn unresolved_headers(&self) -> Vec<&str> {
        let mut headers: Vec<&str> = self
            .entries
            .keys()
            .filter_map(|k| match k {
                ColumnKey::Header(h) => Some(h.as_str()),
                ColumnKey::Index(_) => None,
            })
            .collect();
        headers.sort_unstable();
        headers
    }

    /// Rewrite header keys into column keys using a header row.
    ///
    /// Each present cell whose text equals a pending header takes over that
    /// header's binding. A header that appears twice binds to its first
    /// column. Headers missing from the row stay unresolved.
    pub fn remap_headers(&self, header_row: &Row) -> BindingTable {
        let mut remapped = self.clone();

        for (column, cell) in header_row.cells() {
            let key = ColumnKey::Header(cell.to_string_value());
            if let Some(binding) = remapped.entries.remove(&key) {
                tracing::debug!(column, header = %key, field = %binding.field_name, "header resolved");
                remapped.entries.insert(ColumnKey::Index(column), binding);
            }
        }

        for header in remapped.unresolved_headers() {
            tracing::warn!(header, "header not found in first row, field stays unbound");
        }

        remapped
    }
}

/// Build the binding table for a schema and extraction mode.
///
/// Only fields carrying metadata for the active mode are bound. When two
/// fields share a locator, the one declared last wins.
pub fn resolve<T>(schema: &TypeSchema<T>, mode: ExtractionMode) -> Result<BindingTable> {
    if !schema.is_bindable() {
        return Err(Error::NotBindable {
            type_name: schema.type_name().to_string(),
        });
    }

    let mut entries = HashMap::new();

    for (position, field) in schema.fields().iter().enumerate() {
        let spec = match mode {
            ExtractionMode::ColumnIndex => field.column_index(),
            ExtractionMode::ColumnHeader => field.column_header(),
        };
        let Some(spec) = spec else {
            continue;
        };

        let key = match mode {
            ExtractionMode::ColumnIndex => {
                let index = spec.locator.trim().parse::<usize>().map_err(|e| {
                    Error::MalformedLocator {
                        field: field.name().to_string(),
                        literal: spec.locator.clone(),
                        source: e,
                    }
                })?;
                ColumnKey::Index(index)
            }
            ExtractionMode::ColumnHeader => ColumnKey::Header(spec.locator.clone()),
        };

        let data_type =
            DataType::from_name(&spec.data_type).ok_or_else(|| Error::UnknownDataType {
                field: field.name().to_string(),
                name: spec.data_type.clone(),
            })?;

        let binding = FieldBinding {
            field: position,
            field_name: field.name().to_string(),
            data_type,
            default_value: spec.default_value.clone(),
        };

        if let Some(replaced) = entries.insert(key.clone(), binding) {
            tracing::warn!(
                column = %key,
                replaced = %replaced.field_name,
                field = field.name(),
                "duplicate column binding, keeping the last declared field"
            );
        }
    }

    tracing::debug!(
        type_name = schema.type_name(),
        ?mode,
        fields = entries.len(),
        "resolved binding table"
    );

    Ok(BindingTable { mode, entries })
}
