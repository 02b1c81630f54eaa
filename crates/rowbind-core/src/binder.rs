//! Row binder: turns a sequence of rows into bound objects

use crate::coerce::coerce;
use crate::error::{Error, Result};
use crate::resolver::{resolve, BindingTable, ExtractionMode};
use crate::schema::{Bindable, TypeSchema};
use crate::table::Row;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Row-level policy for a binding run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindOptions {
    /// Discard the first row in index mode
    pub skip_header: bool,
    /// Stop at the first blank row instead of skipping it
    pub break_on_empty_row: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            skip_header: false,
            break_on_empty_row: true,
        }
    }
}

/// Binds rows to instances of `T` using a binding table resolved once at
/// construction
#[derive(Debug)]
pub struct RowBinder<T> {
    schema: TypeSchema<T>,
    table: BindingTable,
    options: BindOptions,
}

impl<T: Bindable> RowBinder<T> {
    /// Create a binder from the type's own schema
    pub fn for_type(mode: ExtractionMode) -> Result<Self> {
        Self::new(T::schema(), mode)
    }
}

impl<T: Default> RowBinder<T> {
    /// Resolve `schema` for `mode` and create a binder with default options
    pub fn new(schema: TypeSchema<T>, mode: ExtractionMode) -> Result<Self> {
        let table = resolve(&schema, mode)?;
        Ok(Self {
            schema,
            table,
            options: BindOptions::default(),
        })
    }

    /// Replace the binder's options
    pub fn with_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> BindOptions {
        self.options
    }

    pub fn skip_header(&self) -> bool {
        self.options.skip_header
    }

    /// Only consulted in index mode; header mode always consumes the first row
    pub fn set_skip_header(&mut self, skip_header: bool) {
        self.options.skip_header = skip_header;
    }

    pub fn break_on_empty_row(&self) -> bool {
        self.options.break_on_empty_row
    }

    pub fn set_break_on_empty_row(&mut self, break_on_empty_row: bool) {
        self.options.break_on_empty_row = break_on_empty_row;
    }

    pub fn mode(&self) -> ExtractionMode {
        self.table.mode()
    }

    pub fn schema(&self) -> &TypeSchema<T> {
        &self.schema
    }

    /// The table as resolved from the schema, before any header remapping
    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// Bind every row of `rows` in source order.
    ///
    /// In header mode the first row is consumed to resolve header names to
    /// columns. Any coercion or field error aborts the whole run.
    pub fn bind<I>(&self, rows: I) -> Result<Vec<T>>
    where
        I: IntoIterator<Item = Row>,
    {
        let mut rows = rows.into_iter().enumerate();

        let table = match self.table.mode() {
            ExtractionMode::ColumnHeader => match rows.next() {
                Some((_, header_row)) => Cow::Owned(self.table.remap_headers(&header_row)),
                None => return Ok(Vec::new()),
            },
            ExtractionMode::ColumnIndex => {
                if self.options.skip_header {
                    rows.next();
                }
                Cow::Borrowed(&self.table)
            }
        };

        let mut result = Vec::new();
        for (row_num, row) in rows {
            if row.is_blank() {
                if self.options.break_on_empty_row {
                    tracing::debug!(row = row_num, "blank row, stopping");
                    break;
                }
                tracing::debug!(row = row_num, "blank row, skipping");
                continue;
            }

            result.push(self.bind_row_at(&table, &row, row_num)?);
        }

        tracing::debug!(
            type_name = self.schema.type_name(),
            objects = result.len(),
            "bound rows"
        );
        Ok(result)
    }

    /// Bind a single row against the binder's table.
    ///
    /// No blank-row check is made. In header mode the table's headers are
    /// unresolved here, so only [`RowBinder::bind`] binds header fields.
    pub fn bind_row(&self, row: &Row) -> Result<T> {
        self.bind_row_at(&self.table, row, 0)
    }

    fn bind_row_at(&self, table: &BindingTable, row: &Row, row_num: usize) -> Result<T> {
        let mut target = T::default();

        // Only bound columns are read; cells past the end of the row are missing,
        // so their defaults apply
        for (column, binding) in table.columns() {
            let text = row.text(column);
            let value = match text.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => v,
                _ => binding.default_value.trim(),
            };
            if value.is_empty() {
                continue;
            }

            let coerced = coerce(value, binding.data_type).map_err(|e| Error::Coercion {
                row: row_num,
                column,
                field: binding.field_name.clone(),
                value: value.to_string(),
                data_type: binding.data_type,
                source: e,
            })?;

            if let (Some(coerced), Some(field)) = (coerced, self.schema.field(binding.field)) {
                field.set(&mut target, coerced)?;
            }
        }

        Ok(target)
    }
}
