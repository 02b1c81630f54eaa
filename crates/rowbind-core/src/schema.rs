//! Field metadata declared by bindable types
//!
//! A type opts into row binding by implementing [`Bindable`] and returning a
//! [`TypeSchema`] built with [`TypeSchema::builder`]. The schema lists the
//! type's own fields in declaration order, each with optional column-index
//! and column-header metadata and a setter that writes a coerced value.

use crate::coerce::{FromValue, Value};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A type whose instances can be produced from tabular rows.
///
/// `Default` is the instantiation capability: every accepted row starts
/// from a fresh `T::default()`.
pub trait Bindable: Default {
    fn schema() -> TypeSchema<Self>;
}

/// Binding metadata for one extraction mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column index literal (index mode) or header text (header mode)
    #[serde(alias = "index", alias = "header")]
    pub locator: String,
    /// Declared data type name, `"string"` unless set
    #[serde(default = "default_data_type")]
    pub data_type: String,
    /// Literal used when the cell is missing or blank
    #[serde(default)]
    pub default_value: String,
}

fn default_data_type() -> String {
    "string".to_string()
}

impl ColumnSpec {
    /// Column metadata with the default data type and no default value
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            data_type: default_data_type(),
            default_value: String::new(),
        }
    }

    /// Set the declared data type
    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    /// Set the default value literal
    pub fn default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }
}

type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<()>>;

/// One declared field of a bindable type
pub struct FieldDef<T> {
    name: String,
    column_index: Option<ColumnSpec>,
    column_header: Option<ColumnSpec>,
    setter: Setter<T>,
}

impl<T> FieldDef<T> {
    /// Declare a field with a typed setter
    pub fn new<F>(name: impl Into<String>, setter: fn(&mut T, F)) -> Self
    where
        T: 'static,
        F: FromValue + 'static,
    {
        let name = name.into();
        let field = name.clone();
        Self::with_setter(name, move |target: &mut T, value: Value| {
            let found = value.data_type();
            let converted = F::from_value(value).ok_or_else(|| Error::FieldType {
                field: field.clone(),
                expected: std::any::type_name::<F>(),
                found,
            })?;
            setter(target, converted);
            Ok(())
        })
    }

    /// Declare a field with an arbitrary setter
    pub fn with_setter<S>(name: impl Into<String>, setter: S) -> Self
    where
        S: Fn(&mut T, Value) -> Result<()> + 'static,
    {
        Self {
            name: name.into(),
            column_index: None,
            column_header: None,
            setter: Box::new(setter),
        }
    }

    /// Attach column-index metadata
    pub fn index(mut self, spec: ColumnSpec) -> Self {
        self.column_index = Some(spec);
        self
    }

    /// Attach column-header metadata
    pub fn header(mut self, spec: ColumnSpec) -> Self {
        self.column_header = Some(spec);
        self
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column-index metadata, if declared
    pub fn column_index(&self) -> Option<&ColumnSpec> {
        self.column_index.as_ref()
    }

    /// Column-header metadata, if declared
    pub fn column_header(&self) -> Option<&ColumnSpec> {
        self.column_header.as_ref()
    }

    /// Write a coerced value into `target`
    pub fn set(&self, target: &mut T, value: Value) -> Result<()> {
        (self.setter)(target, value)
    }
}

impl<T> fmt::Debug for FieldDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("column_index", &self.column_index)
            .field("column_header", &self.column_header)
            .finish_non_exhaustive()
    }
}

/// The declared fields of a type, plus its binding-eligibility marker
#[derive(Debug)]
pub struct TypeSchema<T> {
    type_name: String,
    bindable: bool,
    fields: Vec<FieldDef<T>>,
}

impl<T> TypeSchema<T> {
    /// Start building a schema for the named type
    pub fn builder(type_name: impl Into<String>) -> SchemaBuilder<T> {
        SchemaBuilder {
            schema: TypeSchema {
                type_name: type_name.into(),
                bindable: false,
                fields: Vec::new(),
            },
        }
    }

    /// Name of the described type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether the type carries the binding-eligibility marker
    pub fn is_bindable(&self) -> bool {
        self.bindable
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> &[FieldDef<T>] {
        &self.fields
    }

    /// Get a field by its position in the declaration order
    pub fn field(&self, index: usize) -> Option<&FieldDef<T>> {
        self.fields.get(index)
    }
}

/// Builder for [`TypeSchema`]
pub struct SchemaBuilder<T> {
    schema: TypeSchema<T>,
}

impl<T> SchemaBuilder<T> {
    /// Mark the type as eligible for row binding
    pub fn bindable(mut self) -> Self {
        self.schema.bindable = true;
        self
    }

    /// Declare a field
    pub fn field(mut self, field: FieldDef<T>) -> Self {
        self.schema.fields.push(field);
        self
    }

    pub fn build(self) -> TypeSchema<T> {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Invoice {
        fee: Option<f64>,
        reference: String,
    }

    fn invoice_schema() -> TypeSchema<Invoice> {
        TypeSchema::builder("Invoice")
            .bindable()
            .field(
                FieldDef::new("fee", |i: &mut Invoice, v: Option<f64>| i.fee = v).index(
                    ColumnSpec::new("0")
                        .data_type("double")
                        .default_value("2.356"),
                ),
            )
            .field(
                FieldDef::new("reference", |i: &mut Invoice, v: String| i.reference = v)
                    .index(ColumnSpec::new("2"))
                    .header(ColumnSpec::new("Reference")),
            )
            .build()
    }

    #[test]
    fn test_builder_keeps_declaration_order() {
        let schema = invoice_schema();

        assert!(schema.is_bindable());
        assert_eq!(schema.type_name(), "Invoice");
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["fee", "reference"]);
    }

    #[test]
    fn test_column_spec_defaults() {
        let spec = ColumnSpec::new("3");
        assert_eq!(spec.data_type, "string");
        assert_eq!(spec.default_value, "");

        let schema = invoice_schema();
        assert!(schema.fields()[0].column_header().is_none());
        assert_eq!(schema.fields()[1].column_header().unwrap().locator, "Reference");
    }

    #[test]
    fn test_setter_writes_value() {
        let schema = invoice_schema();
        let mut invoice = Invoice::default();

        schema.fields()[0].set(&mut invoice, Value::Double(1.5)).unwrap();
        schema.fields()[1]
            .set(&mut invoice, Value::String("R-1".to_string()))
            .unwrap();

        assert_eq!(invoice.fee, Some(1.5));
        assert_eq!(invoice.reference, "R-1");
    }

    #[test]
    fn test_setter_rejects_wrong_type() {
        let schema = invoice_schema();
        let mut invoice = Invoice::default();

        let err = schema.fields()[0]
            .set(&mut invoice, Value::String("x".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::FieldType { ref field, .. } if field == "fee"));
        assert_eq!(invoice.fee, None);
    }

    #[test]
    fn test_unmarked_schema() {
        let schema: TypeSchema<Invoice> = TypeSchema::builder("Plain").build();
        assert!(!schema.is_bindable());
        assert!(schema.fields().is_empty());
    }
}
