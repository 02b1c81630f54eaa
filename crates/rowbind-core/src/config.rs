//! JSON binding configuration for records whose fields are known only at
//! runtime
//!
//! A config file names the target type, carries its binding-eligibility
//! marker, and lists its fields with their column metadata. It produces a
//! [`TypeSchema`] over [`Record`], so the same binder drives both static
//! Rust types and config-described records.

use crate::binder::{BindOptions, RowBinder};
use crate::coerce::Value;
use crate::error::{Error, Result};
use crate::resolver::ExtractionMode;
use crate::schema::{ColumnSpec, FieldDef, TypeSchema};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::Path;

/// A binding configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Name of the record type
    pub name: String,
    /// Binding-eligibility marker
    #[serde(default)]
    pub bindable: bool,
    /// Extraction mode
    #[serde(default)]
    pub mode: ExtractionMode,
    /// Row-level options
    #[serde(default)]
    pub options: BindOptions,
    /// Declared fields, in order
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// One declared field of a config-described record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<ColumnSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_header: Option<ColumnSpec>,
}

impl BindingConfig {
    /// Load a binding config from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parse a binding config from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(Error::Json)
    }

    /// Save the binding config to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Build the record schema described by this config
    pub fn schema(&self) -> TypeSchema<Record> {
        let mut builder = TypeSchema::builder(self.name.clone());
        if self.bindable {
            builder = builder.bindable();
        }

        for field in &self.fields {
            let key = field.name.clone();
            let mut def = FieldDef::with_setter(field.name.clone(), move |record: &mut Record, value| {
                record.set(key.clone(), value);
                Ok(())
            });
            if let Some(spec) = &field.column_index {
                def = def.index(spec.clone());
            }
            if let Some(spec) = &field.column_header {
                def = def.header(spec.clone());
            }
            builder = builder.field(def);
        }

        builder.build()
    }

    /// Resolve the schema and create a binder with the configured mode and
    /// options
    pub fn binder(&self) -> Result<RowBinder<Record>> {
        Ok(RowBinder::new(self.schema(), self.mode)?.with_options(self.options))
    }
}

/// A bound object whose fields are named at runtime.
///
/// Fields keep the order in which they were first written; unset fields
/// are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Set a field value, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((name, value)),
        }
    }

    /// Iterate over set fields
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} : {}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;

    const INVOICE_CONFIG: &str = r#"{
        "name": "Invoice",
        "bindable": true,
        "mode": "column_index",
        "options": { "skip_header": true },
        "fields": [
            { "name": "fee", "column_index": { "index": "0", "data_type": "double", "default_value": "2.356" } },
            { "name": "total_cost", "column_index": { "index": "1", "data_type": "double" } },
            { "name": "reference", "column_index": { "index": "2" }, "column_header": { "header": "Reference" } }
        ]
    }"#;

    #[test]
    fn test_parse_config() {
        let config = BindingConfig::from_json(INVOICE_CONFIG).unwrap();

        assert_eq!(config.name, "Invoice");
        assert!(config.bindable);
        assert_eq!(config.mode, ExtractionMode::ColumnIndex);
        assert!(config.options.skip_header);
        assert!(config.options.break_on_empty_row);
        assert_eq!(config.fields.len(), 3);

        let reference = config.fields[2].column_index.as_ref().unwrap();
        assert_eq!(reference.locator, "2");
        assert_eq!(reference.data_type, "string");
        assert_eq!(config.fields[2].column_header.as_ref().unwrap().locator, "Reference");
    }

    #[test]
    fn test_config_defaults() {
        let config = BindingConfig::from_json(r#"{ "name": "Empty" }"#).unwrap();

        assert!(!config.bindable);
        assert_eq!(config.mode, ExtractionMode::ColumnIndex);
        assert_eq!(config.options, BindOptions::default());
        assert!(config.fields.is_empty());
    }

    #[test]
    fn test_mode_aliases() {
        let config =
            BindingConfig::from_json(r#"{ "name": "H", "bindable": true, "mode": "header" }"#)
                .unwrap();
        assert_eq!(config.mode, ExtractionMode::ColumnHeader);
    }

    #[test]
    fn test_config_binder() {
        let config = BindingConfig::from_json(INVOICE_CONFIG).unwrap();
        let binder = config.binder().unwrap();
        let rows = vec![
            Row::from_strs(["Fee", "Total", "Ref"]),
            Row::from_strs(["", "10", "INV-1"]),
            Row::from_strs(["1.5", "20", ""]),
        ];

        let records = binder.bind(rows).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("fee"), Some(&Value::Double(2.356)));
        assert_eq!(records[0].get("reference"), Some(&Value::String("INV-1".to_string())));
        assert_eq!(records[1].get("fee"), Some(&Value::Double(1.5)));
        assert_eq!(records[1].get("reference"), None);
    }

    #[test]
    fn test_unmarked_config_is_rejected() {
        let config = BindingConfig::from_json(r#"{ "name": "Plain" }"#).unwrap();
        let err = config.binder().unwrap_err();
        assert!(matches!(err, Error::NotBindable { .. }));
    }

    #[test]
    fn test_record_json_keeps_field_order() {
        let mut record = Record::new();
        record.set("z", Value::Int(1));
        record.set("a", Value::String("x".to_string()));
        record.set("z", Value::Int(2));

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"z":2,"a":"x"}"#);
        assert_eq!(record.len(), 2);
        assert_eq!(record.to_string(), "z : 2\na : x");
    }

    #[test]
    fn test_save_and_load() {
        let config = BindingConfig::from_json(INVOICE_CONFIG).unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();

        config.save(file.path()).unwrap();
        let loaded = BindingConfig::load(file.path()).unwrap();

        assert_eq!(loaded.fields.len(), 3);
        assert_eq!(loaded.options, config.options);
    }
}
