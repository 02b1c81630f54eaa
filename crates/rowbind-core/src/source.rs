//! CSV row source

use crate::error::{Error, Result};
use crate::table::{CellValue, Row};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Options for reading delimited text into rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvSourceOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Produce numeric cells for fields that parse as numbers
    pub detect_numbers: bool,
}

impl Default for CsvSourceOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            detect_numbers: false,
        }
    }
}

/// Read a CSV file into rows.
///
/// Every record becomes a row, the first one included. Empty fields become
/// missing cells.
pub fn read_csv<P: AsRef<Path>>(path: P, options: &CsvSourceOptions) -> Result<Vec<Row>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    read_rows(BufReader::new(file), path.to_path_buf(), options)
}

/// Read CSV from a string (useful for testing)
pub fn read_csv_str(content: &str, source_name: &str, options: &CsvSourceOptions) -> Result<Vec<Row>> {
    read_rows(content.as_bytes(), PathBuf::from(source_name), options)
}

fn read_rows<R: Read>(reader: R, path: PathBuf, options: &CsvSourceOptions) -> Result<Vec<Row>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // Allow varying number of fields
        .delimiter(options.delimiter)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        let cells = record
            .iter()
            .map(|field| to_cell(field, options.detect_numbers))
            .collect();

        rows.push(Row::new(cells));
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "read CSV rows");
    Ok(rows)
}

fn to_cell(field: &str, detect_numbers: bool) -> Option<CellValue> {
    if field.is_empty() {
        return None;
    }
    if detect_numbers {
        Some(CellValue::parse(field))
    } else {
        Some(CellValue::Text(field.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_simple_csv() {
        let csv = "fee,total\n2.5,100\n";
        let rows = read_csv_str(csv, "test.csv", &CsvSourceOptions::default()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text(0).as_deref(), Some("fee"));
        assert_eq!(rows[1].get(1), Some(&CellValue::Text("100".to_string())));
    }

    #[test]
    fn test_read_with_empty_fields() {
        let csv = "a,,c\n,,\n";
        let rows = read_csv_str(csv, "test.csv", &CsvSourceOptions::default()).unwrap();

        assert_eq!(rows[0].get(1), None);
        assert_eq!(rows[0].last_cell_num(), 3);
        assert!(rows[1].is_blank());
        assert_eq!(rows[1].last_cell_num(), 0);
    }

    #[test]
    fn test_read_ragged_rows() {
        let csv = "1,2,3\n4\n";
        let rows = read_csv_str(csv, "test.csv", &CsvSourceOptions::default()).unwrap();

        assert_eq!(rows[0].last_cell_num(), 3);
        assert_eq!(rows[1].last_cell_num(), 1);
    }

    #[test]
    fn test_detect_numbers() {
        let options = CsvSourceOptions {
            detect_numbers: true,
            ..CsvSourceOptions::default()
        };
        let rows = read_csv_str("7.0,abc, \n", "test.csv", &options).unwrap();

        assert_eq!(rows[0].get(0), Some(&CellValue::Number(7.0)));
        assert_eq!(rows[0].text(0).as_deref(), Some("7"));
        assert_eq!(rows[0].get(1), Some(&CellValue::Text("abc".to_string())));
        assert_eq!(rows[0].get(2), Some(&CellValue::Blank));
    }

    #[test]
    fn test_custom_delimiter() {
        let options = CsvSourceOptions {
            delimiter: b';',
            ..CsvSourceOptions::default()
        };
        let rows = read_csv_str("a;b\n", "test.csv", &options).unwrap();

        assert_eq!(rows[0].text(1).as_deref(), Some("b"));
    }

    #[test]
    fn test_read_csv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "x,y").unwrap();
        writeln!(file, "1,2").unwrap();

        let rows = read_csv(file.path(), &CsvSourceOptions::default()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_csv("does/not/exist.csv", &CsvSourceOptions::default()).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
