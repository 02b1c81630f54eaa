//! Row and cell types consumed by the binder

use crate::coerce::DATE_FORMAT;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single row of tabular data.
///
/// Slots are indexed by physical column. A `None` slot is a missing cell,
/// which is distinct from a present but blank one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<Option<CellValue>>,
}

impl Row {
    /// Create a new row from its cell slots
    pub fn new(cells: Vec<Option<CellValue>>) -> Self {
        Self { cells }
    }

    /// Create a row where every slot holds a text cell
    pub fn from_strs<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            values
                .into_iter()
                .map(|v| Some(CellValue::Text(v.into())))
                .collect(),
        )
    }

    /// Get a cell by column index, `None` if the cell is missing
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index).and_then(|c| c.as_ref())
    }

    /// Iterate over present cells with their column index
    pub fn cells(&self) -> impl Iterator<Item = (usize, &CellValue)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i, c)))
    }

    /// Index of the first present cell (0 for a row without cells)
    pub fn first_cell_num(&self) -> usize {
        self.cells.iter().position(Option::is_some).unwrap_or(0)
    }

    /// One past the index of the last present cell (0 for a row without cells)
    pub fn last_cell_num(&self) -> usize {
        self.cells
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |i| i + 1)
    }

    /// Normalized text of the cell at `index`, `None` if the cell is missing
    pub fn text(&self, index: usize) -> Option<String> {
        self.get(index).map(CellValue::to_string_value)
    }

    /// A row is blank when every cell in its populated range is missing,
    /// blank, or renders as whitespace
    pub fn is_blank(&self) -> bool {
        (self.first_cell_num()..self.last_cell_num()).all(|i| match self.get(i) {
            None | Some(CellValue::Blank) => true,
            Some(cell) => cell.to_string_value().trim().is_empty(),
        })
    }
}

/// A cell value as produced by a tabular source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Text value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Numeric value formatted as a date (spreadsheet serial, 1900 system)
    Date(f64),
    /// Boolean value
    Boolean(bool),
    /// Present but empty cell
    Blank,
}

impl CellValue {
    /// Parse a string into a CellValue, detecting numbers
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Blank;
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Number(f);
            }
        }

        CellValue::Text(s.to_string())
    }

    /// Check if the cell is blank
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Normalized text form: numbers in their shortest form, date cells as
    /// `dd-MM-yyyy`, booleans as `TRUE`/`FALSE`
    pub fn to_string_value(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(serial) => match serial_to_date(*serial) {
                Some(date) => date.format(DATE_FORMAT).to_string(),
                None => serial.to_string(),
            },
            CellValue::Boolean(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            CellValue::Blank => String::new(),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_value())
    }
}

/// Convert a 1900-system spreadsheet serial number to a calendar date.
///
/// Serial 60 is the phantom 1900-02-29 and lands on 1900-03-01.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.trunc() as u64;
    let epoch = if days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_days(Days::new(days))
}
