//! Excel importer implementation - first worksheet → InputTable

use crate::error::{BridgeError, BridgeResult};
use crate::transform::InputSource;
use crate::types::{datetime_to_serial, CellValue, InputCell, InputRow, InputTable};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the first worksheet of an `.xlsx`/`.xls`/`.ods` file
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read the first worksheet into an input table
    ///
    /// Rows keep their sheet positions: `rows[0]` is sheet row 1 even when the
    /// used range starts lower down.
    pub fn import(&self) -> BridgeResult<InputTable> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            BridgeError::InputFormat(format!(
                "Failed to open spreadsheet {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| BridgeError::InputFormat("Workbook has no worksheets".to_string()))?;

        let values = workbook.worksheet_range(&sheet_name).map_err(|e| {
            BridgeError::InputFormat(format!("Failed to read sheet '{}': {}", sheet_name, e))
        })?;

        // A sheet without formulas is fine; only the values are required
        let formulas = workbook.worksheet_formula(&sheet_name).ok();

        let table = Self::build_table(&values, formulas.as_ref());
        debug!(
            sheet = %sheet_name,
            rows = table.row_count(),
            "imported worksheet"
        );
        Ok(table)
    }

    /// Assemble rows from the value range, pairing formula cells with results
    fn build_table(values: &Range<Data>, formulas: Option<&Range<String>>) -> InputTable {
        let (Some((start_row, start_col)), Some((end_row, _))) = (values.start(), values.end())
        else {
            return InputTable::default();
        };

        let mut rows = vec![InputRow::default(); end_row as usize + 1];

        for (r, c, data) in values.cells() {
            let row = start_row as usize + r;
            let col = start_col as usize + c;
            let value = Self::convert_data(data);
            if !value.is_empty() {
                rows[row].set(col, value);
            }
        }

        if let Some(formulas) = formulas {
            if let Some((f_row, f_col)) = formulas.start() {
                for (r, c, formula) in formulas.cells() {
                    if formula.is_empty() {
                        continue;
                    }
                    let row = f_row as usize + r;
                    let col = f_col as usize + c;
                    if row >= rows.len() {
                        continue;
                    }
                    let result = match rows[row].get(col) {
                        Some(InputCell::Value(value)) => value.clone(),
                        _ => CellValue::Empty,
                    };
                    rows[row].set(
                        col,
                        InputCell::FormulaResult {
                            formula: formula.clone(),
                            result,
                        },
                    );
                }
            }
        }

        InputTable::new(rows)
    }

    /// Convert a calamine cell to a normalized scalar
    fn convert_data(data: &Data) -> CellValue {
        match data {
            Data::Empty => CellValue::Empty,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) => Self::iso_to_serial(s)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }

    /// Serial date for an ISO 8601 date or date-time (ODS cells)
    fn iso_to_serial(text: &str) -> Option<f64> {
        let datetime = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })?;
        datetime_to_serial(datetime)
    }
}

impl InputSource for ExcelImporter {
    fn load(&mut self) -> BridgeResult<InputTable> {
        self.import()
    }
}
