//! Excel exporter implementation - OutputTable → .xlsx

use crate::error::{BridgeError, BridgeResult};
use crate::transform::OutputSink;
use crate::types::{OutputCell, OutputTable};
use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the single worksheet in generated files
pub const OUTPUT_SHEET_NAME: &str = "Output";

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Number formats for date cells
struct DateFormats {
    date: Format,
    datetime: Format,
}

impl DateFormats {
    fn new() -> Self {
        Self {
            date: Format::new().set_num_format(DATE_FORMAT),
            datetime: Format::new().set_num_format(DATETIME_FORMAT),
        }
    }

    /// Date-only format for whole days, date-time otherwise
    fn for_serial(&self, serial: f64) -> &Format {
        if serial.fract() == 0.0 {
            &self.date
        } else {
            &self.datetime
        }
    }
}

/// Writes an output table as a one-sheet workbook
///
/// Formula cells are written as live formulas; the workbook is flagged for
/// full recalculation on load so they show values when opened.
pub struct ExcelExporter {
    path: PathBuf,
}

impl ExcelExporter {
    /// Create a new Excel exporter
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Export the table to the configured path
    pub fn export(&self, table: &OutputTable) -> BridgeResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(OUTPUT_SHEET_NAME)
            .map_err(|e| BridgeError::OutputWrite(format!("Failed to set worksheet name: {}", e)))?;

        // Header row (row 0)
        for (col_idx, name) in table.header.iter().enumerate() {
            let col = Self::column(col_idx)?;
            worksheet
                .write_string(0, col, name)
                .map_err(|e| BridgeError::OutputWrite(format!("Failed to write header: {}", e)))?;
        }

        let formats = DateFormats::new();

        // Data rows start at worksheet row 1 (sheet row 2)
        for (row_idx, cells) in table.rows.iter().enumerate() {
            let row = u32::try_from(row_idx + 1).map_err(|_| {
                BridgeError::OutputWrite(format!("Row {} exceeds sheet limits", row_idx + 1))
            })?;
            for (col_idx, cell) in cells.iter().enumerate() {
                Self::write_cell(worksheet, row, Self::column(col_idx)?, cell, &formats)?;
            }
        }

        workbook
            .save(&self.path)
            .map_err(|e| BridgeError::OutputWrite(format!("Failed to save Excel file: {}", e)))?;

        debug!(path = %self.path.display(), rows = table.row_count(), "wrote workbook");
        Ok(())
    }

    /// Write a single cell based on its kind
    fn write_cell(
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        cell: &OutputCell,
        formats: &DateFormats,
    ) -> BridgeResult<()> {
        match cell {
            // Placeholder: the position exists in the header, the cell stays blank
            OutputCell::Empty => {}
            OutputCell::Number(value) => {
                worksheet.write_number(row, col, *value).map_err(|e| {
                    BridgeError::OutputWrite(format!("Failed to write number: {}", e))
                })?;
            }
            OutputCell::Text(value) => {
                worksheet
                    .write_string(row, col, value)
                    .map_err(|e| BridgeError::OutputWrite(format!("Failed to write text: {}", e)))?;
            }
            OutputCell::Bool(value) => {
                worksheet.write_boolean(row, col, *value).map_err(|e| {
                    BridgeError::OutputWrite(format!("Failed to write boolean: {}", e))
                })?;
            }
            OutputCell::DateTime(serial) => {
                worksheet
                    .write_number_with_format(row, col, *serial, formats.for_serial(*serial))
                    .map_err(|e| BridgeError::OutputWrite(format!("Failed to write date: {}", e)))?;
            }
            OutputCell::Formula(expr) => {
                worksheet
                    .write_formula(row, col, Formula::new(format!("={}", expr)))
                    .map_err(|e| {
                        BridgeError::OutputWrite(format!("Failed to write formula: {}", e))
                    })?;
            }
        }
        Ok(())
    }

    fn column(col_idx: usize) -> BridgeResult<u16> {
        u16::try_from(col_idx)
            .map_err(|_| BridgeError::OutputWrite(format!("Column {} exceeds sheet limits", col_idx)))
    }
}

impl OutputSink for ExcelExporter {
    fn write(&mut self, table: &OutputTable) -> BridgeResult<()> {
        self.export(table)
    }
}
