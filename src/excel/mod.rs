//! Excel I/O boundary
//!
//! - Import: first worksheet of a spreadsheet → [`crate::types::InputTable`]
//! - Export: [`crate::types::OutputTable`] → `.xlsx` with live formulas

mod exporter;
mod importer;

pub use exporter::{ExcelExporter, OUTPUT_SHEET_NAME};
pub use importer::ExcelImporter;
