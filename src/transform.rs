//! Transformation driver
//!
//! Maps every data row of an input table in order, reports progress after
//! each row, and hands the finished table to an output sink. A failure at any
//! point aborts the whole run; nothing partial is returned.

use crate::error::{BridgeError, BridgeResult};
use crate::excel::{ExcelExporter, ExcelImporter};
use crate::mapper::RowMapper;
use crate::serie::Serie;
use crate::types::{InputTable, OutputTable};
use std::path::Path;
use tracing::info;

/// Progress callback: `(rows_done, total_rows)`
pub type Progress<'a> = &'a mut dyn FnMut(usize, usize);

/// Where input tables come from
pub trait InputSource {
    fn load(&mut self) -> BridgeResult<InputTable>;
}

/// Where finished output tables go
pub trait OutputSink {
    fn write(&mut self, table: &OutputTable) -> BridgeResult<()>;
}

impl InputSource for InputTable {
    fn load(&mut self) -> BridgeResult<InputTable> {
        Ok(std::mem::take(self))
    }
}

impl OutputSink for Option<OutputTable> {
    fn write(&mut self, table: &OutputTable) -> BridgeResult<()> {
        *self = Some(table.clone());
        Ok(())
    }
}

/// Map a whole input table in memory
pub fn transform_table(
    input: &InputTable,
    serie: Serie,
    mut progress: Option<Progress<'_>>,
) -> BridgeResult<OutputTable> {
    let mapper = RowMapper::new(serie)?;
    let total = input.data_row_count();
    let mut output = OutputTable::new(mapper.header());

    for (idx, row) in input.data_rows().enumerate() {
        // +1 for the header, +1 for 1-based rows
        let output_row = u32::try_from(idx + 2).map_err(|_| BridgeError::RowMapping {
            row: u32::MAX,
            message: format!("row index {} exceeds sheet limits", idx + 2),
        })?;

        let cells = mapper.map_row(row, output_row);
        if cells.len() != output.width() {
            return Err(BridgeError::RowMapping {
                row: output_row,
                message: format!(
                    "mapped {} cells for a {}-column header",
                    cells.len(),
                    output.width()
                ),
            });
        }
        output.push_row(cells);

        if let Some(report) = progress.as_mut() {
            report(idx + 1, total);
        }
    }

    Ok(output)
}

/// Load, map and persist one table
///
/// The sink only sees a complete table; it is not called if loading or
/// mapping fails.
pub fn transform<I, O>(
    source: &mut I,
    sink: &mut O,
    progress: Option<Progress<'_>>,
    serie: Serie,
) -> BridgeResult<()>
where
    I: InputSource + ?Sized,
    O: OutputSink + ?Sized,
{
    let input = source.load()?;
    info!(
        rows = input.data_row_count(),
        serie = %serie,
        "transforming sheet"
    );

    let output = transform_table(&input, serie, progress)?;
    sink.write(&output)?;

    info!(rows = output.row_count(), "transformation complete");
    Ok(())
}

/// Convert an `.xlsx` file on disk into the output layout
pub fn transform_file(
    input: &Path,
    output: &Path,
    progress: Option<Progress<'_>>,
    serie: Serie,
) -> BridgeResult<()> {
    let mut reader = ExcelImporter::new(input);
    let mut writer = ExcelExporter::new(output);
    transform(&mut reader, &mut writer, progress, serie)
}
