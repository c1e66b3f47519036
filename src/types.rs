use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use std::fmt;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Day zero of the 1900 date system as spreadsheets count it
fn serial_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Spreadsheet serial date (days since 1899-12-30) to a calendar date-time
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let millis = (serial * MILLIS_PER_DAY).round();
    if !millis.is_finite() {
        return None;
    }
    serial_epoch()?.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
}

/// Calendar date-time to a spreadsheet serial date
pub fn datetime_to_serial(datetime: NaiveDateTime) -> Option<f64> {
    let delta = datetime.signed_duration_since(serial_epoch()?);
    Some(delta.num_milliseconds() as f64 / MILLIS_PER_DAY)
}

//==============================================================================
// Input Model
//==============================================================================

/// Normalized scalar read out of an input cell
///
/// `Empty` stands in for the empty-string sentinel: it displays as `""` and
/// coerces to `0`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Date or date-time as a serial day number
    DateTime(f64),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            // Integral values print without a trailing ".0", as spreadsheets show them
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::DateTime(serial) => match serial_to_datetime(*serial) {
                Some(dt) if dt.num_seconds_from_midnight() == 0 => {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                }
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{}", serial),
            },
        }
    }
}

/// Raw cell content as stored in the source workbook
///
/// Decoded once at the I/O boundary; everything downstream goes through
/// [`crate::cell::read_cell`] instead of inspecting the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum InputCell {
    /// Plain number, string, or nothing
    Value(CellValue),
    /// Rich-text run: fragments are concatenated in order
    RichText(Vec<String>),
    /// Formula together with its last cached result
    FormulaResult { formula: String, result: CellValue },
}

impl Default for InputCell {
    fn default() -> Self {
        InputCell::Value(CellValue::Empty)
    }
}

impl From<CellValue> for InputCell {
    fn from(value: CellValue) -> Self {
        InputCell::Value(value)
    }
}

impl From<f64> for InputCell {
    fn from(value: f64) -> Self {
        InputCell::Value(CellValue::Number(value))
    }
}

impl From<&str> for InputCell {
    fn from(value: &str) -> Self {
        InputCell::Value(CellValue::text(value))
    }
}

/// One row of the input sheet, indexed by zero-based column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputRow {
    cells: Vec<InputCell>,
}

impl InputRow {
    pub fn new(cells: Vec<InputCell>) -> Self {
        Self { cells }
    }

    /// Cell at a zero-based column index; `None` past the last stored cell
    pub fn get(&self, col: usize) -> Option<&InputCell> {
        self.cells.get(col)
    }

    /// Set a cell, growing the row with empty cells as needed
    pub fn set(&mut self, col: usize, cell: impl Into<InputCell>) {
        if self.cells.len() <= col {
            self.cells.resize_with(col + 1, InputCell::default);
        }
        self.cells[col] = cell.into();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Whole input sheet; `rows[0]` is the header row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTable {
    pub rows: Vec<InputRow>,
}

impl InputTable {
    pub fn new(rows: Vec<InputRow>) -> Self {
        Self { rows }
    }

    /// Total row count, header included
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of data rows (everything after the header)
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Data rows in sheet order, header skipped
    pub fn data_rows(&self) -> impl Iterator<Item = &InputRow> {
        self.rows.iter().skip(1)
    }
}

//==============================================================================
// Output Model
//==============================================================================

/// One cell of the generated sheet
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell {
    /// Empty-string placeholder keeping the column position
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Serial date, written with a date number format
    DateTime(f64),
    /// Live spreadsheet expression, stored without the leading `=`
    Formula(String),
}

impl OutputCell {
    pub fn text(value: impl Into<String>) -> Self {
        OutputCell::Text(value.into())
    }

    pub fn formula(expr: impl Into<String>) -> Self {
        OutputCell::Formula(expr.into())
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, OutputCell::Formula(_))
    }

    /// Expression text when this is a formula cell
    pub fn as_formula(&self) -> Option<&str> {
        match self {
            OutputCell::Formula(expr) => Some(expr),
            _ => None,
        }
    }
}

impl From<CellValue> for OutputCell {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Empty => OutputCell::Empty,
            CellValue::Number(n) => OutputCell::Number(n),
            CellValue::Text(s) => OutputCell::Text(s),
            CellValue::Bool(b) => OutputCell::Bool(b),
            CellValue::DateTime(serial) => OutputCell::DateTime(serial),
        }
    }
}

/// Generated sheet: fixed header plus one mapped row per input data row
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<OutputCell>>,
}

impl OutputTable {
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<OutputCell>) {
        self.rows.push(row);
    }

    /// Number of mapped rows (header excluded)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Cell of a data row by header name
    pub fn cell(&self, row_idx: usize, name: &str) -> Option<&OutputCell> {
        let col = self.header.iter().position(|h| h == name)?;
        self.rows.get(row_idx)?.get(col)
    }
}
