//! Cell value reading and numeric coercion
//!
//! Both operations are total: missing or malformed data degrades to the
//! empty sentinel or to `0`, never to an error.

use crate::columns::column_letter_to_index;
use crate::types::{CellValue, InputCell, InputRow};
use regex::Regex;
use std::sync::LazyLock;

/// Optional sign, digits with an optional fraction, optional exponent
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
});

/// Read a cell by column letter and normalize it to a scalar
///
/// - missing cell → [`CellValue::Empty`]
/// - rich text → fragments joined in order
/// - formula → its cached result, never the formula text
/// - anything else → the stored value unchanged
pub fn read_cell(row: &InputRow, column: &str) -> CellValue {
    let Some(col) = column_letter_to_index(column) else {
        return CellValue::Empty;
    };

    match row.get(col) {
        None => CellValue::Empty,
        Some(InputCell::Value(value)) => value.clone(),
        Some(InputCell::RichText(runs)) => CellValue::Text(runs.concat()),
        Some(InputCell::FormulaResult { result, .. }) => result.clone(),
    }
}

/// Coerce a cell value to a number, defaulting to `0`
///
/// Text is trimmed and its first `,` becomes `.` so both decimal conventions
/// parse. The longest numeric prefix is used (`"12 €"` → 12); text with no
/// numeric prefix, NaN and infinities all yield `0`. Dates count as their
/// serial number and booleans as `0`.
pub fn parse_num(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) | CellValue::DateTime(n) if n.is_nan() => 0.0,
        CellValue::Number(n) | CellValue::DateTime(n) => *n,
        CellValue::Empty | CellValue::Bool(_) => 0.0,
        CellValue::Text(s) => parse_text_num(s),
    }
}

fn parse_text_num(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let cleaned = trimmed.replacen(',', ".", 1);
    LEADING_NUMBER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with(col: usize, cell: InputCell) -> InputRow {
        let mut row = InputRow::default();
        row.set(col, cell);
        row
    }

    #[test]
    fn test_read_cell_missing_is_empty() {
        let row = InputRow::default();
        assert_eq!(read_cell(&row, "A"), CellValue::Empty);
        assert_eq!(read_cell(&row, "ZZ"), CellValue::Empty);
    }

    #[test]
    fn test_read_cell_plain_values() {
        let row = row_with(1, InputCell::from(12.5));
        assert_eq!(read_cell(&row, "B"), CellValue::Number(12.5));
        assert_eq!(read_cell(&row, "A"), CellValue::Empty);

        let row = row_with(4, InputCell::from("Casa 12"));
        assert_eq!(read_cell(&row, "E"), CellValue::text("Casa 12"));
    }

    #[test]
    fn test_read_cell_rich_text_concatenates() {
        let row = row_with(
            0,
            InputCell::RichText(vec!["AC".to_string(), "M".to_string(), "E".to_string()]),
        );
        assert_eq!(read_cell(&row, "A"), CellValue::text("ACME"));
    }

    #[test]
    fn test_read_cell_formula_returns_result() {
        let row = row_with(
            10,
            InputCell::FormulaResult {
                formula: "SUM(A1:A3)".to_string(),
                result: CellValue::Number(300.0),
            },
        );
        assert_eq!(read_cell(&row, "K"), CellValue::Number(300.0));
    }

    #[test]
    fn test_read_cell_bad_address() {
        let row = row_with(0, InputCell::from("x"));
        assert_eq!(read_cell(&row, ""), CellValue::Empty);
        assert_eq!(read_cell(&row, "A1"), CellValue::Empty);
    }

    #[test]
    fn test_parse_num_basic() {
        assert_eq!(parse_num(&CellValue::text("1,5")), 1.5);
        assert_eq!(parse_num(&CellValue::text("")), 0.0);
        assert_eq!(parse_num(&CellValue::Empty), 0.0);
        assert_eq!(parse_num(&CellValue::Number(42.0)), 42.0);
        assert_eq!(parse_num(&CellValue::Number(f64::NAN)), 0.0);
        assert_eq!(parse_num(&CellValue::text("abc")), 0.0);
    }

    #[test]
    fn test_parse_num_text_forms() {
        assert_eq!(parse_num(&CellValue::text("  20  ")), 20.0);
        assert_eq!(parse_num(&CellValue::text("100.5")), 100.5);
        assert_eq!(parse_num(&CellValue::text("-3,25")), -3.25);
        assert_eq!(parse_num(&CellValue::text("1e3")), 1000.0);
        assert_eq!(parse_num(&CellValue::text(".5")), 0.5);
        assert_eq!(parse_num(&CellValue::text("12 €")), 12.0);
        // Only the first comma is a decimal separator
        assert_eq!(parse_num(&CellValue::text("1,234,5")), 1.234);
        assert_eq!(parse_num(&CellValue::text("   ")), 0.0);
    }

    #[test]
    fn test_parse_num_non_finite() {
        assert_eq!(parse_num(&CellValue::text("NaN")), 0.0);
        assert_eq!(parse_num(&CellValue::text("inf")), 0.0);
        assert_eq!(parse_num(&CellValue::Number(f64::INFINITY)), f64::INFINITY);
    }

    #[test]
    fn test_parse_num_typed_cells() {
        assert_eq!(parse_num(&CellValue::Bool(true)), 0.0);
        assert_eq!(parse_num(&CellValue::Bool(false)), 0.0);
        assert_eq!(parse_num(&CellValue::DateTime(45413.25)), 45413.25);
    }

    #[test]
    fn test_read_cell_keeps_typed_values() {
        let row = row_with(2, InputCell::Value(CellValue::DateTime(45413.0)));
        assert_eq!(read_cell(&row, "C"), CellValue::DateTime(45413.0));

        let row = row_with(3, InputCell::Value(CellValue::Bool(true)));
        assert_eq!(read_cell(&row, "D"), CellValue::Bool(true));
    }
}
