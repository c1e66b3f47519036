//! Transformation engine tests
//!
//! Row counts, widths, formula references, serie derivations and progress
//! reporting, exercised through the public in-memory API.

use factura_bridge::cell::parse_num;
use factura_bridge::columns::{column_index_to_letter, column_letter_to_index, HEADERS};
use factura_bridge::mapper::RowMapper;
use factura_bridge::serie::Serie;
use factura_bridge::transform::transform_table;
use factura_bridge::types::{CellValue, InputCell, InputRow, InputTable, OutputCell};
use pretty_assertions::assert_eq;
use regex::Regex;
use xlformula_engine::{calculate, parse_formula, types, NoCustomFunction};

// ═══════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════

fn booking_row(client: &str, number: &str, k: InputCell, o: InputCell) -> InputRow {
    let mut row = InputRow::default();
    row.set(0, client);
    row.set(1, number);
    row.set(2, "2024-05-01");
    row.set(4, "Entity");
    row.set(8, "B00000000");
    row.set(10, k);
    row.set(14, o);
    row
}

fn booking_table(rows: Vec<InputRow>) -> InputTable {
    let mut all = vec![InputRow::new(vec![
        "Cliente".into(),
        "Numero".into(),
        "Fecha".into(),
    ])];
    all.extend(rows);
    InputTable::new(all)
}

fn col(name: &str) -> usize {
    HEADERS.iter().position(|h| *h == name).unwrap()
}

/// Evaluate a cell of a mapped row, following formula references within it
fn eval_cell(cells: &[OutputCell], cell: &OutputCell) -> f32 {
    match cell {
        OutputCell::Number(n) => *n as f32,
        OutputCell::Formula(expr) => {
            let reference = Regex::new(r"^([A-Z]+)(\d+)$").unwrap();
            let resolver = |name: String| -> types::Value {
                let Some(caps) = reference.captures(&name) else {
                    return types::Value::Error(types::Error::Value);
                };
                let idx = column_letter_to_index(&caps[1]).unwrap();
                types::Value::Number(eval_cell(cells, &cells[idx]))
            };
            let parsed =
                parse_formula::parse_string_to_formula(&format!("={}", expr), None::<NoCustomFunction>);
            match calculate::calculate_formula(parsed, Some(&resolver)) {
                types::Value::Number(n) => n,
                other => panic!("formula '{}' evaluated to {:?}", expr, other),
            }
        }
        other => panic!("cell {:?} is not numeric", other),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SHAPE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_output_has_one_row_per_data_row() {
    for n in [0, 1, 5, 37] {
        let rows = (0..n)
            .map(|i| booking_row("C", &format!("F{}", i), (i as f64).into(), "1".into()))
            .collect();
        let output = transform_table(&booking_table(rows), Serie::default(), None).unwrap();
        assert_eq!(output.row_count(), n);
        assert_eq!(output.header, HEADERS.to_vec());
    }
}

#[test]
fn test_every_row_is_header_width() {
    let rows = vec![
        booking_row("A", "1", 1.0.into(), 2.0.into()),
        InputRow::default(),
        InputRow::new(vec!["only a client".into()]),
    ];
    let output = transform_table(&booking_table(rows), Serie::default(), None).unwrap();
    for row in &output.rows {
        assert_eq!(row.len(), HEADERS.len());
    }
}

#[test]
fn test_header_is_verbatim() {
    assert_eq!(HEADERS.len(), 78);
    assert_eq!(HEADERS[0], "SOCIEDAD");
    assert_eq!(HEADERS[13], "NUM.FRA_ORIGEN");
    assert_eq!(HEADERS[30], "BASE1");
    assert_eq!(HEADERS[77], "ING_UNIDADES");
}

// ═══════════════════════════════════════════════════════════════════════════
// COERCION AND ADDRESSING
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_parse_num_properties() {
    assert_eq!(parse_num(&CellValue::text("1,5")), 1.5);
    assert_eq!(parse_num(&CellValue::text("")), 0.0);
    assert_eq!(parse_num(&CellValue::Empty), 0.0);
    assert_eq!(parse_num(&CellValue::Number(42.0)), 42.0);
    assert_eq!(parse_num(&CellValue::Number(f64::NAN)), 0.0);
    assert_eq!(parse_num(&CellValue::text("abc")), 0.0);
}

#[test]
fn test_column_letters() {
    let cases = [(0, "A"), (25, "Z"), (26, "AA"), (27, "AB"), (51, "AZ"), (52, "BA")];
    for (idx, letters) in cases {
        assert_eq!(column_index_to_letter(idx), letters);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MAPPED VALUES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_base_is_literal_sum_of_k_and_o() {
    let rows = vec![booking_row("ACME", "FAC-1", 100.5.into(), 20.0.into())];
    let output = transform_table(&booking_table(rows), Serie::default(), None).unwrap();
    assert_eq!(output.cell(0, "BASE1"), Some(&OutputCell::Number(120.5)));
}

#[test]
fn test_base_from_mixed_cell_kinds() {
    let k = InputCell::FormulaResult {
        formula: "SUM(X2:X9)".to_string(),
        result: CellValue::Number(80.0),
    };
    let o = InputCell::RichText(vec!["1".to_string(), "2,5".to_string()]);
    let rows = vec![booking_row("ACME", "FAC-1", k, o)];
    let output = transform_table(&booking_table(rows), Serie::default(), None).unwrap();
    assert_eq!(output.cell(0, "BASE1"), Some(&OutputCell::Number(92.5)));
}

#[test]
fn test_formulas_stay_on_their_row() {
    let rows = (0..4)
        .map(|i| booking_row("C", "F", (i as f64).into(), 0.0.into()))
        .collect();
    let output = transform_table(&booking_table(rows), Serie::default(), None).unwrap();
    let reference = Regex::new(r"\b([A-Z]+)(\d+)\b").unwrap();
    let allowed = ["AE", "AF", "AG", "E"];

    let formula_columns = [
        "NUM_FRA",
        "IMPORTE_BRUTO",
        "CUOTA1",
        "TOTAL",
        "BASE_RETENCION",
        "CON_IMPORTE",
        "CON_BASE",
        "CON_IVA",
        "ING_IMPORTE",
    ];

    for (row_idx, row) in output.rows.iter().enumerate() {
        let sheet_row = (row_idx + 2).to_string();
        let formulas: Vec<(&str, &str)> = HEADERS
            .iter()
            .zip(row)
            .filter_map(|(name, cell)| cell.as_formula().map(|f| (*name, f)))
            .collect();

        let names: Vec<&str> = formulas.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, formula_columns.to_vec());

        for (name, expr) in formulas {
            let refs: Vec<_> = reference.captures_iter(expr).collect();
            assert!(!refs.is_empty(), "{} has no references", name);
            for cap in refs {
                assert_eq!(&cap[2], sheet_row, "{} → {}", name, expr);
                assert!(allowed.contains(&&cap[1]), "{} → {}", name, expr);
            }
        }
    }
}

#[test]
fn test_formulas_evaluate_to_expected_amounts() {
    let rows = vec![
        booking_row("ACME", "FAC-1", 100.0.into(), 50.0.into()),
        booking_row("Beta", "FAC-2", "80,5".into(), InputCell::default()),
    ];
    let output = transform_table(&booking_table(rows), Serie::default(), None).unwrap();

    let expected = [(150.0_f32, 15.0_f32, 165.0_f32), (80.5, 8.05, 88.55)];
    for (row_idx, (base, quota, total)) in expected.into_iter().enumerate() {
        let cells = &output.rows[row_idx];
        let value = |name: &str| eval_cell(cells, &cells[col(name)]);

        assert!((value("BASE1") - base).abs() < 1e-3);
        assert!((value("CUOTA1") - quota).abs() < 1e-3);
        assert!((value("TOTAL") - total).abs() < 1e-3);
        assert!((value("CON_IVA") - quota).abs() < 1e-3);
        assert!((value("ING_IMPORTE") - base).abs() < 1e-3);
    }
}

#[test]
fn test_serie_drives_derived_fields() {
    let cases = [
        (4, 2.0, 86.0, "CieloHouse Reserva ACME"),
        (5, 3.0, 87.0, "NovaHouse Reserva ACME"),
        (6, 4.0, 85.0, "GrennHouse Reserva ACME"),
        (9, 4.0, 85.0, "GrennHouse Reserva ACME"),
    ];

    for (code, scta, promo, concept) in cases {
        let rows = vec![
            booking_row("ACME", "F1", 1.0.into(), 1.0.into()),
            booking_row("ACME", "F2", 2.0.into(), 2.0.into()),
        ];
        let output = transform_table(&booking_table(rows), Serie(code), None).unwrap();
        for row_idx in 0..output.row_count() {
            assert_eq!(
                output.cell(row_idx, "SERIE"),
                Some(&OutputCell::Number(code as f64))
            );
            assert_eq!(output.cell(row_idx, "ING_SCTA"), Some(&OutputCell::Number(scta)));
            assert_eq!(
                output.cell(row_idx, "ING_PROMOCION"),
                Some(&OutputCell::Number(promo))
            );
            assert_eq!(
                output.cell(row_idx, "CON_CONCEPTO"),
                Some(&OutputCell::text(concept))
            );
        }
    }
}

#[test]
fn test_numeric_client_name_in_concept() {
    let rows = vec![booking_row("", "F", 0.0.into(), 0.0.into())];
    let mut table = booking_table(rows);
    table.rows[1].set(0, 1234.0);
    let output = transform_table(&table, Serie(6), None).unwrap();
    assert_eq!(
        output.cell(0, "CON_CONCEPTO"),
        Some(&OutputCell::text("GrennHouse Reserva 1234"))
    );
}

#[test]
fn test_mapper_matches_driver() {
    let row = booking_row("ACME", "FAC-9", 10.0.into(), 5.0.into());
    let mapper = RowMapper::new(Serie(5)).unwrap();
    let output = transform_table(&booking_table(vec![row.clone()]), Serie(5), None).unwrap();
    assert_eq!(output.rows[0], mapper.map_row(&row, 2));
}

// ═══════════════════════════════════════════════════════════════════════════
// DETERMINISM AND PROGRESS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_rerun_is_identical() {
    let rows = (0..10)
        .map(|i| booking_row("ACME", &format!("FAC-{:03}", i), (i as f64 * 1.5).into(), "2,25".into()))
        .collect();
    let table = booking_table(rows);

    let first = transform_table(&table, Serie(4), None).unwrap();
    let second = transform_table(&table, Serie(4), None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_progress_counts_up_to_total() {
    let rows = (0..25)
        .map(|_| booking_row("C", "F", 1.0.into(), 1.0.into()))
        .collect();
    let mut calls = Vec::new();
    let mut record = |done: usize, total: usize| calls.push((done, total));

    transform_table(&booking_table(rows), Serie::default(), Some(&mut record)).unwrap();

    assert_eq!(calls.len(), 25);
    for (i, (done, total)) in calls.iter().enumerate() {
        assert_eq!(*done, i + 1);
        assert_eq!(*total, 25);
    }
}

#[test]
fn test_header_only_input_reports_nothing() {
    let mut calls = 0;
    let mut record = |_: usize, _: usize| calls += 1;
    let output =
        transform_table(&booking_table(Vec::new()), Serie::default(), Some(&mut record)).unwrap();

    assert_eq!(output.row_count(), 0);
    assert_eq!(output.header.len(), HEADERS.len());
    assert_eq!(calls, 0);
}
