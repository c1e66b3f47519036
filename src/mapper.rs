//! Row mapper: one input data row → one output row
//!
//! Every output cell is a pure function of the input row, the output row
//! number and the run's [`Serie`]. Formula cells only ever point at cells on
//! their own output row, and their column letters come from header positions.

use crate::cell::{parse_num, read_cell};
use crate::columns::{column_index_to_letter, HEADERS};
use crate::error::{BridgeError, BridgeResult};
use crate::serie::Serie;
use crate::types::{CellValue, InputRow, OutputCell};
use tracing::debug;

const SOCIEDAD: f64 = 3.0;
const VISTA: f64 = 1.0;
const DIARIO: f64 = 1.0;
const IVA_PERCENT: f64 = 10.0;
const CTA_DEUDORA: f64 = 4300.0;
const SCTA_DEUDORA: f64 = 0.0;
const ING_CTA: f64 = 7060.0;

/// Source columns read from each input row
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFields {
    /// A: client name, used in the concept text
    pub client: CellValue,
    /// B: manual / document number
    pub manual_number: CellValue,
    /// C: identifier placed in `FEC_FRA`
    pub identifier: CellValue,
    /// E: entity name or id
    pub entity: CellValue,
    /// I: tax id
    pub tax_id: CellValue,
    /// K, coerced
    pub amount_k: f64,
    /// O, coerced
    pub amount_o: f64,
}

impl SourceFields {
    pub fn read(row: &InputRow) -> Self {
        Self {
            client: read_cell(row, "A"),
            manual_number: read_cell(row, "B"),
            identifier: read_cell(row, "C"),
            entity: read_cell(row, "E"),
            tax_id: read_cell(row, "I"),
            amount_k: parse_num(&read_cell(row, "K")),
            amount_o: parse_num(&read_cell(row, "O")),
        }
    }

    /// `BASE1`: the one monetary figure computed eagerly
    pub fn base(&self) -> f64 {
        self.amount_k + self.amount_o
    }
}

/// Column letters the synthesized formulas reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaColumns {
    /// Where the manual number lands; the invoice suffix reads from it
    pub manual_number: String,
    pub base: String,
    pub rate: String,
    pub quota: String,
}

impl FormulaColumns {
    /// Resolve letters from header positions
    pub fn resolve(header: &[&str]) -> BridgeResult<Self> {
        let letter = |name: &str| -> BridgeResult<String> {
            header
                .iter()
                .position(|h| *h == name)
                .map(column_index_to_letter)
                .ok_or_else(|| {
                    BridgeError::Layout(format!("header has no '{}' column", name))
                })
        };

        Ok(Self {
            manual_number: letter("NUMERO_MANUAL")?,
            base: letter("BASE1")?,
            rate: letter("IVA1")?,
            quota: letter("CUOTA1")?,
        })
    }
}

/// Maps input rows to output rows for one run
#[derive(Debug, Clone)]
pub struct RowMapper {
    header: Vec<&'static str>,
    serie: Serie,
    columns: FormulaColumns,
}

impl RowMapper {
    /// Mapper over the fixed output header
    pub fn new(serie: Serie) -> BridgeResult<Self> {
        Self::with_header(&HEADERS, serie)
    }

    /// Mapper over a custom header ordering
    ///
    /// Fails when a column needed by a formula is absent.
    pub fn with_header(header: &[&'static str], serie: Serie) -> BridgeResult<Self> {
        let columns = FormulaColumns::resolve(header)?;
        debug!(
            base = %columns.base,
            rate = %columns.rate,
            quota = %columns.quota,
            serie = %serie,
            "resolved formula columns"
        );

        Ok(Self {
            header: header.to_vec(),
            serie,
            columns,
        })
    }

    pub fn header(&self) -> &[&'static str] {
        &self.header
    }

    pub fn serie(&self) -> Serie {
        self.serie
    }

    pub fn columns(&self) -> &FormulaColumns {
        &self.columns
    }

    /// Map one input row; `output_row` is 1-based with the header as row 1
    pub fn map_row(&self, row: &InputRow, output_row: u32) -> Vec<OutputCell> {
        let fields = SourceFields::read(row);
        self.header
            .iter()
            .map(|name| self.cell_for(name, &fields, output_row))
            .collect()
    }

    fn cell_for(&self, name: &str, fields: &SourceFields, row: u32) -> OutputCell {
        let cols = &self.columns;
        let base_ref = || OutputCell::formula(format!("{}{}", cols.base, row));

        match name {
            "SOCIEDAD" => OutputCell::Number(SOCIEDAD),
            "VISTA" => OutputCell::Number(VISTA),
            "SERIE" => OutputCell::Number(self.serie.code() as f64),
            "NUM_FRA" => OutputCell::formula(format!("RIGHT({}{},3)", cols.manual_number, row)),
            "NUMERO_MANUAL" => fields.manual_number.clone().into(),
            "CIF" => fields.tax_id.clone().into(),
            "D347" => OutputCell::text("S"),
            "FEC_FRA" => fields.identifier.clone().into(),
            "ARREN_LOCALNEG" => OutputCell::text("N"),
            "IMPORTE_BRUTO" => base_ref(),
            "DIARIO1" => OutputCell::Number(DIARIO),
            "BASE1" => OutputCell::Number(fields.base()),
            "IVA1" => OutputCell::Number(IVA_PERCENT),
            "CUOTA1" => OutputCell::formula(format!(
                "{}{}*{}{}/100",
                cols.base, row, cols.rate, row
            )),
            "TOTAL" => OutputCell::formula(format!("{}{}+{}{}", cols.base, row, cols.quota, row)),
            "CTA_DEUDORA" => OutputCell::Number(CTA_DEUDORA),
            "SCTA_DEUDORA" => OutputCell::Number(SCTA_DEUDORA),
            "BASE_RETENCION" => base_ref(),
            "FRA_IVA_DIFERIDO" => OutputCell::text("N"),
            "CON_CONCEPTO" => OutputCell::Text(format!(
                "{}House Reserva {}",
                self.serie.promotion_name(),
                fields.client
            )),
            "CON_IMPORTE" => base_ref(),
            "CON_DIARIO" => OutputCell::Number(DIARIO),
            "CON_BASE" => base_ref(),
            "CON_PORCENTAJE" => OutputCell::Number(IVA_PERCENT),
            "CON_IVA" => OutputCell::formula(format!("{}{}", cols.quota, row)),
            "ING_CTA" => OutputCell::Number(ING_CTA),
            "ING_SCTA" => OutputCell::Number(self.serie.income_subaccount() as f64),
            "ING_IMPORTE" => base_ref(),
            "ING_PROMOCION" => OutputCell::Number(self.serie.promotion_code() as f64),
            "ING_APARTADO" => OutputCell::text("02"),
            "ING_CAPITULO" => OutputCell::text("01"),
            "ING_PARTIDA" => OutputCell::text("001"),
            _ => OutputCell::Empty,
        }
    }
}
