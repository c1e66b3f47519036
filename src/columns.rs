//! Output header layout and spreadsheet column addressing
//!
//! The header order below is the only place column positions are defined.
//! Formula cells find their target columns by looking names up here, so
//! reordering the header moves every generated reference with it.

/// Output header, in sheet order
pub const HEADERS: [&str; 78] = [
    "SOCIEDAD",
    "VISTA",
    "SERIE",
    "NUM_FRA",
    "NUMERO_MANUAL",
    "CIF",
    "CLIENTE",
    "D347",
    "FEC_FRA",
    "ARREN_LOCALNEG",
    "ARREN_REFCATASTRAL",
    "ARREN_SITUACION",
    "TIPO_FRA",
    "NUM.FRA_ORIGEN",
    "DELEGACION",
    "IMPORTE_BRUTO",
    "TIPO_FRA_SII",
    "CLAVE_RE",
    "CLAVE_RE_AD1",
    "CLAVE_RE_AD2",
    "TIPO_OPERACION",
    "FEC_EXPED",
    "FRA_SIMPLIFICADA",
    "FRA_SIMPLI_IDEN",
    "FRA_NOIDEN_DEST",
    "IGIC_BIEN25",
    "IGIC_DOCU25",
    "IGIC_PROT25",
    "IGIC_NOTA25",
    "DIARIO1",
    "BASE1",
    "IVA1",
    "CUOTA1",
    "TOTAL",
    "CTA_DEUDORA",
    "SCTA_DEUDORA",
    "BASE_RETENCION",
    "PORCENTAJE_RETENCION",
    "IMPORTE_RETENCION",
    "CTA_RETENCION",
    "SCTA_RETENCION",
    "FRA_IVA_DIFERIDO",
    "SERIE_DEVENGO",
    "CTA_DIFERIDO",
    "SCTA_DIFERIDO",
    "PORCENTAJE_IRCM",
    "BASE_IRCM",
    "IMPORTE_IRCM",
    "CTA_IRCM",
    "SCTA_IRCM",
    "CLAVE_340",
    "NUMERO_FACTURAS",
    "PRIMER_NUMERO",
    "ULTIMO_NUMERO",
    "EMIT_TERCEROS",
    "CENTRO_COSTE",
    "CON_CONCEPTO",
    "CON_CANTIDAD",
    "CON_PRECIO",
    "CON_IMPORTE",
    "CON_DIARIO",
    "CON_BASE",
    "CON_PORCENTAJE",
    "CON_IVA",
    "ING_CTA",
    "ING_SCTA",
    "ING_IMPORTE",
    "ING_PROMOCION",
    "ING_TIPO",
    "ING_APARTADO",
    "ING_CAPITULO",
    "ING_PARTIDA",
    "TIPO_INMUEBLE",
    "CLAVE1",
    "CLAVE2",
    "CLAVE3",
    "CLAVE4",
    "ING_UNIDADES",
];

/// Convert a zero-based column index to its letter address
///
/// Examples:
/// - 0 → A
/// - 25 → Z
/// - 26 → AA
/// - 52 → BA
pub fn column_index_to_letter(index: usize) -> String {
    let mut result = String::new();
    let mut idx = index;

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

/// Convert a letter address back to a zero-based column index (A → 0, AA → 26)
///
/// Lowercase letters are accepted. Returns `None` for empty input or any
/// non-letter character.
pub fn column_letter_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    let mut acc: usize = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }

    Some(acc - 1)
}

/// Position of a header name in the output layout
pub fn header_index(name: &str) -> Option<usize> {
    HEADERS.iter().position(|h| *h == name)
}

/// Column letter a header name occupies in the output sheet
pub fn header_letter(name: &str) -> Option<String> {
    header_index(name).map(column_index_to_letter)
}
