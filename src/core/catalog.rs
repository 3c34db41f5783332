//! Price list (catalog) loading
//!
//! A catalog is read from either comma-delimited text or the first sheet of
//! a spreadsheet workbook. Both sources produce the same ordered rows; the
//! position of a row in [`Catalog::rows`] is its identity for searching.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

use crate::core::number::coerce_number;

/// A single price list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    /// Product identifier (e.g. EAN), kept as text even when numeric
    pub identifier: String,
    pub description: String,
    /// Unit rate
    pub rate: f64,
}

impl CatalogRow {
    pub fn new(identifier: impl Into<String>, description: impl Into<String>, rate: f64) -> Self {
        Self {
            identifier: identifier.into(),
            description: description.into(),
            rate,
        }
    }
}

/// A loaded price list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// File name the catalog was loaded from
    source: String,
    rows: Vec<CatalogRow>,
}

impl Catalog {
    pub fn new(source: impl Into<String>, rows: Vec<CatalogRow>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&CatalogRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find the first row with the given identifier
    pub fn find_by_identifier(&self, identifier: &str) -> Option<(usize, &CatalogRow)> {
        let wanted = identifier.trim();
        self.rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.identifier.trim() == wanted)
    }
}

/// Header names of the three required price list columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub identifier: String,
    pub description: String,
    pub rate: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            identifier: "EAN".to_string(),
            description: "DESCRIPTION".to_string(),
            rate: "RATE".to_string(),
        }
    }
}

impl ColumnNames {
    fn required(&self) -> [&str; 3] {
        [&self.identifier, &self.description, &self.rate]
    }
}

/// Errors raised while loading a catalog
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("price list is missing required column(s): {}", missing.join(", "))]
    #[diagnostic(code(proforma::catalog::schema))]
    Schema {
        missing: Vec<String>,
        #[help]
        advice: Option<String>,
    },

    #[error("failed to read price list {source_name}: {cause}")]
    #[diagnostic(code(proforma::catalog::parse))]
    Parse { source_name: String, cause: String },
}

impl CatalogError {
    fn parse(source_name: &str, cause: impl ToString) -> Self {
        CatalogError::Parse {
            source_name: source_name.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// A tabular input format that can produce catalog rows
pub trait CatalogSource {
    /// Short name of the format, used in messages
    fn name(&self) -> &'static str;

    /// Parse raw file bytes into a catalog
    fn parse(&self, source_name: &str, bytes: &[u8], columns: &ColumnNames) -> Result<Catalog, CatalogError>;
}

/// Comma-delimited text with a header row
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvSource;

/// First sheet of a spreadsheet workbook (xlsx, xlsm, xlsb, xls, ods)
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookSource;

impl CatalogSource for CsvSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn parse(&self, source_name: &str, bytes: &[u8], columns: &ColumnNames) -> Result<Catalog, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| CatalogError::parse(source_name, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| CatalogError::parse(source_name, e))?;
            records.push(record.iter().map(str::to_string).collect());
        }

        build_catalog(source_name, &headers, records, columns)
    }
}

impl CatalogSource for WorkbookSource {
    fn name(&self) -> &'static str {
        "workbook"
    }

    fn parse(&self, source_name: &str, bytes: &[u8], columns: &ColumnNames) -> Result<Catalog, CatalogError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| CatalogError::parse(source_name, e))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| CatalogError::parse(source_name, "workbook contains no sheets"))?
            .map_err(|e| CatalogError::parse(source_name, e))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|cells| cells.iter().map(cell_text).collect())
            .unwrap_or_default();
        let records = rows
            .map(|cells| cells.iter().map(cell_text).collect())
            .collect();

        build_catalog(source_name, &headers, records, columns)
    }
}

/// Pick the catalog source for a file from its extension
pub fn source_for_path(path: &Path) -> Result<Box<dyn CatalogSource>, CatalogError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvSource)),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(WorkbookSource)),
        other => Err(CatalogError::parse(
            &path.display().to_string(),
            format!(
                "unsupported file type '{}' (expected csv, xlsx, xlsm, xlsb, xls or ods)",
                other
            ),
        )),
    }
}

/// Render a workbook cell as text
///
/// Whole numbers are written without a decimal point so that numeric
/// identifiers such as EANs keep their printed form.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

/// Minimum Jaro-Winkler similarity for a header to be offered as a near miss
const NEAR_MISS_THRESHOLD: f64 = 0.85;

/// Headers that look like a required column but do not match it exactly
fn near_misses(missing: &[String], headers: &[String]) -> Vec<(String, String)> {
    missing
        .iter()
        .filter_map(|name| {
            headers
                .iter()
                .map(|h| (h, strsim::jaro_winkler(&name.to_lowercase(), &h.trim().to_lowercase())))
                .filter(|(_, score)| *score >= NEAR_MISS_THRESHOLD)
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(h, _)| (name.clone(), h.clone()))
        })
        .collect()
}

fn schema_advice(missing: &[String], headers: &[String]) -> String {
    let mut advice =
        "Header names must match exactly; see `columns` in .proforma/config.yaml".to_string();
    for (name, header) in near_misses(missing, headers) {
        advice.push_str(&format!("\nFound '{}', did you mean '{}'?", header, name));
    }
    advice
}

fn build_catalog(
    source_name: &str,
    headers: &[String],
    records: Vec<Vec<String>>,
    columns: &ColumnNames,
) -> Result<Catalog, CatalogError> {
    let position = |name: &str| headers.iter().position(|h| h == name);
    let required = columns.required();
    let found = required.map(position);

    let [Some(id_col), Some(desc_col), Some(rate_col)] = found else {
        let missing: Vec<String> = required
            .iter()
            .zip(found)
            .filter(|(_, pos)| pos.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        let advice = schema_advice(&missing, headers);
        return Err(CatalogError::Schema {
            missing,
            advice: Some(advice),
        });
    };

    let field = |record: &[String], col: usize| record.get(col).cloned().unwrap_or_default();

    let mut rows = Vec::with_capacity(records.len());
    for (line, record) in records.iter().enumerate() {
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let rate_text = field(record, rate_col);
        let rate = coerce_number(&rate_text);
        if rate == 0.0 && rate_text.trim().parse::<f64>().is_err() {
            log::warn!(
                "{}: row {} has non-numeric {} '{}', using 0",
                source_name,
                line + 2,
                columns.rate,
                rate_text
            );
        }

        rows.push(CatalogRow {
            identifier: field(record, id_col).trim().to_string(),
            description: field(record, desc_col),
            rate,
        });
    }

    log::debug!("{}: loaded {} catalog rows", source_name, rows.len());
    Ok(Catalog::new(source_name, rows))
}
