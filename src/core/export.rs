//! Fill a proforma invoice template from the cart
//!
//! The template is read from bytes, filled at the cell addresses given by a
//! [`TemplateLayout`] and written back to a new in-memory workbook. The
//! template itself is never touched.

use chrono::NaiveDate;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;
use umya_spreadsheet::Worksheet;

use crate::core::cart::CartItem;
use crate::core::number::{finite_or_zero, round2};

/// Cell addresses written by the exporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    /// Sheet to fill; the active sheet is used when it does not exist
    pub sheet_name: String,
    pub date_cell: String,
    pub number_cell: String,
    /// First row (1-based) of the line item block
    pub items_start_row: u32,
    pub identifier_column: String,
    pub description_column: String,
    pub quantity_column: String,
    pub rate_column: String,
    pub amount_column: String,
    pub total_quantity_cell: String,
    pub total_amount_cell: String,
    pub grand_total_cell: String,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Invoice".to_string(),
            date_cell: "E3".to_string(),
            number_cell: "E4".to_string(),
            items_start_row: 14,
            identifier_column: "A".to_string(),
            description_column: "B".to_string(),
            quantity_column: "C".to_string(),
            rate_column: "D".to_string(),
            amount_column: "E".to_string(),
            total_quantity_cell: "C31".to_string(),
            total_amount_cell: "E31".to_string(),
            grand_total_cell: "E34".to_string(),
        }
    }
}

/// Errors raised while exporting
#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("cart is empty, nothing to export")]
    #[diagnostic(
        code(proforma::export::empty_cart),
        help("Add items with 'proforma cart add' first")
    )]
    EmptyCart,

    #[error("invalid {field} '{value}' in template layout")]
    #[diagnostic(
        code(proforma::export::invalid_cell),
        help("Cells look like 'E31'; columns like 'C'; rows start at 1")
    )]
    InvalidCell { field: &'static str, value: String },

    #[error("cannot read template {name}: {cause}")]
    #[diagnostic(code(proforma::export::template))]
    Template { name: String, cause: String },

    #[error("failed to write workbook: {0}")]
    #[diagnostic(code(proforma::export::write))]
    Write(String),
}

/// One cart line as written to the template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportLine {
    pub identifier: String,
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

impl From<&CartItem> for ExportLine {
    fn from(item: &CartItem) -> Self {
        let quantity = finite_or_zero(item.quantity);
        let rate = finite_or_zero(item.rate);
        Self {
            identifier: item.identifier.clone(),
            description: item.description.clone(),
            quantity,
            rate,
            amount: round2(quantity * rate),
        }
    }
}

/// Totals derived at export time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub quantity: f64,
    pub amount: f64,
    /// Currently equal to `amount`; taxes or fees would be added here
    pub grand_total: f64,
}

/// A snapshot of the cart ready to be written
#[derive(Debug, Clone, Serialize)]
pub struct ExportRequest {
    pub document_number: String,
    pub date: NaiveDate,
    pub lines: Vec<ExportLine>,
    pub totals: Totals,
}

impl ExportRequest {
    pub fn new(items: &[CartItem], document_number: impl Into<String>, date: NaiveDate) -> Result<Self, ExportError> {
        if items.is_empty() {
            return Err(ExportError::EmptyCart);
        }

        let lines: Vec<ExportLine> = items.iter().map(ExportLine::from).collect();
        let quantity = lines.iter().map(|l| l.quantity).sum();
        let amount = lines.iter().map(|l| l.amount).sum();

        Ok(Self {
            document_number: document_number.into(),
            date,
            lines,
            totals: Totals {
                quantity,
                amount,
                grand_total: amount,
            },
        })
    }
}

/// A filled workbook and its suggested file name
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Last row of an xlsx worksheet
const MAX_ROW: u32 = 1_048_576;

/// Parse an A1-style address into 1-based (column, row)
pub fn parse_cell(address: &str) -> Option<(u32, u32)> {
    let address = address.trim();
    let split = address.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = address.split_at(split);

    let column = parse_column(letters)?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 || row > MAX_ROW {
        return None;
    }
    Some((column, row))
}

/// Parse a column name such as `C` or `AB` into a 1-based index
pub fn parse_column(letters: &str) -> Option<u32> {
    let letters = letters.trim();
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }

    let mut column = 0u32;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        column = column * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    (column <= 16_384).then_some(column)
}

/// Resolved numeric coordinates of a layout
struct Coordinates {
    date: (u32, u32),
    number: (u32, u32),
    start_row: u32,
    columns: [u32; 5],
    total_quantity: (u32, u32),
    total_amount: (u32, u32),
    grand_total: (u32, u32),
}

impl TemplateLayout {
    /// Check every address in the layout
    pub fn validate(&self) -> Result<(), ExportError> {
        self.coordinates().map(|_| ())
    }

    fn coordinates(&self) -> Result<Coordinates, ExportError> {
        let cell = |field: &'static str, value: &str| {
            parse_cell(value).ok_or_else(|| ExportError::InvalidCell {
                field,
                value: value.to_string(),
            })
        };
        let column = |field: &'static str, value: &str| {
            parse_column(value).ok_or_else(|| ExportError::InvalidCell {
                field,
                value: value.to_string(),
            })
        };

        if self.items_start_row == 0 || self.items_start_row > MAX_ROW {
            return Err(ExportError::InvalidCell {
                field: "items_start_row",
                value: self.items_start_row.to_string(),
            });
        }

        Ok(Coordinates {
            date: cell("date_cell", &self.date_cell)?,
            number: cell("number_cell", &self.number_cell)?,
            start_row: self.items_start_row,
            columns: [
                column("identifier_column", &self.identifier_column)?,
                column("description_column", &self.description_column)?,
                column("quantity_column", &self.quantity_column)?,
                column("rate_column", &self.rate_column)?,
                column("amount_column", &self.amount_column)?,
            ],
            total_quantity: cell("total_quantity_cell", &self.total_quantity_cell)?,
            total_amount: cell("total_amount_cell", &self.total_amount_cell)?,
            grand_total: cell("grand_total_cell", &self.grand_total_cell)?,
        })
    }
}

/// Check that bytes hold a workbook the exporter can fill
pub fn check_template(name: &str, bytes: &[u8]) -> Result<(), ExportError> {
    read_template(name, bytes).map(|_| ())
}

fn read_template(name: &str, bytes: &[u8]) -> Result<umya_spreadsheet::Spreadsheet, ExportError> {
    umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes.to_vec()), true).map_err(|e| {
        ExportError::Template {
            name: name.to_string(),
            cause: e.to_string(),
        }
    })
}

/// Suggested output name: the document number plus the template's extension
pub fn suggested_file_name(document_number: &str, template_name: &str) -> String {
    let ext = Path::new(template_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("xlsx");
    format!("{}.{}", document_number, ext)
}

/// Fill the template and return the new workbook
pub fn export(
    template_name: &str,
    template: &[u8],
    layout: &TemplateLayout,
    request: &ExportRequest,
) -> Result<ExportedDocument, ExportError> {
    let coords = layout.coordinates()?;
    let last_row = u64::from(coords.start_row) + (request.lines.len() as u64).saturating_sub(1);
    if last_row > u64::from(MAX_ROW) {
        return Err(ExportError::InvalidCell {
            field: "items_start_row",
            value: format!("{} (line items would end at row {})", coords.start_row, last_row),
        });
    }
    let mut book = read_template(template_name, template)?;

    let sheet: &mut Worksheet = if book.get_sheet_by_name(&layout.sheet_name).is_some() {
        book.get_sheet_by_name_mut(&layout.sheet_name)
            .ok_or_else(|| ExportError::Write(format!("sheet '{}' vanished", layout.sheet_name)))?
    } else {
        log::info!(
            "template {} has no '{}' sheet, using the active sheet",
            template_name,
            layout.sheet_name
        );
        book.get_active_sheet_mut()
    };

    write_document(sheet, &coords, request);

    let mut out = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut out)
        .map_err(|e| ExportError::Write(e.to_string()))?;

    log::info!(
        "exported {} line(s) as {} (total {:.2})",
        request.lines.len(),
        request.document_number,
        request.totals.grand_total
    );

    Ok(ExportedDocument {
        file_name: suggested_file_name(&request.document_number, template_name),
        bytes: out.into_inner(),
    })
}

fn write_document(sheet: &mut Worksheet, coords: &Coordinates, request: &ExportRequest) {
    sheet
        .get_cell_mut(coords.date)
        .set_value(format!(" {}", request.date.format("%Y-%m-%d")));
    sheet
        .get_cell_mut(coords.number)
        .set_value(request.document_number.clone());

    let [id_col, desc_col, qty_col, rate_col, amount_col] = coords.columns;
    for (offset, line) in request.lines.iter().enumerate() {
        let row = coords.start_row + offset as u32;
        sheet
            .get_cell_mut((id_col, row))
            .set_value(line.identifier.clone());
        sheet
            .get_cell_mut((desc_col, row))
            .set_value(line.description.clone());
        sheet.get_cell_mut((qty_col, row)).set_value_number(line.quantity);
        sheet.get_cell_mut((rate_col, row)).set_value_number(line.rate);
        sheet.get_cell_mut((amount_col, row)).set_value_number(line.amount);
    }

    sheet
        .get_cell_mut(coords.total_quantity)
        .set_value_number(request.totals.quantity);
    sheet
        .get_cell_mut(coords.total_amount)
        .set_value_number(request.totals.amount);
    sheet
        .get_cell_mut(coords.grand_total)
        .set_value_number(request.totals.grand_total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cart::Cart;
    use crate::core::catalog::CatalogRow;

    fn template(sheet_name: &str) -> Vec<u8> {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.set_name(sheet_name);
        sheet.get_cell_mut("A1").set_value("PROFORMA INVOICE");
        sheet.get_cell_mut("D3").set_value("DATE:");

        let mut out = Cursor::new(Vec::new());
        umya_spreadsheet::writer::xlsx::write_writer(&book, &mut out).unwrap();
        out.into_inner()
    }

    fn read(bytes: &[u8]) -> umya_spreadsheet::Spreadsheet {
        umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes.to_vec()), true).unwrap()
    }

    fn number(sheet: &Worksheet, cell: &str) -> f64 {
        sheet.get_value(cell).parse().unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 27).unwrap()
    }

    fn widget_cart() -> Cart {
        let row = CatalogRow::new("4006381333931", "Widget A", 10.0);
        let mut cart = Cart::new();
        cart.add_item(&row, 3.0).unwrap();
        cart.add_item(&row, 2.0).unwrap();
        cart
    }

    #[test]
    fn test_export_writes_header_lines_and_totals() {
        let cart = widget_cart();
        let request = ExportRequest::new(cart.items(), "PIM250827KSA001", date()).unwrap();
        let doc = export("PI.xlsx", &template("Invoice"), &TemplateLayout::default(), &request).unwrap();

        assert_eq!(doc.file_name, "PIM250827KSA001.xlsx");

        let book = read(&doc.bytes);
        let sheet = book.get_sheet_by_name("Invoice").unwrap();
        assert_eq!(sheet.get_value("E3"), " 2025-08-27");
        assert_eq!(sheet.get_value("E4"), "PIM250827KSA001");
        assert_eq!(sheet.get_value("A14"), "4006381333931");
        assert_eq!(sheet.get_value("B14"), "Widget A");
        assert_eq!(number(sheet, "C14"), 5.0);
        assert_eq!(number(sheet, "D14"), 10.0);
        assert_eq!(number(sheet, "E14"), 50.0);
        assert_eq!(number(sheet, "C31"), 5.0);
        assert_eq!(number(sheet, "E31"), 50.0);
        assert_eq!(number(sheet, "E34"), 50.0);
        // Existing template content is kept
        assert_eq!(sheet.get_value("A1"), "PROFORMA INVOICE");
    }

    #[test]
    fn test_lines_fill_consecutive_rows_in_cart_order() {
        let mut cart = Cart::new();
        cart.add_item(&CatalogRow::new("B", "Second", 2.0), 1.0).unwrap();
        cart.add_item(&CatalogRow::new("A", "First", 1.0), 4.0).unwrap();
        cart.add_item(&CatalogRow::new("C", "Third", 0.5), 2.0).unwrap();

        let request = ExportRequest::new(cart.items(), "N1", date()).unwrap();
        let doc = export("PI.xlsx", &template("Invoice"), &TemplateLayout::default(), &request).unwrap();

        let book = read(&doc.bytes);
        let sheet = book.get_sheet_by_name("Invoice").unwrap();
        assert_eq!(sheet.get_value("A14"), "B");
        assert_eq!(sheet.get_value("A15"), "A");
        assert_eq!(sheet.get_value("A16"), "C");
        assert_eq!(number(sheet, "C31"), 7.0);
        assert_eq!(number(sheet, "E31"), 7.0);
    }

    #[test]
    fn test_falls_back_to_active_sheet() {
        let cart = widget_cart();
        let request = ExportRequest::new(cart.items(), "N1", date()).unwrap();
        let doc = export("PI.xlsx", &template("Sheet1"), &TemplateLayout::default(), &request).unwrap();

        let book = read(&doc.bytes);
        let sheet = book.get_sheet_by_name("Sheet1").unwrap();
        assert_eq!(sheet.get_value("E4"), "N1");
    }

    #[test]
    fn test_custom_layout() {
        let cart = widget_cart();
        let layout = TemplateLayout {
            number_cell: "B2".to_string(),
            items_start_row: 20,
            total_amount_cell: "F40".to_string(),
            ..TemplateLayout::default()
        };
        let request = ExportRequest::new(cart.items(), "N1", date()).unwrap();
        let doc = export("PI.xlsx", &template("Invoice"), &layout, &request).unwrap();

        let book = read(&doc.bytes);
        let sheet = book.get_sheet_by_name("Invoice").unwrap();
        assert_eq!(sheet.get_value("B2"), "N1");
        assert_eq!(sheet.get_value("A20"), "4006381333931");
        assert_eq!(number(sheet, "F40"), 50.0);
    }

    #[test]
    fn test_non_finite_values_export_as_zero() {
        let items = vec![CartItem {
            identifier: "X".to_string(),
            description: "Broken".to_string(),
            quantity: 2.0,
            rate: f64::NAN,
            amount: f64::NAN,
        }];
        let request = ExportRequest::new(&items, "N1", date()).unwrap();
        assert_eq!(request.lines[0].rate, 0.0);
        assert_eq!(request.lines[0].amount, 0.0);
        assert_eq!(request.totals.amount, 0.0);

        let doc = export("PI.xlsx", &template("Invoice"), &TemplateLayout::default(), &request).unwrap();
        let book = read(&doc.bytes);
        let sheet = book.get_sheet_by_name("Invoice").unwrap();
        assert_eq!(number(sheet, "E14"), 0.0);
    }

    #[test]
    fn test_empty_cart_is_refused() {
        let err = ExportRequest::new(&[], "N1", date()).unwrap_err();
        assert!(matches!(err, ExportError::EmptyCart));
    }

    #[test]
    fn test_invalid_layout_is_rejected_before_writing() {
        let cart = widget_cart();
        let layout = TemplateLayout {
            total_amount_cell: "31E".to_string(),
            ..TemplateLayout::default()
        };
        let request = ExportRequest::new(cart.items(), "N1", date()).unwrap();
        let err = export("PI.xlsx", &template("Invoice"), &layout, &request).unwrap_err();
        assert!(matches!(
            err,
            ExportError::InvalidCell {
                field: "total_amount_cell",
                ..
            }
        ));
    }

    #[test]
    fn test_start_row_past_sheet_end_is_rejected() {
        for start in [MAX_ROW + 1, u32::MAX] {
            let layout = TemplateLayout {
                items_start_row: start,
                ..TemplateLayout::default()
            };
            let err = layout.validate().unwrap_err();
            assert!(matches!(
                err,
                ExportError::InvalidCell {
                    field: "items_start_row",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_line_items_running_off_the_sheet_are_rejected() {
        let mut cart = Cart::new();
        cart.add_item(&CatalogRow::new("A", "First", 1.0), 1.0).unwrap();
        cart.add_item(&CatalogRow::new("B", "Second", 1.0), 1.0).unwrap();
        let request = ExportRequest::new(cart.items(), "N1", date()).unwrap();

        let last_row = TemplateLayout {
            items_start_row: MAX_ROW,
            ..TemplateLayout::default()
        };
        assert!(last_row.validate().is_ok());
        let err = export("PI.xlsx", &template("Invoice"), &last_row, &request).unwrap_err();
        assert!(matches!(
            err,
            ExportError::InvalidCell {
                field: "items_start_row",
                ..
            }
        ));
    }

    #[test]
    fn test_unreadable_template() {
        let cart = widget_cart();
        let request = ExportRequest::new(cart.items(), "N1", date()).unwrap();
        let err = export("PI.xlsx", b"not a workbook", &TemplateLayout::default(), &request).unwrap_err();
        assert!(matches!(err, ExportError::Template { .. }));
        assert!(check_template("PI.xlsx", b"not a workbook").is_err());
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("A1"), Some((1, 1)));
        assert_eq!(parse_cell("E31"), Some((5, 31)));
        assert_eq!(parse_cell("aa10"), Some((27, 10)));
        assert_eq!(parse_cell("E0"), None);
        assert_eq!(parse_cell("31E"), None);
        assert_eq!(parse_cell("E"), None);
        assert_eq!(parse_cell(""), None);
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(suggested_file_name("PIM1", "PI template.xlsx"), "PIM1.xlsx");
        assert_eq!(suggested_file_name("PIM1", "PI.xlsm"), "PIM1.xlsm");
        assert_eq!(suggested_file_name("PIM1", "template"), "PIM1.xlsx");
    }
}
