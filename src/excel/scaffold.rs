//! Starter template writer
//!
//! Writes a minimal cap table template whose Inputs sheet follows the
//! configured layout, plus a Summary sheet with formulas that consume the
//! investor inputs. Handy for trying the transformer without the firm's own
//! template, and used as the template fixture in tests.

use crate::config::ResolvedLayout;
use crate::error::{CapTableError, CapTableResult};
use crate::excel::formula::column_index_to_letter;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

fn xlsx_err(e: XlsxError) -> CapTableError {
    CapTableError::Write(format!("Failed to write template: {}", e))
}

/// Excel template generator for a given layout
pub struct TemplateScaffold {
    layout: ResolvedLayout,
}

impl TemplateScaffold {
    pub fn new(layout: ResolvedLayout) -> Self {
        Self { layout }
    }

    pub fn write(&self, output_path: &Path) -> CapTableResult<()> {
        let mut workbook = Workbook::new();

        let inputs = workbook.add_worksheet();
        inputs.set_name(&self.layout.sheet_name).map_err(xlsx_err)?;
        self.write_inputs(inputs)?;

        let summary = workbook.add_worksheet();
        summary.set_name("Summary").map_err(xlsx_err)?;
        self.write_summary(summary)?;

        workbook.save(output_path).map_err(xlsx_err)?;
        Ok(())
    }

    fn write_inputs(&self, sheet: &mut Worksheet) -> CapTableResult<()> {
        let layout = &self.layout;
        let bold = Format::new().set_bold();
        let date = Format::new().set_num_format("mm/dd/yyyy");

        sheet
            .write_string_with_format(0, 0, "Cap Table Inputs", &bold)
            .map_err(xlsx_err)?;

        label_left_of(sheet, layout.company_cell.row, layout.company_cell.col, "Company")?;
        label_left_of(sheet, layout.date_cell.row, layout.date_cell.col, "Cap table date")?;
        sheet
            .write_blank(layout.date_cell.row, layout.date_cell.col as u16, &date)
            .map_err(xlsx_err)?;

        // Price block
        if layout.price_cell.row > 0 {
            sheet
                .write_string_with_format(
                    layout.price_cell.row - 1,
                    layout.price_cell.col as u16,
                    "Price per share",
                    &bold,
                )
                .map_err(xlsx_err)?;
        }
        for (i, _) in layout.class_columns.iter().enumerate() {
            sheet
                .write_number(layout.price_cell.row + i as u32, layout.price_cell.col as u16, 0.0)
                .map_err(xlsx_err)?;
        }

        // Investor table header
        let header = layout.class_header_row;
        sheet
            .write_string_with_format(header, layout.name_column as u16, "Investor", &bold)
            .map_err(xlsx_err)?;
        for (i, &col) in layout.class_columns.iter().enumerate() {
            sheet
                .write_string_with_format(header, col as u16, format!("Class {}", i + 1), &bold)
                .map_err(xlsx_err)?;
        }
        sheet
            .write_string_with_format(header, layout.common_column as u16, "Common", &bold)
            .map_err(xlsx_err)?;
        sheet
            .write_string_with_format(header, layout.options_column as u16, "Options", &bold)
            .map_err(xlsx_err)?;

        for slot in 0..layout.top_investor_count as u32 {
            let row = layout.first_investor_row + slot;
            sheet
                .write_string(row, layout.name_column as u16, format!("Investor {}", slot + 1))
                .map_err(xlsx_err)?;
            self.write_zero_span(sheet, row, layout.cleared_columns)?;
        }

        sheet
            .write_string(layout.other_row, layout.name_column as u16, &layout.other_label)
            .map_err(xlsx_err)?;
        self.write_zero_span(sheet, layout.other_row, layout.cleared_columns)?;

        sheet
            .write_string(layout.warrants_row, layout.name_column as u16, "Warrants")
            .map_err(xlsx_err)?;
        self.write_zero_span(sheet, layout.warrants_row, layout.warrants_columns)?;

        sheet
            .set_column_width(layout.name_column as u16, 28)
            .map_err(xlsx_err)?;
        Ok(())
    }

    /// Per-class totals over every investor-input row, so the template has
    /// formulas downstream of the populated cells
    fn write_summary(&self, sheet: &mut Worksheet) -> CapTableResult<()> {
        let layout = &self.layout;
        let bold = Format::new().set_bold();
        let inputs = format!("'{}'", layout.sheet_name.replace('\'', "''"));
        let first = layout.first_investor_row + 1;
        let last = layout.other_row.max(layout.warrants_row) + 1;

        sheet
            .write_string_with_format(0, 0, "Column", &bold)
            .map_err(xlsx_err)?;
        sheet
            .write_string_with_format(0, 1, "Total", &bold)
            .map_err(xlsx_err)?;

        let mut columns: Vec<(String, u32)> = layout
            .class_columns
            .iter()
            .enumerate()
            .map(|(i, &c)| (format!("Class {}", i + 1), c))
            .collect();
        columns.push(("Common".to_string(), layout.common_column));
        columns.push(("Options".to_string(), layout.options_column));

        for (i, (label, col)) in columns.iter().enumerate() {
            let row = i as u32 + 1;
            let letter = column_index_to_letter(*col);
            sheet.write_string(row, 0, label).map_err(xlsx_err)?;
            sheet
                .write_formula(
                    row,
                    1,
                    format!("=SUM({inputs}!{letter}{first}:{letter}{last})").as_str(),
                )
                .map_err(xlsx_err)?;
        }
        Ok(())
    }

    fn write_zero_span(&self, sheet: &mut Worksheet, row: u32, (first, last): (u32, u32)) -> CapTableResult<()> {
        for col in first..=last {
            sheet.write_number(row, col as u16, 0.0).map_err(xlsx_err)?;
        }
        Ok(())
    }
}

fn label_left_of(sheet: &mut Worksheet, row: u32, col: u32, label: &str) -> CapTableResult<()> {
    if col > 0 {
        sheet.write_string(row, (col - 1) as u16, label).map_err(xlsx_err)?;
    }
    Ok(())
}
