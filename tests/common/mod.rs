//! Shared fixtures: synthetic Carta exports and starter templates

#![allow(dead_code)]

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use carta_captable::config::TemplateLayout;
use carta_captable::excel::{CellAddress, TemplateScaffold};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

/// Zero-based row of the column-label row in every fixture export
pub const HEADER_ROW: u32 = 3;
/// Zero-based row of the first holder
pub const FIRST_HOLDER_ROW: u32 = 4;
pub const NAME_COL: u16 = 1;
pub const FIRST_CLASS_COL: u16 = 2;

pub struct Holder {
    pub name: String,
    pub units: Vec<f64>,
    pub options: f64,
}

pub fn holder(name: &str, units: &[f64], options: f64) -> Holder {
    Holder {
        name: name.to_string(),
        units: units.to_vec(),
        options,
    }
}

/// A "Detailed Cap" export laid out the way Carta writes it:
///
/// ```text
/// row 0  <Company> Detailed Capitalization Table
/// row 1  As of MM/DD/YYYY
/// row 3  Stakeholder ID | Name | <classes...> | Outstanding Units | Stock Options
/// row 4+ holders, then a blank row and the footer rows
/// ```
pub struct ExportFixture {
    pub sheet_name: String,
    pub title: String,
    pub as_of: Option<String>,
    pub classes: Vec<String>,
    pub holders: Vec<Holder>,
    /// Per-class unit prices; empty means no price row
    pub prices: Vec<f64>,
    /// Overrides the computed per-class fully diluted totals
    pub fully_diluted: Option<Vec<f64>>,
}

impl ExportFixture {
    pub fn new(company: &str) -> Self {
        Self {
            sheet_name: "Detailed Cap".to_string(),
            title: format!("{company} Detailed Capitalization Table"),
            as_of: Some("As of 03/31/2024".to_string()),
            classes: vec![
                "Class A Units (CA)".to_string(),
                "Series Seed Preferred (SS) Units".to_string(),
            ],
            holders: Vec::new(),
            prices: Vec::new(),
            fully_diluted: None,
        }
    }

    pub fn with_holders(mut self, holders: Vec<Holder>) -> Self {
        self.holders = holders;
        self
    }

    pub fn with_prices(mut self, prices: &[f64]) -> Self {
        self.prices = prices.to_vec();
        self
    }

    pub fn outstanding_col(&self) -> u16 {
        FIRST_CLASS_COL + self.classes.len() as u16
    }

    pub fn options_col(&self) -> u16 {
        self.outstanding_col() + 1
    }

    /// Zero-based row of the "Price per unit" footer, when written
    pub fn price_row(&self) -> u32 {
        FIRST_HOLDER_ROW + self.holders.len() as u32 + 3
    }

    pub fn write(&self, path: &Path) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name).unwrap();

        sheet.write_string(0, 0, &self.title).unwrap();
        if let Some(as_of) = &self.as_of {
            sheet.write_string(1, 0, as_of).unwrap();
        }

        sheet.write_string(HEADER_ROW, 0, "Stakeholder ID").unwrap();
        sheet.write_string(HEADER_ROW, NAME_COL, "Name").unwrap();
        for (i, class) in self.classes.iter().enumerate() {
            sheet
                .write_string(HEADER_ROW, FIRST_CLASS_COL + i as u16, class)
                .unwrap();
        }
        sheet
            .write_string(HEADER_ROW, self.outstanding_col(), "Outstanding Units")
            .unwrap();
        sheet
            .write_string(HEADER_ROW, self.options_col(), "Stock Options")
            .unwrap();

        let mut class_totals = vec![0.0; self.classes.len()];
        let mut outstanding_total = 0.0;
        for (i, h) in self.holders.iter().enumerate() {
            let row = FIRST_HOLDER_ROW + i as u32;
            sheet.write_number(row, 0, (i + 1) as f64).unwrap();
            sheet.write_string(row, NAME_COL, &h.name).unwrap();
            for (c, units) in h.units.iter().enumerate() {
                sheet
                    .write_number(row, FIRST_CLASS_COL + c as u16, *units)
                    .unwrap();
                class_totals[c] += units;
            }
            let outstanding: f64 = h.units.iter().sum();
            outstanding_total += outstanding;
            sheet
                .write_number(row, self.outstanding_col(), outstanding)
                .unwrap();
            sheet.write_number(row, self.options_col(), h.options).unwrap();
        }

        // One blank row, then the footer block
        let footer = FIRST_HOLDER_ROW + self.holders.len() as u32 + 1;
        sheet
            .write_string(footer, NAME_COL, "Total Units Outstanding")
            .unwrap();
        sheet
            .write_number(footer, self.outstanding_col(), outstanding_total)
            .unwrap();

        sheet
            .write_string(footer + 1, NAME_COL, "Fully Diluted Units")
            .unwrap();
        let fully_diluted = self.fully_diluted.clone().unwrap_or(class_totals);
        for (c, total) in fully_diluted.iter().enumerate() {
            sheet
                .write_number(footer + 1, FIRST_CLASS_COL + c as u16, *total)
                .unwrap();
        }

        if !self.prices.is_empty() {
            let row = self.price_row();
            sheet.write_string(row, NAME_COL, "Price per unit").unwrap();
            for (c, price) in self.prices.iter().enumerate() {
                sheet
                    .write_number(row, FIRST_CLASS_COL + c as u16, *price)
                    .unwrap();
            }
        }

        workbook.save(path).unwrap();
    }
}

/// `count` holders with strictly decreasing Class A holdings, in export order
pub fn descending_holders(count: usize) -> Vec<Holder> {
    (0..count)
        .map(|i| {
            holder(
                &format!("Investor {:02}", i + 1),
                &[1000.0 - 10.0 * i as f64, 0.0],
                i as f64,
            )
        })
        .collect()
}

/// Starter template for the default layout
pub fn write_template(path: &Path) {
    let layout = TemplateLayout::default().resolve().unwrap();
    TemplateScaffold::new(layout).write(path).unwrap();
}

/// Export + template written into `dir`
pub fn write_inputs(dir: &Path, export: &ExportFixture) -> (PathBuf, PathBuf) {
    let export_path = dir.join("carta_export.xlsx");
    let template_path = dir.join("Cap Table Template.xlsx");
    export.write(&export_path);
    write_template(&template_path);
    (export_path, template_path)
}

pub fn formulas(path: &Path, sheet: &str) -> Range<String> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook.worksheet_formula(sheet).unwrap()
}

pub fn values(path: &Path, sheet: &str) -> Range<Data> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook.worksheet_range(sheet).unwrap()
}

fn position(a1: &str) -> (u32, u32) {
    let cell = CellAddress::from_a1(a1).unwrap();
    (cell.row, cell.col)
}

/// Formula text at an A1 cell (no leading `=`); empty when the cell has none
pub fn formula_at(range: &Range<String>, a1: &str) -> String {
    range.get_value(position(a1)).cloned().unwrap_or_default()
}

pub fn value_at(range: &Range<Data>, a1: &str) -> Data {
    range.get_value(position(a1)).cloned().unwrap_or(Data::Empty)
}

pub fn number_at(range: &Range<Data>, a1: &str) -> Option<f64> {
    match value_at(range, a1) {
        Data::Float(f) => Some(f),
        Data::Int(i) => Some(i as f64),
        Data::DateTime(dt) => Some(dt.as_f64()),
        _ => None,
    }
}

pub fn text_at(range: &Range<Data>, a1: &str) -> Option<String> {
    match value_at(range, a1) {
        Data::String(s) => Some(s),
        _ => None,
    }
}

/// Files in `dir` other than the given inputs
pub fn extra_files(dir: &Path, inputs: &[&PathBuf]) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| !inputs.iter().any(|i| *i == p))
        .collect()
}
