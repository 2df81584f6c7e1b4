//! Template workbook - read an existing .xlsx, embed the raw export, write
//! the planned cells, save a copy
//!
//! The template is loaded into memory and saved elsewhere, so the original
//! file is never modified.

use crate::error::{CapTableError, CapTableResult};
use crate::populator::{CellContent, CellWrite};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::debug;
use umya_spreadsheet::{Cell, Spreadsheet, Worksheet};

const DATE_FORMAT: &str = "mm/dd/yyyy";

/// Excel's serial-day epoch (1900 date system)
fn excel_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default();
    (date - epoch).num_days() as f64
}

pub struct TemplateWorkbook {
    book: Spreadsheet,
    path: PathBuf,
}

impl TemplateWorkbook {
    /// Load a workbook, keeping its formulas and styles
    pub fn open(path: &Path) -> CapTableResult<Self> {
        let book = umya_spreadsheet::reader::xlsx::read(path).map_err(|e| {
            CapTableError::Workbook(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self {
            book,
            path: path.to_path_buf(),
        })
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.book.get_sheet_by_name(name).is_some()
    }

    fn sheet_mut(&mut self, name: &str) -> CapTableResult<&mut Worksheet> {
        let path = self.path.clone();
        self.book
            .get_sheet_by_name_mut(name)
            .ok_or(CapTableError::SheetNotFound {
                sheet: name.to_string(),
                path,
            })
    }

    /// Copy a sheet from another workbook under `target_name`, replacing any
    /// sheet already called that
    ///
    /// Values, per-cell styles (number format, borders, fill, font,
    /// alignment) and column widths are copied. Formula cells are copied as
    /// their cached value.
    pub fn copy_sheet_from(
        &mut self,
        source_path: &Path,
        source_sheet: &str,
        target_name: &str,
    ) -> CapTableResult<()> {
        let source_book = umya_spreadsheet::reader::xlsx::read(source_path).map_err(|e| {
            CapTableError::Workbook(format!("Failed to open {}: {}", source_path.display(), e))
        })?;
        let source = source_book
            .get_sheet_by_name(source_sheet)
            .ok_or_else(|| CapTableError::SheetNotFound {
                sheet: source_sheet.to_string(),
                path: source_path.to_path_buf(),
            })?;

        if self.has_sheet(target_name) {
            self.book
                .remove_sheet_by_name(target_name)
                .map_err(|e| CapTableError::Write(format!("Failed to replace sheet '{}': {}", target_name, e)))?;
        }
        let target = self
            .book
            .new_sheet(target_name)
            .map_err(|e| CapTableError::Write(format!("Failed to add sheet '{}': {}", target_name, e)))?;

        let mut copied = 0usize;
        for cell in source.get_cell_collection() {
            copy_cell(cell, target);
            copied += 1;
        }
        for column in source.get_column_dimensions() {
            target
                .get_column_dimension_by_number_mut(column.get_col_num())
                .set_width(*column.get_width());
        }

        debug!(
            from = source_sheet,
            to = target_name,
            cells = copied,
            "copied raw export sheet"
        );
        Ok(())
    }

    /// Apply planned writes to one sheet
    pub fn apply(&mut self, sheet_name: &str, writes: &[CellWrite]) -> CapTableResult<()> {
        let sheet = self.sheet_mut(sheet_name)?;
        for write in writes {
            let cell = sheet.get_cell_mut(write.cell.to_one_based());
            match &write.content {
                CellContent::Text(text) => {
                    cell.set_value_string(text.clone());
                }
                CellContent::Number(n) => {
                    cell.set_value_number(*n);
                }
                CellContent::Date(date) => {
                    cell.set_value_number(excel_serial(*date));
                    let style = cell.get_style_mut();
                    let general = style
                        .get_number_format()
                        .map(|f| f.get_format_code() == "General")
                        .unwrap_or(true);
                    if general {
                        style.get_number_format_mut().set_format_code(DATE_FORMAT);
                    }
                }
                CellContent::Formula(formula) => {
                    cell.set_formula(formula.expression());
                }
                CellContent::Blank => {
                    cell.set_blank();
                }
            }
        }
        debug!(sheet = sheet_name, writes = writes.len(), "applied template writes");
        Ok(())
    }

    /// Save to `path` via a temp file in the same directory, so a failed
    /// save leaves nothing behind
    pub fn save(&self, path: &Path) -> CapTableResult<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.is_dir() {
            return Err(CapTableError::Write(format!(
                "Output directory does not exist: {}",
                dir.display()
            )));
        }

        let temp = tempfile::Builder::new()
            .prefix(".captable-")
            .suffix(".xlsx")
            .tempfile_in(&dir)
            .map_err(|e| CapTableError::Write(format!("Failed to create temp file: {}", e)))?;

        umya_spreadsheet::writer::xlsx::write(&self.book, temp.path()).map_err(|e| {
            CapTableError::Write(format!("Failed to save {}: {}", path.display(), e))
        })?;

        temp.persist(path).map_err(|e| {
            CapTableError::Write(format!("Failed to save {}: {}", path.display(), e.error))
        })?;
        Ok(())
    }
}

fn copy_cell(source: &Cell, target: &mut Worksheet) {
    let coordinate = source.get_coordinate();
    let col = *coordinate.get_col_num();
    let row = *coordinate.get_row_num();
    let cell = target.get_cell_mut((col, row));

    if source.is_formula() {
        let cached = source.get_value();
        match cached.trim().parse::<f64>() {
            Ok(n) => {
                cell.set_value_number(n);
            }
            Err(_) => {
                cell.set_value_string(cached.to_string());
            }
        }
    } else {
        cell.set_cell_value(source.get_cell_value().clone());
    }
    cell.set_style(source.get_style().clone());
}
