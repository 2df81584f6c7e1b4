//! Export reader - Excel (.xlsx) sheet → absolute-coordinate grid

use crate::error::{CapTableError, CapTableResult};
use crate::types::{CellValue, RawSheet};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::Path;
use tracing::debug;

/// List the sheet names of a workbook
pub fn sheet_names(path: &Path) -> CapTableResult<Vec<String>> {
    let workbook: Xlsx<_> = open_workbook(path).map_err(|e| {
        CapTableError::Workbook(format!("Failed to open {}: {}", path.display(), e))
    })?;
    Ok(workbook.sheet_names().to_vec())
}

/// Read one worksheet into a `RawSheet`
///
/// Cell positions are absolute: a sheet whose first used cell is `B3` still
/// reports that cell at (2, 1).
pub fn read_sheet(path: &Path, sheet: &str) -> CapTableResult<RawSheet> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| {
        CapTableError::Workbook(format!("Failed to open {}: {}", path.display(), e))
    })?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(CapTableError::SheetNotFound {
            sheet: sheet.to_string(),
            path: path.to_path_buf(),
        });
    }

    let range = workbook.worksheet_range(sheet).map_err(|e| {
        CapTableError::Workbook(format!("Failed to read sheet '{}': {}", sheet, e))
    })?;

    let raw = range_to_sheet(sheet, &range);
    debug!(
        sheet,
        rows = raw.height(),
        columns = raw.width(),
        "read export sheet"
    );
    Ok(raw)
}

fn range_to_sheet(name: &str, range: &Range<Data>) -> RawSheet {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }

    RawSheet::new(name, rows)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        other => CellValue::Text(other.to_string()),
    }
}
