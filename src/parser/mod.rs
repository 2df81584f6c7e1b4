//! Carta export parser
//!
//! Turns the free-form "Detailed Cap" sheet into a `ParsedExport`: finds the
//! header row, classifies columns, keeps stakeholder rows, totals holdings,
//! and picks up the footer validation totals and per-class unit prices.
//! Parsing is a pure read of the grid; nothing is written.

use crate::config::ExportLayout;
use crate::core::classify::{
    classify_column, classify_footer_label, classify_header_row, classify_row_name,
    company_from_title, extract_as_of_date, is_stakeholder_name_label, ColumnRole, FooterCheck,
    RowKind,
};
use crate::error::{CapTableError, CapTableResult};
use crate::excel::reader::read_sheet;
use crate::types::{CellValue, ColumnRef, ParsedExport, RawSheet, StakeholderRecord};
use chrono::{Local, NaiveDate};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Validation key for the "Total Units Outstanding" footer
pub const TOTAL_OUTSTANDING_KEY: &str = "total_outstanding";

/// Validation key for a class's "Fully Diluted ... Units" footer value
pub fn fully_diluted_key(class_label: &str) -> String {
    format!("fully_diluted_{class_label}")
}

/// Parse the export's detailed sheet
pub fn parse_export(path: &Path, layout: &ExportLayout) -> CapTableResult<ParsedExport> {
    parse_export_sheet(path, &layout.sheet_name, layout)
}

/// Parse a named sheet with the export heuristics
///
/// Used for the detailed sheet of a fresh export, and for re-reading the raw
/// copy embedded in a generated workbook.
pub fn parse_export_sheet(
    path: &Path,
    sheet: &str,
    layout: &ExportLayout,
) -> CapTableResult<ParsedExport> {
    let raw = read_sheet(path, sheet)?;
    let parsed = parse_sheet(&raw, layout)?;
    info!(
        company = %parsed.company_name,
        stakeholders = parsed.stakeholders.len(),
        share_classes = parsed.share_classes.len(),
        option_columns = parsed.option_columns.len(),
        "parsed export"
    );
    Ok(parsed)
}

/// Parse an already-loaded grid
pub fn parse_sheet(raw: &RawSheet, layout: &ExportLayout) -> CapTableResult<ParsedExport> {
    let header_row = find_header_row(raw, layout.header_scan_rows)?;
    let columns = classify_columns(raw, header_row)?;

    let title = raw.get(0, 0).to_string();
    let company_name = company_from_title(&title, &layout.title_boilerplate);

    let found_date = find_as_of_date(raw, layout.date_scan_rows);
    let as_of_date = found_date.unwrap_or_else(|| Local::now().date_naive());
    if found_date.is_none() {
        debug!(%as_of_date, "no 'As of' date in export, using today");
    }

    let stakeholders = collect_stakeholders(raw, header_row, &columns, &layout.footer_keywords);
    let validation_totals = collect_validation_totals(raw, header_row, &columns);
    let (unit_prices, price_row_index) = collect_unit_prices(raw, &columns);

    Ok(ParsedExport {
        sheet_name: raw.name().to_string(),
        company_name,
        as_of_date,
        as_of_date_found: found_date.is_some(),
        header_row_index: header_row as u32,
        name_column: columns.name,
        outstanding_column: columns.outstanding,
        stakeholders,
        share_classes: columns.share_classes,
        option_columns: columns.option_columns,
        validation_totals,
        unit_prices,
        price_row_index,
    })
}

/// Top-most row within `scan_rows` that looks like the column-label row
pub fn find_header_row(raw: &RawSheet, scan_rows: usize) -> CapTableResult<usize> {
    for row in 0..scan_rows.min(raw.height()) {
        let cells: Vec<String> = raw.row(row).iter().map(CellValue::to_string).collect();
        if let Some(how) = classify_header_row(cells.iter().map(String::as_str)) {
            debug!(row, ?how, "found header row");
            return Ok(row);
        }
    }
    Err(CapTableError::Format(format!(
        "Could not find header row in the first {} rows of sheet '{}' \
         (expected a 'Name' column or a 'Stakeholder' label)",
        scan_rows,
        raw.name()
    )))
}

/// "As of MM/DD/YYYY" from the leading cell of the first `scan_rows` rows
pub fn find_as_of_date(raw: &RawSheet, scan_rows: usize) -> Option<NaiveDate> {
    (0..scan_rows.min(raw.height())).find_map(|row| extract_as_of_date(&raw.get(row, 0).to_string()))
}

/// Column mapping built once from the header row
#[derive(Debug, Clone)]
struct ExportColumns {
    name: ColumnRef,
    outstanding: Option<ColumnRef>,
    share_classes: Vec<ColumnRef>,
    option_columns: Vec<ColumnRef>,
}

fn classify_columns(raw: &RawSheet, header_row: usize) -> CapTableResult<ExportColumns> {
    let mut name = None;
    let mut stakeholder_fallback = None;
    let mut outstanding = None;
    let mut share_classes = Vec::new();
    let mut option_columns = Vec::new();
    let mut seen_labels = HashSet::new();

    // Left-to-right: the template is filled in this same order
    for (idx, cell) in raw.row(header_row).iter().enumerate() {
        let text = cell.to_string();
        let label = text.trim();
        if label.is_empty() {
            continue;
        }
        let role = classify_column(label);
        let column = ColumnRef::new(unique_label(label, &mut seen_labels), idx as u32);

        match role {
            ColumnRole::Name if name.is_none() => name = Some(column.clone()),
            ColumnRole::OutstandingUnits if outstanding.is_none() => {
                outstanding = Some(column.clone())
            }
            _ => {}
        }
        if stakeholder_fallback.is_none() && is_stakeholder_name_label(label) {
            stakeholder_fallback = Some(column.clone());
        }
        if role.is_share_class() {
            share_classes.push(column.clone());
        }
        if role.is_option_pool() {
            option_columns.push(column);
        }
    }

    let name = match (name, stakeholder_fallback) {
        (Some(name), _) => name,
        (None, Some(fallback)) => {
            debug!(column = %fallback.label, "no 'Name' column, using stakeholder column");
            fallback
        }
        (None, None) => {
            return Err(CapTableError::Format(format!(
                "Header row {} of sheet '{}' has no 'Name' or stakeholder name column",
                header_row + 1,
                raw.name()
            )))
        }
    };

    debug!(
        name_column = name.index,
        share_classes = ?share_classes.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
        option_columns = ?option_columns.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
        "classified export columns"
    );

    Ok(ExportColumns {
        name,
        outstanding,
        share_classes,
        option_columns,
    })
}

/// Repeated header labels get `.1`, `.2`, ... so every column keys its own
/// holdings, validation total and price
fn unique_label(label: &str, seen: &mut HashSet<String>) -> String {
    if seen.insert(label.to_string()) {
        return label.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{label}.{n}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn collect_stakeholders(
    raw: &RawSheet,
    header_row: usize,
    columns: &ExportColumns,
    footer_keywords: &[String],
) -> Vec<StakeholderRecord> {
    let mut stakeholders = Vec::new();

    for row in (header_row + 1)..raw.height() {
        let name = raw.get(row, columns.name.index as usize).to_string();
        match classify_row_name(&name, footer_keywords) {
            RowKind::Stakeholder => {}
            RowKind::Footer(keyword) => {
                debug!(row, name = %name.trim(), %keyword, "skipping footer row");
                continue;
            }
            RowKind::Blank => continue,
        }

        let holdings_by_class: Vec<(String, CellValue)> = columns
            .share_classes
            .iter()
            .map(|c| (c.label.clone(), raw.get(row, c.index as usize).clone()))
            .collect();
        // Record totals are floored at 0; per-cell values keep their sign
        let total_shares = holdings_by_class
            .iter()
            .map(|(_, v)| v.to_number())
            .sum::<f64>()
            .max(0.0);
        let total_options = columns
            .option_columns
            .iter()
            .map(|c| raw.get(row, c.index as usize).to_number())
            .sum::<f64>()
            .max(0.0);

        stakeholders.push(StakeholderRecord {
            name: name.trim().to_string(),
            source_row_index: row as u32,
            holdings_by_class,
            total_shares,
            total_options,
        });
    }

    stakeholders
}

fn collect_validation_totals(
    raw: &RawSheet,
    header_row: usize,
    columns: &ExportColumns,
) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();

    for row in (header_row + 1)..raw.height() {
        let label = raw.get(row, columns.name.index as usize).to_string();
        match classify_footer_label(&label) {
            Some(FooterCheck::TotalUnitsOutstanding) => {
                let value = columns
                    .outstanding
                    .as_ref()
                    .map(|c| raw.get(row, c.index as usize).to_number())
                    .unwrap_or(0.0);
                totals.insert(TOTAL_OUTSTANDING_KEY.to_string(), value);
            }
            Some(FooterCheck::FullyDilutedUnits) => {
                for class in &columns.share_classes {
                    totals.insert(
                        fully_diluted_key(&class.label),
                        raw.get(row, class.index as usize).to_number(),
                    );
                }
            }
            Some(FooterCheck::PricePerUnit) | None => {}
        }
    }

    totals
}

/// First "Price per unit" row anywhere in the sheet; only positive prices kept
fn collect_unit_prices(
    raw: &RawSheet,
    columns: &ExportColumns,
) -> (BTreeMap<String, f64>, Option<u32>) {
    let mut prices = BTreeMap::new();

    for row in 0..raw.height() {
        let label = raw.get(row, columns.name.index as usize).to_string();
        if classify_footer_label(&label) != Some(FooterCheck::PricePerUnit) {
            continue;
        }
        for class in &columns.share_classes {
            match raw.get(row, class.index as usize).as_number() {
                Some(price) if price > 0.0 => {
                    prices.insert(class.label.clone(), price);
                }
                _ => debug!(class = %class.label, "no positive unit price"),
            }
        }
        return (prices, Some(row as u32));
    }

    (prices, None)
}
