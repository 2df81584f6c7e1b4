//! Transformation configuration
//!
//! Sheet names, scan depths, footer keywords, and every template cell
//! coordinate the populator writes to. All fields default to the layout of
//! the firm's cap table template, so a YAML file only needs the values it
//! overrides.

use crate::error::{CapTableError, CapTableResult};
use crate::excel::formula::{column_letter_to_index, CellAddress};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub export: ExportLayout,
    pub template: TemplateLayout,
}

impl TransformConfig {
    /// Load a YAML config file and validate it
    pub fn load(path: &Path) -> CapTableResult<Self> {
        if !path.exists() {
            return Err(CapTableError::MissingFile(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let config: TransformConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise defaults
    pub fn load_or_default(path: Option<&Path>) -> CapTableResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> CapTableResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject layouts the populator cannot address
    pub fn validate(&self) -> CapTableResult<()> {
        self.export.validate()?;
        self.template.resolve().map(|_| ())
    }
}

//==============================================================================
// Export side
//==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportLayout {
    /// Sheet holding the detailed cap table
    pub sheet_name: String,
    /// Fragment stripped from the title cell to get the company name
    pub title_boilerplate: String,
    /// Rows scanned for the header (top-most match wins)
    pub header_scan_rows: usize,
    /// Rows whose leading cell is scanned for "As of MM/DD/YYYY"
    pub date_scan_rows: usize,
    /// Case-insensitive substrings that mark a summary/footer row
    pub footer_keywords: Vec<String>,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Detailed Cap".to_string(),
            title_boilerplate: "Detailed Capitalization Table".to_string(),
            header_scan_rows: 10,
            date_scan_rows: 5,
            footer_keywords: [
                "total",
                "outstanding",
                "available",
                "fully diluted",
                "percentage",
                "price per",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl ExportLayout {
    fn validate(&self) -> CapTableResult<()> {
        if self.sheet_name.trim().is_empty() {
            return Err(CapTableError::Format(
                "export.sheet_name must not be empty".to_string(),
            ));
        }
        if self.header_scan_rows == 0 {
            return Err(CapTableError::Format(
                "export.header_scan_rows must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

//==============================================================================
// Template side
//==============================================================================

/// Inclusive column span, by letter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpan {
    pub first: String,
    pub last: String,
}

impl ColumnSpan {
    fn new(first: &str, last: &str) -> Self {
        Self {
            first: first.to_string(),
            last: last.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    /// Sheet receiving the investor inputs
    pub sheet_name: String,
    /// Sheet the raw export is copied into (replaced if present)
    pub raw_sheet_name: String,
    pub company_cell: String,
    pub date_cell: String,
    /// Row (1-based) holding the share-class header labels
    pub class_header_row: u32,
    /// One column per mapped share class, left to right
    pub class_columns: Vec<String>,
    /// First investor row (1-based)
    pub first_investor_row: u32,
    pub top_investor_count: u32,
    pub name_column: String,
    pub common_column: String,
    pub options_column: String,
    /// Columns zeroed on unused investor rows and an empty rollup row
    pub cleared_columns: ColumnSpan,
    pub other_row: u32,
    pub other_label: String,
    pub warrants_row: u32,
    pub warrants_columns: ColumnSpan,
    /// Top cell of the price block; class `i` lands `i` rows below it
    pub price_cell: String,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Inputs".to_string(),
            raw_sheet_name: "Carta Raw".to_string(),
            company_cell: "I6".to_string(),
            date_cell: "I7".to_string(),
            class_header_row: 30,
            class_columns: ["F", "G", "H", "I"].iter().map(|s| s.to_string()).collect(),
            first_investor_row: 31,
            top_investor_count: 9,
            name_column: "D".to_string(),
            common_column: "P".to_string(),
            options_column: "Q".to_string(),
            cleared_columns: ColumnSpan::new("F", "Q"),
            other_row: 40,
            other_label: "Other Investors".to_string(),
            warrants_row: 41,
            warrants_columns: ColumnSpan::new("F", "O"),
            price_cell: "K10".to_string(),
        }
    }
}

/// Template layout with every coordinate resolved to zero-based indices
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayout {
    pub sheet_name: String,
    pub raw_sheet_name: String,
    pub company_cell: CellAddress,
    pub date_cell: CellAddress,
    pub class_header_row: u32,
    pub class_columns: Vec<u32>,
    pub first_investor_row: u32,
    pub top_investor_count: usize,
    pub name_column: u32,
    pub common_column: u32,
    pub options_column: u32,
    pub cleared_columns: (u32, u32),
    pub other_row: u32,
    pub other_label: String,
    pub warrants_row: u32,
    pub warrants_columns: (u32, u32),
    pub price_cell: CellAddress,
}

impl ResolvedLayout {
    /// How many share classes the template has room for
    pub fn max_classes(&self) -> usize {
        self.class_columns.len()
    }
}

impl TemplateLayout {
    pub fn resolve(&self) -> CapTableResult<ResolvedLayout> {
        if self.sheet_name.trim().is_empty() || self.raw_sheet_name.trim().is_empty() {
            return Err(CapTableError::Format(
                "template sheet names must not be empty".to_string(),
            ));
        }
        if self.sheet_name == self.raw_sheet_name {
            return Err(CapTableError::Format(format!(
                "template.raw_sheet_name must differ from template.sheet_name ('{}')",
                self.sheet_name
            )));
        }
        if self.class_columns.is_empty() {
            return Err(CapTableError::Format(
                "template.class_columns must name at least one column".to_string(),
            ));
        }
        if self.top_investor_count == 0 {
            return Err(CapTableError::Format(
                "template.top_investor_count must be at least 1".to_string(),
            ));
        }

        let class_columns = self
            .class_columns
            .iter()
            .map(|c| column("class_columns", c))
            .collect::<CapTableResult<Vec<_>>>()?;

        Ok(ResolvedLayout {
            sheet_name: self.sheet_name.clone(),
            raw_sheet_name: self.raw_sheet_name.clone(),
            company_cell: cell("company_cell", &self.company_cell)?,
            date_cell: cell("date_cell", &self.date_cell)?,
            class_header_row: row("class_header_row", self.class_header_row)?,
            class_columns,
            first_investor_row: row("first_investor_row", self.first_investor_row)?,
            top_investor_count: self.top_investor_count as usize,
            name_column: column("name_column", &self.name_column)?,
            common_column: column("common_column", &self.common_column)?,
            options_column: column("options_column", &self.options_column)?,
            cleared_columns: span("cleared_columns", &self.cleared_columns)?,
            other_row: row("other_row", self.other_row)?,
            other_label: self.other_label.clone(),
            warrants_row: row("warrants_row", self.warrants_row)?,
            warrants_columns: span("warrants_columns", &self.warrants_columns)?,
            price_cell: cell("price_cell", &self.price_cell)?,
        })
    }
}

fn cell(field: &str, a1: &str) -> CapTableResult<CellAddress> {
    CellAddress::from_a1(a1).ok_or_else(|| {
        CapTableError::Format(format!("template.{field}: '{a1}' is not a cell reference"))
    })
}

fn column(field: &str, letters: &str) -> CapTableResult<u32> {
    column_letter_to_index(letters).ok_or_else(|| {
        CapTableError::Format(format!("template.{field}: '{letters}' is not a column letter"))
    })
}

fn row(field: &str, one_based: u32) -> CapTableResult<u32> {
    one_based.checked_sub(1).ok_or_else(|| {
        CapTableError::Format(format!("template.{field}: rows are numbered from 1"))
    })
}

fn span(field: &str, s: &ColumnSpan) -> CapTableResult<(u32, u32)> {
    let first = column(field, &s.first)?;
    let last = column(field, &s.last)?;
    if first > last {
        return Err(CapTableError::Format(format!(
            "template.{field}: {}..{} runs backwards",
            s.first, s.last
        )));
    }
    Ok((first, last))
}
