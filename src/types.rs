use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

//==============================================================================
// Raw grid
//==============================================================================

/// A single literal value read from an export cell
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

static EMPTY: CellValue = CellValue::Empty;

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric reading of the cell: numbers as-is, numeric text parsed,
    /// everything else `None`
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Empty | CellValue::Bool(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Lenient numeric coercion: non-numeric and blank cells count as 0
    pub fn to_number(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// A worksheet read into absolute (zero-based) coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell at an absolute position; out-of-range cells read as empty
    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn row(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }
}

//==============================================================================
// Parsed export
//==============================================================================

/// An export column: header label plus its absolute column index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    pub label: String,
    pub index: u32,
}

impl ColumnRef {
    pub fn new(label: impl Into<String>, index: u32) -> Self {
        Self {
            label: label.into(),
            index,
        }
    }
}

/// One equity holder row from the export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakeholderRecord {
    pub name: String,
    /// Absolute zero-based row in the export sheet
    pub source_row_index: u32,
    /// Raw value per share class, in share-class column order
    pub holdings_by_class: Vec<(String, CellValue)>,
    pub total_shares: f64,
    pub total_options: f64,
}

impl StakeholderRecord {
    pub fn holding(&self, class_label: &str) -> Option<&CellValue> {
        self.holdings_by_class
            .iter()
            .find(|(label, _)| label == class_label)
            .map(|(_, value)| value)
    }

    /// Coerced units held in one class (blank or non-numeric = 0, sign kept
    /// so the figure matches what a formula on the cell evaluates to)
    pub fn units(&self, class_label: &str) -> f64 {
        self.holding(class_label).map(CellValue::to_number).unwrap_or(0.0)
    }
}

/// Everything extracted from one export; read-only once built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedExport {
    /// Sheet the data was read from (also the sheet copied into the output)
    pub sheet_name: String,
    pub company_name: String,
    pub as_of_date: NaiveDate,
    /// Whether `as_of_date` came from the export or defaulted to today
    pub as_of_date_found: bool,
    pub header_row_index: u32,
    pub name_column: ColumnRef,
    pub outstanding_column: Option<ColumnRef>,
    pub stakeholders: Vec<StakeholderRecord>,
    pub share_classes: Vec<ColumnRef>,
    pub option_columns: Vec<ColumnRef>,
    pub validation_totals: BTreeMap<String, f64>,
    pub unit_prices: BTreeMap<String, f64>,
    pub price_row_index: Option<u32>,
}

impl ParsedExport {
    /// Sum of one class across every stakeholder
    pub fn class_total(&self, class_label: &str) -> f64 {
        self.stakeholders.iter().map(|s| s.units(class_label)).sum()
    }
}

//==============================================================================
// Summary
//==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassTotal {
    pub class: String,
    pub total: f64,
}

/// Result of one transformation, for caller display only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub output_path: PathBuf,
    pub raw_sheet: String,
    pub company_name: String,
    pub as_of_date: NaiveDate,
    pub investors_processed: usize,
    pub top_investors: usize,
    pub other_investors: usize,
    pub share_classes_mapped: Vec<String>,
    pub totals_by_class: Vec<ClassTotal>,
    pub validation: BTreeMap<String, f64>,
    pub prices_found: bool,
    pub warnings: Vec<String>,
}
