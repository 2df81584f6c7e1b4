//! Cell addresses, cross-sheet references, and the formula strings built from them
//!
//! Formulas are modelled as data (`Formula::Reference` or `Formula::Sum`) and
//! serialized in one place, so reference-building can be tested without a
//! spreadsheet engine.

use std::fmt;

/// Excel caps a single function call at 255 arguments.
const MAX_SUM_ARGS: usize = 255;

/// Zero-based cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference (`I6`, `$K$10`, `bc32`)
    pub fn from_a1(a1: &str) -> Option<Self> {
        let cleaned: String = a1.trim().chars().filter(|c| *c != '$').collect();
        let split = cleaned.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = cleaned.split_at(split);
        let col = column_letter_to_index(letters)?;
        let row: u32 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        Some(Self { row: row - 1, col })
    }

    /// One-based (column, row) pair, the order the template backend expects
    pub fn to_one_based(self) -> (u32, u32) {
        (self.col + 1, self.row + 1)
    }

    pub fn to_a1(self) -> String {
        format!("{}{}", column_index_to_letter(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Convert a zero-based column index to an Excel column letter
///
/// Examples:
/// - 0 → A
/// - 25 → Z
/// - 26 → AA
pub fn column_index_to_letter(index: u32) -> String {
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

/// Convert an Excel column letter (`A`, `q`, `AB`) to a zero-based index
pub fn column_letter_to_index(letters: &str) -> Option<u32> {
    let letters = letters.trim();
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        let v = (b.to_ascii_uppercase() - b'A') as u32 + 1;
        col = col.checked_mul(26)?.checked_add(v)?;
    }
    Some(col - 1)
}

/// A single cell on a named sheet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub sheet: String,
    pub cell: CellAddress,
}

impl CellRef {
    pub fn new(sheet: impl Into<String>, row: u32, col: u32) -> Self {
        Self {
            sheet: sheet.into(),
            cell: CellAddress::new(row, col),
        }
    }

    pub fn to_formula_text(&self) -> String {
        format!("{}!{}", quote_sheet(&self.sheet), self.cell.to_a1())
    }
}

/// A formula written into the template
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// `='Sheet'!B5`
    Reference(CellRef),
    /// Sum of every referenced cell
    Sum(Vec<CellRef>),
}

impl Formula {
    pub fn reference(sheet: impl Into<String>, row: u32, col: u32) -> Self {
        Formula::Reference(CellRef::new(sheet, row, col))
    }

    /// Every cell the formula reads, in insertion order
    pub fn terms(&self) -> Vec<&CellRef> {
        match self {
            Formula::Reference(r) => vec![r],
            Formula::Sum(refs) => refs.iter().collect(),
        }
    }

    /// Formula text without the leading `=`
    pub fn expression(&self) -> String {
        match self {
            Formula::Reference(r) => r.to_formula_text(),
            Formula::Sum(refs) => match refs.as_slice() {
                [] => "0".to_string(),
                [single] => single.to_formula_text(),
                _ => {
                    let args = collapse_runs(refs);
                    args.chunks(MAX_SUM_ARGS)
                        .map(|chunk| format!("SUM({})", chunk.join(",")))
                        .collect::<Vec<_>>()
                        .join("+")
                }
            },
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "={}", self.expression())
    }
}

/// Sheet names are always quoted; embedded quotes are doubled
fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// Group references by (sheet, column) in first-seen order and merge
/// consecutive rows into `A1:A9` ranges.
fn collapse_runs(refs: &[CellRef]) -> Vec<String> {
    let mut groups: Vec<((&str, u32), Vec<u32>)> = Vec::new();
    for r in refs {
        let key = (r.sheet.as_str(), r.cell.col);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, rows)) => rows.push(r.cell.row),
            None => groups.push((key, vec![r.cell.row])),
        }
    }

    let mut args = Vec::new();
    for ((sheet, col), mut rows) in groups {
        rows.sort_unstable();
        let mut i = 0;
        while i < rows.len() {
            let start = rows[i];
            let mut end = start;
            while i + 1 < rows.len() && rows[i + 1] == end + 1 {
                end = rows[i + 1];
                i += 1;
            }
            let first = CellAddress::new(start, col);
            if start == end {
                args.push(format!("{}!{}", quote_sheet(sheet), first));
            } else {
                let last = CellAddress::new(end, col);
                args.push(format!("{}!{}:{}", quote_sheet(sheet), first, last));
            }
            i += 1;
        }
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index_to_letter() {
        assert_eq!(column_index_to_letter(0), "A");
        assert_eq!(column_index_to_letter(1), "B");
        assert_eq!(column_index_to_letter(25), "Z");
        assert_eq!(column_index_to_letter(26), "AA");
        assert_eq!(column_index_to_letter(27), "AB");
        assert_eq!(column_index_to_letter(701), "ZZ");
    }

    #[test]
    fn test_column_letter_to_index() {
        assert_eq!(column_letter_to_index("A"), Some(0));
        assert_eq!(column_letter_to_index("q"), Some(16));
        assert_eq!(column_letter_to_index("AA"), Some(26));
        assert_eq!(column_letter_to_index("ZZ"), Some(701));
        assert_eq!(column_letter_to_index(""), None);
        assert_eq!(column_letter_to_index("A1"), None);
    }

    #[test]
    fn test_cell_address_a1() {
        let addr = CellAddress::from_a1("I6").unwrap();
        assert_eq!(addr, CellAddress::new(5, 8));
        assert_eq!(addr.to_a1(), "I6");
        assert_eq!(addr.to_one_based(), (9, 6));
        assert_eq!(CellAddress::from_a1("$K$10"), Some(CellAddress::new(9, 10)));
        assert_eq!(CellAddress::from_a1("K0"), None);
        assert_eq!(CellAddress::from_a1("10"), None);
        assert_eq!(CellAddress::from_a1("K"), None);
    }

    #[test]
    fn test_reference_serialization() {
        let f = Formula::reference("Carta Raw", 4, 1);
        assert_eq!(f.to_string(), "='Carta Raw'!B5");
        assert_eq!(f.expression(), "'Carta Raw'!B5");
    }

    #[test]
    fn test_sheet_quote_escaping() {
        let f = Formula::reference("Bob's Raw", 0, 0);
        assert_eq!(f.expression(), "'Bob''s Raw'!A1");
    }

    #[test]
    fn test_sum_of_one_is_plain_reference() {
        let f = Formula::Sum(vec![CellRef::new("Raw", 9, 5)]);
        assert_eq!(f.to_string(), "='Raw'!F10");
    }

    #[test]
    fn test_empty_sum_is_zero() {
        assert_eq!(Formula::Sum(vec![]).to_string(), "=0");
    }

    #[test]
    fn test_sum_collapses_contiguous_rows() {
        let refs = vec![
            CellRef::new("Raw", 12, 5),
            CellRef::new("Raw", 10, 5),
            CellRef::new("Raw", 11, 5),
            CellRef::new("Raw", 20, 5),
        ];
        assert_eq!(
            Formula::Sum(refs).to_string(),
            "=SUM('Raw'!F11:F13,'Raw'!F21)"
        );
    }

    #[test]
    fn test_sum_keeps_columns_separate() {
        let refs = vec![
            CellRef::new("Raw", 4, 12),
            CellRef::new("Raw", 4, 13),
            CellRef::new("Raw", 5, 12),
            CellRef::new("Raw", 5, 13),
        ];
        assert_eq!(
            Formula::Sum(refs).to_string(),
            "=SUM('Raw'!M5:M6,'Raw'!N5:N6)"
        );
    }

    #[test]
    fn test_sum_splits_past_argument_limit() {
        // Every other row, so nothing collapses into a range
        let refs: Vec<CellRef> = (0..300).map(|i| CellRef::new("Raw", i * 2, 0)).collect();
        let text = Formula::Sum(refs).expression();
        assert_eq!(text.matches("SUM(").count(), 2);
        assert!(text.contains(")+SUM("));
    }

    #[test]
    fn test_terms_lists_every_reference() {
        let f = Formula::Sum(vec![CellRef::new("Raw", 1, 1), CellRef::new("Raw", 2, 1)]);
        assert_eq!(f.terms().len(), 2);
        assert_eq!(Formula::reference("Raw", 0, 0).terms().len(), 1);
    }
}
