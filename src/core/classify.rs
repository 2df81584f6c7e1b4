//! Text heuristics for reading a Carta export
//!
//! Every function here takes plain text and returns a tagged outcome. None of
//! them know about rows, columns, or workbooks; the parser does the traversal.

use chrono::NaiveDate;
use regex::Regex;

/// Case-folded, trimmed form used by every heuristic
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Why a row was taken as the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch {
    /// Some cell is exactly `name`
    NameToken,
    /// The joined row text mentions `stakeholder`
    StakeholderText,
}

/// Decide whether a row of cell texts is the column-label row
pub fn classify_header_row<'a, I>(cells: I) -> Option<HeaderMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized: Vec<String> = cells.into_iter().map(normalize).collect();
    if normalized.iter().any(|c| c == "name") {
        return Some(HeaderMatch::NameToken);
    }
    if normalized.join(" ").contains("stakeholder") {
        return Some(HeaderMatch::StakeholderText);
    }
    None
}

/// Semantic role of an export column, from its header label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// The stakeholder name
    Name,
    /// Per-holder outstanding units (read for the validation total)
    OutstandingUnits,
    /// `Class ...`/`Series ...` with `units`
    ShareClass,
    /// Options or RSU pool
    OptionPool,
    /// Matches both tests, e.g. `Class B Option Units`
    ShareClassAndOptionPool,
    Other,
}

impl ColumnRole {
    pub fn is_share_class(self) -> bool {
        matches!(self, ColumnRole::ShareClass | ColumnRole::ShareClassAndOptionPool)
    }

    pub fn is_option_pool(self) -> bool {
        matches!(self, ColumnRole::OptionPool | ColumnRole::ShareClassAndOptionPool)
    }
}

pub fn classify_column(label: &str) -> ColumnRole {
    let label = normalize(label);
    if label == "name" {
        return ColumnRole::Name;
    }
    if label == "outstanding units" {
        return ColumnRole::OutstandingUnits;
    }

    let share_class =
        (label.contains("class") || label.contains("series")) && label.contains("units");
    let option_pool = label.contains("option") || label.contains("rsu");

    match (share_class, option_pool) {
        (true, true) => ColumnRole::ShareClassAndOptionPool,
        (true, false) => ColumnRole::ShareClass,
        (false, true) => ColumnRole::OptionPool,
        (false, false) => ColumnRole::Other,
    }
}

/// Header label that can stand in for a missing `Name` column: mentions
/// "stakeholder" and is not an identifier column such as `Stakeholder ID`
pub fn is_stakeholder_name_label(label: &str) -> bool {
    let label = normalize(label);
    label.contains("stakeholder")
        && !label
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "id")
}

/// What a data row's name field says about the row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Stakeholder,
    /// Empty or a missing-value marker
    Blank,
    /// Summary row; carries the keyword that matched
    Footer(String),
}

const MISSING_MARKERS: [&str; 4] = ["nan", "none", "null", "#n/a"];

/// Classify a row by its name field against the footer keywords
///
/// Matching is case-insensitive substring, so labels like
/// "Total Units Outstanding" and "% Fully Diluted" are both caught. A real
/// holder whose name contains a keyword ("Total Holdings LLC") is excluded too.
pub fn classify_row_name(name: &str, footer_keywords: &[String]) -> RowKind {
    let name = normalize(name);
    if name.is_empty() || MISSING_MARKERS.contains(&name.as_str()) {
        return RowKind::Blank;
    }
    match footer_keywords
        .iter()
        .find(|k| !k.is_empty() && name.contains(&normalize(k)))
    {
        Some(keyword) => RowKind::Footer(keyword.clone()),
        None => RowKind::Stakeholder,
    }
}

/// Footer rows that carry numbers worth keeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterCheck {
    TotalUnitsOutstanding,
    FullyDilutedUnits,
    PricePerUnit,
}

pub fn classify_footer_label(label: &str) -> Option<FooterCheck> {
    let label = normalize(label);
    if label.contains("total units outstanding") {
        Some(FooterCheck::TotalUnitsOutstanding)
    } else if label.contains("fully diluted") && label.contains("units") {
        Some(FooterCheck::FullyDilutedUnits)
    } else if label.contains("price per unit") {
        Some(FooterCheck::PricePerUnit)
    } else {
        None
    }
}

/// Pull the date out of an "As of MM/DD/YYYY" line
pub fn extract_as_of_date(text: &str) -> Option<NaiveDate> {
    if !text.to_lowercase().contains("as of") {
        return None;
    }
    let pattern = Regex::new(r"(\d{2}/\d{2}/\d{4})").ok()?;
    let found = pattern.captures(text)?.get(1)?;
    NaiveDate::parse_from_str(found.as_str(), "%m/%d/%Y").ok()
}

/// Company name from the title cell: boilerplate removed, whitespace trimmed
pub fn company_from_title(title: &str, boilerplate: &str) -> String {
    let stripped = if boilerplate.is_empty() {
        title.to_string()
    } else {
        title.replace(boilerplate, "")
    };
    stripped.trim().to_string()
}

/// Template header label for a share-class column
///
/// `Class A Units (CA)` → `Class A`, `Series Seed Preferred (SS) Units` →
/// `Series Seed Preferred`
pub fn clean_class_label(label: &str) -> String {
    let without_units = match Regex::new(r"\s*Units.*$") {
        Ok(re) => re.replace(label, "").into_owned(),
        Err(_) => label.to_string(),
    };
    let without_parens = match Regex::new(r"\s*\([^)]*\)") {
        Ok(re) => re.replace_all(without_units.trim(), "").into_owned(),
        Err(_) => without_units,
    };
    without_parens.trim().to_string()
}
