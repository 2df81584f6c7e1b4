//! Excel plumbing
//!
//! - Reader: export sheet (.xlsx) → `RawSheet` grid via calamine
//! - Template: read-modify-write of the template workbook via umya-spreadsheet
//! - Scaffold: starter template (.xlsx) via rust_xlsxwriter
//! - Formula: cell addresses and the formula strings written into the template

pub mod formula;
pub mod reader;
mod scaffold;
mod template;

pub use formula::{CellAddress, CellRef, Formula};
pub use scaffold::TemplateScaffold;
pub use template::TemplateWorkbook;
