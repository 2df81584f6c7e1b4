//! Carta cap table transformer
//!
//! Reads a Carta "Detailed Cap" export and rewrites the firm's cap table
//! template so its investor inputs are formulas pointing at a verbatim copy of
//! the export, embedded as an extra sheet.
//!
//! # Pipeline
//!
//! - [`parser`]: header discovery, column classification, stakeholder
//!   filtering, per-holder totals, footer validation totals and unit prices
//! - [`populator`]: ranking, top-N / "other" rollup, and the formula writes
//! - [`transform`]: file checks, output naming, and the save
//!
//! # Example
//!
//! ```no_run
//! use carta_captable::config::TransformConfig;
//! use carta_captable::transform::run_transformation;
//! use std::path::Path;
//!
//! let summary = run_transformation(
//!     Path::new("carta_export.xlsx"),
//!     Path::new("Cap Table Template.xlsx"),
//!     None,
//!     &TransformConfig::default(),
//! )?;
//!
//! println!("Investors: {}", summary.investors_processed);
//! println!("Output: {}", summary.output_path.display());
//! # Ok::<(), carta_captable::error::CapTableError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod parser;
pub mod populator;
pub mod transform;
pub mod types;

// Re-export commonly used types
pub use config::TransformConfig;
pub use error::{CapTableError, CapTableResult};
pub use transform::run_transformation;
pub use types::{ColumnRef, ParsedExport, StakeholderRecord, Summary};
