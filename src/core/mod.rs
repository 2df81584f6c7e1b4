//! Export heuristics and stakeholder ranking

pub mod classify;
pub mod ranking;

pub use classify::{ColumnRole, FooterCheck, HeaderMatch, RowKind};
pub use ranking::{rank_stakeholders, Ranking};
