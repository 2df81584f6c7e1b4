//! Template populator
//!
//! Builds the list of cell writes that binds the template's Inputs sheet to
//! the raw export copy. Every investor value is a formula into the raw sheet,
//! never a baked-in number. The plan is plain data; `excel::TemplateWorkbook`
//! applies it to a real workbook.

use crate::config::ResolvedLayout;
use crate::core::classify::clean_class_label;
use crate::core::ranking::{rank_stakeholders, Ranking};
use crate::excel::formula::{CellAddress, CellRef, Formula};
use crate::parser::fully_diluted_key;
use crate::types::{ClassTotal, ParsedExport, StakeholderRecord, Summary};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Value written into one template cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Formula(Formula),
    Blank,
}

impl CellContent {
    pub fn as_formula(&self) -> Option<&Formula> {
        match self {
            CellContent::Formula(f) => Some(f),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellWrite {
    pub cell: CellAddress,
    pub content: CellContent,
}

/// Where one export share class lands in the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMapping {
    /// Raw export column label
    pub label: String,
    /// Cleaned label written into the template header
    pub header: String,
    pub template_column: u32,
    pub raw_column: u32,
}

/// Everything the populator will write, in write order
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatePlan {
    pub writes: Vec<CellWrite>,
    pub class_mappings: Vec<ClassMapping>,
    pub top_investors: usize,
    pub other_investors: usize,
}

impl TemplatePlan {
    /// Final content planned for a cell (later writes win)
    pub fn get(&self, cell: CellAddress) -> Option<&CellContent> {
        self.writes
            .iter()
            .rev()
            .find(|w| w.cell == cell)
            .map(|w| &w.content)
    }
}

struct PlanBuilder<'a> {
    layout: &'a ResolvedLayout,
    writes: Vec<CellWrite>,
}

impl<'a> PlanBuilder<'a> {
    fn put(&mut self, row: u32, col: u32, content: CellContent) {
        self.writes.push(CellWrite {
            cell: CellAddress::new(row, col),
            content,
        });
    }

    fn zero_span(&mut self, row: u32, (first, last): (u32, u32)) {
        for col in first..=last {
            self.put(row, col, CellContent::Number(0.0));
        }
    }

    fn raw_ref(&self, row: u32, col: u32) -> CellRef {
        CellRef::new(self.layout.raw_sheet_name.clone(), row, col)
    }

    /// Template class columns with no export class mapped into them
    fn unused_class_columns(&self, mapped: usize) -> Vec<u32> {
        self.layout.class_columns.iter().skip(mapped).copied().collect()
    }
}

/// Build the cell writes for one parsed export
pub fn plan_population(parsed: &ParsedExport, layout: &ResolvedLayout) -> TemplatePlan {
    let mut plan = PlanBuilder {
        layout,
        writes: Vec::new(),
    };

    // Company and date
    plan.put(
        layout.company_cell.row,
        layout.company_cell.col,
        CellContent::Text(parsed.company_name.clone()),
    );
    plan.put(
        layout.date_cell.row,
        layout.date_cell.col,
        CellContent::Date(parsed.as_of_date),
    );

    // Share-class headers, left to right in export order
    let class_mappings: Vec<ClassMapping> = parsed
        .share_classes
        .iter()
        .zip(layout.class_columns.iter())
        .map(|(class, &template_column)| ClassMapping {
            label: class.label.clone(),
            header: clean_class_label(&class.label),
            template_column,
            raw_column: class.index,
        })
        .collect();
    if parsed.share_classes.len() > class_mappings.len() {
        debug!(
            dropped = parsed.share_classes.len() - class_mappings.len(),
            "export has more share classes than the template has columns"
        );
    }
    for mapping in &class_mappings {
        plan.put(
            layout.class_header_row,
            mapping.template_column,
            CellContent::Text(mapping.header.clone()),
        );
    }
    let unused = plan.unused_class_columns(class_mappings.len());
    for &col in &unused {
        plan.put(layout.class_header_row, col, CellContent::Blank);
    }

    let ranking = rank_stakeholders(&parsed.stakeholders, layout.top_investor_count);
    debug!(
        top = ranking.top.len(),
        other = ranking.other.len(),
        "ranked stakeholders"
    );

    write_top_investors(&mut plan, parsed, &ranking, &class_mappings, &unused);
    write_other_row(&mut plan, parsed, &ranking, &class_mappings, &unused);

    // The export has no warrant data
    plan.zero_span(layout.warrants_row, layout.warrants_columns);

    write_prices(&mut plan, parsed, &class_mappings);

    TemplatePlan {
        writes: plan.writes,
        class_mappings,
        top_investors: ranking.top.len(),
        other_investors: ranking.other.len(),
    }
}

fn write_top_investors(
    plan: &mut PlanBuilder<'_>,
    parsed: &ParsedExport,
    ranking: &Ranking<'_>,
    class_mappings: &[ClassMapping],
    unused: &[u32],
) {
    let layout = plan.layout;

    for slot in 0..layout.top_investor_count {
        let row = layout.first_investor_row + slot as u32;

        let Some(holder) = ranking.top.get(slot) else {
            // Fewer holders than slots: clear rather than leave stale values
            plan.put(row, layout.name_column, CellContent::Blank);
            plan.zero_span(row, layout.cleared_columns);
            continue;
        };
        let source_row = holder.source_row_index;

        let name_ref = plan.raw_ref(source_row, parsed.name_column.index);
        plan.put(row, layout.name_column, CellContent::Formula(Formula::Reference(name_ref)));

        for mapping in class_mappings {
            let class_ref = plan.raw_ref(source_row, mapping.raw_column);
            plan.put(
                row,
                mapping.template_column,
                CellContent::Formula(Formula::Reference(class_ref)),
            );
        }
        for &col in unused {
            plan.put(row, col, CellContent::Number(0.0));
        }

        // No common-share concept in the export
        plan.put(row, layout.common_column, CellContent::Number(0.0));

        let options = option_refs(plan, parsed, std::slice::from_ref(holder));
        plan.put(row, layout.options_column, sum_or_zero(options));
    }
}

fn write_other_row(
    plan: &mut PlanBuilder<'_>,
    parsed: &ParsedExport,
    ranking: &Ranking<'_>,
    class_mappings: &[ClassMapping],
    unused: &[u32],
) {
    let layout = plan.layout;
    let row = layout.other_row;

    plan.put(row, layout.name_column, CellContent::Text(layout.other_label.clone()));

    if ranking.other.is_empty() {
        plan.zero_span(row, layout.cleared_columns);
        return;
    }

    for mapping in class_mappings {
        let refs: Vec<CellRef> = ranking
            .other
            .iter()
            .map(|holder| plan.raw_ref(holder.source_row_index, mapping.raw_column))
            .collect();
        plan.put(row, mapping.template_column, sum_or_zero(refs));
    }
    for &col in unused {
        plan.put(row, col, CellContent::Number(0.0));
    }

    plan.put(row, layout.common_column, CellContent::Number(0.0));

    let options = option_refs(plan, parsed, &ranking.other);
    plan.put(row, layout.options_column, sum_or_zero(options));
}

fn write_prices(plan: &mut PlanBuilder<'_>, parsed: &ParsedExport, class_mappings: &[ClassMapping]) {
    let Some(price_row) = parsed.price_row_index else {
        return;
    };
    if parsed.unit_prices.is_empty() {
        return;
    }
    let start = plan.layout.price_cell;

    for (i, mapping) in class_mappings.iter().enumerate() {
        if !parsed.unit_prices.contains_key(&mapping.label) {
            continue;
        }
        let price_ref = plan.raw_ref(price_row, mapping.raw_column);
        plan.put(
            start.row + i as u32,
            start.col,
            CellContent::Formula(Formula::Reference(price_ref)),
        );
    }
}

/// Every option-column cell for the given holders, holder-major
fn option_refs(
    plan: &PlanBuilder<'_>,
    parsed: &ParsedExport,
    holders: &[&StakeholderRecord],
) -> Vec<CellRef> {
    holders
        .iter()
        .flat_map(|holder| {
            parsed
                .option_columns
                .iter()
                .map(move |col| plan.raw_ref(holder.source_row_index, col.index))
        })
        .collect()
}

/// A sum formula, or a literal zero when there is nothing to sum
fn sum_or_zero(refs: Vec<CellRef>) -> CellContent {
    if refs.is_empty() {
        CellContent::Number(0.0)
    } else {
        CellContent::Formula(Formula::Sum(refs))
    }
}

/// Caller-facing summary of a populated template
pub fn build_summary(parsed: &ParsedExport, plan: &TemplatePlan, output_path: PathBuf, raw_sheet: &str) -> Summary {
    let totals_by_class: Vec<ClassTotal> = plan
        .class_mappings
        .iter()
        .map(|m| ClassTotal {
            class: m.label.clone(),
            total: parsed.class_total(&m.label),
        })
        .collect();

    let mut warnings = Vec::new();
    for total in &totals_by_class {
        if let Some(expected) = parsed.validation_totals.get(&fully_diluted_key(&total.class)) {
            if (expected - total.total).abs() > 0.5 {
                let message = format!(
                    "{}: stakeholder rows sum to {} but the export's fully diluted row says {}",
                    total.class, total.total, expected
                );
                warn!("{}", message);
                warnings.push(message);
            }
        }
    }

    Summary {
        output_path,
        raw_sheet: raw_sheet.to_string(),
        company_name: parsed.company_name.clone(),
        as_of_date: parsed.as_of_date,
        investors_processed: parsed.stakeholders.len(),
        top_investors: plan.top_investors,
        other_investors: plan.other_investors,
        share_classes_mapped: plan.class_mappings.iter().map(|m| m.label.clone()).collect(),
        totals_by_class,
        validation: parsed.validation_totals.clone(),
        prices_found: !parsed.unit_prices.is_empty(),
        warnings,
    }
}
