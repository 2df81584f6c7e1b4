//! End-to-end transformation: export + template → populated workbook

use crate::config::TransformConfig;
use crate::error::{CapTableError, CapTableResult};
use crate::excel::TemplateWorkbook;
use crate::parser::parse_export;
use crate::populator::{build_summary, plan_population};
use crate::types::Summary;
use chrono::NaiveDate;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;

/// `<Company>_Cap_Table_<YYYYMMDD>.xlsx`
pub fn output_file_name(company_name: &str, as_of_date: NaiveDate) -> String {
    let cleaned = match Regex::new(r"[^\w\s-]") {
        Ok(re) => re.replace_all(company_name, "").trim().to_string(),
        Err(_) => company_name.trim().to_string(),
    };
    let company = if cleaned.is_empty() {
        "Company".to_string()
    } else {
        cleaned
    };
    format!("{}_Cap_Table_{}.xlsx", company, as_of_date.format("%Y%m%d"))
}

fn ensure_exists(path: &Path) -> CapTableResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(CapTableError::MissingFile(path.to_path_buf()))
    }
}

/// Parse the export, populate a copy of the template, and save it
///
/// The output lands in `output_dir`, or next to the export when `None`. Any
/// failure aborts the whole run and leaves no output file.
pub fn run_transformation(
    export_path: &Path,
    template_path: &Path,
    output_dir: Option<&Path>,
    config: &TransformConfig,
) -> CapTableResult<Summary> {
    ensure_exists(export_path)?;
    ensure_exists(template_path)?;
    config.validate()?;
    let layout = config.template.resolve()?;

    let parsed = parse_export(export_path, &config.export)?;

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => export_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let output_path = dir.join(output_file_name(&parsed.company_name, parsed.as_of_date));
    if is_same_file(&output_path, template_path) {
        return Err(CapTableError::Write(format!(
            "Refusing to overwrite the template {}",
            template_path.display()
        )));
    }

    let plan = plan_population(&parsed, &layout);

    let mut workbook = TemplateWorkbook::open(template_path)?;
    if !workbook.has_sheet(&layout.sheet_name) {
        return Err(CapTableError::SheetNotFound {
            sheet: layout.sheet_name.clone(),
            path: template_path.to_path_buf(),
        });
    }
    workbook.copy_sheet_from(export_path, &parsed.sheet_name, &layout.raw_sheet_name)?;
    workbook.apply(&layout.sheet_name, &plan.writes)?;
    workbook.save(&output_path)?;

    info!(
        output = %output_path.display(),
        top = plan.top_investors,
        other = plan.other_investors,
        "wrote cap table"
    );

    Ok(build_summary(&parsed, &plan, output_path, &layout.raw_sheet_name))
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
