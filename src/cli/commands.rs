use crate::config::TransformConfig;
use crate::core::ranking::rank_stakeholders;
use crate::error::CapTableResult;
use crate::excel::formula::column_index_to_letter;
use crate::excel::TemplateScaffold;
use crate::parser::{parse_export, parse_export_sheet};
use crate::transform::run_transformation;
use crate::types::{ParsedExport, Summary};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Format a number for display, removing unnecessary decimal places
pub fn format_number(n: f64) -> String {
    let rounded = (n * 1e6).round() / 1e6;
    format!("{:.6}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Execute the transform command
pub fn transform(
    export: PathBuf,
    template: PathBuf,
    output_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    json: bool,
) -> CapTableResult<()> {
    let config = TransformConfig::load_or_default(config.as_deref())?;

    if !json {
        println!("{}", "📊 Carta Cap Table - Transform".bold().green());
        println!("   Export:   {}", export.display());
        println!("   Template: {}\n", template.display());
    }

    let summary = run_transformation(&export, &template, output_dir.as_deref(), &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!("{}", "✅ Transformation complete".bold().green());
    println!("   Output:    {}", summary.output_path.display());
    println!("   Company:   {}", summary.company_name.bright_blue().bold());
    println!("   As of:     {}", summary.as_of_date.format("%m/%d/%Y"));
    println!("   Raw sheet: {}\n", summary.raw_sheet);

    println!("{}", "📈 Investors".bold().cyan());
    println!("   Processed:        {}", summary.investors_processed);
    println!("   Top investors:    {}", summary.top_investors);
    println!("   Rolled up (other): {}\n", summary.other_investors);

    if !summary.totals_by_class.is_empty() {
        println!("{}", "🏷️  Share classes mapped".bold().cyan());
        for total in &summary.totals_by_class {
            println!("   {} = {}", total.class.bright_blue(), format_number(total.total).bold());
        }
        println!();
    }

    if !summary.validation.is_empty() {
        println!("{}", "🔎 Export validation totals".bold().cyan());
        for (check, value) in &summary.validation {
            println!("   {} = {}", check, format_number(*value));
        }
        println!();
    }

    println!(
        "   Prices found: {}",
        if summary.prices_found { "yes".green() } else { "no".yellow() }
    );

    if !summary.warnings.is_empty() {
        println!("\n{}", "⚠️  Validation warnings".bold().yellow());
        for warning in &summary.warnings {
            println!("   {}", warning.yellow());
        }
    }
}

/// Execute the inspect command - parse only, print what was found
pub fn inspect(
    export: PathBuf,
    sheet: Option<String>,
    config: Option<PathBuf>,
    json: bool,
) -> CapTableResult<()> {
    let config = TransformConfig::load_or_default(config.as_deref())?;
    let parsed = inspect_export(&export, sheet.as_deref(), &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    println!("{}", "🔍 Carta Cap Table - Inspect".bold().green());
    println!("   File:  {}", export.display());
    println!("   Sheet: {}\n", parsed.sheet_name);

    println!("   Company:    {}", parsed.company_name.bright_blue().bold());
    let date_note = if parsed.as_of_date_found { "" } else { " (not in export, defaulted to today)" };
    println!("   As of:      {}{}", parsed.as_of_date.format("%m/%d/%Y"), date_note);
    println!("   Header row: {}", parsed.header_row_index + 1);
    println!(
        "   Name column: {} ({})\n",
        column_index_to_letter(parsed.name_column.index),
        parsed.name_column.label
    );

    println!("{}", "🏷️  Share classes".bold().cyan());
    let max_classes = config.template.class_columns.len();
    for (i, class) in parsed.share_classes.iter().enumerate() {
        let note = if i < max_classes { "" } else { " (not mapped)" };
        println!(
            "   {} {}{}",
            column_index_to_letter(class.index),
            class.label.bright_blue(),
            note.yellow()
        );
    }
    println!("\n{}", "🎟️  Option pools".bold().cyan());
    for col in &parsed.option_columns {
        println!("   {} {}", column_index_to_letter(col.index), col.label);
    }

    println!("\n{}", "👥 Stakeholders by total shares".bold().cyan());
    let top_n = config.template.top_investor_count as usize;
    let ranking = rank_stakeholders(&parsed.stakeholders, top_n);
    for (rank, holder) in ranking.top.iter().chain(ranking.other.iter()).enumerate() {
        let marker = if rank < top_n { "top".green() } else { "other".dimmed() };
        println!(
            "   {:>3}. [{}] {} (row {}) shares={} options={}",
            rank + 1,
            marker,
            holder.name,
            holder.source_row_index + 1,
            format_number(holder.total_shares),
            format_number(holder.total_options)
        );
    }

    if !parsed.validation_totals.is_empty() {
        println!("\n{}", "🔎 Validation totals".bold().cyan());
        for (check, value) in &parsed.validation_totals {
            println!("   {} = {}", check, format_number(*value));
        }
    }
    if !parsed.unit_prices.is_empty() {
        println!("\n{}", "💲 Unit prices".bold().cyan());
        for (class, price) in &parsed.unit_prices {
            println!("   {} = {}", class, format_number(*price));
        }
    }

    Ok(())
}

/// Parse an export without touching any template
pub fn inspect_export(
    export: &Path,
    sheet: Option<&str>,
    config: &TransformConfig,
) -> CapTableResult<ParsedExport> {
    if !export.exists() {
        return Err(crate::error::CapTableError::MissingFile(export.to_path_buf()));
    }
    match sheet {
        Some(name) => parse_export_sheet(export, name, &config.export),
        None => parse_export(export, &config.export),
    }
}

/// Execute the init-template command
pub fn init_template(output: PathBuf, config: Option<PathBuf>) -> CapTableResult<()> {
    let config = TransformConfig::load_or_default(config.as_deref())?;
    let layout = config.template.resolve()?;

    TemplateScaffold::new(layout).write(&output)?;

    println!("{}", "✅ Template written".bold().green());
    println!("   {}", output.display());
    Ok(())
}

/// Execute the config command - print the effective configuration
pub fn show_config(config: Option<PathBuf>) -> CapTableResult<()> {
    let config = TransformConfig::load_or_default(config.as_deref())?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
