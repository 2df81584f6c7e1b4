use carta_captable::cli;
use carta_captable::error::CapTableResult;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "carta-captable")]
#[command(about = "Bind a cap table template to a Carta export with live formulas.")]
#[command(long_about = "Carta Cap Table - template populator for Carta exports

Reads the 'Detailed Cap' sheet of a Carta export, copies it verbatim into the
template as a raw sheet, and rewrites the template's investor inputs as
formulas pointing at that copy. Nothing is baked in: edit the raw sheet and
the template recomputes.

COMMANDS:
  transform      - Populate a template from an export
  inspect        - Show what the parser finds in an export
  init-template  - Write a starter template for the configured layout
  config         - Print the effective layout configuration

EXAMPLES:
  carta-captable transform export.xlsx \"Cap Table Template.xlsx\"
  carta-captable transform export.xlsx template.xlsx -o out/ --json
  carta-captable inspect export.xlsx
  carta-captable config > layout.yaml")]
#[command(version)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Layout configuration file (YAML); defaults match the firm template
    #[arg(short, long, global = true, env = "CARTA_CAPTABLE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Populate a cap table template from a Carta export.

The output is a copy of the template plus a raw sheet holding the full
export. Investor names, per-class units, option totals and unit prices are
written as formulas into that raw sheet.

LAYOUT (defaults, see 'config'):
  Inputs!I6 / I7        company name / as-of date
  Inputs!F30:I30        share-class headers (first 4 classes)
  Inputs rows 31-39     top 9 investors by total shares
  Inputs row 40         'Other Investors' rollup
  Inputs row 41         warrants (always zero)
  Inputs!K10:K13        price per share

OUTPUT:
  <Company>_Cap_Table_<YYYYMMDD>.xlsx, next to the export unless -o is given.")]
    /// Populate a template from a Carta export
    Transform {
        /// Carta export (.xlsx)
        export: PathBuf,

        /// Cap table template (.xlsx); never modified
        template: PathBuf,

        /// Output directory (default: the export's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what the parser finds in an export
    Inspect {
        /// Carta export (.xlsx)
        export: PathBuf,

        /// Sheet to read instead of the configured one
        #[arg(short, long)]
        sheet: Option<String>,

        /// Print the parsed export as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter template for the configured layout
    InitTemplate {
        /// Output template path (.xlsx)
        output: PathBuf,
    },

    /// Print the effective layout configuration as YAML
    Config,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "carta_captable=debug" } else { "carta_captable=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CapTableResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Transform {
            export,
            template,
            output_dir,
            json,
        } => cli::transform(export, template, output_dir, cli.config, json),

        Commands::Inspect {
            export,
            sheet,
            json,
        } => cli::inspect(export, sheet, cli.config, json),

        Commands::InitTemplate { output } => cli::init_template(output, cli.config),

        Commands::Config => cli::show_config(cli.config),
    }
}
