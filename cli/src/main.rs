//! sheetpivot CLI - Excel workbook reader and unpivoter
//!
//! A command-line tool for listing sheets, dumping rows and unpivoting
//! crosstab tables of XLSX files as JSON.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use sheetpivot::{KeyedRow, PivotReader, PivotRow, ReaderOptions, Workbook};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Read Excel workbooks as rows and unpivot crosstab sheets
#[derive(Parser)]
#[command(
    name = "sheetpivot",
    version,
    about = "Read and unpivot Excel workbooks",
    long_about = "sheetpivot - OOXML spreadsheet reader.\n\n\
                  Lists sheets, dumps rows as JSON objects and turns annotated \
                  crosstab sheets into one row per measure."
)]
struct Cli {
    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the worksheets of a workbook
    #[command(visible_alias = "ls")]
    Sheets {
        /// Input file path
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Dump the rows of a worksheet as JSON objects
    Rows {
        /// Input file path
        input: PathBuf,

        /// Worksheet name (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Read every row as data, naming columns by letter
        #[arg(long)]
        no_header: bool,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show the pivot tables of a workbook
    Tables {
        /// Input file path
        input: PathBuf,

        #[command(flatten)]
        pivot: PivotArgs,
    },

    /// Unpivot a table into one JSON object per measure cell
    Unpivot {
        /// Input file path
        input: PathBuf,

        /// Table name (default: the only table)
        #[arg(short, long)]
        table: Option<String>,

        #[command(flatten)]
        pivot: PivotArgs,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args)]
struct PivotArgs {
    /// Reserved sheet-name prefix of the marker sheets
    #[arg(long, default_value = sheetpivot::options::DEFAULT_MARKER_PREFIX)]
    prefix: String,

    /// Measure column name when the metadata names none
    #[arg(long, default_value = sheetpivot::options::DEFAULT_MEASURE)]
    measure: String,
}

impl From<&PivotArgs> for ReaderOptions {
    fn from(args: &PivotArgs) -> Self {
        ReaderOptions::new()
            .with_marker_prefix(args.prefix.as_str())
            .with_default_measure(args.measure.as_str())
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Sheets { input, json } => {
            let workbook = open(&input, ReaderOptions::default())?;
            let entries = workbook.sheet_entries()?;

            if json {
                println!("{}", serde_json::to_string_pretty(entries)?);
                return Ok(());
            }

            println!("{}", "Worksheets".cyan().bold());
            println!("{}", "─".repeat(40));
            for entry in entries {
                println!(
                    "{:>4}  {}  {}",
                    entry.sheet_id,
                    entry.name.bold(),
                    entry.rel_id.dimmed()
                );
            }
            println!("{}: {}", "Parts".bold(), workbook.worksheet_ids().join(", "));
        }

        Commands::Rows {
            input,
            sheet,
            no_header,
            output,
            compact,
        } => {
            let workbook = open(&input, ReaderOptions::default())?;
            let sheet = workbook.get_worksheet(sheet.as_deref(), !no_header)?;
            let rows: Vec<Value> = sheet.rows()?.map(keyed_object).collect();

            write_json(output.as_deref(), &Value::Array(rows), compact)?;
            if let Some(path) = output {
                println!(
                    "{} Wrote rows of {}: {}",
                    "✓".green().bold(),
                    sheet.name(),
                    path.display()
                );
            }
        }

        Commands::Tables { input, pivot } => {
            let workbook = open(&input, (&pivot).into())?;
            let reader = PivotReader::new(&workbook);

            println!("{}", "Pivot Tables".cyan().bold());
            println!("{}", "─".repeat(40));
            if reader.is_multi_table()? {
                println!("{}", "multi-table workbook".yellow());
            }
            for table in reader.tables()? {
                println!("{}: {}", "Table".bold(), table.name());
                println!("  {}: {}", "Target".bold(), table.database_table());
                println!("  {}: {}", "Label origin".bold(), table.label_origin());
                println!("  {}: {}", "Data origin".bold(), table.data_origin());
                println!("  {}: {}", "Columns".bold(), table.column_names()?.join(", "));
                for dimension in table.dimensions() {
                    println!(
                        "  {:?} #{}: {}",
                        dimension.orientation, dimension.rank, dimension.name
                    );
                }
            }
        }

        Commands::Unpivot {
            input,
            table,
            pivot,
            output,
            compact,
        } => {
            let workbook = open(&input, (&pivot).into())?;
            let pb = create_spinner("Unpivoting...");
            let reader = PivotReader::new(&workbook);
            let table = reader.default_table_named(table.as_deref())?;
            let rows: Vec<Value> = table.rows()?.map(pivot_object).collect();
            pb.finish_and_clear();

            let count = rows.len();
            write_json(output.as_deref(), &Value::Array(rows), compact)?;
            if let Some(path) = output {
                println!(
                    "{} Unpivoted {} rows of {}: {}",
                    "✓".green().bold(),
                    count,
                    table.name(),
                    path.display()
                );
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn open(path: &Path, options: ReaderOptions) -> sheetpivot::Result<Workbook> {
    let pb = create_spinner("Opening workbook...");
    let workbook = Workbook::open(path);
    pb.finish_and_clear();
    Ok(workbook?.with_options(options))
}

/// A keyed row as a JSON object; a repeated column name keeps its last value.
fn keyed_object(row: KeyedRow) -> Value {
    let object: Map<String, Value> = row
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();
    Value::Object(object)
}

fn pivot_object(row: PivotRow) -> Value {
    let object: Map<String, Value> = row
        .into_iter()
        .map(|(key, value)| (key, value.map_or(Value::Null, Value::String)))
        .collect();
    Value::Object(object)
}

fn print_version() {
    println!("{} {}", "sheetpivot".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("OOXML spreadsheet reader with crosstab unpivoting");
    println!();
    println!("Supported formats: XLSX");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_json(
    path: Option<&Path>,
    value: &Value,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
