//! `proforma catalog` command - Load and inspect the price list

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::{load_config, open_session, require_catalog};
use crate::cli::helpers::{csv_lines, format_money, markdown_table, truncate_str, tsv_lines};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::{
    source_for_path, Catalog, CatalogError, CatalogSource, ColumnNames, CsvSource,
    WorkbookSource,
};
use crate::core::shortid::ShortIdIndex;

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Load a price list, replacing the current one
    Load(LoadArgs),

    /// Show the loaded price list
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct LoadArgs {
    /// Price list file (.csv, .xlsx, .xls, ...)
    pub file: PathBuf,

    /// Input format (default: from the file extension)
    #[arg(long, value_enum)]
    pub format: Option<CatalogFormat>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Number of rows to show
    #[arg(long, short = 'n', default_value = "20")]
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CatalogFormat {
    /// Comma-delimited text
    Csv,
    /// Spreadsheet workbook (first sheet)
    Workbook,
}

pub fn run(cmd: CatalogCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CatalogCommands::Load(args) => run_load(args, global),
        CatalogCommands::Show(args) => run_show(args, global),
    }
}

fn run_load(args: LoadArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let config = load_config(&session);

    let source_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| args.file.display().to_string());

    let source: Box<dyn CatalogSource> = match args.format {
        Some(CatalogFormat::Csv) => Box::new(CsvSource),
        Some(CatalogFormat::Workbook) => Box::new(WorkbookSource),
        None => source_for_path(&args.file)?,
    };

    let bytes = std::fs::read(&args.file).map_err(|e| CatalogError::Parse {
        source_name: source_name.clone(),
        cause: e.to_string(),
    })?;

    log::info!("loading {} as {}", args.file.display(), source.name());
    let catalog = source.parse(&source_name, &bytes, &config.columns)?;

    session.save_catalog(&catalog)?;
    ShortIdIndex::clear(&session)?;

    if !global.quiet {
        println!(
            "{} Loaded {} row(s) from {}",
            style("✓").green(),
            style(catalog.len()).cyan(),
            style(&source_name).yellow()
        );
        if catalog.is_empty() {
            println!("{} The price list has no data rows", style("!").yellow());
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let config = load_config(&session);
    let catalog = require_catalog(&session)?;
    print_catalog(&catalog, &config.columns, args.limit, global.format)
}

fn print_catalog(
    catalog: &Catalog,
    columns: &ColumnNames,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let shown = &catalog.rows()[..limit.min(catalog.len())];
    let headers = [
        columns.identifier.as_str(),
        columns.description.as_str(),
        columns.rate.as_str(),
    ];
    let rows: Vec<Vec<String>> = shown
        .iter()
        .map(|r| vec![r.identifier.clone(), r.description.clone(), format_money(r.rate)])
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(shown).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(shown).into_diagnostic()?);
        }
        OutputFormat::Csv => println!("{}", csv_lines(&headers, &rows)),
        OutputFormat::Tsv => println!("{}", tsv_lines(&headers, &rows)),
        OutputFormat::Md => println!("{}", markdown_table(&headers, &rows)),
        OutputFormat::Id => {
            for row in shown {
                println!("{}", row.identifier);
            }
        }
        OutputFormat::Auto => {
            println!(
                "{} ({} row(s))",
                style(catalog.source()).bold(),
                style(catalog.len()).cyan()
            );
            println!();
            println!(
                "{:<16} {:<50} {:>10}",
                style(headers[0]).bold(),
                style(headers[1]).bold(),
                style(headers[2]).bold()
            );
            println!("{}", "-".repeat(78));
            for row in shown {
                println!(
                    "{:<16} {:<50} {:>10}",
                    style(truncate_str(&row.identifier, 16)).cyan(),
                    truncate_str(&row.description, 48),
                    format_money(row.rate)
                );
            }
            if shown.len() < catalog.len() {
                println!();
                println!(
                    "{}",
                    style(format!("... {} more row(s)", catalog.len() - shown.len())).dim()
                );
            }
        }
    }

    Ok(())
}
