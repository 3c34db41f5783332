//! `proforma template` command - Load and inspect the invoice template

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::{load_config, open_session};
use crate::cli::GlobalOpts;
use crate::core::export::check_template;

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Load an invoice template (.xlsx), replacing the current one
    Load(LoadArgs),

    /// Show the loaded template and the cells export will fill
    Show,
}

#[derive(clap::Args, Debug)]
pub struct LoadArgs {
    /// Template workbook
    pub file: PathBuf,
}

pub fn run(cmd: TemplateCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TemplateCommands::Load(args) => run_load(args, global),
        TemplateCommands::Show => run_show(global),
    }
}

fn run_load(args: LoadArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;

    let ext = args
        .file
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if ext != "xlsx" && ext != "xlsm" {
        return Err(miette::miette!(
            help = "Save the template as an Excel workbook (.xlsx)",
            "unsupported template type '{}'",
            args.file.display()
        ));
    }

    let name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| miette::miette!("invalid template path: {}", args.file.display()))?;
    let bytes = std::fs::read(&args.file).into_diagnostic()?;

    check_template(&name, &bytes)?;
    session.store_template(&name, &bytes)?;

    if !global.quiet {
        println!(
            "{} Loaded template {}",
            style("✓").green(),
            style(&name).cyan()
        );
    }
    Ok(())
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let config = load_config(&session);

    let Some(path) = session.template_path() else {
        println!(
            "No template loaded. Use {}.",
            style("proforma template load <FILE>").yellow()
        );
        return Ok(());
    };

    let layout = &config.layout;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    println!("{} {}", style("Template:").bold(), style(name).cyan());
    println!("  Sheet:            {} (falls back to the active sheet)", layout.sheet_name);
    println!("  Date:             {}", layout.date_cell);
    println!("  Document number:  {}", layout.number_cell);
    println!(
        "  Line items:       row {} onwards, columns {} {} {} {} {}",
        layout.items_start_row,
        layout.identifier_column,
        layout.description_column,
        layout.quantity_column,
        layout.rate_column,
        layout.amount_column
    );
    println!("  Total quantity:   {}", layout.total_quantity_cell);
    println!("  Total amount:     {}", layout.total_amount_cell);
    println!("  Grand total:      {}", layout.grand_total_cell);

    if let Err(e) = layout.validate() {
        println!();
        println!("{} {}", style("!").yellow(), e);
    }

    Ok(())
}
