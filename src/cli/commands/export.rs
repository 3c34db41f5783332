//! `proforma export` command - Fill the invoice template with the order list

use chrono::{Local, NaiveDate};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::{load_config, open_session};
use crate::cli::helpers::format_money;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::docnum::{default_document_number, resolve_document_number};
use crate::core::export::{export, ExportRequest};

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Document number (default: <prefix><yymmdd><suffix>)
    #[arg(long)]
    pub number: Option<String>,

    /// Generation date, YYYY-MM-DD (default: today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Write to this file instead of <number>.<ext> in the output directory
    #[arg(long, short = 'o', conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory for the generated file (default: current directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {} (expected YYYY-MM-DD)", s, e))
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let config = load_config(&session);

    let cart = session.load_cart()?;
    if cart.is_empty() {
        return Err(miette::miette!(
            help = "Search the price list and add items with 'proforma cart add'",
            "cart is empty, nothing to export"
        ));
    }

    let template_path = session.template_path().ok_or_else(|| {
        miette::miette!(
            help = "Load one with 'proforma template load <FILE>'",
            "no template loaded"
        )
    })?;
    let template_name = template_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let template = std::fs::read(&template_path).into_diagnostic()?;

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let document_number = resolve_document_number(
        args.number.as_deref(),
        default_document_number(&config.doc_prefix, date, &config.region_suffix),
    );

    let request = ExportRequest::new(cart.items(), document_number, date)?;
    let document = export(&template_name, &template, &config.layout, &request)?;

    let target = match (args.output, args.output_dir) {
        (Some(path), _) => path,
        (None, Some(dir)) => dir.join(&document.file_name),
        (None, None) => std::env::current_dir()
            .into_diagnostic()?
            .join(&document.file_name),
    };
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).into_diagnostic()?;
        }
    }
    std::fs::write(&target, &document.bytes).into_diagnostic()?;

    if global.format == OutputFormat::Json {
        let summary = serde_json::json!({
            "file": target.display().to_string(),
            "document_number": request.document_number,
            "date": request.date.format("%Y-%m-%d").to_string(),
            "lines": request.lines.len(),
            "total_quantity": request.totals.quantity,
            "total_amount": request.totals.amount,
            "grand_total": request.totals.grand_total,
        });
        println!("{}", serde_json::to_string_pretty(&summary).into_diagnostic()?);
        return Ok(());
    }

    if !global.quiet {
        println!(
            "{} Exported {} line(s) to {}",
            style("✓").green(),
            style(request.lines.len()).cyan(),
            style(target.display()).yellow()
        );
        println!("  Document number: {}", style(&request.document_number).cyan());
        println!("  Grand total:     {}", format_money(request.totals.grand_total));
    }

    Ok(())
}
