//! `proforma search` command - Find price list rows by keyword
//!
//! Matches descriptions by fuzzy similarity and identifiers by substring.
//! Each result gets an `@N` alias that `proforma cart add` accepts.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::commands::utils::{load_config, open_session, require_catalog};
use crate::cli::helpers::{csv_lines, format_money, markdown_table, truncate_str, tsv_lines};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::matcher::{self, Match, MatchOrigin};
use crate::core::shortid::ShortIdIndex;

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Keyword (model, description or identifier fragment)
    pub keyword: String,

    /// Maximum number of fuzzy description matches (default: search_limit from config)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(Serialize)]
struct SearchResult<'a> {
    alias: String,
    identifier: &'a str,
    description: &'a str,
    rate: f64,
    matched_on: MatchOrigin,
    score: f64,
}

/// Run the search command
pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let config = load_config(&session);
    let catalog = require_catalog(&session)?;

    let limit = args.limit.unwrap_or(config.search_limit);
    let results = matcher::search(&catalog, &args.keyword, limit);

    // Aliases always follow the latest search, even an empty one
    ShortIdIndex::from_results(&args.keyword, results.iter().map(|m| m.index)).save(&session)?;

    if args.count {
        println!("{}", results.len());
        return Ok(());
    }

    if results.is_empty() {
        if !global.quiet {
            println!("No results found for '{}'.", style(&args.keyword).yellow());
        }
        return Ok(());
    }

    print_results(&args.keyword, &results, global.format)
}

fn print_results(keyword: &str, results: &[Match<'_>], format: OutputFormat) -> Result<()> {
    let headers = ["ALIAS", "EAN", "DESCRIPTION", "RATE"];
    let rows: Vec<Vec<String>> = results
        .iter()
        .enumerate()
        .map(|(i, m)| {
            vec![
                ShortIdIndex::alias(i),
                m.row.identifier.clone(),
                m.row.description.clone(),
                format_money(m.row.rate),
            ]
        })
        .collect();

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let serializable: Vec<SearchResult<'_>> = results
                .iter()
                .enumerate()
                .map(|(i, m)| SearchResult {
                    alias: ShortIdIndex::alias(i),
                    identifier: &m.row.identifier,
                    description: &m.row.description,
                    rate: m.row.rate,
                    matched_on: m.origin,
                    score: (m.score * 10.0).round() / 10.0,
                })
                .collect();
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&serializable).into_diagnostic()?);
            } else {
                print!("{}", serde_yml::to_string(&serializable).into_diagnostic()?);
            }
        }
        OutputFormat::Csv => println!("{}", csv_lines(&headers, &rows)),
        OutputFormat::Tsv => println!("{}", tsv_lines(&headers, &rows)),
        OutputFormat::Md => println!("{}", markdown_table(&headers, &rows)),
        OutputFormat::Id => {
            for m in results {
                println!("{}", m.row.identifier);
            }
        }
        OutputFormat::Auto => {
            println!(
                "{} results for '{}':",
                style(results.len()).cyan(),
                style(keyword).yellow()
            );
            println!();

            println!(
                "{:<6} {:<16} {:<50} {:>10}",
                style("ALIAS").bold().dim(),
                style("EAN").bold(),
                style("DESCRIPTION").bold(),
                style("RATE").bold()
            );
            println!("{}", "-".repeat(85));

            for (i, m) in results.iter().enumerate() {
                let identifier = match m.origin {
                    MatchOrigin::Identifier => style(truncate_str(&m.row.identifier, 16)).green(),
                    MatchOrigin::Description => style(truncate_str(&m.row.identifier, 16)).white(),
                };
                println!(
                    "{:<6} {:<16} {:<50} {:>10}",
                    style(ShortIdIndex::alias(i)).cyan(),
                    identifier,
                    truncate_str(&m.row.description, 48),
                    format_money(m.row.rate)
                );
            }

            println!();
            println!(
                "Use {} to add a result to the order list.",
                style("proforma cart add @N --qty <QTY>").cyan()
            );
        }
    }

    Ok(())
}
