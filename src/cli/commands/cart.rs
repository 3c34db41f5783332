//! `proforma cart` command - Order list management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::{open_session, require_catalog};
use crate::cli::helpers::{csv_lines, format_money, markdown_table, truncate_str, tsv_lines};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::cart::{AddOutcome, Cart};
use crate::core::catalog::{Catalog, CatalogRow};
use crate::core::number::format_quantity;
use crate::core::shortid::ShortIdIndex;

#[derive(Subcommand, Debug)]
pub enum CartCommands {
    /// Add a price list row to the order list
    Add(AddArgs),

    /// Remove all lines with an identifier
    #[command(visible_alias = "rm")]
    Remove(RemoveArgs),

    /// Show the order list
    #[command(visible_alias = "ls")]
    List,

    /// Empty the order list
    Clear,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Search result alias (@N) or product identifier
    pub selector: String,

    /// Quantity to add (must be greater than 0)
    #[arg(long, visible_alias = "quantity", default_value = "1", allow_negative_numbers = true)]
    pub qty: f64,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Product identifier
    pub identifier: String,
}

pub fn run(cmd: CartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CartCommands::Add(args) => run_add(args, global),
        CartCommands::Remove(args) => run_remove(args, global),
        CartCommands::List => run_list(global),
        CartCommands::Clear => run_clear(global),
    }
}

/// Resolve a selector to a catalog row
fn select_row<'a>(catalog: &'a Catalog, aliases: &ShortIdIndex, selector: &str) -> Result<&'a CatalogRow> {
    if ShortIdIndex::is_alias(selector) {
        let index = aliases.resolve(selector).ok_or_else(|| {
            miette::miette!(
                help = "Run 'proforma search <keyword>' and pick one of the listed aliases",
                "'{}' does not match a result of the last search",
                selector
            )
        })?;
        return catalog
            .get(index)
            .ok_or_else(|| miette::miette!("'{}' points past the end of the price list", selector));
    }

    catalog
        .find_by_identifier(selector)
        .map(|(_, row)| row)
        .ok_or_else(|| miette::miette!("No price list row with identifier '{}'", selector))
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let catalog = require_catalog(&session)?;
    let aliases = ShortIdIndex::load(&session);
    let row = select_row(&catalog, &aliases, &args.selector)?;

    let mut cart = session.load_cart()?;
    let outcome = cart.add_item(row, args.qty)?;
    session.save_cart(&cart)?;

    if !global.quiet {
        let item = cart
            .items()
            .iter()
            .find(|item| item.identifier == row.identifier.trim());
        match (outcome, item) {
            (AddOutcome::Merged, Some(item)) => println!(
                "{} Added {} x {} (now {}, amount {})",
                style("✓").green(),
                format_quantity(args.qty),
                style(&item.description).cyan(),
                format_quantity(item.quantity),
                format_money(item.amount)
            ),
            _ => println!(
                "{} Added {} x {} | EAN:{} | RATE:{}",
                style("✓").green(),
                format_quantity(args.qty),
                style(&row.description).cyan(),
                row.identifier,
                format_money(row.rate)
            ),
        }
    }

    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let mut cart = session.load_cart()?;

    let removed = cart.remove_item(&args.identifier);
    if removed == 0 {
        eprintln!(
            "{} No order line with identifier '{}'",
            style("!").yellow(),
            args.identifier
        );
        return Ok(());
    }

    session.save_cart(&cart)?;
    if !global.quiet {
        println!(
            "{} Removed {} line(s) for {}",
            style("✓").green(),
            removed,
            style(&args.identifier).cyan()
        );
    }

    Ok(())
}

fn run_clear(global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let mut cart = session.load_cart()?;
    let count = cart.len();
    cart.clear();
    session.save_cart(&cart)?;

    if !global.quiet {
        println!("{} Cleared {} line(s)", style("✓").green(), count);
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let cart = session.load_cart()?;
    print_cart(&cart, global.format)
}

fn print_cart(cart: &Cart, format: OutputFormat) -> Result<()> {
    let headers = ["EAN", "DESCRIPTION", "QTY", "RATE", "AMOUNT"];
    let rows: Vec<Vec<String>> = cart
        .items()
        .iter()
        .map(|item| {
            vec![
                item.identifier.clone(),
                item.description.clone(),
                format_quantity(item.quantity),
                format_money(item.rate),
                format_money(item.amount),
            ]
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(cart.items()).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(cart.items()).into_diagnostic()?);
        }
        OutputFormat::Csv => println!("{}", csv_lines(&headers, &rows)),
        OutputFormat::Tsv => println!("{}", tsv_lines(&headers, &rows)),
        OutputFormat::Md => println!("{}", markdown_table(&headers, &rows)),
        OutputFormat::Id => {
            for item in cart.items() {
                println!("{}", item.identifier);
            }
        }
        OutputFormat::Auto => {
            if cart.is_empty() {
                println!("The order list is empty. Search and add items first.");
                return Ok(());
            }

            println!(
                "{:<16} {:<40} {:>8} {:>10} {:>12}",
                style("EAN").bold(),
                style("DESCRIPTION").bold(),
                style("QTY").bold(),
                style("RATE").bold(),
                style("AMOUNT").bold()
            );
            println!("{}", "-".repeat(90));
            for item in cart.items() {
                println!(
                    "{:<16} {:<40} {:>8} {:>10} {:>12}",
                    style(truncate_str(&item.identifier, 16)).cyan(),
                    truncate_str(&item.description, 38),
                    format_quantity(item.quantity),
                    format_money(item.rate),
                    format_money(item.amount)
                );
            }
            println!("{}", "-".repeat(90));
            println!(
                "{:<16} {:<40} {:>8} {:>10} {:>12}",
                style("TOTAL").bold(),
                "",
                format_quantity(cart.total_quantity()),
                "",
                style(format_money(cart.total_amount())).bold()
            );
        }
    }

    Ok(())
}
