//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    cart::CartCommands,
    catalog::CatalogCommands,
    completions::CompletionsArgs,
    config::ConfigCommands,
    export::ExportArgs,
    init::InitArgs,
    search::SearchArgs,
    template::TemplateCommands,
};

#[derive(Parser)]
#[command(name = "proforma")]
#[command(author, version, about = "Price list search and proforma invoice builder")]
#[command(long_about = "Search an uploaded price list, collect line items into an order list and fill a proforma invoice spreadsheet template.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Session directory (default: auto-detect by finding .proforma/)
    #[arg(long, global = true)]
    pub session: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new session
    Init(InitArgs),

    /// Load or inspect the price list
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Search the price list by keyword
    Search(SearchArgs),

    /// Manage the order list
    #[command(subcommand)]
    Cart(CartCommands),

    /// Load or inspect the invoice template
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Fill the template with the order list
    Export(ExportArgs),

    /// Show effective configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (styled table on a terminal)
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// YAML format
    Yaml,
    /// Just identifiers, one per line
    Id,
}
