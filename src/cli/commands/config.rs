//! `proforma config` command - Inspect configuration
//!
//! Settings are edited by hand in the YAML files; these commands only
//! report the effective values and where they come from.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::session::Session;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show,

    /// Show paths to configuration files
    Path,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(global),
    }
}

/// The session is optional here: outside one only the global layer applies
fn session_config_path(global: &GlobalOpts) -> Option<std::path::PathBuf> {
    Session::open(global.session.as_deref())
        .ok()
        .map(|session| session.config_path())
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let config = Config::load(session_config_path(global).as_deref());

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&config).into_diagnostic()?);
        }
        _ => {
            println!("{}", style("Effective Configuration").bold().underlined());
            println!();
            print!("{}", serde_yml::to_string(&config).into_diagnostic()?);

            println!();
            println!("{}", style("Config Sources (in priority order):").dim());
            println!("  1. Environment variables (PROFORMA_DOC_PREFIX, PROFORMA_REGION_SUFFIX)");
            println!("  2. Session config (.proforma/config.yaml)");
            println!("  3. Global config (~/.config/proforma/config.yaml)");
        }
    }

    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    match Config::global_config_path() {
        Some(path) => print_path("Global:", &path),
        None => println!("  {} {}", style("Global:").cyan(), style("(unavailable)").dim()),
    }

    match session_config_path(global) {
        Some(path) => print_path("Session:", &path),
        None => println!(
            "  {} {}",
            style("Session:").cyan(),
            style("(not in a session)").dim()
        ),
    }

    Ok(())
}

fn print_path(label: &str, path: &std::path::Path) {
    println!("  {} {}", style(label).cyan(), path.display());
    if path.exists() {
        println!("           {}", style("(exists)").green());
    } else {
        println!("           {}", style("(not created)").dim());
    }
}
