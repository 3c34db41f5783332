//! `proforma init` command - Initialize a new session

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::session::{Session, SessionError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Reinitialize, discarding any catalog, cart and template
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let session = if args.force {
        Session::init_force(&path)
    } else {
        Session::init(&path)
    };

    match session {
        Ok(session) => {
            println!(
                "{} Initialized proforma session at {}",
                style("✓").green(),
                style(session.root().display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!(
                "  {} Load a price list",
                style("proforma catalog load prices.xlsx").yellow()
            );
            println!(
                "  {} Find products",
                style("proforma search <keyword>").yellow()
            );
            println!(
                "  {} Load the invoice template",
                style("proforma template load PI.xlsx").yellow()
            );
            Ok(())
        }
        Err(SessionError::AlreadyExists(path)) => {
            println!(
                "{} proforma session already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to start over",
                style("proforma init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
