use clap::Parser;
use miette::Result;
use proforma::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior so piping to `head` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    // RUST_LOG wins over --verbose
    let default_level = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Init(args) => proforma::cli::commands::init::run(args),
        Commands::Catalog(cmd) => proforma::cli::commands::catalog::run(cmd, &global),
        Commands::Search(args) => proforma::cli::commands::search::run(args, &global),
        Commands::Cart(cmd) => proforma::cli::commands::cart::run(cmd, &global),
        Commands::Template(cmd) => proforma::cli::commands::template::run(cmd, &global),
        Commands::Export(args) => proforma::cli::commands::export::run(args, &global),
        Commands::Config(cmd) => proforma::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => proforma::cli::commands::completions::run(args),
    }
}
