//! Shared utilities for CLI commands

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::catalog::Catalog;
use crate::core::config::Config;
use crate::core::session::Session;

/// Open the session selected by `--session`, or the one above the current directory
pub fn open_session(global: &GlobalOpts) -> Result<Session> {
    Ok(Session::open(global.session.as_deref())?)
}

/// Load the effective configuration for a session
pub fn load_config(session: &Session) -> Config {
    Config::load(Some(&session.config_path()))
}

/// Load the session catalog, failing if none has been loaded yet
pub fn require_catalog(session: &Session) -> Result<Catalog> {
    session.load_catalog()?.ok_or_else(|| {
        miette::miette!(
            help = "Load one with 'proforma catalog load <FILE>'",
            "no catalog loaded"
        )
    })
}
