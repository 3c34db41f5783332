//! Session discovery and persisted state
//!
//! A session is a directory containing `.proforma/`. It holds exactly one
//! user's catalog, cart and template; separate session directories share
//! nothing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::cart::Cart;
use crate::core::catalog::Catalog;

/// Name of the session state directory
pub const SESSION_DIR: &str = ".proforma";

const CATALOG_FILE: &str = "catalog.json";
const CART_FILE: &str = "cart.json";
const TEMPLATE_DIR: &str = "template";

/// A proforma working session rooted at a directory
#[derive(Debug)]
pub struct Session {
    /// Directory containing `.proforma/`
    root: PathBuf,
}

impl Session {
    /// Find the session by walking up from the current directory
    pub fn discover() -> Result<Self, SessionError> {
        let current = std::env::current_dir().map_err(|e| SessionError::Io(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the session by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, SessionError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| SessionError::Io(e.to_string()))?;

        loop {
            if current.join(SESSION_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(SessionError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Resolve the session from an explicit `--session` path, or discover it
    pub fn open(explicit: Option<&Path>) -> Result<Self, SessionError> {
        match explicit {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Create a new session at the given path
    pub fn init(path: &Path) -> Result<Self, SessionError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(SESSION_DIR).exists() {
            return Err(SessionError::AlreadyExists(root));
        }

        Self::create(root)
    }

    /// Reinitialize a session, discarding catalog, cart and template
    pub fn init_force(path: &Path) -> Result<Self, SessionError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let dir = root.join(SESSION_DIR);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| SessionError::Io(e.to_string()))?;
        }

        Self::create(root)
    }

    fn create(root: PathBuf) -> Result<Self, SessionError> {
        let dir = root.join(SESSION_DIR);
        fs::create_dir_all(dir.join(TEMPLATE_DIR)).map_err(|e| SessionError::Io(e.to_string()))?;
        fs::write(dir.join("config.yaml"), Self::default_config())
            .map_err(|e| SessionError::Io(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# proforma session configuration

# Document number: <doc_prefix><yymmdd><region_suffix>
# doc_prefix: PIM
# region_suffix: KSA001

# Maximum fuzzy matches per search
# search_limit: 50

# Required price list headers
# columns:
#   identifier: EAN
#   description: DESCRIPTION
#   rate: RATE

# Template cell layout
# layout:
#   sheet_name: Invoice
#   date_cell: E3
#   number_cell: E4
#   items_start_row: 14
#   total_quantity_cell: C31
#   total_amount_cell: E31
#   grand_total_cell: E34
"#
    }

    /// Get the session root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the `.proforma` state directory
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(SESSION_DIR)
    }

    /// Get the session config file path
    pub fn config_path(&self) -> PathBuf {
        self.state_dir().join("config.yaml")
    }

    /// Load the current catalog, if one has been loaded
    pub fn load_catalog(&self) -> Result<Option<Catalog>, SessionError> {
        self.read_json(CATALOG_FILE)
    }

    /// Replace the session catalog
    pub fn save_catalog(&self, catalog: &Catalog) -> Result<(), SessionError> {
        self.write_json(CATALOG_FILE, catalog)
    }

    /// Load the cart (empty if none has been saved yet)
    pub fn load_cart(&self) -> Result<Cart, SessionError> {
        Ok(self.read_json(CART_FILE)?.unwrap_or_default())
    }

    /// Persist the cart
    pub fn save_cart(&self, cart: &Cart) -> Result<(), SessionError> {
        self.write_json(CART_FILE, cart)
    }

    /// Path of the loaded template, if any
    pub fn template_path(&self) -> Option<PathBuf> {
        let entries = fs::read_dir(self.state_dir().join(TEMPLATE_DIR)).ok()?;
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|p| p.is_file())
    }

    /// Store a copy of the template, replacing any previous one
    pub fn store_template(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, SessionError> {
        let dir = self.state_dir().join(TEMPLATE_DIR);
        fs::create_dir_all(&dir).map_err(|e| SessionError::Io(e.to_string()))?;

        // The previous template stays in place until the new one is written
        let path = dir.join(name);
        fs::write(&path, bytes).map_err(|e| SessionError::Io(e.to_string()))?;

        let entries = fs::read_dir(&dir).map_err(|e| SessionError::Io(e.to_string()))?;
        for entry in entries.filter_map(|e| e.ok()) {
            let old = entry.path();
            if old != path {
                let removed = if old.is_dir() {
                    fs::remove_dir_all(&old)
                } else {
                    fs::remove_file(&old)
                };
                removed.map_err(|e| SessionError::Io(e.to_string()))?;
            }
        }
        Ok(path)
    }

    pub(crate) fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, SessionError> {
        let path = self.state_dir().join(file);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| SessionError::Io(e.to_string()))?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SessionError::Corrupt {
                file: path,
                message: e.to_string(),
            })
    }

    pub(crate) fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), SessionError> {
        let content =
            serde_json::to_string_pretty(value).map_err(|e| SessionError::Io(e.to_string()))?;
        fs::write(self.state_dir().join(file), content).map_err(|e| SessionError::Io(e.to_string()))
    }
}

/// Errors that can occur while opening or persisting a session
#[derive(Debug, Error, miette::Diagnostic)]
pub enum SessionError {
    #[error("not a proforma session (searched from {searched_from:?}). Run 'proforma init' to create one.")]
    #[diagnostic(code(proforma::session::not_found))]
    NotFound { searched_from: PathBuf },

    #[error("proforma session already exists at {0:?}")]
    #[diagnostic(code(proforma::session::exists))]
    AlreadyExists(PathBuf),

    #[error("session state file {file:?} is unreadable: {message}")]
    #[diagnostic(
        code(proforma::session::corrupt),
        help("Reload the catalog or run 'proforma cart clear' to reset it")
    )]
    Corrupt { file: PathBuf, message: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(proforma::session::io))]
    Io(String),
}
