//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::catalog::ColumnNames;
use crate::core::docnum::{DEFAULT_PREFIX, DEFAULT_REGION_SUFFIX};
use crate::core::export::TemplateLayout;
use crate::core::matcher::DEFAULT_LIMIT;

/// Settings as read from one config file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    doc_prefix: Option<String>,
    region_suffix: Option<String>,
    search_limit: Option<usize>,
    columns: Option<ColumnsFile>,
    layout: Option<LayoutFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ColumnsFile {
    identifier: Option<String>,
    description: Option<String>,
    rate: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LayoutFile {
    sheet_name: Option<String>,
    date_cell: Option<String>,
    number_cell: Option<String>,
    items_start_row: Option<u32>,
    identifier_column: Option<String>,
    description_column: Option<String>,
    quantity_column: Option<String>,
    rate_column: Option<String>,
    amount_column: Option<String>,
    total_quantity_cell: Option<String>,
    total_amount_cell: Option<String>,
    grand_total_cell: Option<String>,
}

/// Effective configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Leading part of generated document numbers
    pub doc_prefix: String,

    /// Trailing part of generated document numbers
    pub region_suffix: String,

    /// Maximum number of fuzzy description matches per search
    pub search_limit: usize,

    /// Required price list headers
    pub columns: ColumnNames,

    /// Template cell layout
    pub layout: TemplateLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            doc_prefix: DEFAULT_PREFIX.to_string(),
            region_suffix: DEFAULT_REGION_SUFFIX.to_string(),
            search_limit: DEFAULT_LIMIT,
            columns: ColumnNames::default(),
            layout: TemplateLayout::default(),
        }
    }
}

/// Overwrite `$target` with the file value when the file sets it
macro_rules! merge_fields {
    ($target:expr, $source:expr, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(value) = $source.$field {
                $target.$field = value;
            }
        )*
    };
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(session_config: Option<&Path>) -> Self {
        let mut config = Config::default();

        // Global user config (~/.config/proforma/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            config.merge_file(&global_path);
        }

        // Session config (.proforma/config.yaml)
        if let Some(path) = session_config {
            config.merge_file(path);
        }

        // Environment variables
        if let Ok(prefix) = std::env::var("PROFORMA_DOC_PREFIX") {
            config.doc_prefix = prefix;
        }
        if let Ok(suffix) = std::env::var("PROFORMA_REGION_SUFFIX") {
            config.region_suffix = suffix;
        }

        config
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "proforma")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn merge_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|contents| {
                serde_yml::from_str::<Option<ConfigFile>>(&contents).map_err(|e| e.to_string())
            });

        match parsed {
            // A file with only comments parses as null
            Ok(Some(file)) => self.merge(file),
            Ok(None) => {}
            Err(e) => log::warn!("ignoring config file {}: {}", path.display(), e),
        }
    }

    /// Merge a config file into this one (file takes precedence)
    fn merge(&mut self, other: ConfigFile) {
        merge_fields!(self, other, [doc_prefix, region_suffix, search_limit]);

        if let Some(columns) = other.columns {
            merge_fields!(self.columns, columns, [identifier, description, rate]);
        }

        if let Some(layout) = other.layout {
            merge_fields!(
                self.layout,
                layout,
                [
                    sheet_name,
                    date_cell,
                    number_cell,
                    items_start_row,
                    identifier_column,
                    description_column,
                    quantity_column,
                    rate_column,
                    amount_column,
                    total_quantity_cell,
                    total_amount_cell,
                    grand_total_cell,
                ]
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.doc_prefix, "PIM");
        assert_eq!(config.region_suffix, "KSA001");
        assert_eq!(config.search_limit, 50);
        assert_eq!(config.layout.items_start_row, 14);
        assert_eq!(config.columns.identifier, "EAN");
    }

    #[test]
    fn test_partial_layout_merges_field_by_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "doc_prefix: PI\nlayout:\n  items_start_row: 20\n  grand_total_cell: F40\ncolumns:\n  rate: PRICE\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.merge_file(&path);

        assert_eq!(config.doc_prefix, "PI");
        assert_eq!(config.region_suffix, "KSA001");
        assert_eq!(config.layout.items_start_row, 20);
        assert_eq!(config.layout.grand_total_cell, "F40");
        assert_eq!(config.layout.date_cell, "E3");
        assert_eq!(config.columns.rate, "PRICE");
        assert_eq!(config.columns.identifier, "EAN");
    }

    #[test]
    fn test_comment_only_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "# nothing set\n# doc_prefix: X\n").unwrap();

        let mut config = Config::default();
        config.merge_file(&path);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "search_limit: [not, a, number]\n").unwrap();

        let mut config = Config::default();
        config.merge_file(&path);
        assert_eq!(config.search_limit, 50);
    }
}
