//! Short aliases for search results
//!
//! Every search replaces the alias table: `@1`, `@2`, ... map to the
//! catalog rows of the latest result list in display order, so a row can be
//! picked with `proforma cart add @3`.

use serde::{Deserialize, Serialize};

use crate::core::session::{Session, SessionError};

/// Index file location within the session state directory
const INDEX_FILE: &str = "results.json";

/// Maps `@N` aliases to catalog row positions
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ShortIdIndex {
    /// Keyword that produced the aliases
    keyword: String,
    /// Catalog row index for alias N at position N-1
    rows: Vec<usize>,
}

impl ShortIdIndex {
    /// Build an index for a fresh result list
    pub fn from_results(keyword: &str, rows: impl IntoIterator<Item = usize>) -> Self {
        Self {
            keyword: keyword.to_string(),
            rows: rows.into_iter().collect(),
        }
    }

    /// Load the index from a session, or create empty if not found
    pub fn load(session: &Session) -> Self {
        match session.read_json(INDEX_FILE) {
            Ok(Some(index)) => index,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("discarding search aliases: {}", e);
                Self::default()
            }
        }
    }

    /// Save the index to a session
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        session.write_json(INDEX_FILE, self)
    }

    /// Forget all aliases (the catalog they pointed into changed)
    pub fn clear(session: &Session) -> Result<(), SessionError> {
        Self::default().save(session)
    }

    /// Keyword of the search the aliases came from
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Alias text for the N-th result (0-based position)
    pub fn alias(position: usize) -> String {
        format!("@{}", position + 1)
    }

    /// Whether the text looks like an alias rather than an identifier
    pub fn is_alias(text: &str) -> bool {
        text.strip_prefix('@')
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    }

    /// Resolve `@N` to a catalog row position
    pub fn resolve(&self, alias: &str) -> Option<usize> {
        let n: usize = alias.strip_prefix('@')?.parse().ok()?;
        if n == 0 {
            return None;
        }
        self.rows.get(n - 1).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve() {
        let index = ShortIdIndex::from_results("hose", [4, 2, 9]);
        assert_eq!(index.resolve("@1"), Some(4));
        assert_eq!(index.resolve("@3"), Some(9));
        assert_eq!(index.resolve("@4"), None);
        assert_eq!(index.resolve("@0"), None);
        assert_eq!(index.resolve("4"), None);
    }

    #[test]
    fn test_is_alias() {
        assert!(ShortIdIndex::is_alias("@12"));
        assert!(!ShortIdIndex::is_alias("@"));
        assert!(!ShortIdIndex::is_alias("@x1"));
        assert!(!ShortIdIndex::is_alias("4006381333931"));
    }

    #[test]
    fn test_alias_text() {
        assert_eq!(ShortIdIndex::alias(0), "@1");
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let session = Session::init(tmp.path()).unwrap();
        assert!(ShortIdIndex::load(&session).is_empty());

        ShortIdIndex::from_results("widget", [7, 1]).save(&session).unwrap();
        let index = ShortIdIndex::load(&session);
        assert_eq!(index.keyword(), "widget");
        assert_eq!(index.resolve("@2"), Some(1));

        ShortIdIndex::clear(&session).unwrap();
        assert!(ShortIdIndex::load(&session).is_empty());
    }
}
