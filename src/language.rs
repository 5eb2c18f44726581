//! Extension and name lookups for known languages.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Language, LanguageId};
use crate::store::SqliteStore;

pub trait LanguageRegistry: Send + Sync {
    /// `extension` carries no leading dot.
    fn by_extension(&self, extension: &str) -> Option<LanguageId>;

    fn by_name(&self, name: &str) -> Option<LanguageId>;
}

/// In-memory snapshot of the `languages` table.
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    by_extension: HashMap<String, LanguageId>,
    by_name: HashMap<String, LanguageId>,
}

impl LanguageTable {
    pub fn new(languages: impl IntoIterator<Item = Language>) -> Self {
        let mut table = Self::default();
        for lang in languages {
            table.by_extension.insert(lang.extension, lang.id);
            table.by_name.insert(lang.name, lang.id);
        }
        table
    }

    pub fn load(store: &SqliteStore) -> Result<Self> {
        Ok(Self::new(store.languages()?))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl LanguageRegistry for LanguageTable {
    fn by_extension(&self, extension: &str) -> Option<LanguageId> {
        self.by_extension.get(extension).copied()
    }

    fn by_name(&self, name: &str) -> Option<LanguageId> {
        self.by_name.get(name).copied()
    }
}

/// Substring after the last '.' in a file name, if non-empty.
pub fn file_extension(name: &str) -> Option<&str> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("app.js"), Some("js"));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz"));
        assert_eq!(file_extension("Makefile"), None);
        assert_eq!(file_extension("trailing."), None);
        assert_eq!(file_extension(".gitignore"), Some("gitignore"));
    }

    #[test]
    fn test_table_lookups() {
        let table = LanguageTable::new(vec![Language {
            id: LanguageId(7),
            name: "JavaScript".to_string(),
            extension: "js".to_string(),
        }]);

        assert_eq!(table.by_extension("js"), Some(LanguageId(7)));
        assert_eq!(table.by_name("JavaScript"), Some(LanguageId(7)));
        assert_eq!(table.by_extension("py"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_load_from_store() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = store.create_language("Python", "py").unwrap();
        let table = LanguageTable::load(&store).unwrap();
        assert_eq!(table.by_extension("py"), Some(id));
    }
}
