// ClassCatalog: sorted class identifiers and their dense label space

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::annotations::{parse_wnids, parse_words, read_text_file};
use crate::error::Result;

/// Name of the class-list file at the dataset root.
pub const WNIDS_FILE: &str = "wnids.txt";

/// Name of the optional human-readable name file at the dataset root.
pub const WORDS_FILE: &str = "words.txt";

/// The set of classes of a dataset.
///
/// Identifiers are sorted lexicographically and deduplicated; the label of
/// a class is its position in that order. Display names are aligned with
/// the identifiers and fall back to the identifier itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCatalog {
    classes: Vec<String>,
    class_to_idx: HashMap<String, usize>,
    names: Vec<String>,
}

impl ClassCatalog {
    /// Build a catalog from class identifiers in any order.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = ids.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();

        let class_to_idx = classes
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        let names = classes.clone();

        ClassCatalog {
            classes,
            class_to_idx,
            names,
        }
    }

    /// Load the catalog from `<root>/wnids.txt`, optionally resolving names
    /// from `<root>/words.txt`.
    ///
    /// A missing `wnids.txt` is an error; a missing `words.txt` is not.
    pub fn load(root: &Path, use_words: bool) -> Result<Self> {
        let text = read_text_file(&root.join(WNIDS_FILE))?;
        let mut catalog = ClassCatalog::from_ids(parse_wnids(&text));

        if use_words {
            let words_path = root.join(WORDS_FILE);
            if words_path.is_file() {
                let text = read_text_file(&words_path)?;
                catalog = catalog.with_names(&parse_words(&text));
            } else {
                debug!(
                    path = %words_path.display(),
                    "no words file, using class identifiers as names"
                );
            }
        }

        Ok(catalog)
    }

    /// Replace display names using a `wnid -> name` lookup.
    pub fn with_names(mut self, lookup: &HashMap<String, String>) -> Self {
        self.names = self
            .classes
            .iter()
            .map(|id| lookup.get(id).cloned().unwrap_or_else(|| id.clone()))
            .collect();
        self
    }

    /// Sorted class identifiers.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Display names, aligned with [`classes`](Self::classes).
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The `wnid -> label` mapping.
    pub fn class_to_idx(&self) -> &HashMap<String, usize> {
        &self.class_to_idx
    }

    /// Label of a class identifier, if it is part of the catalog.
    pub fn index_of(&self, wnid: &str) -> Option<usize> {
        self.class_to_idx.get(wnid).copied()
    }

    /// Display name of a label.
    pub fn name_of(&self, label: usize) -> Option<&str> {
        self.names.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_sorted_order() {
        let catalog = ClassCatalog::from_ids(["n02", "n01", "n03"]);
        assert_eq!(catalog.classes(), &["n01", "n02", "n03"]);
        assert_eq!(catalog.index_of("n01"), Some(0));
        assert_eq!(catalog.index_of("n02"), Some(1));
        assert_eq!(catalog.index_of("n03"), Some(2));
        assert_eq!(catalog.index_of("n04"), None);
    }

    #[test]
    fn duplicates_collapse_to_one_label() {
        let catalog = ClassCatalog::from_ids(["n02", "n01", "n02"]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.index_of("n02"), Some(1));
    }

    #[test]
    fn names_fall_back_to_identifier() {
        let mut lookup = HashMap::new();
        lookup.insert("n01".to_string(), "goldfish".to_string());
        let catalog = ClassCatalog::from_ids(["n02", "n01"]).with_names(&lookup);
        assert_eq!(catalog.names(), &["goldfish", "n02"]);
        assert_eq!(catalog.name_of(1), Some("n02"));
        assert_eq!(catalog.name_of(2), None);
    }

    #[test]
    fn load_without_words_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(WNIDS_FILE), "n02\nn01\n").unwrap();
        let catalog = ClassCatalog::load(dir.path(), true).unwrap();
        assert_eq!(catalog.names(), catalog.classes());
    }

    #[test]
    fn load_missing_wnids_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClassCatalog::load(dir.path(), false).unwrap_err();
        assert!(err.is_missing_file());
    }
}
