use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A movie known to the recommender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    /// TMDB identifier
    pub movie_id: u64,
    /// Display title, also the lookup key
    pub title: String,
}

impl CatalogEntry {
    pub fn new(movie_id: u64, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: title.into(),
        }
    }
}

/// Ordered table of movies; the row index of an entry is its position
///
/// Titles are looked up by exact match. When the same title appears on
/// several rows the first row wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<CatalogEntry>", into = "Vec<CatalogEntry>")]
pub struct TitleCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    duplicates: usize,
}

impl TitleCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        let mut duplicates = 0;

        for (row, entry) in entries.iter().enumerate() {
            if index.contains_key(&entry.title) {
                duplicates += 1;
            } else {
                index.insert(entry.title.clone(), row);
            }
        }

        Self {
            entries,
            index,
            duplicates,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, row: usize) -> Option<&CatalogEntry> {
        self.entries.get(row)
    }

    /// Row index of the first entry whose title equals `title`
    pub fn position(&self, title: &str) -> Option<usize> {
        self.index.get(title).copied()
    }

    /// Number of rows shadowed by an earlier row with the same title
    pub fn duplicate_count(&self) -> usize {
        self.duplicates
    }
}

impl From<Vec<CatalogEntry>> for TitleCatalog {
    fn from(entries: Vec<CatalogEntry>) -> Self {
        Self::new(entries)
    }
}

impl From<TitleCatalog> for Vec<CatalogEntry> {
    fn from(catalog: TitleCatalog) -> Self {
        catalog.entries
    }
}
