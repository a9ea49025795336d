// Dataset trait: unified interface for indexable data sources

use crate::error::Result;

/// A dataset is an indexed collection of items.
///
/// This is the whole contract an external batching or sampling loader
/// needs: a length and independent random access by position.
/// Implementations must be `Send + Sync` so a loader can read from
/// multiple worker threads.
pub trait Dataset: Send + Sync {
    /// The value produced for one index.
    type Item;

    /// Total number of items in the dataset.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the item at position `index`.
    ///
    /// Fails with [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange)
    /// if `index >= self.len()`.
    fn get(&self, index: usize) -> Result<Self::Item>;

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}
