// Split: which partition of the dataset to index

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which partition of TinyImageNet to load.
///
/// Each split has its own indexing strategy:
///   - `Train`: one directory of images per class
///   - `Val`:   a flat image directory plus `val_annotations.txt`
///   - `Test`:  a flat image directory, no labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    #[default]
    Train,
    #[serde(alias = "validation")]
    Val,
    Test,
}

impl Split {
    /// All splits, in canonical order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    /// The directory name (and canonical string form) of this split.
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }

    /// Whether samples of this split carry a class label.
    pub fn is_labeled(&self) -> bool {
        !matches!(self, Split::Test)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Split::Train),
            "val" | "validation" => Ok(Split::Val),
            "test" => Ok(Split::Test),
            other => Err(Error::InvalidArgument(format!(
                "invalid split: {other:?}, expected 'train', 'val', or 'test'"
            ))),
        }
    }
}
