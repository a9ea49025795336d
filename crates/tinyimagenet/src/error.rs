use std::path::PathBuf;

/// All errors that can occur while building or reading a TinyImageNet index.
///
/// Construction failures (`MissingFile`, `InvalidArgument`, `Io`) abort the
/// build before any sample is indexed. Access failures (`Decode`,
/// `IndexOutOfRange`) are per-call and leave the dataset usable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required file or directory does not exist.
    #[error("file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// A construction parameter has an unrecognized value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An image could not be opened or decoded.
    #[error("error loading image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Sample index outside `[0, len)`.
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A directory listing or text file read failed for a reason other than absence.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn missing(path: impl Into<PathBuf>) -> Self {
        Error::MissingFile { path: path.into() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if a required file or directory was absent.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Error::MissingFile { .. })
    }

    /// Returns true if the error came from an out-of-range sample index.
    pub fn is_index_error(&self) -> bool {
        matches!(self, Error::IndexOutOfRange { .. })
    }
}

/// Convenience Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
