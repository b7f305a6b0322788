use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tilebatch operations.
#[derive(Debug, Error)]
pub enum TilebatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid grid geometry: {message}")]
    InvalidGeometry { message: String },

    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write ROI bundle to {path}: {source}")]
    RoiBundleWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse ROI bundle from {path}: {source}")]
    RoiBundleParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing ROI artifact for tile {tile}: expected {expected}")]
    MissingRoiArtifact { tile: PathBuf, expected: PathBuf },

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Filename of {0} is not valid UTF-8")]
    NonUtf8Path(PathBuf),
}

impl TilebatchError {
    /// Shorthand for an [`InvalidGeometry`](Self::InvalidGeometry) error.
    pub(crate) fn geometry(message: impl Into<String>) -> Self {
        TilebatchError::InvalidGeometry {
            message: message.into(),
        }
    }
}
