use std::path::PathBuf;

use thiserror::Error;

use crate::metadata::domain::metadata_error::MetadataError;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write split image {path}: {source}")]
    WriteImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("split build failed and partial splits were removed: {0}")]
    RolledBack(#[source] Box<SplitError>),
}

impl SplitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SplitError::Io {
            path: path.into(),
            source,
        }
    }
}
