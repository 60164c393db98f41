use std::path::PathBuf;

use thiserror::Error;

use crate::archive::domain::archive_error::ArchiveError;
use crate::metadata::domain::metadata_error::MetadataError;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk corpus root {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("failed to write frame {path}: {message}")]
    WriteFrame { path: PathBuf, message: String },
    #[error("failed to persist corpus metadata: {0}")]
    Metadata(#[from] MetadataError),
}
