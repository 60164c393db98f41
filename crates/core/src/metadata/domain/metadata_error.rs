use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("metadata file {0} not found, run face extraction first")]
    Missing(PathBuf),
    #[error("failed to access metadata file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("metadata file {path} is not valid: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
