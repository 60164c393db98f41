use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneFilterError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk scene root {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
