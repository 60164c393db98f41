use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::metadata::domain::corpus_metadata::CorpusMetadata;
use crate::metadata::domain::metadata_error::MetadataError;
use crate::metadata::domain::metadata_store::MetadataStore;

/// Stores the corpus metadata as a JSON document, usually `<root>/metadata.json`.
pub struct JsonMetadataStore {
    path: PathBuf,
}

impl JsonMetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> MetadataError {
        MetadataError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl MetadataStore for JsonMetadataStore {
    fn load(&self) -> Result<CorpusMetadata, MetadataError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MetadataError::Missing(self.path.clone()))
            }
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&json).map_err(|source| MetadataError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, metadata: &CorpusMetadata) -> Result<(), MetadataError> {
        let json = serde_json::to_string_pretty(metadata).map_err(|source| MetadataError::Json {
            path: self.path.clone(),
            source,
        })?;
        // Write beside the target and rename so readers never see a partial record.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}
