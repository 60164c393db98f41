use crate::metadata::domain::corpus_metadata::CorpusMetadata;
use crate::metadata::domain::metadata_error::MetadataError;

/// Persistence for the corpus-wide derived metadata record.
pub trait MetadataStore: Send {
    /// Fails with [`MetadataError::Missing`] until an extraction pass has
    /// completed; callers should run extraction rather than retry.
    fn load(&self) -> Result<CorpusMetadata, MetadataError>;

    /// Replaces any previous record.
    fn save(&self, metadata: &CorpusMetadata) -> Result<(), MetadataError>;
}
