pub mod corpus_metadata;
pub mod metadata_error;
pub mod metadata_store;
