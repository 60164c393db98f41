pub mod json_metadata_store;
