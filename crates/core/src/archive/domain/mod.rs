pub mod archive_error;
pub mod archive_reader;
pub mod identity;
