pub(crate) mod npy_header;
pub mod npz_archive_reader;
