use std::path::{Path, PathBuf};

use crate::archive::domain::archive_error::ArchiveError;
use crate::shared::frame::Frame;
use crate::shared::resolution::Resolution;

/// What is known about a recording once its archive header has been read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub identity: String,
    pub frame_count: usize,
    pub resolution: Resolution,
    pub channels: u8,
    pub source_path: PathBuf,
}

/// Random access to the frames of one per-identity recording archive.
///
/// `open` must not decode the whole recording up front; frames are produced
/// one at a time by `frame`, in the archive's native channel order.
pub trait ArchiveReader: Send {
    fn open(&mut self, path: &Path) -> Result<ArchiveInfo, ArchiveError>;

    fn frame(&self, index: usize) -> Result<Frame, ArchiveError>;

    /// Releases the mapping held for the current archive.
    fn close(&mut self);
}
