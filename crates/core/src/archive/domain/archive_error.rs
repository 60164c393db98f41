use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("failed to read archive {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("archive {path} is not a valid zip container: {source}")]
    Container {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("archive {path} has no array named '{key}'")]
    MissingArray { path: PathBuf, key: String },
    #[error("malformed array header in {path}: {reason}")]
    MalformedHeader { path: PathBuf, reason: String },
    #[error("unsupported dtype '{descr}' in {path}, expected unsigned 8-bit")]
    UnsupportedDtype { path: PathBuf, descr: String },
    #[error("unsupported array shape {shape:?} in {path}, expected (height, width, channels, frames)")]
    UnsupportedShape { path: PathBuf, shape: Vec<usize> },
    #[error("array data in {path} is truncated: expected {expected} bytes, found {found}")]
    Truncated {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
    #[error("cannot derive an identity from archive name {0}")]
    UnrecognizedName(PathBuf),
    #[error("frame {index} out of range, archive has {count} frames")]
    FrameOutOfRange { index: usize, count: usize },
    #[error("no archive is open")]
    NotOpen,
}
