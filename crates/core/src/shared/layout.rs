use std::fmt;
use std::path::{Path, PathBuf};

use crate::shared::constants::{
    FACES_DIR_NAME, FACE_FILE_EXTENSION, FACE_FILE_PREFIX, METADATA_FILE_NAME,
};

/// Named partition of identities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub const ALL: [Split; 2] = [Split::Train, Split::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk layout of a prepared face corpus.
///
/// ```text
/// <root>/Faces/<identity>/face_<n>.png
/// <root>/metadata.json
/// <root>/train/<identity>_<file>
/// <root>/test/<identity>_<file>
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusLayout {
    root: PathBuf,
}

impl CorpusLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn faces_dir(&self) -> PathBuf {
        self.root.join(FACES_DIR_NAME)
    }

    pub fn identity_dir(&self, identity: &str) -> PathBuf {
        self.faces_dir().join(identity)
    }

    pub fn face_path(&self, identity: &str, index: usize) -> PathBuf {
        self.identity_dir(identity).join(face_file_name(index))
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE_NAME)
    }

    pub fn split_dir(&self, split: Split) -> PathBuf {
        self.root.join(split.as_str())
    }
}

pub fn face_file_name(index: usize) -> String {
    format!("{FACE_FILE_PREFIX}{index}.{FACE_FILE_EXTENSION}")
}

/// Name of an identity's image once copied into a flat split directory.
pub fn split_file_name(identity: &str, file_name: &str) -> String {
    format!("{identity}_{file_name}")
}
