use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};
use ndarray::{ArrayView4, Axis, ShapeBuilder};
use zip::result::ZipError;
use zip::{CompressionMethod, ZipArchive};

use crate::archive::domain::archive_error::ArchiveError;
use crate::archive::domain::archive_reader::{ArchiveInfo, ArchiveReader};
use crate::archive::domain::identity::identity_from_path;
use crate::archive::infrastructure::npy_header::NpyHeader;
use crate::shared::constants::COLOR_IMAGES_KEY;
use crate::shared::frame::Frame;
use crate::shared::resolution::Resolution;

/// Reads recordings stored as NumPy `.npz` archives.
///
/// The archive is memory-mapped. When the array entry is stored uncompressed
/// (`np.savez`) frames are viewed straight out of the mapping; a deflated entry
/// (`np.savez_compressed`) has to be inflated once on open.
pub struct NpzArchiveReader {
    array_key: String,
    current: Option<OpenArchive>,
}

struct OpenArchive {
    mmap: Mmap,
    payload: Payload,
    header: NpyHeader,
    /// Byte length of the array data, checked against the payload on open.
    data_len: usize,
    info: ArchiveInfo,
}

enum Payload {
    Mapped { start: usize, len: usize },
    Inflated(Vec<u8>),
}

impl OpenArchive {
    fn npy_bytes(&self) -> &[u8] {
        match &self.payload {
            Payload::Mapped { start, len } => &self.mmap[*start..*start + *len],
            Payload::Inflated(bytes) => bytes,
        }
    }

    fn frames_view(&self) -> Result<ArrayView4<'_, u8>, ArchiveError> {
        let [h, w, c, n]: [usize; 4] = self
            .header
            .shape
            .as_slice()
            .try_into()
            .map_err(|_| self.shape_error())?;
        let start = self.header.data_offset;
        let data = &self.npy_bytes()[start..start + self.data_len];
        ArrayView4::from_shape((h, w, c, n).set_f(self.header.fortran_order), data)
            .map_err(|_| self.shape_error())
    }

    fn shape_error(&self) -> ArchiveError {
        ArchiveError::UnsupportedShape {
            path: self.info.source_path.clone(),
            shape: self.header.shape.clone(),
        }
    }
}

impl NpzArchiveReader {
    pub fn new() -> Self {
        Self::with_array_key(COLOR_IMAGES_KEY)
    }

    pub fn with_array_key(key: impl Into<String>) -> Self {
        Self {
            array_key: key.into(),
            current: None,
        }
    }

    fn load(&self, path: &Path) -> Result<OpenArchive, ArchiveError> {
        let identity = identity_from_path(path)
            .ok_or_else(|| ArchiveError::UnrecognizedName(path.to_path_buf()))?;
        let io_err = |source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        // Safety: the corpus is treated as read-only while it is being processed.
        let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(io_err)?;

        let payload = locate_array(&mmap, path, &self.array_key)?;
        let npy = match &payload {
            Payload::Mapped { start, len } => start
                .checked_add(*len)
                .and_then(|end| mmap.get(*start..end))
                .ok_or(ArchiveError::Truncated {
                    path: path.to_path_buf(),
                    expected: start.saturating_add(*len),
                    found: mmap.len(),
                })?,
            Payload::Inflated(bytes) => bytes.as_slice(),
        };

        let header = NpyHeader::parse(npy).map_err(|reason| ArchiveError::MalformedHeader {
            path: path.to_path_buf(),
            reason,
        })?;
        if !header.is_u8() {
            return Err(ArchiveError::UnsupportedDtype {
                path: path.to_path_buf(),
                descr: header.descr.clone(),
            });
        }
        let shape_err = || ArchiveError::UnsupportedShape {
            path: path.to_path_buf(),
            shape: header.shape.clone(),
        };
        if header.shape.len() != 4 || header.shape[2] == 0 || header.shape[2] > 4 {
            return Err(shape_err());
        }
        // A corrupt header may declare sizes that do not fit in memory arithmetic.
        let data_len = header.element_count().ok_or_else(shape_err)?;
        let expected = header
            .data_offset
            .checked_add(data_len)
            .ok_or_else(shape_err)?;
        let height = u32::try_from(header.shape[0]).map_err(|_| shape_err())?;
        let width = u32::try_from(header.shape[1]).map_err(|_| shape_err())?;
        if npy.len() < expected {
            return Err(ArchiveError::Truncated {
                path: path.to_path_buf(),
                expected,
                found: npy.len(),
            });
        }

        let info = ArchiveInfo {
            identity,
            frame_count: header.shape[3],
            resolution: Resolution::new(height, width),
            channels: header.shape[2] as u8,
            source_path: path.to_path_buf(),
        };

        Ok(OpenArchive {
            mmap,
            payload,
            header,
            data_len,
            info,
        })
    }
}

impl Default for NpzArchiveReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds `<key>.npy` inside the zip container.
fn locate_array(mmap: &Mmap, path: &Path, key: &str) -> Result<Payload, ArchiveError> {
    let container_err = |source| ArchiveError::Container {
        path: path.to_path_buf(),
        source,
    };
    let mut zip = ZipArchive::new(Cursor::new(&mmap[..])).map_err(container_err)?;
    let entry_name = format!("{key}.npy");
    let mut entry = match zip.by_name(&entry_name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(ArchiveError::MissingArray {
                path: path.to_path_buf(),
                key: key.to_string(),
            })
        }
        Err(e) => return Err(container_err(e)),
    };

    if entry.compression() == CompressionMethod::Stored {
        Ok(Payload::Mapped {
            start: entry.data_start() as usize,
            len: entry.size() as usize,
        })
    } else {
        // The declared size is untrusted; never reserve more than the file holds.
        let capacity = usize::try_from(entry.size()).unwrap_or(usize::MAX).min(mmap.len());
        let mut bytes = Vec::with_capacity(capacity);
        entry.read_to_end(&mut bytes).map_err(|source| ArchiveError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        Ok(Payload::Inflated(bytes))
    }
}

impl ArchiveReader for NpzArchiveReader {
    fn open(&mut self, path: &Path) -> Result<ArchiveInfo, ArchiveError> {
        self.current = None;
        let archive = self.load(path)?;
        let info = archive.info.clone();
        log::debug!(
            "Opened {} ({} frames at {}, {})",
            path.display(),
            info.frame_count,
            info.resolution,
            if matches!(archive.payload, Payload::Mapped { .. }) {
                "mapped"
            } else {
                "inflated"
            }
        );
        self.current = Some(archive);
        Ok(info)
    }

    fn frame(&self, index: usize) -> Result<Frame, ArchiveError> {
        let archive = self.current.as_ref().ok_or(ArchiveError::NotOpen)?;
        let count = archive.info.frame_count;
        if index >= count {
            return Err(ArchiveError::FrameOutOfRange { index, count });
        }
        let frames = archive.frames_view()?;
        Ok(Frame::from_view(frames.index_axis(Axis(3), index), index))
    }

    fn close(&mut self) {
        self.current = None;
    }
}
