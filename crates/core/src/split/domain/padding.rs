use std::path::{Path, PathBuf};

use image::{imageops, RgbImage};
use thiserror::Error;

use crate::shared::resolution::Resolution;

#[derive(Error, Debug)]
pub enum PaddingError {
    #[error("image {size} does not fit in target {target}")]
    TooLarge { size: Resolution, target: Resolution },
    #[error("failed to read image {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Constant border added on each side of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Padding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Padding {
    /// Centres `size` inside `target`; an odd difference puts the extra pixel
    /// on the top/left side.
    pub fn centering(size: Resolution, target: Resolution) -> Result<Self, PaddingError> {
        if !target.contains(size) {
            return Err(PaddingError::TooLarge { size, target });
        }
        let dy = target.height - size.height;
        let dx = target.width - size.width;
        Ok(Self {
            top: dy.div_ceil(2),
            bottom: dy / 2,
            left: dx.div_ceil(2),
            right: dx / 2,
        })
    }
}

/// Pads `image` with black borders to exactly `target`.
pub fn pad_to_resolution(image: &RgbImage, target: Resolution) -> Result<RgbImage, PaddingError> {
    let size = Resolution::new(image.height(), image.width());
    let padding = Padding::centering(size, target)?;
    let mut canvas = RgbImage::new(target.width, target.height);
    imageops::replace(&mut canvas, image, padding.left as i64, padding.top as i64);
    Ok(canvas)
}

/// Reads the image at `path` as RGB and pads it to `target`.
pub fn pad_file(path: &Path, target: Resolution) -> Result<RgbImage, PaddingError> {
    let image = image::open(path)
        .map_err(|source| PaddingError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    pad_to_resolution(&image, target)
}
