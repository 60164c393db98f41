use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};

use crate::extraction::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

/// Writes frames with the `image` crate; the format follows the path's extension.
///
/// The image is encoded beside the destination and renamed into place, so an
/// existing file at the destination is always a complete image.
pub struct PngImageWriter;

impl PngImageWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PngImageWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_dynamic(frame: &Frame) -> Option<DynamicImage> {
    let (w, h) = (frame.width(), frame.height());
    let data = frame.data().to_vec();
    match frame.channels() {
        1 => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
        _ => None,
    }
}

impl ImageWriter for PngImageWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let img = to_dynamic(frame).ok_or_else(|| {
            format!(
                "Cannot encode {}x{} frame with {} channels",
                frame.width(),
                frame.height(),
                frame.channels()
            )
        })?;
        let format = ImageFormat::from_path(path)?;
        let partial = partial_path(path)?;
        let result = img
            .save_with_format(&partial, format)
            .map_err(Box::<dyn std::error::Error>::from)
            .and_then(|()| fs::rename(&partial, path).map_err(Into::into));
        if result.is_err() && partial.exists() {
            if let Err(e) = fs::remove_file(&partial) {
                log::warn!("Failed to remove {}: {e}", partial.display());
            }
        }
        result
    }
}

/// `<dir>/face_0.png` becomes `<dir>/face_0.png.part`.
fn partial_path(path: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut name = path
        .file_name()
        .ok_or("image path has no file name")?
        .to_os_string();
    name.push(".part");
    Ok(path.with_file_name(name))
}
