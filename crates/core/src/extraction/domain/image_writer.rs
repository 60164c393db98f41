use std::path::Path;

use crate::shared::frame::Frame;

/// Encodes a single frame (grayscale, RGB or RGBA) to an image file.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}
