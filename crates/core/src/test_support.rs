//! Fixtures shared by the unit tests: real `.npz` recordings and PNG faces.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use ndarray::Array4;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::archive::infrastructure::npy_header::encode_u8_header;
use crate::shared::constants::COLOR_IMAGES_KEY;

/// Deterministic pixel value of the fixture recordings.
pub(crate) fn fixture_pixel(y: usize, x: usize, c: usize, n: usize) -> u8 {
    ((n * 31 + y * 7 + x * 3 + c) % 251) as u8
}

/// Writes a 3-channel recording of `frames` frames at `height` x `width`.
pub(crate) fn write_recording(
    path: &Path,
    height: usize,
    width: usize,
    frames: usize,
    compression: CompressionMethod,
    fortran_order: bool,
) {
    let arr = Array4::from_shape_fn((height, width, 3, frames), |(y, x, c, n)| {
        fixture_pixel(y, x, c, n)
    });
    let data: Vec<u8> = if fortran_order {
        arr.t().iter().copied().collect()
    } else {
        arr.iter().copied().collect()
    };

    let mut npy = encode_u8_header(&[height, width, 3, frames], fortran_order);
    npy.extend_from_slice(&data);
    write_color_images(path, &npy, compression);
}

/// Writes an archive whose colour array entry holds exactly `npy`.
pub(crate) fn write_color_images(path: &Path, npy: &[u8], compression: CompressionMethod) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(compression);
    zip.start_file(format!("{COLOR_IMAGES_KEY}.npy"), options)
        .unwrap();
    zip.write_all(npy).unwrap();
    zip.finish().unwrap();
}

/// Writes an archive whose header declares `shape` but carries only a few
/// bytes of data.
pub(crate) fn write_corrupt_shape_recording(path: &Path, shape: &[usize]) {
    let mut npy = encode_u8_header(shape, false);
    npy.extend_from_slice(&[0; 16]);
    write_color_images(path, &npy, CompressionMethod::Stored);
}

/// Writes a solid-colour RGB PNG.
pub(crate) fn write_png(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_pixel(width, height, image::Rgb(rgb))
        .save(path)
        .unwrap();
}
