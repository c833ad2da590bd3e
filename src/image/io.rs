//! Convenience helpers for decoding and encoding images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageView, OwnedImage, Raster, Rgb};
use crate::util::{ScanError, ScanResult};
use image::ImageEncoder;
use std::path::Path;

/// File name offered for the rectified scan.
pub const DEFAULT_SCAN_FILE_NAME: &str = "scan.png";

fn io_error(err: impl std::fmt::Display) -> ScanError {
    ScanError::ImageIo {
        reason: err.to_string(),
    }
}

fn dim(value: usize) -> ScanResult<u32> {
    u32::try_from(value).map_err(|_| ScanError::InvalidDimensions {
        width: value,
        height: value,
    })
}

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> ScanResult<ImageView<'_, u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    ImageView::from_slice(img.as_raw(), width, height)
}

/// Creates an owned image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> ScanResult<OwnedImage<u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    OwnedImage::new(img.as_raw().clone(), width, height)
}

/// Creates an owned color image from an RGB image buffer.
pub fn owned_from_rgb_image(img: &image::RgbImage) -> ScanResult<OwnedImage<Rgb>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img
        .as_raw()
        .chunks_exact(3)
        .map(|px| [px[0], px[1], px[2]])
        .collect();
    OwnedImage::new(data, width, height)
}

/// Converts a dynamic image into a [`Raster`], keeping color when present.
pub fn raster_from_dynamic_image(img: &image::DynamicImage) -> ScanResult<Raster> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    match img {
        image::DynamicImage::ImageLuma8(gray) => owned_from_gray_image(gray).map(Raster::Gray),
        image::DynamicImage::ImageRgb8(rgb) => owned_from_rgb_image(rgb).map(Raster::Rgb),
        other => {
            let rgba = other.to_rgba8();
            let data = rgba
                .as_raw()
                .chunks_exact(4)
                .map(|px| [px[0], px[1], px[2], px[3]])
                .collect();
            OwnedImage::new(data, width, height).map(Raster::Rgba)
        }
    }
}

/// Decodes an encoded image (PNG or JPEG) held in memory.
pub fn decode_raster(bytes: &[u8]) -> ScanResult<Raster> {
    let img = image::load_from_memory(bytes).map_err(io_error)?;
    raster_from_dynamic_image(&img)
}

/// Loads an image from disk as a [`Raster`].
pub fn load_raster<P: AsRef<Path>>(path: P) -> ScanResult<Raster> {
    let img = image::open(path).map_err(io_error)?;
    raster_from_dynamic_image(&img)
}

/// Loads an image from disk and converts it to an owned RGB image.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> ScanResult<OwnedImage<Rgb>> {
    let img = image::open(path).map_err(io_error)?;
    owned_from_rgb_image(&img.to_rgb8())
}

/// Loads an image from disk and converts it to a grayscale owned image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> ScanResult<OwnedImage<u8>> {
    load_raster(path)?.into_gray()
}

fn packed_rgb(view: ImageView<'_, Rgb>) -> ScanResult<Vec<u8>> {
    let mut bytes = Vec::with_capacity(view.width() * view.height() * 3);
    for y in 0..view.height() {
        let row = view.row(y).ok_or(ScanError::BufferTooSmall {
            needed: (y + 1) * view.stride(),
            got: view.as_slice().len(),
        })?;
        bytes.extend(row.iter().flatten().copied());
    }
    Ok(bytes)
}

/// Encodes an RGB view as PNG bytes.
pub fn encode_png(view: ImageView<'_, Rgb>) -> ScanResult<Vec<u8>> {
    let width = dim(view.width())?;
    let height = dim(view.height())?;
    let bytes = packed_rgb(view)?;
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(&bytes, width, height, image::ExtendedColorType::Rgb8)
        .map_err(io_error)?;
    Ok(out)
}

/// Writes an RGB view to `path` as PNG.
pub fn save_png<P: AsRef<Path>>(view: ImageView<'_, Rgb>, path: P) -> ScanResult<()> {
    let png = encode_png(view)?;
    std::fs::write(path, png).map_err(io_error)
}
