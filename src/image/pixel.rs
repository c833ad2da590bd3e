//! Pixel layouts supported by views, the warp, and grayscale conversion.

use crate::image::{to_gray, OwnedImage};
use crate::util::math::{luma_bt601, round_to_u8};
use crate::util::ScanResult;

/// Packed 8-bit RGB pixel.
pub type Rgb = [u8; 3];

/// Packed 8-bit RGBA pixel. Alpha is ignored for luma.
pub type Rgba = [u8; 4];

/// Pixel type that can be converted to luma and interpolated per channel.
pub trait Pixel: Copy + Send + Sync + 'static {
    /// Number of meaningful channels.
    const CHANNELS: usize;

    /// Returns the BT.601 luma of the pixel.
    fn luma(self) -> u8;

    /// Returns channel values widened to `f32`; unused slots are zero.
    fn to_channels(self) -> [f32; 4];

    /// Builds a pixel from interpolated channel values, rounding and saturating.
    fn from_channels(channels: [f32; 4]) -> Self;
}

impl Pixel for u8 {
    const CHANNELS: usize = 1;

    fn luma(self) -> u8 {
        self
    }

    fn to_channels(self) -> [f32; 4] {
        [f32::from(self), 0.0, 0.0, 0.0]
    }

    fn from_channels(channels: [f32; 4]) -> Self {
        round_to_u8(channels[0])
    }
}

impl Pixel for Rgb {
    const CHANNELS: usize = 3;

    fn luma(self) -> u8 {
        luma_bt601(self[0], self[1], self[2])
    }

    fn to_channels(self) -> [f32; 4] {
        [
            f32::from(self[0]),
            f32::from(self[1]),
            f32::from(self[2]),
            0.0,
        ]
    }

    fn from_channels(channels: [f32; 4]) -> Self {
        [
            round_to_u8(channels[0]),
            round_to_u8(channels[1]),
            round_to_u8(channels[2]),
        ]
    }
}

impl Pixel for Rgba {
    const CHANNELS: usize = 4;

    fn luma(self) -> u8 {
        luma_bt601(self[0], self[1], self[2])
    }

    fn to_channels(self) -> [f32; 4] {
        self.map(f32::from)
    }

    fn from_channels(channels: [f32; 4]) -> Self {
        channels.map(round_to_u8)
    }
}

/// A decoded raster in whichever layout its source produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Raster {
    /// Single-channel 8-bit intensity.
    Gray(OwnedImage<u8>),
    /// Packed RGB.
    Rgb(OwnedImage<Rgb>),
    /// Packed RGBA; alpha does not affect luma.
    Rgba(OwnedImage<Rgba>),
}

impl Raster {
    /// Returns `(width, height)` of the raster.
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            Raster::Gray(img) => (img.width(), img.height()),
            Raster::Rgb(img) => (img.width(), img.height()),
            Raster::Rgba(img) => (img.width(), img.height()),
        }
    }

    /// Converts the raster to single-channel grayscale.
    pub fn into_gray(self) -> ScanResult<OwnedImage<u8>> {
        match self {
            Raster::Gray(img) => Ok(img),
            Raster::Rgb(img) => to_gray(img.view()),
            Raster::Rgba(img) => to_gray(img.view()),
        }
    }
}

impl From<OwnedImage<u8>> for Raster {
    fn from(value: OwnedImage<u8>) -> Self {
        Raster::Gray(value)
    }
}

impl From<OwnedImage<Rgb>> for Raster {
    fn from(value: OwnedImage<Rgb>) -> Self {
        Raster::Rgb(value)
    }
}

impl From<OwnedImage<Rgba>> for Raster {
    fn from(value: OwnedImage<Rgba>) -> Self {
        Raster::Rgba(value)
    }
}
