//! Image views, owned rasters, and pixel conversions.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! Views and owned images are generic over the pixel type: `u8` for grayscale
//! frames and templates, [`Rgb`] and [`Rgba`] for color frames.

use crate::util::{ScanError, ScanResult};

#[cfg(feature = "image-io")]
pub mod io;
mod pixel;

pub use pixel::{Pixel, Raster, Rgb, Rgba};

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> ScanResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> ScanResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(ScanError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> ScanResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(ScanError::InvalidDimensions { width, height });
        }

        let out_of_bounds = ScanError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(ScanError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self.data.get(start..).ok_or(ScanError::BufferTooSmall {
            needed: start.saturating_add(1),
            got: self.data.len(),
        })?;

        ImageView::new(data, width, height, self.stride)
    }
}

impl<T: Copy> ImageView<'_, T> {
    /// Copies the view into a contiguous owned image.
    pub fn to_owned_image(&self) -> ScanResult<OwnedImage<T>> {
        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            let row = self.row(y).ok_or(ScanError::BufferTooSmall {
                needed: (y + 1) * self.stride,
                got: self.data.len(),
            })?;
            data.extend_from_slice(row);
        }
        OwnedImage::new(data, self.width, self.height)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> ScanResult<usize> {
    if width == 0 || height == 0 {
        return Err(ScanError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(ScanError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(ScanError::InvalidDimensions { width, height })?;
    Ok(needed)
}

/// Owned contiguous image buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage<T = u8> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> OwnedImage<T> {
    /// Wraps a contiguous row-major buffer of exactly `width * height` pixels.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> ScanResult<Self> {
        if width == 0 || height == 0 {
            return Err(ScanError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(ScanError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(ScanError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(ScanError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the contiguous pixel buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the image and returns its pixel buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

impl<T: Copy> OwnedImage<T> {
    /// Creates an image filled with a single value.
    pub fn filled(width: usize, height: usize, value: T) -> ScanResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(ScanError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }
}

/// Converts any supported pixel view into a single-channel grayscale image.
pub fn to_gray<P: Pixel>(view: ImageView<'_, P>) -> ScanResult<OwnedImage<u8>> {
    let width = view.width();
    let height = view.height();
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = view.row(y).ok_or(ScanError::BufferTooSmall {
            needed: (y + 1) * view.stride(),
            got: view.as_slice().len(),
        })?;
        data.extend(row.iter().map(|px| px.luma()));
    }
    OwnedImage::new(data, width, height)
}
