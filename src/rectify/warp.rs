//! Inverse-mapped perspective warp with bilinear interpolation.

use crate::corner::Point2;
use crate::image::{ImageView, OwnedImage, Pixel};
use crate::rectify::homography::Homography;
use crate::util::{ScanError, ScanResult};

/// Samples `src` at a subpixel location.
///
/// Neighbours outside the image take the value `fill` (constant border), so
/// samples near the edge blend towards it.
pub fn sample_bilinear<P: Pixel>(src: ImageView<'_, P>, x: f64, y: f64, fill: P) -> P {
    if !x.is_finite() || !y.is_finite() {
        return fill;
    }
    let x0 = x.floor();
    let y0 = y.floor();
    let width = src.width() as f64;
    let height = src.height() as f64;
    if x0 < -1.0 || y0 < -1.0 || x0 >= width || y0 >= height {
        return fill;
    }

    let fx = (x - x0) as f32;
    let fy = (y - y0) as f32;
    let (xi, yi) = (x0 as isize, y0 as isize);
    let taps = [
        (xi, yi, (1.0 - fx) * (1.0 - fy)),
        (xi + 1, yi, fx * (1.0 - fy)),
        (xi, yi + 1, (1.0 - fx) * fy),
        (xi + 1, yi + 1, fx * fy),
    ];

    let mut acc = [0.0f32; 4];
    for (tx, ty, w) in taps {
        if w == 0.0 {
            continue;
        }
        let px = if tx >= 0 && ty >= 0 {
            src.get(tx as usize, ty as usize).copied().unwrap_or(fill)
        } else {
            fill
        };
        for (a, c) in acc.iter_mut().zip(px.to_channels()).take(P::CHANNELS) {
            *a += w * c;
        }
    }
    P::from_channels(acc)
}

fn warp_row<P: Pixel>(
    src: ImageView<'_, P>,
    h: &Homography,
    y: usize,
    row: &mut [P],
    fill: P,
) {
    let m = h.inverse_matrix();
    let yf = y as f64;
    for (x, out) in row.iter_mut().enumerate() {
        let xf = x as f64;
        let w = m[(2, 0)] * xf + m[(2, 1)] * yf + m[(2, 2)];
        *out = if w.abs() < 1e-15 {
            fill
        } else {
            let sx = (m[(0, 0)] * xf + m[(0, 1)] * yf + m[(0, 2)]) / w;
            let sy = (m[(1, 0)] * xf + m[(1, 1)] * yf + m[(1, 2)]) / w;
            sample_bilinear(src, sx, sy, fill)
        };
    }
}

/// Produces a `width x height` image whose pixel `(x, y)` is `src` sampled at
/// `h^-1 * (x, y)`.
///
/// `h` maps source coordinates to destination coordinates.
pub fn warp_perspective<P: Pixel>(
    src: ImageView<'_, P>,
    h: &Homography,
    width: usize,
    height: usize,
    fill: P,
    parallel: bool,
) -> ScanResult<OwnedImage<P>> {
    let len = width
        .checked_mul(height)
        .filter(|&len| len > 0)
        .ok_or(ScanError::InvalidDimensions { width, height })?;
    let mut data = vec![fill; len];

    #[cfg(feature = "rayon")]
    if parallel {
        use rayon::prelude::*;
        data.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| warp_row(src, h, y, row, fill));
        return OwnedImage::new(data, width, height);
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    for (y, row) in data.chunks_mut(width).enumerate() {
        warp_row(src, h, y, row, fill);
    }
    OwnedImage::new(data, width, height)
}

/// Corners of a `width x height` output in TL, TR, BR, BL order.
pub fn destination_corners(width: usize, height: usize) -> [Point2; 4] {
    let (w, h) = (width as f64, height as f64);
    [
        Point2::new(0.0, 0.0),
        Point2::new(w, 0.0),
        Point2::new(w, h),
        Point2::new(0.0, h),
    ]
}

#[cfg(test)]
mod tests {
    use super::sample_bilinear;
    use crate::image::{OwnedImage, Rgb, Rgba};

    #[test]
    fn bilinear_blends_neighbours() {
        let img = OwnedImage::new(vec![0u8, 100, 200, 50], 2, 2).unwrap();
        assert_eq!(sample_bilinear(img.view(), 0.0, 0.0, 0), 0);
        assert_eq!(sample_bilinear(img.view(), 1.0, 0.0, 0), 100);
        assert_eq!(sample_bilinear(img.view(), 0.5, 0.0, 0), 50);
        assert_eq!(sample_bilinear(img.view(), 0.5, 0.5, 0), 88);
    }

    #[test]
    fn outside_samples_use_fill_and_edges_blend() {
        let img = OwnedImage::new(vec![[200u8, 100, 50]; 4], 2, 2).unwrap();
        let fill: Rgb = [0, 0, 0];
        assert_eq!(sample_bilinear(img.view(), -5.0, 0.0, fill), fill);
        assert_eq!(sample_bilinear(img.view(), 0.0, 2.5, fill), fill);
        assert_eq!(sample_bilinear(img.view(), 1.5, 0.0, fill), [100, 50, 25]);
        assert_eq!(sample_bilinear(img.view(), f64::NAN, 0.0, fill), fill);
    }

    #[test]
    fn rgba_samples_blend_every_channel() {
        let img = OwnedImage::new(vec![[0u8, 40, 80, 255], [100, 140, 180, 55]], 2, 1).unwrap();
        let fill: Rgba = [0, 0, 0, 0];
        assert_eq!(
            sample_bilinear(img.view(), 0.5, 0.0, fill),
            [50, 90, 130, 155]
        );
        assert_eq!(sample_bilinear(img.view(), 0.0, 0.5, fill), [0, 20, 40, 128]);
    }
}
