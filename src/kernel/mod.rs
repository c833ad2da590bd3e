//! Correlation kernel implementations.

use crate::candidate::Peak;
use crate::util::{ScanError, ScanResult};
use crate::ImageView;

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Minimum variance threshold for the image window; flatter windows are
    /// not scored.
    pub min_var_i: f32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self { min_var_i: 1e-8 }
    }
}

/// Inclusive range of top-left placements to evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementRange {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PlacementRange {
    /// Every placement where a `tpl_width x tpl_height` template fits.
    pub fn full(
        img_width: usize,
        img_height: usize,
        tpl_width: usize,
        tpl_height: usize,
    ) -> ScanResult<Self> {
        if img_width < tpl_width || img_height < tpl_height {
            return Err(ScanError::RoiOutOfBounds {
                x: 0,
                y: 0,
                width: tpl_width,
                height: tpl_height,
                img_width,
                img_height,
            });
        }
        Ok(Self {
            x0: 0,
            y0: 0,
            x1: img_width - tpl_width,
            y1: img_height - tpl_height,
        })
    }

    /// Intersects with another range; `None` when empty.
    pub fn clamp_to(self, bounds: PlacementRange) -> Option<Self> {
        let out = Self {
            x0: self.x0.max(bounds.x0),
            y0: self.y0.max(bounds.y0),
            x1: self.x1.min(bounds.x1),
            y1: self.y1.min(bounds.y1),
        };
        (out.x0 <= out.x1 && out.y0 <= out.y1).then_some(out)
    }
}

/// Kernel trait for scoring and scan operations.
pub trait Kernel {
    type Plan;

    /// Computes the score at a single placement (top-left coordinates).
    ///
    /// Returns `f32::NEG_INFINITY` for placements outside the image or
    /// windows below the variance threshold.
    fn score_at(
        image: ImageView<'_, u8>,
        plan: &Self::Plan,
        x: usize,
        y: usize,
        min_var_i: f32,
    ) -> f32;

    /// Scans the full valid placement range and returns the best peak.
    fn scan_full(
        image: ImageView<'_, u8>,
        plan: &Self::Plan,
        params: ScanParams,
    ) -> ScanResult<Option<Peak>>;

    /// Scans a range of placements and returns the best peak.
    ///
    /// The range is clamped to the valid placements; an empty intersection
    /// yields `Ok(None)`.
    fn scan_roi(
        image: ImageView<'_, u8>,
        plan: &Self::Plan,
        range: PlacementRange,
        params: ScanParams,
    ) -> ScanResult<Option<Peak>>;
}

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;
