//! Rayon-parallel ZNCC scan (feature-gated).
//!
//! Rows of placements are scored in parallel and reduced with the same
//! tie-breaking as the scalar kernel, so results are identical.

use crate::candidate::{BestPeak, Peak};
use crate::kernel::scalar::zncc_window;
use crate::kernel::{PlacementRange, ScanParams};
use crate::template::TemplatePlan;
use crate::util::ScanResult;
use crate::ImageView;
use rayon::prelude::*;

/// Row-parallel ZNCC scan over a placement range.
pub fn zncc_scan_range_par(
    image: ImageView<'_, u8>,
    tpl: &TemplatePlan,
    range: PlacementRange,
    params: ScanParams,
) -> ScanResult<Option<Peak>> {
    let valid = PlacementRange::full(image.width(), image.height(), tpl.width(), tpl.height())?;
    let Some(range) = range.clamp_to(valid) else {
        return Ok(None);
    };

    let best = (range.y0..=range.y1)
        .into_par_iter()
        .map(|y| {
            let mut row_best = BestPeak::new();
            for x in range.x0..=range.x1 {
                if let Some(score) = zncc_window(image, tpl, x, y, params.min_var_i) {
                    row_best.push(Peak { x, y, score });
                }
            }
            row_best
        })
        .reduce(BestPeak::new, BestPeak::merge);

    Ok(best.into_peak())
}

/// Row-parallel ZNCC scan over every valid placement.
pub fn zncc_scan_full_par(
    image: ImageView<'_, u8>,
    tpl: &TemplatePlan,
    params: ScanParams,
) -> ScanResult<Option<Peak>> {
    let range = PlacementRange::full(image.width(), image.height(), tpl.width(), tpl.height())?;
    zncc_scan_range_par(image, tpl, range, params)
}
