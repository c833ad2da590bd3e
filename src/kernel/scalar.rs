//! Scalar reference kernel for ZNCC evaluation.

use crate::candidate::{BestPeak, Peak};
use crate::kernel::{Kernel, PlacementRange, ScanParams};
use crate::template::TemplatePlan;
use crate::util::ScanResult;
use crate::ImageView;

/// Scalar ZNCC kernel over axis-aligned templates.
pub struct ZnccScalar;

/// Scores one placement that is known to be in bounds.
///
/// Window sums are accumulated as integers so a flat window has exactly zero
/// variance and is skipped. The result is clamped to `[-1, 1]`.
#[inline]
pub(crate) fn zncc_window(
    image: ImageView<'_, u8>,
    tpl: &TemplatePlan,
    x: usize,
    y: usize,
    min_var_i: f32,
) -> Option<f32> {
    let tpl_width = tpl.width();
    let tpl_height = tpl.height();
    let t_prime = tpl.t_prime();
    let n = (tpl_width * tpl_height) as u64;

    let mut dot = 0.0f64;
    let mut sum_i = 0u64;
    let mut sum_i2 = 0u64;
    for ty in 0..tpl_height {
        let img_row = image.row(y + ty).expect("row within bounds for scan");
        let window = &img_row[x..x + tpl_width];
        let base = ty * tpl_width;
        for (&t, &value) in t_prime[base..base + tpl_width].iter().zip(window) {
            dot += f64::from(t) * f64::from(value);
            sum_i += u64::from(value);
            sum_i2 += u64::from(value) * u64::from(value);
        }
    }

    let var_i = (n * sum_i2 - sum_i * sum_i) as f64 / n as f64;
    if var_i <= f64::from(min_var_i) {
        return None;
    }

    let score = dot / (f64::from(tpl.var_t()) * var_i).sqrt();
    score.is_finite().then(|| score.clamp(-1.0, 1.0) as f32)
}

impl ZnccScalar {
    pub(crate) fn scan_range(
        image: ImageView<'_, u8>,
        tpl: &TemplatePlan,
        range: PlacementRange,
        params: ScanParams,
    ) -> ScanResult<Option<Peak>> {
        let valid =
            PlacementRange::full(image.width(), image.height(), tpl.width(), tpl.height())?;
        let Some(range) = range.clamp_to(valid) else {
            return Ok(None);
        };

        let mut best = BestPeak::new();
        for y in range.y0..=range.y1 {
            for x in range.x0..=range.x1 {
                if let Some(score) = zncc_window(image, tpl, x, y, params.min_var_i) {
                    best.push(Peak { x, y, score });
                }
            }
        }
        Ok(best.into_peak())
    }
}

impl Kernel for ZnccScalar {
    type Plan = TemplatePlan;

    fn score_at(
        image: ImageView<'_, u8>,
        tpl: &Self::Plan,
        x: usize,
        y: usize,
        min_var_i: f32,
    ) -> f32 {
        if image.width() < tpl.width() || image.height() < tpl.height() {
            return f32::NEG_INFINITY;
        }
        if x > image.width() - tpl.width() || y > image.height() - tpl.height() {
            return f32::NEG_INFINITY;
        }
        zncc_window(image, tpl, x, y, min_var_i).unwrap_or(f32::NEG_INFINITY)
    }

    fn scan_full(
        image: ImageView<'_, u8>,
        tpl: &Self::Plan,
        params: ScanParams,
    ) -> ScanResult<Option<Peak>> {
        let range =
            PlacementRange::full(image.width(), image.height(), tpl.width(), tpl.height())?;
        Self::scan_range(image, tpl, range, params)
    }

    fn scan_roi(
        image: ImageView<'_, u8>,
        tpl: &Self::Plan,
        range: PlacementRange,
        params: ScanParams,
    ) -> ScanResult<Option<Peak>> {
        Self::scan_range(image, tpl, range, params)
    }
}

#[cfg(test)]
mod tests {
    use super::{Kernel, ZnccScalar};
    use crate::kernel::{PlacementRange, ScanParams};
    use crate::template::TemplatePlan;
    use crate::ImageView;

    fn brute_force_best(
        image: ImageView<'_, u8>,
        tpl: ImageView<'_, u8>,
    ) -> (usize, usize, f64) {
        let tw = tpl.width();
        let th = tpl.height();
        let n = (tw * th) as f64;
        let t: Vec<f64> = (0..th)
            .flat_map(|y| tpl.row(y).unwrap().iter().map(|&v| v as f64))
            .collect();
        let t_mean = t.iter().sum::<f64>() / n;

        let mut best = (0, 0, f64::NEG_INFINITY);
        for y in 0..=(image.height() - th) {
            for x in 0..=(image.width() - tw) {
                let w: Vec<f64> = (0..th)
                    .flat_map(|ty| image.row(y + ty).unwrap()[x..x + tw].iter().map(|&v| v as f64))
                    .collect();
                let w_mean = w.iter().sum::<f64>() / n;
                let mut num = 0.0;
                let mut dt = 0.0;
                let mut dw = 0.0;
                for (a, b) in t.iter().zip(w.iter()) {
                    num += (a - t_mean) * (b - w_mean);
                    dt += (a - t_mean).powi(2);
                    dw += (b - w_mean).powi(2);
                }
                if dw <= 1e-8 {
                    continue;
                }
                let score = num / (dt * dw).sqrt();
                if score > best.2 {
                    best = (x, y, score);
                }
            }
        }
        best
    }

    fn textured(width: usize, height: usize, seed: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push((((x + seed) * 17 + y * 9 + x * y) & 0xFF) as u8);
            }
        }
        data
    }

    #[test]
    fn zncc_scan_matches_bruteforce() {
        let image = textured(9, 7, 0);
        let tpl: Vec<u8> = (3..5)
            .flat_map(|y| image[y * 9 + 4..y * 9 + 7].to_vec())
            .collect();
        let image_view = ImageView::from_slice(&image, 9, 7).unwrap();
        let tpl_view = ImageView::from_slice(&tpl, 3, 2).unwrap();
        let plan = TemplatePlan::from_view(tpl_view).unwrap();

        let best = ZnccScalar::scan_full(image_view, &plan, ScanParams::default())
            .unwrap()
            .unwrap();
        let (bx, by, bscore) = brute_force_best(image_view, tpl_view);

        assert_eq!((best.x, best.y), (bx, by));
        assert_eq!((bx, by), (4, 3));
        assert!((best.score as f64 - bscore).abs() < 1e-4);
        let at = ZnccScalar::score_at(image_view, &plan, bx, by, 1e-8);
        assert_eq!(at, best.score);
    }

    #[test]
    fn flat_windows_are_not_scored() {
        let image = vec![42u8; 8 * 8];
        let tpl = textured(3, 3, 1);
        let image_view = ImageView::from_slice(&image, 8, 8).unwrap();
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 3, 3).unwrap()).unwrap();

        let best = ZnccScalar::scan_full(image_view, &plan, ScanParams::default()).unwrap();
        assert!(best.is_none());
        assert_eq!(
            ZnccScalar::score_at(image_view, &plan, 0, 0, 1e-8),
            f32::NEG_INFINITY
        );
    }

    #[test]
    fn roi_scan_is_clamped_to_valid_placements() {
        let image = textured(10, 10, 0);
        let tpl = textured(4, 4, 2);
        let image_view = ImageView::from_slice(&image, 10, 10).unwrap();
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 4, 4).unwrap()).unwrap();

        let range = PlacementRange {
            x0: 5,
            y0: 5,
            x1: 100,
            y1: 100,
        };
        let best = ZnccScalar::scan_roi(image_view, &plan, range, ScanParams::default())
            .unwrap()
            .unwrap();
        assert!(best.x >= 5 && best.x <= 6);
        assert!(best.y >= 5 && best.y <= 6);

        let outside = PlacementRange {
            x0: 7,
            y0: 0,
            x1: 9,
            y1: 0,
        };
        let none = ZnccScalar::scan_roi(image_view, &plan, outside, ScanParams::default());
        assert!(none.unwrap().is_none());
    }

    #[test]
    fn exact_match_never_scores_above_one() {
        let image = textured(160, 120, 3);
        let tpl: Vec<u8> = (50..90)
            .flat_map(|y| image[y * 160 + 70..y * 160 + 110].to_vec())
            .collect();
        let image_view = ImageView::from_slice(&image, 160, 120).unwrap();
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 40, 40).unwrap()).unwrap();

        let score = ZnccScalar::score_at(image_view, &plan, 70, 50, 1e-8);
        assert!(score <= 1.0, "score {score}");
        assert!(score > 0.999, "score {score}");

        let inverted: Vec<u8> = tpl.iter().map(|&v| 255 - v).collect();
        let plan =
            TemplatePlan::from_view(ImageView::from_slice(&inverted, 40, 40).unwrap()).unwrap();
        let score = ZnccScalar::score_at(image_view, &plan, 70, 50, 1e-8);
        assert!(score >= -1.0, "score {score}");
        assert!(score < -0.999, "score {score}");
    }

    #[test]
    fn template_larger_than_image_is_rejected() {
        let image = textured(3, 3, 0);
        let tpl = textured(4, 2, 0);
        let image_view = ImageView::from_slice(&image, 3, 3).unwrap();
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 4, 2).unwrap()).unwrap();
        assert!(ZnccScalar::scan_full(image_view, &plan, ScanParams::default()).is_err());
    }
}
