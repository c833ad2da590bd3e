//! Template plan precomputation for ZNCC.

use crate::image::ImageView;
use crate::util::{ScanError, ScanResult};

/// Precomputed statistics and zero-mean buffer for template matching.
///
/// With `t' = t - mean(t)` the ZNCC score at a placement reduces to
/// `sum(t' * i) / sqrt(var_t * var_i)`, where `var_t = sum(t'^2)` and
/// `var_i = sum(i^2) - sum(i)^2 / n` over the window.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    var_t: f32,
    t_prime: Vec<f32>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> ScanResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(ScanError::InvalidDimensions { width, height })?;

        let mut pixels = Vec::with_capacity(count);
        for y in 0..height {
            let row = tpl.row(y).ok_or(ScanError::BufferTooSmall {
                needed: (y + 1) * tpl.stride(),
                got: tpl.as_slice().len(),
            })?;
            pixels.extend_from_slice(row);
        }

        let sum: f64 = pixels.iter().map(|&v| f64::from(v)).sum();
        let mean = sum / count as f64;
        let var_t: f64 = pixels
            .iter()
            .map(|&v| {
                let d = f64::from(v) - mean;
                d * d
            })
            .sum();
        if var_t / count as f64 <= 1e-8 {
            return Err(ScanError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        let t_prime = pixels
            .iter()
            .map(|&v| (f64::from(v) - mean) as f32)
            .collect();

        Ok(Self {
            width,
            height,
            var_t: var_t as f32,
            t_prime,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the sum of squared deviations from the mean.
    pub fn var_t(&self) -> f32 {
        self.var_t
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn t_prime(&self) -> &[f32] {
        &self.t_prime
    }
}
