//! Exact four-point homography.

use crate::corner::Point2;
use crate::util::math::corner_sine;
use crate::util::{ScanError, ScanResult};
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

/// Corners whose interior angle has `|sin|` below this are treated as
/// collinear.
pub const MIN_CORNER_SINE: f64 = 1e-3;

/// Planar projective transform with its inverse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    h: Matrix3<f64>,
    h_inv: Matrix3<f64>,
}

/// Translate the centroid to the origin and scale the mean distance to
/// `sqrt(2)`.
fn normalize_points(pts: &[Point2; 4]) -> (Matrix3<f64>, [Point2; 4]) {
    let cx = pts.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let mean_dist = pts
        .iter()
        .map(|p| (p.x - cx).hypot(p.y - cy))
        .sum::<f64>()
        / 4.0;
    let s = if mean_dist > 1e-15 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = pts.map(|p| Point2::new(s * (p.x - cx), s * (p.y - cy)));
    (t, normalized)
}

/// Fails when any three of the four points are (nearly) collinear.
pub(crate) fn check_general_position(pts: &[Point2; 4]) -> ScanResult<()> {
    if pts.iter().any(|p| !p.is_finite()) {
        return Err(ScanError::DegenerateQuad {
            reason: "corner coordinates are not finite",
        });
    }
    for i in 0..4 {
        let sine = corner_sine(
            pts[i].to_array(),
            pts[(i + 1) % 4].to_array(),
            pts[(i + 3) % 4].to_array(),
        );
        if sine.abs() < MIN_CORNER_SINE {
            return Err(ScanError::DegenerateQuad {
                reason: "three corners are collinear or coincide",
            });
        }
    }
    Ok(())
}

impl Homography {
    /// Solves the unique homography mapping `src[i]` onto `dst[i]`.
    ///
    /// Both point sets must be in general position (no three collinear).
    pub fn from_correspondences(src: &[Point2; 4], dst: &[Point2; 4]) -> ScanResult<Self> {
        check_general_position(src)?;
        check_general_position(dst)?;

        let (t_src, src_n) = normalize_points(src);
        let (t_dst, dst_n) = normalize_points(dst);

        // h33 fixed to 1; two rows per correspondence.
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for i in 0..4 {
            let (x, y) = (src_n[i].x, src_n[i].y);
            let (u, v) = (dst_n[i].x, dst_n[i].y);
            let r = 2 * i;
            a[(r, 0)] = x;
            a[(r, 1)] = y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -u * x;
            a[(r, 7)] = -u * y;
            b[r] = u;
            a[(r + 1, 3)] = x;
            a[(r + 1, 4)] = y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -v * x;
            a[(r + 1, 7)] = -v * y;
            b[r + 1] = v;
        }

        let sol = a.lu().solve(&b).ok_or(ScanError::DegenerateQuad {
            reason: "perspective system is singular",
        })?;
        let h_n = Matrix3::new(
            sol[0], sol[1], sol[2], sol[3], sol[4], sol[5], sol[6], sol[7], 1.0,
        );

        let t_dst_inv = t_dst.try_inverse().ok_or(ScanError::DegenerateQuad {
            reason: "destination normalization is singular",
        })?;
        let mut h = t_dst_inv * h_n * t_src;
        let scale = h[(2, 2)];
        if scale.abs() > 1e-15 {
            h /= scale;
        }
        Self::from_matrix(h)
    }

    /// Wraps a matrix, failing if it is not invertible.
    pub fn from_matrix(h: Matrix3<f64>) -> ScanResult<Self> {
        if h.iter().any(|v| !v.is_finite()) {
            return Err(ScanError::DegenerateQuad {
                reason: "transform has non-finite entries",
            });
        }
        let h_inv = h.try_inverse().ok_or(ScanError::DegenerateQuad {
            reason: "transform is not invertible",
        })?;
        Ok(Self { h, h_inv })
    }

    /// Returns the forward matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.h
    }

    /// Returns the inverse transform.
    pub fn inverse(&self) -> Homography {
        Homography {
            h: self.h_inv,
            h_inv: self.h,
        }
    }

    /// Maps a point through the forward transform.
    ///
    /// Points mapped to infinity come back as NaN.
    pub fn project(&self, p: Point2) -> Point2 {
        project(&self.h, p)
    }

    /// Maps a point through the inverse transform.
    pub fn inverse_project(&self, p: Point2) -> Point2 {
        project(&self.h_inv, p)
    }

    pub(crate) fn inverse_matrix(&self) -> &Matrix3<f64> {
        &self.h_inv
    }
}

fn project(h: &Matrix3<f64>, p: Point2) -> Point2 {
    let q = h * Vector3::new(p.x, p.y, 1.0);
    if q[2].abs() < 1e-15 {
        return Point2::new(f64::NAN, f64::NAN);
    }
    Point2::new(q[0] / q[2], q[1] / q[2])
}
