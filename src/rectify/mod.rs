//! Rectifier: flattens the quadrilateral spanned by the detected corners.
//!
//! Source points are taken in TL, TR, BR, BL order and mapped onto
//! `(0,0), (W,0), (W,H), (0,H)`. The output is produced by inverse mapping
//! every destination pixel and sampling the frame bilinearly.

mod homography;
mod warp;

pub use homography::{Homography, MIN_CORNER_SINE};
pub use warp::{destination_corners, sample_bilinear, warp_perspective};

use crate::corner::CornerSet;
use crate::image::{ImageView, OwnedImage, Pixel};
use crate::locate::OrderingPolicy;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::math::cross;
use crate::util::{ScanError, ScanResult};

/// Default output width, about A4 proportions with [`DEFAULT_HEIGHT`].
pub const DEFAULT_WIDTH: usize = 900;
/// Default output height.
pub const DEFAULT_HEIGHT: usize = 1270;

/// Configuration for rectification.
#[derive(Clone, Debug)]
pub struct RectifyConfig {
    /// Output width in pixels.
    pub width: usize,
    /// Output height in pixels.
    pub height: usize,
    /// Border color (RGBA) for samples outside the frame.
    pub fill: [u8; 4],
    /// Warp rows in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for RectifyConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fill: [0, 0, 0, 255],
            parallel: false,
        }
    }
}

/// Perspective rectifier with a fixed output size.
#[derive(Clone, Debug, Default)]
pub struct Rectifier {
    cfg: RectifyConfig,
    ordering: OrderingPolicy,
}

impl Rectifier {
    /// Creates a rectifier that accepts convex quads of either winding.
    pub fn new(cfg: RectifyConfig) -> Self {
        Self {
            cfg,
            ordering: OrderingPolicy::Warn,
        }
    }

    /// Sets how counter-clockwise (mirrored) corners are handled.
    ///
    /// With [`OrderingPolicy::Warn`] the mirrored quad is warped as given;
    /// with [`OrderingPolicy::Reject`] it fails with `DegenerateQuad`.
    ///
    /// ```
    /// use markscan::{CornerSet, OrderingPolicy, Point2, Rectifier, RectifyConfig};
    ///
    /// let mirrored = CornerSet::new(
    ///     Point2::new(90.0, 10.0),
    ///     Point2::new(10.0, 10.0),
    ///     Point2::new(10.0, 120.0),
    ///     Point2::new(90.0, 120.0),
    /// );
    /// let lenient = Rectifier::new(RectifyConfig::default());
    /// assert!(lenient.homography(&mirrored).is_ok());
    ///
    /// let strict = lenient.with_ordering(OrderingPolicy::Reject);
    /// assert!(strict.homography(&mirrored).is_err());
    /// ```
    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Returns the winding policy.
    pub fn ordering(&self) -> OrderingPolicy {
        self.ordering
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &RectifyConfig {
        &self.cfg
    }

    /// Transform from frame coordinates to output coordinates.
    ///
    /// Fails with `DegenerateQuad` unless the corners form a convex
    /// quadrilateral with no three corners collinear. A counter-clockwise
    /// quad is also rejected when the ordering policy is `Reject`.
    pub fn homography(&self, corners: &CornerSet) -> ScanResult<Homography> {
        if self.cfg.width == 0 || self.cfg.height == 0 {
            return Err(ScanError::InvalidDimensions {
                width: self.cfg.width,
                height: self.cfg.height,
            });
        }
        let src = corners.as_array();
        homography::check_general_position(src)?;
        if winding(corners)? == Winding::CounterClockwise {
            trace_warn!("mirrored_corners", width = self.cfg.width, height = self.cfg.height);
            if self.ordering == OrderingPolicy::Reject {
                return Err(ScanError::DegenerateQuad {
                    reason: "corners wind counter-clockwise; expected TL, TR, BR, BL",
                });
            }
        }
        Homography::from_correspondences(src, &destination_corners(self.cfg.width, self.cfg.height))
    }

    /// Warps the region spanned by `corners` into a new image.
    pub fn rectify<P: Pixel>(
        &self,
        frame: ImageView<'_, P>,
        corners: &CornerSet,
    ) -> ScanResult<OwnedImage<P>> {
        let _span = trace_span!("rectify", width = self.cfg.width, height = self.cfg.height).entered();
        let h = self.homography(corners)?;
        let fill = P::from_channels(self.cfg.fill.map(f32::from));
        let out = warp_perspective(
            frame,
            &h,
            self.cfg.width,
            self.cfg.height,
            fill,
            self.cfg.parallel,
        )?;
        trace_event!("rectified", width = out.width(), height = out.height());
        Ok(out)
    }
}

/// Rectifies `frame` into a `dest_width x dest_height` image with a black
/// border.
pub fn rectify<P: Pixel>(
    frame: ImageView<'_, P>,
    corners: &CornerSet,
    dest_width: usize,
    dest_height: usize,
) -> ScanResult<OwnedImage<P>> {
    Rectifier::new(RectifyConfig {
        width: dest_width,
        height: dest_height,
        ..RectifyConfig::default()
    })
    .rectify(frame, corners)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Winding {
    /// TL, TR, BR, BL clockwise on screen (y down).
    Clockwise,
    CounterClockwise,
}

/// Winding of a convex quad; mixed turn directions are an error.
fn winding(corners: &CornerSet) -> ScanResult<Winding> {
    let pts = corners.as_array().map(|p| p.to_array());
    let turns: [f64; 4] =
        std::array::from_fn(|i| cross(pts[i], pts[(i + 1) % 4], pts[(i + 2) % 4]));
    if turns.iter().all(|&t| t > 0.0) {
        Ok(Winding::Clockwise)
    } else if turns.iter().all(|&t| t < 0.0) {
        Ok(Winding::CounterClockwise)
    } else {
        Err(ScanError::DegenerateQuad {
            reason: "corners do not form a convex quadrilateral",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{rectify, Rectifier, RectifyConfig};
    use crate::corner::{CornerSet, Point2};
    use crate::image::OwnedImage;
    use crate::locate::OrderingPolicy;
    use crate::util::{ScanError, Stage};

    fn square(x0: f64, y0: f64, side: f64) -> CornerSet {
        CornerSet::new(
            Point2::new(x0, y0),
            Point2::new(x0 + side, y0),
            Point2::new(x0 + side, y0 + side),
            Point2::new(x0, y0 + side),
        )
    }

    #[test]
    fn default_output_is_a4_sized() {
        let cfg = RectifyConfig::default();
        assert_eq!((cfg.width, cfg.height), (900, 1270));
    }

    #[test]
    fn mirrored_corners_warp_unless_rejected() {
        let c = square(0.0, 0.0, 10.0);
        let [tl, tr, br, bl] = *c.as_array();
        let mirrored = CornerSet::new(tr, tl, bl, br);
        let cfg = RectifyConfig {
            width: 10,
            height: 10,
            ..RectifyConfig::default()
        };

        let h = Rectifier::new(cfg.clone()).homography(&mirrored).unwrap();
        let p = h.project(Point2::new(10.0, 0.0));
        assert!(p.x.abs() < 1e-9 && p.y.abs() < 1e-9);

        let err = Rectifier::new(cfg)
            .with_ordering(OrderingPolicy::Reject)
            .homography(&mirrored)
            .err()
            .unwrap();
        assert_eq!(
            err,
            ScanError::DegenerateQuad {
                reason: "corners wind counter-clockwise; expected TL, TR, BR, BL",
            }
        );
        assert_eq!(err.stage(), Stage::Transform);
    }

    #[test]
    fn mirrored_frame_is_flipped_back() {
        // Left half dark, right half bright; mirrored corners swap them.
        let data = (0..20 * 20)
            .map(|i| if i % 20 < 10 { 20u8 } else { 220 })
            .collect();
        let frame = OwnedImage::new(data, 20, 20).unwrap();
        let c = square(0.0, 0.0, 20.0);
        let [tl, tr, br, bl] = *c.as_array();
        let mirrored = CornerSet::new(tr, tl, bl, br);

        let out = rectify(frame.view(), &mirrored, 20, 20).unwrap();
        assert_eq!(out.view().get(2, 5), Some(&220));
        assert_eq!(out.view().get(17, 5), Some(&20));
    }

    #[test]
    fn self_intersecting_corners_are_rejected() {
        let c = square(0.0, 0.0, 10.0);
        let [tl, tr, br, bl] = *c.as_array();
        let bowtie = CornerSet::new(tl, tr, bl, br);
        let err = Rectifier::default().homography(&bowtie).err().unwrap();
        assert_eq!(
            err,
            ScanError::DegenerateQuad {
                reason: "corners do not form a convex quadrilateral",
            }
        );
    }

    #[test]
    fn zero_sized_output_is_invalid() {
        let frame = OwnedImage::filled(4, 4, 7u8).unwrap();
        let err = rectify(frame.view(), &square(0.0, 0.0, 3.0), 0, 5)
            .err()
            .unwrap();
        assert_eq!(err, ScanError::InvalidDimensions { width: 0, height: 5 });
    }

    #[test]
    fn uniform_frame_stays_uniform_inside_the_quad() {
        let frame = OwnedImage::filled(20, 20, 180u8).unwrap();
        let out = rectify(frame.view(), &square(2.0, 3.0, 12.0), 6, 6).unwrap();
        assert!(out.data().iter().all(|&v| v == 180));
    }
}
