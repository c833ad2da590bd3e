//! Corner labels, points, and the four-corner set produced by detection.

use std::fmt;
use std::ops::Index;

/// One of the four document corner markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CornerLabel {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl CornerLabel {
    /// Canonical order used for loading, matching, and rectification.
    pub const ALL: [CornerLabel; 4] = [
        CornerLabel::TopLeft,
        CornerLabel::TopRight,
        CornerLabel::BottomRight,
        CornerLabel::BottomLeft,
    ];

    /// Position of the label in [`CornerLabel::ALL`].
    pub fn index(self) -> usize {
        match self {
            CornerLabel::TopLeft => 0,
            CornerLabel::TopRight => 1,
            CornerLabel::BottomRight => 2,
            CornerLabel::BottomLeft => 3,
        }
    }

    /// Two-letter name, e.g. `"TL"`.
    pub fn short_name(self) -> &'static str {
        match self {
            CornerLabel::TopLeft => "TL",
            CornerLabel::TopRight => "TR",
            CornerLabel::BottomRight => "BR",
            CornerLabel::BottomLeft => "BL",
        }
    }

    /// Asset file stem of the marker template, e.g. `"tmpl_tl"`.
    pub fn asset_stem(self) -> &'static str {
        match self {
            CornerLabel::TopLeft => "tmpl_tl",
            CornerLabel::TopRight => "tmpl_tr",
            CornerLabel::BottomRight => "tmpl_br",
            CornerLabel::BottomLeft => "tmpl_bl",
        }
    }

    /// Whether the corner lies on the right half of the page.
    pub fn is_right(self) -> bool {
        matches!(self, CornerLabel::TopRight | CornerLabel::BottomRight)
    }

    /// Whether the corner lies on the bottom half of the page.
    pub fn is_bottom(self) -> bool {
        matches!(self, CornerLabel::BottomRight | CornerLabel::BottomLeft)
    }
}

impl fmt::Display for CornerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// 2D point in pixel coordinates (x right, y down).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    /// Creates a point from frame coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub(crate) fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub(crate) fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Best template placement for one corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult {
    /// Corner the template belongs to.
    pub label: CornerLabel,
    /// ZNCC score in `[-1, 1]`.
    pub score: f32,
    /// Left edge of the best placement.
    pub x: usize,
    /// Top edge of the best placement.
    pub y: usize,
}

/// Four corner points, always fully populated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerSet {
    points: [Point2; 4],
}

impl CornerSet {
    /// Builds a set from points given in TL, TR, BR, BL order.
    pub fn new(tl: Point2, tr: Point2, br: Point2, bl: Point2) -> Self {
        Self {
            points: [tl, tr, br, bl],
        }
    }

    /// Builds a set from an array in [`CornerLabel::ALL`] order.
    pub fn from_array(points: [Point2; 4]) -> Self {
        Self { points }
    }

    /// Returns the point for `label`.
    pub fn get(&self, label: CornerLabel) -> Point2 {
        self.points[label.index()]
    }

    /// Returns points in TL, TR, BR, BL order.
    pub fn as_array(&self) -> &[Point2; 4] {
        &self.points
    }

    /// Iterates over `(label, point)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (CornerLabel, Point2)> + '_ {
        CornerLabel::ALL
            .iter()
            .map(move |&label| (label, self.get(label)))
    }

    /// Coarse layout check on the detected corners.
    ///
    /// Holds when `TL.x < TR.x`, `TL.y < BL.y`, `TR.x > BR.x` and
    /// `BR.y > TR.y`. This is a heuristic: an exactly axis-aligned rectangle
    /// has `TR.x == BR.x` and fails it.
    pub fn is_plausibly_ordered(&self) -> bool {
        let [tl, tr, br, bl] = self.points;
        tl.x < tr.x && tl.y < bl.y && tr.x > br.x && br.y > tr.y
    }
}

impl Index<CornerLabel> for CornerSet {
    type Output = Point2;

    fn index(&self, label: CornerLabel) -> &Self::Output {
        &self.points[label.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::{CornerLabel, CornerSet, Point2};

    #[test]
    fn labels_follow_canonical_order() {
        for (idx, label) in CornerLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), idx);
        }
        assert_eq!(CornerLabel::BottomLeft.to_string(), "BL");
        assert_eq!(CornerLabel::TopRight.asset_stem(), "tmpl_tr");
        assert!(CornerLabel::BottomRight.is_right());
        assert!(CornerLabel::BottomRight.is_bottom());
        assert!(!CornerLabel::TopLeft.is_bottom());
    }

    #[test]
    fn ordering_check_accepts_slightly_skewed_page() {
        let corners = CornerSet::new(
            Point2::new(100.0, 100.0),
            Point2::new(900.0, 90.0),
            Point2::new(880.0, 1200.0),
            Point2::new(110.0, 1210.0),
        );
        assert!(corners.is_plausibly_ordered());
        assert_eq!(corners[CornerLabel::TopRight], Point2::new(900.0, 90.0));
    }

    #[test]
    fn ordering_check_flags_swapped_and_axis_aligned_corners() {
        let swapped = CornerSet::new(
            Point2::new(900.0, 100.0),
            Point2::new(100.0, 100.0),
            Point2::new(900.0, 1200.0),
            Point2::new(100.0, 1200.0),
        );
        assert!(!swapped.is_plausibly_ordered());

        let aligned = CornerSet::new(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        );
        assert!(!aligned.is_plausibly_ordered());
    }
}
