//! Corner locator: finds the four markers in a grayscale frame.
//!
//! Each template is matched against the frame with ZNCC and the global
//! maximum of the response is taken. Corners are processed in TL, TR, BR, BL
//! order and the first one scoring below the threshold aborts detection. The
//! returned point is the center of the matched template.

use crate::corner::{CornerLabel, CornerSet, MatchResult, Point2};
use crate::kernel::scalar::ZnccScalar;
use crate::kernel::{Kernel, PlacementRange, ScanParams};
use crate::store::TemplateStore;
use crate::template::Template;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{ScanError, ScanResult};
use crate::ImageView;

/// Confidence threshold applied to every corner by default.
pub const DEFAULT_THRESHOLD: f32 = 0.60;

/// Placements considered for each template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchRegion {
    /// Every placement in the frame.
    #[default]
    Full,
    /// Only placements whose center lies in the corner's own quadrant.
    Quadrant,
}

/// What to do when corners fail the coarse layout check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// Log a warning and flag the detection.
    #[default]
    Warn,
    /// Fail with [`ScanError::CornerOrdering`].
    Reject,
}

/// Configuration for corner detection.
#[derive(Clone, Debug)]
pub struct LocateConfig {
    /// Minimum ZNCC score each corner must reach.
    pub threshold: f32,
    /// Minimum window variance for a placement to be scored.
    pub min_var_i: f32,
    /// Placement search region.
    pub region: SearchRegion,
    /// Handling of corners that fail the layout check.
    pub ordering: OrderingPolicy,
    /// Use the row-parallel kernel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_var_i: ScanParams::default().min_var_i,
            region: SearchRegion::Full,
            ordering: OrderingPolicy::Warn,
            parallel: false,
        }
    }
}

/// Result of a successful detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Template centers in TL, TR, BR, BL order.
    pub corners: CornerSet,
    /// Best match per corner, in the same order.
    pub matches: [MatchResult; 4],
    /// Outcome of [`CornerSet::is_plausibly_ordered`].
    pub ordering_ok: bool,
}

impl Detection {
    /// Returns the match for `label`.
    pub fn match_for(&self, label: CornerLabel) -> &MatchResult {
        &self.matches[label.index()]
    }
}

/// Template-matching corner detector borrowing a loaded store.
pub struct CornerLocator<'a> {
    store: &'a TemplateStore,
    cfg: LocateConfig,
}

impl<'a> CornerLocator<'a> {
    /// Creates a locator with the default configuration.
    pub fn new(store: &'a TemplateStore) -> ScanResult<Self> {
        if !store.is_loaded() {
            return Err(ScanError::StoreNotLoaded);
        }
        Ok(Self {
            store,
            cfg: LocateConfig::default(),
        })
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: LocateConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &LocateConfig {
        &self.cfg
    }

    /// Finds all four corners or fails on the first weak one.
    pub fn locate(&self, frame: ImageView<'_, u8>) -> ScanResult<Detection> {
        let _span = trace_span!("locate", width = frame.width(), height = frame.height()).entered();

        let mut found = Vec::with_capacity(CornerLabel::ALL.len());
        for label in CornerLabel::ALL {
            let tpl = self.template(label)?;
            let m = self.match_template(frame, tpl)?;
            trace_event!(
                "corner_match",
                corner = label.short_name(),
                score = m.score,
                x = m.x,
                y = m.y
            );
            if m.score < self.cfg.threshold {
                return Err(ScanError::LowConfidence {
                    corner: label,
                    score: m.score,
                    threshold: self.cfg.threshold,
                });
            }
            let center = Point2::new(
                m.x as f64 + tpl.width() as f64 / 2.0,
                m.y as f64 + tpl.height() as f64 / 2.0,
            );
            found.push((m, center));
        }

        let corners = CornerSet::from_array(std::array::from_fn(|i| found[i].1));
        let matches = std::array::from_fn(|i| found[i].0);
        let ordering_ok = corners.is_plausibly_ordered();
        if !ordering_ok {
            let [tl, tr, br, bl] = *corners.as_array();
            trace_warn!(
                "corner_ordering",
                tl_x = tl.x,
                tl_y = tl.y,
                tr_x = tr.x,
                tr_y = tr.y,
                br_x = br.x,
                br_y = br.y,
                bl_x = bl.x,
                bl_y = bl.y
            );
            if self.cfg.ordering == OrderingPolicy::Reject {
                return Err(ScanError::CornerOrdering);
            }
        }

        Ok(Detection {
            corners,
            matches,
            ordering_ok,
        })
    }

    /// Best match for a single corner, without applying the threshold.
    pub fn match_corner(
        &self,
        frame: ImageView<'_, u8>,
        label: CornerLabel,
    ) -> ScanResult<MatchResult> {
        let tpl = self.template(label)?;
        self.match_template(frame, tpl)
    }

    fn template(&self, label: CornerLabel) -> ScanResult<&'a Template> {
        self.store.get(label).ok_or(ScanError::StoreNotLoaded)
    }

    fn match_template(&self, frame: ImageView<'_, u8>, tpl: &Template) -> ScanResult<MatchResult> {
        let label = tpl.label();
        let _span = trace_span!("match_corner", corner = label.short_name()).entered();

        let valid =
            PlacementRange::full(frame.width(), frame.height(), tpl.width(), tpl.height())
                .map_err(|_| ScanError::TemplateTooLarge {
                    corner: label,
                    tpl_width: tpl.width(),
                    tpl_height: tpl.height(),
                    img_width: frame.width(),
                    img_height: frame.height(),
                })?;
        let range = match self.cfg.region {
            SearchRegion::Full => valid,
            SearchRegion::Quadrant => quadrant_range(label, frame, tpl),
        };
        let params = ScanParams {
            min_var_i: self.cfg.min_var_i,
        };

        let peak = self
            .scan(frame, tpl, range, params)?
            .ok_or(ScanError::NoCandidate { corner: label })?;
        Ok(MatchResult {
            label,
            score: peak.score,
            x: peak.x,
            y: peak.y,
        })
    }

    fn scan(
        &self,
        frame: ImageView<'_, u8>,
        tpl: &Template,
        range: PlacementRange,
        params: ScanParams,
    ) -> ScanResult<Option<crate::candidate::Peak>> {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return crate::kernel::rayon::zncc_scan_range_par(frame, tpl.plan(), range, params);
        }
        <ZnccScalar as Kernel>::scan_roi(frame, tpl.plan(), range, params)
    }
}

/// Placements whose template center falls in the corner's quadrant.
///
/// Bounds are unclamped on the far side; the kernel clamps them. The range
/// always holds at least one valid placement when the template fits.
fn quadrant_range(label: CornerLabel, frame: ImageView<'_, u8>, tpl: &Template) -> PlacementRange {
    let split_x = (frame.width() / 2).saturating_sub(tpl.width() / 2);
    let split_y = (frame.height() / 2).saturating_sub(tpl.height() / 2);
    let (x0, x1) = if label.is_right() {
        (split_x, usize::MAX)
    } else {
        (0, split_x)
    };
    let (y0, y1) = if label.is_bottom() {
        (split_y, usize::MAX)
    } else {
        (0, split_y)
    };
    PlacementRange { x0, y0, x1, y1 }
}
