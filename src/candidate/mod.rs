//! Match peak selection.
//!
//! The locator only needs the global maximum of the response surface, so
//! peaks are reduced with a single best-so-far tracker instead of a Top-K
//! buffer. Ties resolve to the lowest `y`, then the lowest `x`, which keeps
//! sequential and row-parallel scans bit-identical.

use std::cmp::Ordering;

/// Peak candidate in image space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the placement's top-left corner.
    pub x: usize,
    /// Y coordinate (row) of the placement's top-left corner.
    pub y: usize,
    /// ZNCC score at the placement.
    pub score: f32,
}

/// Orders peaks so that the preferred peak compares as `Less`.
pub(crate) fn peak_cmp_desc(a: &Peak, b: &Peak) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
}

/// Tracks the best peak seen so far.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BestPeak {
    best: Option<Peak>,
}

impl BestPeak {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, peak: Peak) {
        match self.best {
            Some(current) if peak_cmp_desc(&peak, &current) != Ordering::Less => {}
            _ => self.best = Some(peak),
        }
    }

    pub(crate) fn merge(mut self, other: BestPeak) -> Self {
        if let Some(peak) = other.best {
            self.push(peak);
        }
        self
    }

    pub(crate) fn into_peak(self) -> Option<Peak> {
        self.best
    }
}
