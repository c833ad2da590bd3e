//! Capture pipeline: frame → grayscale → corners → rectified scan.
//!
//! One capture runs to completion before the next; nothing is retried. The
//! camera is an external collaborator reached through [`FrameSource`].

use crate::corner::CornerSet;
use crate::image::{to_gray, ImageView, OwnedImage, Rgb};
use crate::locate::{CornerLocator, Detection, LocateConfig};
use crate::rectify::{Rectifier, RectifyConfig};
use crate::store::TemplateStore;
use crate::trace::{trace_event, trace_span};
use crate::util::ScanResult;

/// Provider of color frames, typically a camera.
pub trait FrameSource {
    /// Captures the current frame.
    ///
    /// Implementations report failures as [`ScanError::Camera`](crate::ScanError::Camera).
    fn acquire_frame(&mut self) -> ScanResult<OwnedImage<Rgb>>;
}

/// Frame source backed by a fixed image, for files and tests.
#[derive(Clone, Debug)]
pub struct StillFrame {
    frame: OwnedImage<Rgb>,
}

impl StillFrame {
    /// Wraps an already decoded frame.
    pub fn new(frame: OwnedImage<Rgb>) -> Self {
        Self { frame }
    }

    /// Loads the still from an image file.
    #[cfg(feature = "image-io")]
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> ScanResult<Self> {
        let path = path.as_ref();
        crate::image::io::load_rgb_image(path)
            .map(Self::new)
            .map_err(|err| crate::util::ScanError::Camera {
                reason: format!("{}: {err}", path.display()),
            })
    }
}

impl FrameSource for StillFrame {
    fn acquire_frame(&mut self) -> ScanResult<OwnedImage<Rgb>> {
        Ok(self.frame.clone())
    }
}

/// Combined detection and rectification settings.
#[derive(Clone, Debug, Default)]
pub struct ScanConfig {
    pub locate: LocateConfig,
    pub rectify: RectifyConfig,
}

/// A rectified document together with the detection it came from.
#[derive(Clone, Debug)]
pub struct Scan {
    /// Flattened output image.
    pub image: OwnedImage<Rgb>,
    /// Corners and per-corner match scores.
    pub detection: Detection,
}

impl Scan {
    /// Detected corners in TL, TR, BR, BL order.
    pub fn corners(&self) -> &CornerSet {
        &self.detection.corners
    }
}

/// Runs the full capture pipeline against a loaded template store.
pub struct Scanner<'a> {
    locator: CornerLocator<'a>,
    rectifier: Rectifier,
}

impl<'a> Scanner<'a> {
    /// Builds a scanner; fails with `StoreNotLoaded` on an empty store.
    ///
    /// The locate ordering policy also governs mirrored corners in the
    /// rectifier.
    pub fn new(store: &'a TemplateStore, cfg: ScanConfig) -> ScanResult<Self> {
        let ordering = cfg.locate.ordering;
        Ok(Self {
            locator: CornerLocator::new(store)?.with_config(cfg.locate),
            rectifier: Rectifier::new(cfg.rectify).with_ordering(ordering),
        })
    }

    /// Returns the corner locator.
    pub fn locator(&self) -> &CornerLocator<'a> {
        &self.locator
    }

    /// Returns the rectifier.
    pub fn rectifier(&self) -> &Rectifier {
        &self.rectifier
    }

    /// Detects corners in `frame` and rectifies it.
    pub fn scan_frame(&self, frame: ImageView<'_, Rgb>) -> ScanResult<Scan> {
        let _span = trace_span!("scan", width = frame.width(), height = frame.height()).entered();
        let gray = to_gray(frame)?;
        let detection = self.locator.locate(gray.view())?;
        drop(gray);
        let image = self.rectifier.rectify(frame, &detection.corners)?;
        trace_event!("scan_complete", ordering_ok = detection.ordering_ok);
        Ok(Scan { image, detection })
    }

    /// Acquires one frame from `source` and scans it.
    pub fn capture<S: FrameSource + ?Sized>(&self, source: &mut S) -> ScanResult<Scan> {
        let frame = source.acquire_frame()?;
        self.scan_frame(frame.view())
    }
}
