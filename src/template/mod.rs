//! Corner marker templates.

use crate::corner::CornerLabel;
use crate::image::{ImageView, OwnedImage};
use crate::util::ScanResult;

mod plan;

pub use plan::TemplatePlan;

/// Grayscale marker template with its precomputed ZNCC plan.
#[derive(Clone, Debug)]
pub struct Template {
    label: CornerLabel,
    img: OwnedImage<u8>,
    plan: TemplatePlan,
}

impl Template {
    /// Creates a template from a contiguous grayscale buffer.
    pub fn new(label: CornerLabel, data: Vec<u8>, width: usize, height: usize) -> ScanResult<Self> {
        Self::from_image(label, OwnedImage::new(data, width, height)?)
    }

    /// Creates a template from an owned grayscale image.
    ///
    /// Fails with `DegenerateTemplate` when the image has constant intensity.
    pub fn from_image(label: CornerLabel, img: OwnedImage<u8>) -> ScanResult<Self> {
        let plan = TemplatePlan::from_view(img.view())?;
        Ok(Self { label, img, plan })
    }

    /// Returns the corner this template marks.
    pub fn label(&self) -> CornerLabel {
        self.label
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// Returns a borrowed view of the template data.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }

    /// Returns the precomputed ZNCC plan.
    pub fn plan(&self) -> &TemplatePlan {
        &self.plan
    }
}
