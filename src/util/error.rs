//! Error types for markscan.

use crate::corner::CornerLabel;
use thiserror::Error;

/// Result alias for markscan operations.
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Pipeline stage an error originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Raster construction or argument validation.
    Input,
    /// Template asset loading and conversion.
    Load,
    /// Frame acquisition from the camera collaborator.
    Camera,
    /// Corner detection.
    Detection,
    /// Perspective transform and warp.
    Transform,
    /// Encoding or writing the scan.
    Output,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::Load => "template load",
            Stage::Camera => "camera",
            Stage::Detection => "detection",
            Stage::Transform => "perspective transform",
            Stage::Output => "output",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while loading templates, detecting corners, or
/// rectifying a frame.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScanError {
    /// Image dimensions are zero or overflow the address space.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the declared layout.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Requested region does not fit inside the image.
    #[error(
        "roi {width}x{height} at ({x}, {y}) is out of bounds for {img_width}x{img_height} image"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Template cannot be normalized (for example constant intensity).
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// Decoding or encoding through the `image` crate failed.
    #[error("image i/o: {reason}")]
    ImageIo { reason: String },
    /// A template asset could not be loaded or converted.
    #[error("failed to load {corner} template: {reason}")]
    TemplateLoad { corner: CornerLabel, reason: String },
    /// The template store has not been loaded.
    #[error("template store is not loaded")]
    StoreNotLoaded,
    /// A template does not fit inside the frame.
    #[error(
        "{corner} template {tpl_width}x{tpl_height} does not fit in {img_width}x{img_height} frame"
    )]
    TemplateTooLarge {
        corner: CornerLabel,
        tpl_width: usize,
        tpl_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Best match for a corner scored below the confidence threshold.
    #[error("low confidence for {corner}: {score:.2} < {threshold:.2}")]
    LowConfidence {
        corner: CornerLabel,
        score: f32,
        threshold: f32,
    },
    /// No placement had enough texture to be scored.
    #[error("no scorable placement for {corner}: every window in the search region is flat")]
    NoCandidate { corner: CornerLabel },
    /// Detected corners are not laid out as TL, TR, BR, BL.
    #[error("detected corners do not form a properly ordered quadrilateral")]
    CornerOrdering,
    /// Corner geometry admits no unique perspective transform.
    #[error("degenerate quadrilateral: {reason}")]
    DegenerateQuad { reason: &'static str },
    /// The frame source failed to produce a frame.
    #[error("camera: {reason}")]
    Camera { reason: String },
}

impl ScanError {
    /// Returns the pipeline stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            ScanError::InvalidDimensions { .. }
            | ScanError::InvalidStride { .. }
            | ScanError::BufferTooSmall { .. }
            | ScanError::RoiOutOfBounds { .. } => Stage::Input,
            ScanError::DegenerateTemplate { .. }
            | ScanError::TemplateLoad { .. }
            | ScanError::StoreNotLoaded => Stage::Load,
            ScanError::TemplateTooLarge { .. }
            | ScanError::LowConfidence { .. }
            | ScanError::NoCandidate { .. }
            | ScanError::CornerOrdering => Stage::Detection,
            ScanError::DegenerateQuad { .. } => Stage::Transform,
            ScanError::Camera { .. } => Stage::Camera,
            ScanError::ImageIo { .. } => Stage::Output,
        }
    }

    /// Returns the corner an error refers to, if any.
    pub fn corner(&self) -> Option<CornerLabel> {
        match self {
            ScanError::TemplateLoad { corner, .. }
            | ScanError::TemplateTooLarge { corner, .. }
            | ScanError::LowConfidence { corner, .. }
            | ScanError::NoCandidate { corner } => Some(*corner),
            _ => None,
        }
    }

    /// Formats the error prefixed with its stage, for display to the user.
    pub fn user_message(&self) -> String {
        format!("{} error: {}", self.stage(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::{ScanError, Stage};
    use crate::corner::CornerLabel;

    #[test]
    fn low_confidence_message_names_corner_and_score() {
        let err = ScanError::LowConfidence {
            corner: CornerLabel::TopRight,
            score: 0.4217,
            threshold: 0.6,
        };
        assert_eq!(err.to_string(), "low confidence for TR: 0.42 < 0.60");
        assert_eq!(err.stage(), Stage::Detection);
        assert_eq!(err.corner(), Some(CornerLabel::TopRight));
        assert_eq!(
            err.user_message(),
            "detection error: low confidence for TR: 0.42 < 0.60"
        );
    }

    #[test]
    fn stages_cover_error_kinds() {
        let load = ScanError::TemplateLoad {
            corner: CornerLabel::BottomRight,
            reason: "missing".into(),
        };
        assert_eq!(load.stage(), Stage::Load);
        assert_eq!(load.to_string(), "failed to load BR template: missing");

        let quad = ScanError::DegenerateQuad {
            reason: "collinear corners",
        };
        assert_eq!(quad.stage(), Stage::Transform);
        assert!(quad.corner().is_none());

        let cam = ScanError::Camera {
            reason: "denied".into(),
        };
        assert_eq!(cam.stage(), Stage::Camera);
    }
}
