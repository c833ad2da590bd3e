//! Markscan is a CPU-first document scanner driven by printed corner markers.
//!
//! A page carries four fiducial markers, one near each corner. The scanner
//! locates each marker in a camera frame by ZNCC template matching, accepts
//! the detection only when every marker scores at least the confidence
//! threshold, and flattens the enclosed quadrilateral into an upright
//! rectangle with a perspective warp.
//!
//! ```no_run
//! # #[cfg(feature = "image-io")]
//! # fn main() -> markscan::ScanResult<()> {
//! use markscan::{DirSource, ScanConfig, Scanner, StillFrame, TemplateStore};
//!
//! let store = TemplateStore::from_source(&DirSource::new("assets"))?;
//! let scanner = Scanner::new(&store, ScanConfig::default())?;
//! let scan = scanner.capture(&mut StillFrame::open("frame.jpg")?)?;
//! markscan::io::save_png(scan.image.view(), markscan::io::DEFAULT_SCAN_FILE_NAME)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "image-io"))]
//! # fn main() {}
//! ```
//!
//! Optional features: `rayon` scans and warps rows in parallel, `image-io`
//! decodes and encodes image files, `tracing` emits spans and events for each
//! stage.

mod candidate;
pub mod corner;
pub mod image;
pub mod kernel;
pub mod locate;
pub mod pipeline;
pub mod rectify;
pub mod store;
pub mod template;
mod trace;
pub mod util;

pub use corner::{CornerLabel, CornerSet, MatchResult, Point2};
pub use image::{to_gray, ImageView, OwnedImage, Pixel, Raster, Rgb, Rgba};
pub use kernel::{Kernel, PlacementRange, ScanParams};
pub use locate::{
    CornerLocator, Detection, LocateConfig, OrderingPolicy, SearchRegion, DEFAULT_THRESHOLD,
};
pub use pipeline::{FrameSource, Scan, ScanConfig, Scanner, StillFrame};
pub use rectify::{
    rectify, Homography, Rectifier, RectifyConfig, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
pub use store::{MemorySource, TemplateSource, TemplateStore};
#[cfg(feature = "image-io")]
pub use store::{DirSource, EncodedSource};
pub use template::{Template, TemplatePlan};
pub use util::{ScanError, ScanResult, Stage};

pub use candidate::Peak;

#[cfg(feature = "image-io")]
pub use image::io;
