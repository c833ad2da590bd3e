//! Providers of raw template assets.

use crate::corner::CornerLabel;
use crate::image::Raster;
use crate::util::{ScanError, ScanResult};
#[cfg(feature = "image-io")]
use std::path::{Path, PathBuf};

/// Supplies the decoded raster for each corner marker.
pub trait TemplateSource {
    /// Loads the asset for `label`.
    fn load(&self, label: CornerLabel) -> ScanResult<Raster>;
}

impl<F> TemplateSource for F
where
    F: Fn(CornerLabel) -> ScanResult<Raster>,
{
    fn load(&self, label: CornerLabel) -> ScanResult<Raster> {
        self(label)
    }
}

fn missing(label: CornerLabel) -> ScanError {
    ScanError::TemplateLoad {
        corner: label,
        reason: format!("asset {} is missing", label.asset_stem()),
    }
}

/// In-memory rasters keyed by corner.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    rasters: [Option<Raster>; 4],
}

impl MemorySource {
    /// Creates a source with no assets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raster for `label`, replacing any previous one.
    pub fn insert(&mut self, label: CornerLabel, raster: impl Into<Raster>) {
        self.rasters[label.index()] = Some(raster.into());
    }

    /// Builder-style [`MemorySource::insert`].
    pub fn with(mut self, label: CornerLabel, raster: impl Into<Raster>) -> Self {
        self.insert(label, raster);
        self
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, label: CornerLabel) -> ScanResult<Raster> {
        self.rasters[label.index()]
            .clone()
            .ok_or_else(|| missing(label))
    }
}

/// Template files `<dir>/<stem>.<ext>` (e.g. `assets/tmpl_tl.png`).
#[cfg(feature = "image-io")]
#[derive(Clone, Debug)]
pub struct DirSource {
    dir: PathBuf,
    extension: String,
}

#[cfg(feature = "image-io")]
impl DirSource {
    /// Reads `<stem>.png` files from `dir`.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            extension: "png".to_string(),
        }
    }

    /// Overrides the file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Path of the asset for `label`.
    pub fn path_for(&self, label: CornerLabel) -> PathBuf {
        self.dir
            .join(label.asset_stem())
            .with_extension(&self.extension)
    }
}

#[cfg(feature = "image-io")]
impl TemplateSource for DirSource {
    fn load(&self, label: CornerLabel) -> ScanResult<Raster> {
        let path = self.path_for(label);
        if !path.is_file() {
            return Err(ScanError::TemplateLoad {
                corner: label,
                reason: format!("{} not found", path.display()),
            });
        }
        crate::image::io::load_raster(&path)
    }
}

/// Encoded (PNG/JPEG) template bytes keyed by corner.
#[cfg(feature = "image-io")]
#[derive(Clone, Debug, Default)]
pub struct EncodedSource {
    assets: [Option<Vec<u8>>; 4],
}

#[cfg(feature = "image-io")]
impl EncodedSource {
    /// Creates a source with no encoded assets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the encoded bytes for `label`.
    pub fn insert(&mut self, label: CornerLabel, bytes: Vec<u8>) {
        self.assets[label.index()] = Some(bytes);
    }
}

#[cfg(feature = "image-io")]
impl TemplateSource for EncodedSource {
    fn load(&self, label: CornerLabel) -> ScanResult<Raster> {
        let bytes = self.assets[label.index()]
            .as_deref()
            .ok_or_else(|| missing(label))?;
        crate::image::io::decode_raster(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemorySource, TemplateSource};
    use crate::corner::CornerLabel;
    use crate::image::OwnedImage;
    use crate::util::ScanError;

    #[test]
    fn memory_source_reports_missing_assets() {
        let source = MemorySource::new().with(
            CornerLabel::TopLeft,
            OwnedImage::new(vec![0u8, 255], 2, 1).unwrap(),
        );
        assert!(source.load(CornerLabel::TopLeft).is_ok());
        let err = source.load(CornerLabel::BottomLeft).err().unwrap();
        assert_eq!(
            err,
            ScanError::TemplateLoad {
                corner: CornerLabel::BottomLeft,
                reason: "asset tmpl_bl is missing".into(),
            }
        );
    }

    #[cfg(feature = "image-io")]
    #[test]
    fn dir_source_builds_asset_paths() {
        let source = super::DirSource::new("assets").with_extension("jpg");
        let path = source.path_for(CornerLabel::BottomRight);
        assert_eq!(path, std::path::Path::new("assets").join("tmpl_br.jpg"));
    }
}
