//! Template store: the four corner markers, loaded once and shared read-only.
//!
//! Loading is transactional. Every asset is decoded, checked, converted to
//! grayscale and compiled into a ZNCC plan; if any step fails for any corner,
//! the templates produced so far are released and the store is left empty.

mod source;
mod txn;

pub use source::{MemorySource, TemplateSource};
#[cfg(feature = "image-io")]
pub use source::{DirSource, EncodedSource};
pub use txn::{load_all, LoadFailure};

use crate::corner::CornerLabel;
use crate::template::Template;
use crate::trace::{trace_event, trace_span};
use crate::util::{ScanError, ScanResult};

/// Owner of the four corner templates.
///
/// A store is either empty or holds exactly one template per corner.
#[derive(Debug, Default)]
pub struct TemplateStore {
    templates: Vec<Template>,
}

impl TemplateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store and loads it from `source`.
    pub fn from_source<S: TemplateSource + ?Sized>(source: &S) -> ScanResult<Self> {
        let mut store = Self::new();
        store.load(source)?;
        Ok(store)
    }

    /// Loads all four templates from `source`, replacing any previous set.
    ///
    /// On failure the store is empty, including when it was loaded before.
    pub fn load<S: TemplateSource + ?Sized>(&mut self, source: &S) -> ScanResult<()> {
        let _span = trace_span!("template_load").entered();
        self.templates.clear();

        match load_all(CornerLabel::ALL.len(), |idx| {
            load_template(source, CornerLabel::ALL[idx])
        }) {
            Ok(templates) => {
                for tpl in &templates {
                    trace_event!(
                        "template_loaded",
                        corner = tpl.label().short_name(),
                        width = tpl.width(),
                        height = tpl.height()
                    );
                }
                self.templates = templates;
                Ok(())
            }
            Err(failure) => {
                trace_event!(
                    "template_load_rollback",
                    corner = CornerLabel::ALL[failure.index].short_name(),
                    released = failure.released
                );
                Err(failure.error)
            }
        }
    }

    /// Whether all four templates are present.
    pub fn is_loaded(&self) -> bool {
        self.templates.len() == CornerLabel::ALL.len()
    }

    /// Returns the template for `label`, if loaded.
    pub fn get(&self, label: CornerLabel) -> Option<&Template> {
        self.templates.get(label.index())
    }

    /// Iterates over loaded templates in canonical corner order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    /// Releases all templates.
    pub fn clear(&mut self) {
        self.templates.clear();
    }
}

fn load_template<S: TemplateSource + ?Sized>(
    source: &S,
    label: CornerLabel,
) -> ScanResult<Template> {
    let as_load_error = |err: ScanError| match err {
        ScanError::TemplateLoad { .. } => err,
        other => ScanError::TemplateLoad {
            corner: label,
            reason: other.to_string(),
        },
    };

    let raster = source.load(label).map_err(as_load_error)?;
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Err(ScanError::TemplateLoad {
            corner: label,
            reason: format!("asset is not fully decoded ({width}x{height})"),
        });
    }
    let gray = raster.into_gray().map_err(as_load_error)?;
    Template::from_image(label, gray).map_err(as_load_error)
}
