//! Multi-template search pipeline.
//!
//! [`Matcher`] owns a template set (with optional labels) and a correlation
//! kernel. [`Matcher::find_matches`] returns the raw candidate pool and
//! [`Matcher::match_templates`] runs the full pipeline: validation, candidate
//! assembly, then suppression over the pooled candidates of every template.
//! The free functions [`find_matches`] and [`match_templates`] do the same
//! for borrowed inputs.

pub(crate) mod assemble;

use crate::candidate::nms::{suppress, validate_max_overlap};
use crate::candidate::ObjectCount;
use crate::detection::Detection;
use crate::kernel::{DefaultKernel, Kernel};
use crate::template::Template;
use crate::trace::{trace_event, trace_span};
use crate::util::{MultiMatchError, MultiMatchResult};
use crate::ImageView;

/// Rectangular region of the image to search, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SearchRegion {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl SearchRegion {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersects the region with a `img_width` x `img_height` image.
    ///
    /// Parts past the right or bottom edge are cut off; a region with no
    /// pixel inside the image is rejected.
    pub fn clamp_to(self, img_width: usize, img_height: usize) -> MultiMatchResult<Self> {
        let width = self
            .x
            .checked_add(self.width)
            .map_or(img_width, |end| end.min(img_width))
            .saturating_sub(self.x);
        let height = self
            .y
            .checked_add(self.height)
            .map_or(img_height, |end| end.min(img_height))
            .saturating_sub(self.y);
        if width == 0 || height == 0 {
            return Err(MultiMatchError::SearchRegionOutsideImage {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                img_width,
                img_height,
            });
        }
        Ok(Self::new(self.x, self.y, width, height))
    }
}

/// Configuration for one matching call.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Minimum score for a peak to become a candidate. Ignored when exactly
    /// one object is expected.
    pub score_threshold: f32,
    /// Maximum IoU allowed between two reported detections, in `[0, 1]`.
    pub max_overlap: f32,
    /// Number of objects to report at most.
    pub object_count: ObjectCount,
    /// Restricts the search to a sub-rectangle of the image.
    pub search_region: Option<SearchRegion>,
    /// Correlates templates concurrently (requires the `rayon` feature,
    /// otherwise templates are processed sequentially).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.5,
            max_overlap: 0.25,
            object_count: ObjectCount::Unbounded,
            search_region: None,
            parallel: false,
        }
    }
}

impl MatchConfig {
    /// Validates the configuration on its own.
    ///
    /// A zero object count cannot be expressed: [`ObjectCount::finite`]
    /// rejects it when the count is built.
    pub fn validate(&self) -> MultiMatchResult<()> {
        validate_max_overlap(self.max_overlap)?;
        if self.score_threshold.is_nan() {
            return Err(MultiMatchError::ScoreThresholdNotANumber);
        }
        Ok(())
    }
}

/// Validates image-independent arguments: label arity, then the
/// configuration.
fn validate_args(
    cfg: &MatchConfig,
    label_count: Option<usize>,
    template_count: usize,
) -> MultiMatchResult<()> {
    if let Some(labels) = label_count {
        if labels != template_count {
            return Err(MultiMatchError::LabelCountMismatch {
                labels,
                templates: template_count,
            });
        }
    }
    cfg.validate()
}

/// Validates a call against its image and returns the configuration with
/// the search region clamped to the image.
fn validate_call(
    cfg: &MatchConfig,
    label_count: Option<usize>,
    template_count: usize,
    image: ImageView<'_, u8>,
) -> MultiMatchResult<MatchConfig> {
    validate_args(cfg, label_count, template_count)?;
    let search_region = cfg
        .search_region
        .map(|region| region.clamp_to(image.width(), image.height()))
        .transpose()?;
    Ok(MatchConfig {
        search_region,
        ..cfg.clone()
    })
}

/// Returns every candidate of every template before suppression.
///
/// Arguments are validated before any correlation work.
pub fn find_matches<K: Kernel + Sync>(
    image: ImageView<'_, u8>,
    templates: &[Template],
    labels: Option<&[&str]>,
    kernel: &K,
    cfg: &MatchConfig,
) -> MultiMatchResult<Vec<Detection>> {
    let cfg = validate_call(cfg, labels.map(<[&str]>::len), templates.len(), image)?;
    assemble::assemble(image, templates, labels, kernel, &cfg)
}

/// Finds the templates in the image and returns non-overlapping detections
/// ordered by descending score.
pub fn match_templates<K: Kernel + Sync>(
    image: ImageView<'_, u8>,
    templates: &[Template],
    labels: Option<&[&str]>,
    kernel: &K,
    cfg: &MatchConfig,
) -> MultiMatchResult<Vec<Detection>> {
    let _span = trace_span!("match_templates", templates = templates.len()).entered();
    let pool = find_matches(image, templates, labels, kernel, cfg)?;
    let kept = suppress(pool, cfg.max_overlap, cfg.object_count)?;
    trace_event!(info, "detections", count = kept.len());
    Ok(kept)
}

/// Template set bound to a kernel and a configuration.
pub struct Matcher<K = DefaultKernel> {
    templates: Vec<Template>,
    labels: Option<Vec<String>>,
    kernel: K,
    cfg: MatchConfig,
}

impl Matcher<DefaultKernel> {
    /// Creates a matcher with the default kernel and configuration.
    pub fn new(templates: Vec<Template>) -> Self {
        Self {
            templates,
            labels: None,
            kernel: DefaultKernel::default(),
            cfg: MatchConfig::default(),
        }
    }
}

impl<K: Kernel + Sync> Matcher<K> {
    /// Attaches one label per template. The pairing is checked at match time.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the match configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Swaps the correlation kernel.
    pub fn with_kernel<K2: Kernel + Sync>(self, kernel: K2) -> Matcher<K2> {
        Matcher {
            templates: self.templates,
            labels: self.labels,
            kernel,
            cfg: self.cfg,
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Checks configuration and label arity without touching an image.
    pub fn validate(&self) -> MultiMatchResult<()> {
        validate_args(
            &self.cfg,
            self.labels.as_ref().map(Vec::len),
            self.templates.len(),
        )
    }

    /// Returns the raw candidate pool.
    pub fn find_matches(&self, image: ImageView<'_, u8>) -> MultiMatchResult<Vec<Detection>> {
        let cfg = validate_call(
            &self.cfg,
            self.labels.as_ref().map(Vec::len),
            self.templates.len(),
            image,
        )?;
        assemble::assemble(
            image,
            &self.templates,
            self.labels.as_deref(),
            &self.kernel,
            &cfg,
        )
    }

    /// Runs the full pipeline and returns the final detections.
    pub fn match_templates(&self, image: ImageView<'_, u8>) -> MultiMatchResult<Vec<Detection>> {
        let _span = trace_span!("match_templates", templates = self.templates.len()).entered();
        let pool = self.find_matches(image)?;
        let kept = suppress(pool, self.cfg.max_overlap, self.cfg.object_count)?;
        trace_event!(info, "detections", count = kept.len());
        Ok(kept)
    }

    /// Returns the best single detection, ignoring the score threshold and
    /// the configured object count.
    pub fn best_match(&self, image: ImageView<'_, u8>) -> MultiMatchResult<Option<Detection>> {
        let cfg = MatchConfig {
            object_count: ObjectCount::ONE,
            ..self.cfg.clone()
        };
        let cfg = validate_call(
            &cfg,
            self.labels.as_ref().map(Vec::len),
            self.templates.len(),
            image,
        )?;
        let pool = assemble::assemble(
            image,
            &self.templates,
            self.labels.as_deref(),
            &self.kernel,
            &cfg,
        )?;
        Ok(suppress(pool, cfg.max_overlap, cfg.object_count)?
            .into_iter()
            .next())
    }
}
