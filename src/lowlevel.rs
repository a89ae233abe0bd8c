//! Low-level building blocks for custom matching pipelines.
//!
//! These expose the individual pipeline stages (correlation, peak
//! extraction, suppression) beyond the high-level [`Matcher`] API. Most users
//! should prefer [`match_templates`] or [`Matcher`].
//!
//! [`Matcher`]: crate::Matcher
//! [`match_templates`]: crate::match_templates

pub use crate::candidate::nms::{suppress, validate_max_overlap};
pub use crate::candidate::peaks::{find_peaks, global_maximum, local_maxima};
pub use crate::candidate::PeakLimit;
pub use crate::kernel::scalar::{score_at, zncc_map, ZnccScalar};
pub use crate::kernel::{placement_range, Kernel, ScoreMap};
pub use crate::template::TemplatePlan;

#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::{zncc_map_par, ZnccParallel};
#[cfg(feature = "simd")]
pub use crate::kernel::simd::ZnccSimd;
