//! MultiMatch finds several templates in one image and reports
//! non-overlapping detections.
//!
//! Every template is correlated against the image with zero-mean normalized
//! cross-correlation (ZNCC). Peaks of each score map become candidate boxes,
//! and the candidates of all templates are pooled and pruned by greedy
//! IoU-based non-maximum suppression. Optional features add parallelism
//! (`rayon`), a SIMD kernel (`simd`), image file IO (`image-io`) and
//! structured logging (`tracing`).

mod candidate;
pub mod detection;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod render;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use candidate::{ObjectCount, PeakLimit};
pub use detection::{upscale_detections, BoundingBox, Detection, ScaledDetection};
pub use image::{ImageView, OwnedImage};
pub use kernel::{DefaultKernel, Kernel, ScoreMap};
pub use search::{find_matches, match_templates, MatchConfig, Matcher, SearchRegion};
pub use template::{Template, TemplatePlan};
pub use util::{MultiMatchError, MultiMatchResult};

pub use candidate::nms::suppress;
pub use candidate::peaks::find_peaks;
