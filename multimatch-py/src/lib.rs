//! Python bindings for the multimatch library.
//!
//! Images and templates are numpy `uint8` arrays: 2-D arrays are grayscale,
//! 3-D arrays hold interleaved channels (height x width x channels).

use numpy::{PyReadonlyArrayDyn, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use multimatch::{
    find_matches as rust_find_matches, match_templates as rust_match_templates,
    Detection as RustDetection, ImageView, MatchConfig, MultiMatchError, ObjectCount,
    SearchRegion, Template,
};
use multimatch::lowlevel::ZnccScalar;

/// Convert a MultiMatchError to a Python exception.
fn to_py_err(err: MultiMatchError) -> PyErr {
    if err.is_invalid_argument() {
        PyValueError::new_err(err.to_string())
    } else {
        PyRuntimeError::new_err(err.to_string())
    }
}

/// Detected template placement.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    /// Left edge of the box.
    #[pyo3(get)]
    pub x: usize,
    /// Top edge of the box.
    #[pyo3(get)]
    pub y: usize,
    #[pyo3(get)]
    pub width: usize,
    #[pyo3(get)]
    pub height: usize,
    /// Correlation score in [-1, 1].
    #[pyo3(get)]
    pub score: f32,
    /// Index of the matching template in the input list.
    #[pyo3(get)]
    pub template_index: usize,
    #[pyo3(get)]
    pub label: String,
}

#[pymethods]
impl Detection {
    /// Box as (x, y, width, height).
    #[getter]
    fn bbox(&self) -> (usize, usize, usize, usize) {
        (self.x, self.y, self.width, self.height)
    }

    /// Box as (x1, y1, x2, y2) with exclusive right and bottom edges.
    #[getter]
    fn corners(&self) -> (usize, usize, usize, usize) {
        (self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn __repr__(&self) -> String {
        format!(
            "Detection(x={}, y={}, width={}, height={}, score={:.4}, template_index={}, label='{}')",
            self.x, self.y, self.width, self.height, self.score, self.template_index, self.label
        )
    }
}

impl From<RustDetection> for Detection {
    fn from(d: RustDetection) -> Self {
        Self {
            x: d.x(),
            y: d.y(),
            width: d.width(),
            height: d.height(),
            score: d.score(),
            template_index: d.template_index(),
            label: d.label().to_owned(),
        }
    }
}

fn view_of<'a>(array: &'a PyReadonlyArrayDyn<'_, u8>) -> PyResult<ImageView<'a, u8>> {
    let shape = array.shape();
    let data = array.as_slice()?;
    let view = match *shape {
        [height, width] => ImageView::from_slice(data, width, height),
        [height, width, channels] => ImageView::from_interleaved(data, width, height, channels),
        _ => {
            return Err(PyValueError::new_err(
                "arrays must be 2-D (grayscale) or 3-D (height x width x channels)",
            ))
        }
    };
    view.map_err(to_py_err)
}

fn template_of(array: &PyReadonlyArrayDyn<'_, u8>) -> PyResult<Template> {
    Template::from_view(view_of(array)?).map_err(to_py_err)
}

/// Shared argument handling for both entry points.
struct CallArgs {
    templates: Vec<Template>,
    labels: Option<Vec<String>>,
    cfg: MatchConfig,
}

impl CallArgs {
    #[allow(clippy::too_many_arguments)]
    fn parse(
        templates: &[PyReadonlyArrayDyn<'_, u8>],
        labels: Option<Vec<String>>,
        score_threshold: f32,
        max_overlap: f32,
        n_objects: Option<usize>,
        search_box: Option<(usize, usize, usize, usize)>,
        parallel: bool,
    ) -> PyResult<Self> {
        let object_count = match n_objects {
            Some(n) => ObjectCount::finite(n).map_err(to_py_err)?,
            None => ObjectCount::Unbounded,
        };
        let cfg = MatchConfig {
            score_threshold,
            max_overlap,
            object_count,
            search_region: search_box.map(|(x, y, w, h)| SearchRegion::new(x, y, w, h)),
            parallel,
        };
        let templates = templates.iter().map(template_of).collect::<PyResult<_>>()?;
        Ok(Self {
            templates,
            labels,
            cfg,
        })
    }

    fn labels(&self) -> Option<Vec<&str>> {
        self.labels
            .as_ref()
            .map(|labels| labels.iter().map(String::as_str).collect())
    }
}

/// Find every template in an image and return non-overlapping detections.
///
/// Args:
///     image: uint8 numpy array, 2-D or 3-D
///     templates: list of uint8 numpy arrays with the image's channel layout
///     labels: optional list of names, one per template
///     score_threshold: minimum score of a candidate (default: 0.5)
///     max_overlap: maximum IoU between reported boxes (default: 0.25)
///     n_objects: maximum number of detections, None for no limit
///     search_box: optional (x, y, width, height) region to search
///     parallel: correlate templates concurrently (default: False)
///
/// Returns:
///     List of Detection objects sorted by descending score
#[pyfunction]
#[pyo3(signature = (
    image,
    templates,
    labels = None,
    score_threshold = 0.5,
    max_overlap = 0.25,
    n_objects = None,
    search_box = None,
    parallel = false
))]
#[allow(clippy::too_many_arguments)]
fn match_templates(
    image: PyReadonlyArrayDyn<'_, u8>,
    templates: Vec<PyReadonlyArrayDyn<'_, u8>>,
    labels: Option<Vec<String>>,
    score_threshold: f32,
    max_overlap: f32,
    n_objects: Option<usize>,
    search_box: Option<(usize, usize, usize, usize)>,
    parallel: bool,
) -> PyResult<Vec<Detection>> {
    let args = CallArgs::parse(
        &templates,
        labels,
        score_threshold,
        max_overlap,
        n_objects,
        search_box,
        parallel,
    )?;
    let view = view_of(&image)?;
    let labels = args.labels();
    let detections = rust_match_templates(
        view,
        &args.templates,
        labels.as_deref(),
        &ZnccScalar,
        &args.cfg,
    )
    .map_err(to_py_err)?;
    Ok(detections.into_iter().map(Detection::from).collect())
}

/// Return every candidate detection of every template, before overlap
/// suppression. Takes the same arguments as `match_templates`.
#[pyfunction]
#[pyo3(signature = (
    image,
    templates,
    labels = None,
    score_threshold = 0.5,
    max_overlap = 0.25,
    n_objects = None,
    search_box = None,
    parallel = false
))]
#[allow(clippy::too_many_arguments)]
fn find_matches(
    image: PyReadonlyArrayDyn<'_, u8>,
    templates: Vec<PyReadonlyArrayDyn<'_, u8>>,
    labels: Option<Vec<String>>,
    score_threshold: f32,
    max_overlap: f32,
    n_objects: Option<usize>,
    search_box: Option<(usize, usize, usize, usize)>,
    parallel: bool,
) -> PyResult<Vec<Detection>> {
    let args = CallArgs::parse(
        &templates,
        labels,
        score_threshold,
        max_overlap,
        n_objects,
        search_box,
        parallel,
    )?;
    let view = view_of(&image)?;
    let labels = args.labels();
    let detections = rust_find_matches(
        view,
        &args.templates,
        labels.as_deref(),
        &ZnccScalar,
        &args.cfg,
    )
    .map_err(to_py_err)?;
    Ok(detections.into_iter().map(Detection::from).collect())
}

/// Python module for multimatch.
#[pymodule]
fn _multimatch(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_function(wrap_pyfunction!(match_templates, m)?)?;
    m.add_function(wrap_pyfunction!(find_matches, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
