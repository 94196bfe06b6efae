//! Python bindings for the locate-image sample search library.
//!
//! Images are passed as `(height, width, channels)` uint8 numpy arrays with
//! 3 (RGB) or 4 (RGBA) channels. RGB input is converted to RGBA before the
//! search; RGBA input is searched in place.

use numpy::{PyArrayMethods, PyReadonlyArray3, PyUntypedArrayMethods};
use pyo3::create_exception;
use pyo3::exceptions::{PyBaseException, PyException, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use locate_image::{
    to_canonical, CancelToken as RustCancelToken, LocateConfig, LocateError, Locator,
    Match as RustMatch, PixelBuffer, PixelLayout, PixelView, RawImage, Selection, Visit,
};

create_exception!(_locate_image, NotFoundError, PyException, "No window matched the sample.");
create_exception!(
    _locate_image,
    MultipleFoundError,
    PyException,
    "More than one window matched in 'only' mode; `best` and `count` describe them."
);
create_exception!(
    _locate_image,
    CancelledError,
    PyException,
    "The search was cancelled; `partial` holds the matches found so far, `best` the first."
);

/// Convert a LocateError to a Python exception.
fn to_py_err(err: LocateError) -> PyErr {
    match err {
        LocateError::NotFound => NotFoundError::new_err(err.to_string()),
        LocateError::MultipleFound { .. } => MultipleFoundError::new_err(err.to_string()),
        LocateError::Cancelled { .. } => CancelledError::new_err(err.to_string()),
        LocateError::InvalidInput(_)
        | LocateError::InvalidDimensions { .. }
        | LocateError::InvalidStride { .. }
        | LocateError::BufferTooSmall { .. }
        | LocateError::RoiOutOfBounds { .. }
        | LocateError::UnsupportedFormat { .. } => PyValueError::new_err(err.to_string()),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

/// Matches that travel with a search error: the best one and the partial list.
fn carried_matches(err: &LocateError) -> (Option<Match>, Vec<Match>) {
    (
        err.best_match().copied().map(Match::from),
        err.partial_matches().iter().copied().map(Match::from).collect(),
    )
}

fn raise_with<'py>(
    py: Python<'py>,
    raised: PyErr,
    attrs: impl FnOnce(&Bound<'py, PyBaseException>) -> PyResult<()>,
) -> PyErr {
    let attached = attrs(raised.value(py));
    match attached {
        Ok(()) => raised,
        Err(err) => err,
    }
}

/// Like [`to_py_err`], but keeps the matches carried by `MultipleFound` and
/// `Cancelled` as exception attributes.
fn search_err(py: Python<'_>, err: LocateError) -> PyErr {
    let (best, partial) = carried_matches(&err);
    match err {
        LocateError::MultipleFound { count, .. } => {
            raise_with(py, MultipleFoundError::new_err(err.to_string()), |value| {
                value.setattr("best", best)?;
                value.setattr("count", count)
            })
        }
        LocateError::Cancelled { .. } => {
            raise_with(py, CancelledError::new_err(err.to_string()), |value| {
                value.setattr("partial", partial)?;
                value.setattr("best", best)
            })
        }
        other => to_py_err(other),
    }
}

/// A matched region of the canvas.
#[pyclass]
#[derive(Clone)]
pub struct Match {
    /// Left edge of the match in canvas coordinates.
    #[pyo3(get)]
    pub x: usize,
    /// Top edge of the match in canvas coordinates.
    #[pyo3(get)]
    pub y: usize,
    /// Width of the match (the sample width).
    #[pyo3(get)]
    pub width: usize,
    /// Height of the match (the sample height).
    #[pyo3(get)]
    pub height: usize,
    /// Similarity in [0, 1]; 1 is an exact match.
    #[pyo3(get)]
    pub similarity: f64,
}

#[pymethods]
impl Match {
    fn __repr__(&self) -> String {
        format!(
            "Match(x={}, y={}, width={}, height={}, similarity={:.6})",
            self.x, self.y, self.width, self.height, self.similarity
        )
    }
}

impl From<RustMatch> for Match {
    fn from(m: RustMatch) -> Self {
        Self {
            x: m.rect.x,
            y: m.rect.y,
            width: m.rect.width,
            height: m.rect.height,
            similarity: m.similarity,
        }
    }
}

/// Cancellation flag that can be fired from a `for_each` callback.
#[pyclass]
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: RustCancelToken,
}

#[pymethods]
impl CancelToken {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the search stops at the next canvas row.
    fn cancel(&self) {
        self.inner.cancel();
    }

    /// Whether cancel() has been called.
    #[getter]
    fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    fn __repr__(&self) -> String {
        format!("CancelToken(cancelled={})", self.inner.is_cancelled())
    }
}

/// Pixels borrowed from numpy when already RGBA, converted otherwise.
enum Pixels<'a> {
    Borrowed(PixelView<'a>),
    Owned(PixelBuffer),
}

impl Pixels<'_> {
    fn view(&self) -> PixelView<'_> {
        match self {
            Pixels::Borrowed(view) => *view,
            Pixels::Owned(buffer) => buffer.view(),
        }
    }
}

fn pixels<'a>(array: &'a PyReadonlyArray3<'_, u8>) -> PyResult<Pixels<'a>> {
    let shape = array.shape();
    let (height, width, channels) = (shape[0], shape[1], shape[2]);
    let data = array.as_slice()?;
    match channels {
        4 => Ok(Pixels::Borrowed(
            PixelView::from_slice(data, width, height).map_err(to_py_err)?,
        )),
        3 => {
            let raw = RawImage::packed(data, width, height, PixelLayout::Rgb8);
            Ok(Pixels::Owned(to_canonical(raw).map_err(to_py_err)?))
        }
        _ => Err(PyValueError::new_err(
            "images must have shape (height, width, 3) or (height, width, 4)",
        )),
    }
}

fn parse_selection(selection: &str) -> PyResult<Selection> {
    selection
        .parse()
        .map_err(|_| PyValueError::new_err("selection must be 'first', 'best' or 'only'"))
}

fn locator(sample: PixelView<'_>, tolerance: f64, parallel: bool) -> PyResult<Locator<'_>> {
    let cfg = LocateConfig {
        tolerance,
        parallel,
    };
    cfg.validate().map_err(to_py_err)?;
    Ok(Locator::new(sample).with_config(cfg))
}

fn token(cancel: Option<&CancelToken>) -> RustCancelToken {
    cancel.map(|c| c.inner.clone()).unwrap_or_default()
}

/// Find every occurrence of `sample` in `canvas`.
///
/// Args:
///     canvas: uint8 array (height x width x 3|4)
///     sample: uint8 array (height x width x 3|4)
///     tolerance: Allowed difference in [0, 1] (default: 0.0, exact)
///     parallel: Evaluate rows in parallel (default: False)
///     cancel: Optional CancelToken
///
/// Returns:
///     List of Match objects, highest similarity first
///
/// Raises:
///     CancelledError: with `partial` set to the matches found so far, sorted
#[pyfunction]
#[pyo3(signature = (canvas, sample, tolerance = 0.0, parallel = false, cancel = None))]
fn find_all(
    py: Python<'_>,
    canvas: PyReadonlyArray3<'_, u8>,
    sample: PyReadonlyArray3<'_, u8>,
    tolerance: f64,
    parallel: bool,
    cancel: Option<PyRef<'_, CancelToken>>,
) -> PyResult<Vec<Match>> {
    let canvas = pixels(&canvas)?;
    let sample = pixels(&sample)?;
    let found = locator(sample.view(), tolerance, parallel)?
        .find_all(canvas.view(), &token(cancel.as_deref()))
        .map_err(|err| search_err(py, err))?;
    Ok(found.into_iter().map(Match::from).collect())
}

/// Find a single occurrence of `sample` in `canvas`.
///
/// Args:
///     canvas: uint8 array (height x width x 3|4)
///     sample: uint8 array (height x width x 3|4)
///     tolerance: Allowed difference in [0, 1] (default: 0.0, exact)
///     selection: "first", "best" or "only" (default: "best")
///     parallel: Evaluate rows in parallel (default: False)
///     cancel: Optional CancelToken
///
/// Raises:
///     NotFoundError: no window matched
///     MultipleFoundError: "only" saw several windows; carries `best`, `count`
///     CancelledError: carries `best`, the best match seen before cancelling
#[pyfunction]
#[pyo3(signature = (
    canvas,
    sample,
    tolerance = 0.0,
    selection = "best",
    parallel = false,
    cancel = None
))]
fn find_one(
    py: Python<'_>,
    canvas: PyReadonlyArray3<'_, u8>,
    sample: PyReadonlyArray3<'_, u8>,
    tolerance: f64,
    selection: &str,
    parallel: bool,
    cancel: Option<PyRef<'_, CancelToken>>,
) -> PyResult<Match> {
    let selection = parse_selection(selection)?;
    let canvas = pixels(&canvas)?;
    let sample = pixels(&sample)?;
    let found = locator(sample.view(), tolerance, parallel)?
        .find_one(canvas.view(), selection, &token(cancel.as_deref()))
        .map_err(|err| search_err(py, err))?;
    Ok(found.into())
}

/// Call `callback(match)` for every occurrence in row-major scan order.
///
/// Returning False from the callback stops the search; any other value
/// (including None) continues it. Exceptions raised by the callback
/// propagate unchanged.
///
/// Args:
///     canvas: uint8 array (height x width x 3|4)
///     sample: uint8 array (height x width x 3|4)
///     callback: Callable taking a Match
///     tolerance: Allowed difference in [0, 1] (default: 0.0, exact)
///     cancel: Optional CancelToken
#[pyfunction]
#[pyo3(signature = (canvas, sample, callback, tolerance = 0.0, cancel = None))]
fn for_each(
    py: Python<'_>,
    canvas: PyReadonlyArray3<'_, u8>,
    sample: PyReadonlyArray3<'_, u8>,
    callback: &Bound<'_, PyAny>,
    tolerance: f64,
    cancel: Option<PyRef<'_, CancelToken>>,
) -> PyResult<()> {
    let canvas = pixels(&canvas)?;
    let sample = pixels(&sample)?;
    let mut raised: Option<PyErr> = None;
    let scanned = locator(sample.view(), tolerance, false)?.for_each(
        canvas.view(),
        &token(cancel.as_deref()),
        |m| match callback.call1((Match::from(m),)) {
            Ok(ret) if ret.is_none() => Visit::Continue,
            Ok(ret) => match ret.is_truthy() {
                Ok(true) => Visit::Continue,
                Ok(false) => Visit::Stop,
                Err(err) => {
                    raised = Some(err);
                    Visit::Fail("callback result is not a bool".into())
                }
            },
            Err(err) => {
                raised = Some(err);
                Visit::Fail("callback raised".into())
            }
        },
    );
    if let Some(err) = raised {
        return Err(err);
    }
    scanned.map_err(|err| search_err(py, err))
}

/// Load an image file as an RGBA uint8 array of shape (height, width, 4).
#[pyfunction]
fn load_image<'py>(py: Python<'py>, path: &str) -> PyResult<Bound<'py, numpy::PyArray3<u8>>> {
    let owned = locate_image::io::load_rgba_image(path).map_err(to_py_err)?;
    let (width, height) = (owned.width(), owned.height());
    let flat = numpy::PyArray1::from_vec(py, owned.into_raw());
    flat.reshape([height, width, 4])
}

/// Python module for locating a sample image inside a canvas.
#[pymodule]
fn _locate_image(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Match>()?;
    m.add_class::<CancelToken>()?;
    m.add_function(wrap_pyfunction!(find_all, m)?)?;
    m.add_function(wrap_pyfunction!(find_one, m)?)?;
    m.add_function(wrap_pyfunction!(for_each, m)?)?;
    m.add_function(wrap_pyfunction!(load_image, m)?)?;
    m.add("NotFoundError", m.py().get_type::<NotFoundError>())?;
    m.add("MultipleFoundError", m.py().get_type::<MultipleFoundError>())?;
    m.add("CancelledError", m.py().get_type::<CancelledError>())?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
