//! Error types for locate-image.

use crate::image::convert::PixelLayout;
use crate::search::Match;
use thiserror::Error;

/// Boxed error type returned by visitor callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias for locate-image operations.
pub type LocateResult<T> = std::result::Result<T, LocateError>;

/// Errors that can occur when searching for a sample inside a canvas.
///
/// Some outcomes carry a result alongside the error: `MultipleFound` still
/// reports the best match and `Cancelled` reports whatever had been collected
/// when the cancellation was observed. Use [`LocateError::best_match`] and
/// [`LocateError::partial_matches`] to read them without matching on variants.
#[derive(Debug, Error)]
pub enum LocateError {
    /// Image dimensions are invalid or overflow the address space.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride (in bytes) is smaller than one row of pixels.
    #[error("invalid stride: {stride} bytes is less than one row of {width} pixels")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is too small for the requested view.
    #[error("buffer too small: needed {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// ROI is outside the parent view.
    #[error("roi out of bounds: x={x}, y={y}, w={width}, h={height}, img={img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A buffer was handed to the core in a layout other than canonical RGBA8.
    #[error("unsupported pixel layout {layout:?}: convert to RGBA8 first")]
    UnsupportedFormat { layout: PixelLayout },
    /// No window of the canvas matched the sample.
    #[error("not found")]
    NotFound,
    /// More than one window matched in unique mode; `best` is still valid.
    #[error("multiple matches found ({count}), best at {best}")]
    MultipleFound { best: Match, count: usize },
    /// The cancellation token fired between rows.
    #[error("search cancelled ({} partial match(es))", .partial.len())]
    Cancelled { partial: Vec<Match> },
    /// A visitor callback aborted the scan.
    #[error("callback failed: {0}")]
    Callback(#[source] BoxError),
    /// Image decoding failed.
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
}

impl LocateError {
    /// Returns the best match delivered together with this error, if any.
    ///
    /// For `Cancelled` raised by a single-match search this is the best match
    /// seen before the cancellation; for `find_all` it is the head of the
    /// sorted partial list.
    pub fn best_match(&self) -> Option<&Match> {
        match self {
            Self::MultipleFound { best, .. } => Some(best),
            Self::Cancelled { partial } => partial.first(),
            _ => None,
        }
    }

    /// Returns the partial matches carried by a cancellation.
    pub fn partial_matches(&self) -> &[Match] {
        match self {
            Self::Cancelled { partial } => partial,
            Self::MultipleFound { best, .. } => std::slice::from_ref(best),
            _ => &[],
        }
    }

    /// Returns true for `Cancelled`.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns true for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
