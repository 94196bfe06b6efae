//! Locating a sample image inside a canvas.
//!
//! Every public operation drives the same row-major window scan
//! ([`scan::scan`]) and differs only in the collector that consumes its
//! matches: collect-and-sort for [`Locator::find_all`], stop-at-first or
//! keep-the-best for [`Locator::find_one`], or a caller-supplied visitor for
//! [`Locator::for_each`].

use std::fmt;
use std::str::FromStr;

use crate::cancel::CancelToken;
use crate::candidate::collect::{BestFound, CollectAll, Collector, FirstFound};
use crate::candidate::order::SIMILARITY_DIGITS;
use crate::image::PixelView;
use crate::kernel::DefaultKernel;
use crate::tolerance::{validate_tolerance, Thresholds};
use crate::trace::{trace_event, trace_span};
use crate::util::{LocateError, LocateResult};

#[cfg(feature = "rayon")]
pub(crate) mod parallel;
pub mod scan;

pub use scan::Visit;

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: usize,
    /// Top edge.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> usize {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y.saturating_add(self.height)
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// A window of the canvas that matched the sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// Matched region; always the size of the sample.
    pub rect: Rect,
    /// Score from 0 (completely dissimilar) to 1 (exact match). A match
    /// reported under tolerance `t` has a similarity of at least `1 - t`.
    pub similarity: f64,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})+({}x{}) {:.*}%",
            self.rect.x,
            self.rect.y,
            self.rect.width,
            self.rect.height,
            SIMILARITY_DIGITS - 2,
            100.0 * self.similarity
        )
    }
}

/// How [`Locator::find_one`] picks the match it returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    /// Stop at the first match in row-major scan order.
    FirstEncountered,
    /// Scan everything and return the highest similarity; ties go to the
    /// earliest match in scan order.
    #[default]
    BestOverall,
    /// Like `BestOverall`, but report `MultipleFound` (carrying the best
    /// match) when more than one window matched.
    BestOverallUnique,
}

impl Selection {
    /// Short lowercase name, as accepted by `FromStr`.
    pub fn as_str(self) -> &'static str {
        match self {
            Selection::FirstEncountered => "first",
            Selection::BestOverall => "best",
            Selection::BestOverallUnique => "only",
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Selection {
    type Err = LocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" | "fastest" => Ok(Selection::FirstEncountered),
            "best" => Ok(Selection::BestOverall),
            "only" | "unique" => Ok(Selection::BestOverallUnique),
            _ => Err(LocateError::InvalidInput(
                "selection must be 'first', 'best' or 'only'",
            )),
        }
    }
}

/// Configuration for a search.
#[derive(Clone, Debug)]
pub struct LocateConfig {
    /// Tolerated difference in `[0, 1]`; `0` finds exact matches only and
    /// around `0.05` is reasonable for fuzzy matching.
    pub tolerance: f64,
    /// Evaluate rows in parallel (requires the `rayon` feature; ignored
    /// otherwise). Emission order is unchanged.
    pub parallel: bool,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.0,
            parallel: false,
        }
    }
}

impl LocateConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> LocateResult<()> {
        validate_tolerance(self.tolerance)
    }
}

/// Searches a canvas for a fixed sample image.
#[derive(Clone, Debug)]
pub struct Locator<'s> {
    sample: PixelView<'s>,
    cfg: LocateConfig,
}

impl<'s> Locator<'s> {
    /// Creates a locator for `sample` with the default (exact) configuration.
    pub fn new(sample: PixelView<'s>) -> Self {
        Self {
            sample,
            cfg: LocateConfig::default(),
        }
    }

    /// Replaces the search configuration.
    pub fn with_config(mut self, cfg: LocateConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets only the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.cfg.tolerance = tolerance;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &LocateConfig {
        &self.cfg
    }

    /// Returns the sample being searched for.
    pub fn sample(&self) -> PixelView<'s> {
        self.sample
    }

    /// Returns every match, sorted by similarity (descending) then by
    /// position (y, then x, ascending).
    ///
    /// On cancellation the matches collected so far are returned inside
    /// `LocateError::Cancelled`, sorted the same way.
    pub fn find_all(
        &self,
        canvas: PixelView<'_>,
        cancel: &CancelToken,
    ) -> LocateResult<Vec<Match>> {
        let _span = trace_span!(
            "find_all",
            canvas_width = canvas.width(),
            canvas_height = canvas.height(),
            tolerance = self.cfg.tolerance
        )
        .entered();
        self.collect(canvas, cancel, CollectAll::default())
    }

    /// Returns a single match chosen by `selection`.
    ///
    /// Errors: `NotFound` when nothing matched, `MultipleFound` (with the
    /// best match) in unique mode, `Cancelled` (with the best match so far,
    /// if any) when the token fired.
    pub fn find_one(
        &self,
        canvas: PixelView<'_>,
        selection: Selection,
        cancel: &CancelToken,
    ) -> LocateResult<Match> {
        let _span = trace_span!(
            "find_one",
            canvas_width = canvas.width(),
            canvas_height = canvas.height(),
            tolerance = self.cfg.tolerance,
            selection = selection.as_str()
        )
        .entered();
        match selection {
            Selection::FirstEncountered => self.collect(canvas, cancel, FirstFound::default()),
            Selection::BestOverall => self.collect(canvas, cancel, BestFound::new(false)),
            Selection::BestOverallUnique => self.collect(canvas, cancel, BestFound::new(true)),
        }
    }

    /// Invokes `visit` for every match in row-major scan order.
    ///
    /// Returning [`Visit::Stop`] ends the search successfully;
    /// [`Visit::Fail`] ends it with `LocateError::Callback`.
    pub fn for_each<F>(
        &self,
        canvas: PixelView<'_>,
        cancel: &CancelToken,
        visit: F,
    ) -> LocateResult<()>
    where
        F: FnMut(Match) -> Visit,
    {
        let _span = trace_span!(
            "for_each",
            canvas_width = canvas.width(),
            canvas_height = canvas.height(),
            tolerance = self.cfg.tolerance
        )
        .entered();
        self.run(canvas, cancel, visit)
    }

    /// Drives the scan with a collector and lets it interpret the outcome.
    pub fn collect<C: Collector>(
        &self,
        canvas: PixelView<'_>,
        cancel: &CancelToken,
        mut collector: C,
    ) -> LocateResult<C::Output> {
        let scanned = self.run(canvas, cancel, |m| collector.visit(m));
        collector.finish(scanned)
    }

    fn run<F>(&self, canvas: PixelView<'_>, cancel: &CancelToken, visit: F) -> LocateResult<()>
    where
        F: FnMut(Match) -> Visit,
    {
        self.cfg.validate()?;
        let thresholds = Thresholds::derive(
            self.cfg.tolerance,
            self.sample.width(),
            self.sample.height(),
        );
        trace_event!(
            "thresholds",
            pixel = thresholds.pixel,
            window = thresholds.window,
            max_total = thresholds.max_total
        );

        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return parallel::scan_par::<DefaultKernel, _>(
                canvas,
                self.sample,
                &thresholds,
                cancel,
                visit,
            );
        }

        scan::scan::<DefaultKernel, _>(canvas, self.sample, &thresholds, cancel, visit)
    }
}

/// Returns every match of `sample` in `canvas`, sorted best first.
///
/// Shorthand for `Locator::new(sample).with_tolerance(tolerance).find_all(..)`.
pub fn find_all(
    canvas: PixelView<'_>,
    sample: PixelView<'_>,
    tolerance: f64,
    cancel: &CancelToken,
) -> LocateResult<Vec<Match>> {
    Locator::new(sample)
        .with_tolerance(tolerance)
        .find_all(canvas, cancel)
}

/// Returns one match of `sample` in `canvas` according to `selection`.
pub fn find_one(
    canvas: PixelView<'_>,
    sample: PixelView<'_>,
    tolerance: f64,
    selection: Selection,
    cancel: &CancelToken,
) -> LocateResult<Match> {
    Locator::new(sample)
        .with_tolerance(tolerance)
        .find_one(canvas, selection, cancel)
}

/// Invokes `visit` for each match of `sample` in `canvas`, in scan order.
pub fn for_each<F>(
    canvas: PixelView<'_>,
    sample: PixelView<'_>,
    tolerance: f64,
    cancel: &CancelToken,
    visit: F,
) -> LocateResult<()>
where
    F: FnMut(Match) -> Visit,
{
    Locator::new(sample)
        .with_tolerance(tolerance)
        .for_each(canvas, cancel, visit)
}
