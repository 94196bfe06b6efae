//! Brute-force sliding-window scan.

use crate::cancel::CancelToken;
use crate::image::PixelView;
use crate::kernel::WindowKernel;
use crate::search::{Match, Rect};
use crate::tolerance::Thresholds;
use crate::trace::{trace_debug, trace_event};
use crate::util::{BoxError, LocateError, LocateResult};

/// What the scanner should do after handing a match to a visitor.
#[derive(Debug)]
pub enum Visit {
    /// Keep scanning.
    Continue,
    /// Stop scanning; the scan reports success.
    Stop,
    /// Abort the scan; the error surfaces as `LocateError::Callback`.
    Fail(BoxError),
}

/// Returns the inclusive ranges of valid window origins, or `None` when no
/// window fits (empty images or a sample larger than the canvas).
pub(crate) fn placement_range(
    canvas: PixelView<'_>,
    sample: PixelView<'_>,
) -> Option<(usize, usize)> {
    if canvas.is_empty() || sample.is_empty() {
        return None;
    }
    if sample.width() > canvas.width() || sample.height() > canvas.height() {
        return None;
    }
    Some((canvas.width() - sample.width(), canvas.height() - sample.height()))
}

/// Builds the match for an accepted window at placement `(x, y)`.
#[inline]
pub(crate) fn make_match(
    canvas: PixelView<'_>,
    sample: PixelView<'_>,
    x: usize,
    y: usize,
    diff: u64,
    thresholds: &Thresholds,
) -> Match {
    let (ox, oy) = canvas.origin();
    Match {
        rect: Rect::new(
            ox.saturating_add(x),
            oy.saturating_add(y),
            sample.width(),
            sample.height(),
        ),
        similarity: thresholds.similarity(diff),
    }
}

pub(crate) fn cancelled() -> LocateError {
    LocateError::Cancelled {
        partial: Vec::new(),
    }
}

/// Scans every window of `canvas` in row-major order and hands each accepted
/// window to `visit`.
///
/// The cancellation token is checked at the start of every row. An oversized
/// or empty sample yields an empty, successful scan; that check happens before
/// the token is looked at. The `Cancelled` error produced here carries no
/// matches; collectors attach their partial results.
pub fn scan<K, F>(
    canvas: PixelView<'_>,
    sample: PixelView<'_>,
    thresholds: &Thresholds,
    cancel: &CancelToken,
    mut visit: F,
) -> LocateResult<()>
where
    K: WindowKernel,
    F: FnMut(Match) -> Visit,
{
    let Some((max_x, max_y)) = placement_range(canvas, sample) else {
        return Ok(());
    };

    let mut emitted = 0usize;
    for y in 0..=max_y {
        if cancel.is_cancelled() {
            trace_debug!("scan_cancelled", row = y, emitted = emitted);
            return Err(cancelled());
        }
        for x in 0..=max_x {
            let Some(diff) = K::window_diff(canvas, sample, x, y, thresholds) else {
                continue;
            };
            emitted += 1;
            match visit(make_match(canvas, sample, x, y, diff, thresholds)) {
                Visit::Continue => {}
                Visit::Stop => {
                    trace_event!("scan_stopped", row = y, emitted = emitted);
                    return Ok(());
                }
                Visit::Fail(err) => return Err(LocateError::Callback(err)),
            }
        }
    }

    trace_event!("scan_finished", emitted = emitted);
    Ok(())
}
