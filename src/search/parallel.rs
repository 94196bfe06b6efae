//! Row-parallel scan (feature-gated).
//!
//! Rows are evaluated in batches on the rayon pool; each row polls the
//! cancellation token before doing any work. Matches are then replayed to the
//! visitor strictly in row-major order, so first-encountered and tie-breaking
//! semantics are identical to the sequential scan. The token is polled again
//! before each row is replayed, so a visitor that cancels sees the same
//! partial result as in the sequential scan. A batch is at most a few rows per
//! worker, which bounds the work wasted after a visitor stops or cancels.

use crate::cancel::CancelToken;
use crate::image::PixelView;
use crate::kernel::WindowKernel;
use crate::search::scan::{cancelled, make_match, placement_range, Visit};
use crate::search::Match;
use crate::tolerance::Thresholds;
use crate::trace::{trace_debug, trace_event};
use crate::util::{LocateError, LocateResult};
use rayon::prelude::*;

const ROWS_PER_WORKER: usize = 2;

/// Accepted windows of a single row, in x order.
fn row_matches<K: WindowKernel>(
    canvas: PixelView<'_>,
    sample: PixelView<'_>,
    thresholds: &Thresholds,
    y: usize,
    max_x: usize,
) -> Vec<Match> {
    (0..=max_x)
        .filter_map(|x| {
            K::window_diff(canvas, sample, x, y, thresholds)
                .map(|diff| make_match(canvas, sample, x, y, diff, thresholds))
        })
        .collect()
}

pub(crate) fn scan_par<K, F>(
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

    let batch = rayon::current_num_threads().max(1) * ROWS_PER_WORKER;
    let mut emitted = 0usize;
    let mut y0 = 0usize;
    while y0 <= max_y {
        let y1 = (y0 + batch - 1).min(max_y);
        let rows: Vec<Option<Vec<Match>>> = (y0..=y1)
            .into_par_iter()
            .map(|y| {
                if cancel.is_cancelled() {
                    return None;
                }
                Some(row_matches::<K>(canvas, sample, thresholds, y, max_x))
            })
            .collect();

        for (offset, row) in rows.into_iter().enumerate() {
            let row = match row {
                Some(row) if !cancel.is_cancelled() => row,
                _ => {
                    trace_debug!("scan_cancelled", row = y0 + offset, emitted = emitted);
                    return Err(cancelled());
                }
            };
            for m in row {
                emitted += 1;
                match visit(m) {
                    Visit::Continue => {}
                    Visit::Stop => {
                        trace_event!("scan_stopped", row = y0 + offset, emitted = emitted);
                        return Ok(());
                    }
                    Visit::Fail(err) => return Err(LocateError::Callback(err)),
                }
            }
        }
        y0 = y1 + 1;
    }

    trace_event!("scan_finished", emitted = emitted, parallel = true);
    Ok(())
}
