//! Property checks on randomized low-contrast canvases.
//!
//! Canvases are noise in a narrow band so that small tolerances admit a
//! meaningful number of windows. Every search is compared against a
//! straightforward reference that measures each window in full.

use locate_image::lowlevel::{pixel_delta, Thresholds};
use locate_image::{
    find_all, find_one, for_each, CancelToken, LocateError, Match, PixelBuffer, PixelView, Rect,
    Selection, Visit,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const TOLERANCES: [f64; 6] = [0.0, 0.002, 0.005, 0.01, 0.02, 0.05];

fn noisy_canvas(rng: &mut StdRng, width: usize, height: usize) -> PixelBuffer {
    let mut canvas = PixelBuffer::filled(width, height, [0, 0, 0, 255]).unwrap();
    for y in 0..height {
        for x in 0..width {
            let base: u8 = rng.random_range(96..104);
            let rgba = [
                base,
                base.wrapping_add(rng.random_range(0..3)),
                base.wrapping_sub(rng.random_range(0..3)),
                rng.random(),
            ];
            canvas.put_pixel(x, y, rgba);
        }
    }
    canvas
}

/// Crops a random sample from `canvas` so at least one exact match exists.
fn sample_from(
    rng: &mut StdRng,
    canvas: &PixelBuffer,
    width: usize,
    height: usize,
) -> PixelBuffer {
    let x = rng.random_range(0..=canvas.width() - width);
    let y = rng.random_range(0..=canvas.height() - height);
    canvas.crop(Rect::new(x, y, width, height)).unwrap()
}

/// Measures every window in full, in row-major order.
fn reference(canvas: PixelView<'_>, sample: PixelView<'_>, tolerance: f64) -> Vec<Match> {
    let th = Thresholds::derive(tolerance, sample.width(), sample.height());
    let mut out = Vec::new();
    if sample.width() > canvas.width() || sample.height() > canvas.height() {
        return out;
    }
    for y in 0..=canvas.height() - sample.height() {
        for x in 0..=canvas.width() - sample.width() {
            let mut total = 0u64;
            let mut worst = 0u32;
            for sy in 0..sample.height() {
                for sx in 0..sample.width() {
                    let a = canvas.pixel(x + sx, y + sy).unwrap();
                    let b = sample.pixel(sx, sy).unwrap();
                    let d = pixel_delta(&a, &b);
                    worst = worst.max(d);
                    total += u64::from(d);
                }
            }
            if worst <= th.pixel && total <= th.window {
                out.push(Match {
                    rect: Rect::new(x, y, sample.width(), sample.height()),
                    similarity: th.similarity(total),
                });
            }
        }
    }
    out
}

fn by_position(matches: &mut [Match]) {
    matches.sort_by_key(|m| (m.rect.y, m.rect.x));
}

fn scan_order(canvas: PixelView<'_>, sample: PixelView<'_>, tolerance: f64) -> Vec<Match> {
    let mut seen = Vec::new();
    for_each(canvas, sample, tolerance, &CancelToken::new(), |m| {
        seen.push(m);
        Visit::Continue
    })
    .unwrap();
    seen
}

fn cases() -> Vec<(PixelBuffer, PixelBuffer)> {
    let mut rng = StdRng::seed_from_u64(0x5eed_1234);
    (0..6)
        .map(|i| {
            let canvas = noisy_canvas(&mut rng, 20 + i * 3, 16 + i);
            let (w, h) = [(1, 1), (2, 2), (3, 2), (4, 3), (2, 5), (5, 4)][i];
            let sample = sample_from(&mut rng, &canvas, w, h);
            (canvas, sample)
        })
        .collect()
}

#[test]
fn scan_agrees_with_reference() {
    for (canvas, sample) in cases() {
        for t in TOLERANCES {
            let expected = reference(canvas.view(), sample.view(), t);
            let seen = scan_order(canvas.view(), sample.view(), t);
            assert_eq!(seen, expected, "tolerance {t}");
        }
    }
}

#[test]
fn find_all_is_sorted_and_free_of_duplicates() {
    for (canvas, sample) in cases() {
        for t in TOLERANCES {
            let found = find_all(canvas.view(), sample.view(), t, &CancelToken::new()).unwrap();
            let rects: HashSet<Rect> = found.iter().map(|m| m.rect).collect();
            assert_eq!(rects.len(), found.len());
            for pair in found.windows(2) {
                assert!(pair[0].before(&pair[1]), "{} before {}", pair[1], pair[0]);
            }

            let expected = reference(canvas.view(), sample.view(), t);
            let mut scanned = found.clone();
            by_position(&mut scanned);
            assert_eq!(scanned, expected, "tolerance {t}");
        }
    }
}

#[test]
fn large_sample_ranking_keeps_adjacent_pairs_ordered() {
    // With a 40x40 sample one unit of difference moves the similarity by less
    // than the ranking precision, so windows with diffs 0, 1 and 2 tie
    // pairwise but not transitively.
    let grey = [100, 100, 100, 255];
    let mut canvas = PixelBuffer::filled(40, 100, grey).unwrap();
    canvas.put_pixel(0, 0, [102, 100, 100, 255]);
    canvas.put_pixel(0, 50, [101, 100, 100, 255]);
    let sample = PixelBuffer::filled(40, 40, grey).unwrap();

    let found = find_all(canvas.view(), sample.view(), 0.001, &CancelToken::new()).unwrap();
    assert_eq!(found.len(), 61);
    for pair in found.windows(2) {
        assert!(pair[0].before(&pair[1]), "{} then {}", pair[0], pair[1]);
    }

    let th = Thresholds::derive(0.001, 40, 40);
    let similarity_at = |y: usize| {
        found
            .iter()
            .find(|m| m.rect == Rect::new(0, y, 40, 40))
            .map(|m| m.similarity)
    };
    assert_eq!(similarity_at(0), Some(th.similarity(2)));
    assert_eq!(similarity_at(50), Some(th.similarity(1)));
    assert_eq!(similarity_at(60), Some(1.0));

    let mut scanned = found.clone();
    by_position(&mut scanned);
    assert_eq!(scanned, reference(canvas.view(), sample.view(), 0.001));
}

#[test]
fn zero_tolerance_reports_only_exact_matches() {
    for (canvas, sample) in cases() {
        let found = find_all(canvas.view(), sample.view(), 0.0, &CancelToken::new()).unwrap();
        assert!(!found.is_empty(), "the sample was cropped from the canvas");
        assert!(found.iter().all(|m| m.similarity == 1.0));
    }
}

#[test]
fn similarity_respects_tolerance() {
    for (canvas, sample) in cases() {
        let th = Thresholds::derive(0.0, sample.width(), sample.height());
        // Round-half-up on the window budget admits up to half a unit more.
        let slack = 0.5 / th.max_total as f64 + 1e-12;
        for t in TOLERANCES {
            for m in find_all(canvas.view(), sample.view(), t, &CancelToken::new()).unwrap() {
                assert!(m.similarity >= 1.0 - t - slack, "{m} at tolerance {t}");
                assert!(m.similarity <= 1.0);
            }
        }
    }
}

#[test]
fn larger_tolerance_never_loses_matches() {
    for (canvas, sample) in cases() {
        let mut previous: HashSet<Rect> = HashSet::new();
        for t in TOLERANCES {
            let current: HashSet<Rect> = scan_order(canvas.view(), sample.view(), t)
                .into_iter()
                .map(|m| m.rect)
                .collect();
            assert!(previous.is_subset(&current), "tolerance {t}");
            previous = current;
        }
    }
}

#[test]
fn selections_agree_with_scan_order() {
    let cancel = CancelToken::new();
    for (canvas, sample) in cases() {
        for t in TOLERANCES {
            let seen = scan_order(canvas.view(), sample.view(), t);
            let pick = |selection| find_one(canvas.view(), sample.view(), t, selection, &cancel);
            let first = pick(Selection::FirstEncountered);
            let best = pick(Selection::BestOverall);
            let only = pick(Selection::BestOverallUnique);

            if seen.is_empty() {
                assert!(first.unwrap_err().is_not_found());
                assert!(best.unwrap_err().is_not_found());
                assert!(only.unwrap_err().is_not_found());
                continue;
            }

            assert_eq!(first.unwrap(), seen[0]);

            // Ties on similarity go to the earliest window in scan order.
            let top = seen.iter().map(|m| m.similarity).fold(f64::MIN, f64::max);
            let expected_best = *seen.iter().find(|m| m.similarity == top).unwrap();
            assert_eq!(best.unwrap(), expected_best);

            match only {
                Ok(m) => {
                    assert_eq!(seen.len(), 1);
                    assert_eq!(m, expected_best);
                }
                Err(LocateError::MultipleFound { best, count }) => {
                    assert_eq!(count, seen.len());
                    assert!(count >= 2);
                    assert_eq!(best, expected_best);
                }
                Err(other) => panic!("unexpected error {other:?}"),
            }
        }
    }
}

#[test]
fn oversized_sample_matches_nothing() {
    let mut rng = StdRng::seed_from_u64(7);
    let canvas = noisy_canvas(&mut rng, 8, 6);
    let cancel = CancelToken::new();
    for (w, h) in [(9, 1), (1, 7), (9, 7)] {
        let sample = PixelBuffer::filled(w, h, [100, 100, 100, 255]).unwrap();
        assert!(find_all(canvas.view(), sample.view(), 1.0, &cancel).unwrap().is_empty());
        for selection in [
            Selection::FirstEncountered,
            Selection::BestOverall,
            Selection::BestOverallUnique,
        ] {
            let err = find_one(canvas.view(), sample.view(), 1.0, selection, &cancel).unwrap_err();
            assert!(err.is_not_found());
        }
        let mut calls = 0;
        for_each(canvas.view(), sample.view(), 1.0, &cancel, |_| {
            calls += 1;
            Visit::Continue
        })
        .unwrap();
        assert_eq!(calls, 0);
    }
}

#[test]
fn full_tolerance_accepts_every_placement() {
    let mut rng = StdRng::seed_from_u64(11);
    let canvas = noisy_canvas(&mut rng, 9, 7);
    let sample = PixelBuffer::filled(3, 2, [255, 255, 255, 0]).unwrap();
    let found = find_all(canvas.view(), sample.view(), 1.0, &CancelToken::new()).unwrap();
    assert_eq!(found.len(), 7 * 6);
}

#[test]
fn invalid_tolerance_is_rejected() {
    let canvas = PixelBuffer::filled(4, 4, [0, 0, 0, 255]).unwrap();
    let sample = PixelBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap();
    for t in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
        let err = find_all(canvas.view(), sample.view(), t, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, LocateError::InvalidInput(_)), "tolerance {t}");
    }
}
