//! Scalar reference kernel.

use crate::image::{PixelView, PIXEL_SIZE};
use crate::kernel::{pixel_delta, WindowKernel};
use crate::tolerance::Thresholds;

/// Pixel-by-pixel kernel checking both budgets after every pixel.
pub struct ScalarKernel;

impl WindowKernel for ScalarKernel {
    fn window_diff(
        canvas: PixelView<'_>,
        sample: PixelView<'_>,
        x: usize,
        y: usize,
        thresholds: &Thresholds,
    ) -> Option<u64> {
        let pixel_limit = thresholds.pixel;
        let window_limit = thresholds.window;
        let row_bytes = sample.width() * PIXEL_SIZE;
        let x_off = x * PIXEL_SIZE;

        let mut diff = 0u64;
        for sy in 0..sample.height() {
            let canvas_row = canvas.row(y + sy)?;
            let sample_row = sample.row(sy)?;
            let window_row = canvas_row.get(x_off..x_off + row_bytes)?;
            for (cpx, spx) in window_row
                .chunks_exact(PIXEL_SIZE)
                .zip(sample_row.chunks_exact(PIXEL_SIZE))
            {
                let delta = pixel_delta(cpx, spx);
                if delta > pixel_limit {
                    return None;
                }
                diff += delta as u64;
                if diff > window_limit {
                    return None;
                }
            }
        }
        Some(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::ScalarKernel;
    use crate::image::PixelBuffer;
    use crate::kernel::{pixel_delta, WindowKernel};
    use crate::search::Rect;
    use crate::tolerance::Thresholds;

    #[test]
    fn pixel_delta_ignores_alpha() {
        assert_eq!(pixel_delta(&[255, 0, 0, 0], &[250, 5, 5, 255]), 15);
    }

    #[test]
    fn exact_window_has_zero_diff() {
        let mut canvas = PixelBuffer::filled(6, 6, [255, 255, 255, 255]).unwrap();
        canvas.fill_rect(Rect::new(2, 3, 2, 2), [255, 0, 0, 255]);
        let sample = PixelBuffer::filled(2, 2, [255, 0, 0, 255]).unwrap();
        let th = Thresholds::derive(0.0, 2, 2);
        let diff = ScalarKernel::window_diff(canvas.view(), sample.view(), 2, 3, &th);
        assert_eq!(diff, Some(0));
        let miss = ScalarKernel::window_diff(canvas.view(), sample.view(), 1, 3, &th);
        assert_eq!(miss, None);
    }

    #[test]
    fn single_outlier_pixel_is_rejected_even_with_window_budget() {
        let mut canvas = PixelBuffer::filled(4, 4, [100, 100, 100, 255]).unwrap();
        canvas.put_pixel(3, 3, [0, 100, 100, 255]);
        let sample = PixelBuffer::filled(4, 4, [100, 100, 100, 255]).unwrap();
        // Window budget is large (0.2 * 16 * 765 = 2448) but the per-pixel
        // budget is round(3 * 256 * 0.4) = 307 > 100, so this passes...
        let th = Thresholds::derive(0.2, 4, 4);
        assert_eq!(
            ScalarKernel::window_diff(canvas.view(), sample.view(), 0, 0, &th),
            Some(100)
        );
        // ...while at 0.05 the per-pixel budget is round(76.8) = 77 < 100.
        let th = Thresholds::derive(0.05, 4, 4);
        assert!(th.window >= 100);
        assert_eq!(
            ScalarKernel::window_diff(canvas.view(), sample.view(), 0, 0, &th),
            None
        );
    }

    #[test]
    fn window_budget_rejects_accumulated_difference() {
        let canvas = PixelBuffer::filled(3, 3, [10, 10, 10, 255]).unwrap();
        let sample = PixelBuffer::filled(3, 3, [12, 12, 12, 255]).unwrap();
        // Each pixel differs by 6; 9 pixels sum to 54.
        let tight = Thresholds {
            pixel: 6,
            window: 53,
            max_total: 9 * 765,
        };
        let loose = Thresholds { window: 54, ..tight };
        assert_eq!(
            ScalarKernel::window_diff(canvas.view(), sample.view(), 0, 0, &tight),
            None
        );
        assert_eq!(
            ScalarKernel::window_diff(canvas.view(), sample.view(), 0, 0, &loose),
            Some(54)
        );
    }
}
