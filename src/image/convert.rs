//! Conversion of arbitrary interleaved 8-bit buffers into canonical RGBA8.
//!
//! The search core only reads canonical RGBA8 pixels. Screen grabbers and
//! decoders often produce BGRA, RGB or greyscale, so this module rewrites those
//! layouts once up front. A buffer that is already RGBA8 can be borrowed
//! directly with [`PixelView::from_raw`] without copying.

use crate::image::{PixelBuffer, PixelView, PIXEL_SIZE};
use crate::util::{LocateError, LocateResult};

/// Interleaved 8-bit channel layouts understood by [`to_canonical`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// Canonical layout: R, G, B, A.
    Rgba8,
    /// B, G, R, A (common for screen captures).
    Bgra8,
    /// R, G, B without alpha.
    Rgb8,
    /// B, G, R without alpha.
    Bgr8,
    /// Single luminance channel.
    Luma8,
    /// Luminance plus alpha.
    LumaA8,
}

impl PixelLayout {
    /// Returns the number of bytes per pixel.
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Rgba8 | PixelLayout::Bgra8 => 4,
            PixelLayout::Rgb8 | PixelLayout::Bgr8 => 3,
            PixelLayout::LumaA8 => 2,
            PixelLayout::Luma8 => 1,
        }
    }

    fn to_rgba(self, px: &[u8]) -> [u8; 4] {
        match self {
            PixelLayout::Rgba8 => [px[0], px[1], px[2], px[3]],
            PixelLayout::Bgra8 => [px[2], px[1], px[0], px[3]],
            PixelLayout::Rgb8 => [px[0], px[1], px[2], 255],
            PixelLayout::Bgr8 => [px[2], px[1], px[0], 255],
            PixelLayout::Luma8 => [px[0], px[0], px[0], 255],
            PixelLayout::LumaA8 => [px[0], px[0], px[0], px[1]],
        }
    }
}

/// Caller-owned interleaved pixels in any supported layout.
#[derive(Clone, Copy, Debug)]
pub struct RawImage<'a> {
    /// Backing bytes, including any row padding.
    pub data: &'a [u8],
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Bytes between row starts.
    pub stride: usize,
    /// Channel layout of each pixel.
    pub layout: PixelLayout,
}

impl<'a> RawImage<'a> {
    /// Describes a tightly packed buffer (`stride == channels * width`).
    pub fn packed(data: &'a [u8], width: usize, height: usize, layout: PixelLayout) -> Self {
        Self {
            data,
            width,
            height,
            stride: width.saturating_mul(layout.channels()),
            layout,
        }
    }

    fn row(&self, y: usize) -> LocateResult<&'a [u8]> {
        let row_bytes = self.width * self.layout.channels();
        let start = y * self.stride;
        self.data
            .get(start..start + row_bytes)
            .ok_or(LocateError::BufferTooSmall {
                needed: start + row_bytes,
                got: self.data.len(),
            })
    }
}

impl<'a> PixelView<'a> {
    /// Borrows a raw image that is already canonical RGBA8.
    ///
    /// Any other layout is rejected with `UnsupportedFormat`; run it through
    /// [`to_canonical`] first.
    pub fn from_raw(raw: RawImage<'a>) -> LocateResult<Self> {
        if raw.layout != PixelLayout::Rgba8 {
            return Err(LocateError::UnsupportedFormat { layout: raw.layout });
        }
        PixelView::new(raw.data, raw.width, raw.height, raw.stride)
    }
}

/// Converts any supported layout into an owned canonical buffer.
pub fn to_canonical(raw: RawImage<'_>) -> LocateResult<PixelBuffer> {
    let channels = raw.layout.channels();
    let row_bytes = raw
        .width
        .checked_mul(channels)
        .ok_or(LocateError::InvalidDimensions {
            width: raw.width,
            height: raw.height,
        })?;
    if raw.stride < row_bytes {
        return Err(LocateError::InvalidStride {
            width: raw.width,
            stride: raw.stride,
        });
    }

    let mut data = Vec::with_capacity(raw.width * raw.height * PIXEL_SIZE);
    for y in 0..raw.height {
        let row = raw.row(y)?;
        if raw.layout == PixelLayout::Rgba8 {
            data.extend_from_slice(row);
            continue;
        }
        for px in row.chunks_exact(channels) {
            data.extend_from_slice(&raw.layout.to_rgba(px));
        }
    }
    PixelBuffer::new(data, raw.width, raw.height)
}

#[cfg(test)]
mod tests {
    use super::{to_canonical, PixelLayout, RawImage};
    use crate::image::PixelView;
    use crate::util::LocateError;

    #[test]
    fn bgra_swaps_red_and_blue() {
        let data = [10u8, 20, 30, 40, 1, 2, 3, 4];
        let raw = RawImage::packed(&data, 2, 1, PixelLayout::Bgra8);
        let buf = to_canonical(raw).unwrap();
        assert_eq!(buf.data(), &[30, 20, 10, 40, 3, 2, 1, 4]);
    }

    #[test]
    fn luma_expands_to_grey_opaque() {
        let data = [7u8, 200];
        let raw = RawImage::packed(&data, 1, 2, PixelLayout::Luma8);
        let buf = to_canonical(raw).unwrap();
        assert_eq!(buf.view().pixel(0, 1), Some([200, 200, 200, 255]));
    }

    #[test]
    fn padded_rgb_rows_are_compacted() {
        // 2x2 RGB with 2 bytes of padding per row.
        let data = [
            1u8, 2, 3, 4, 5, 6, 0, 0, //
            7, 8, 9, 10, 11, 12, 0, 0,
        ];
        let raw = RawImage {
            data: &data,
            width: 2,
            height: 2,
            stride: 8,
            layout: PixelLayout::Rgb8,
        };
        let buf = to_canonical(raw).unwrap();
        assert_eq!(buf.stride(), 8);
        assert_eq!(buf.view().pixel(1, 1), Some([10, 11, 12, 255]));
    }

    #[test]
    fn from_raw_rejects_non_canonical_layouts() {
        let data = [0u8; 12];
        let raw = RawImage::packed(&data, 2, 2, PixelLayout::Rgb8);
        let err = PixelView::from_raw(raw).unwrap_err();
        assert!(matches!(
            err,
            LocateError::UnsupportedFormat {
                layout: PixelLayout::Rgb8
            }
        ));

        let rgba = [0u8; 16];
        let view = PixelView::from_raw(RawImage::packed(&rgba, 2, 2, PixelLayout::Rgba8)).unwrap();
        assert_eq!(view.width(), 2);
    }

    #[test]
    fn short_buffer_is_reported() {
        let data = [0u8; 5];
        let raw = RawImage::packed(&data, 2, 1, PixelLayout::Rgb8);
        assert!(matches!(
            to_canonical(raw),
            Err(LocateError::BufferTooSmall { needed: 6, got: 5 })
        ));
    }
}
