//! Canonical RGBA pixel views and buffers.
//!
//! `PixelView` is a borrowed 2D view into a byte buffer holding 4 bytes per
//! pixel in R, G, B, A order. The stride counts **bytes** between the starts of
//! consecutive rows, so a stride larger than `4 * width` represents padded rows.
//! ROI slices are zero-copy views into the same backing slice; they keep the
//! stride and accumulate an origin so coordinates stay in the parent's space.

use crate::util::{LocateError, LocateResult};

pub mod convert;
#[cfg(feature = "image-io")]
pub mod io;
mod owned;

pub use owned::PixelBuffer;

/// Bytes per canonical pixel.
pub const PIXEL_SIZE: usize = 4;

/// Borrowed RGBA8 view with an explicit byte stride.
///
/// Zero-sized views are valid; searching them yields no matches.
#[derive(Copy, Clone, Debug)]
pub struct PixelView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
    origin: (usize, usize),
}

impl<'a> PixelView<'a> {
    /// Creates a contiguous view with `stride == 4 * width`.
    pub fn from_slice(data: &'a [u8], width: usize, height: usize) -> LocateResult<Self> {
        let stride = width
            .checked_mul(PIXEL_SIZE)
            .ok_or(LocateError::InvalidDimensions { width, height })?;
        Self::new(data, width, height, stride)
    }

    /// Creates a view with an explicit stride in bytes.
    pub fn new(data: &'a [u8], width: usize, height: usize, stride: usize) -> LocateResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(LocateError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
            origin: (0, 0),
        })
    }

    /// Returns a copy of this view that reports coordinates relative to `origin`.
    ///
    /// Match coordinates are `origin + position` and saturate at `usize::MAX`.
    pub fn with_origin(mut self, x: usize, y: usize) -> Self {
        self.origin = (x, y);
        self
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in bytes between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the top-left corner of this view in its parent's coordinates.
    pub fn origin(&self) -> (usize, usize) {
        self.origin
    }

    /// Returns true when the view holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the RGBA bytes of row `y`, exactly `4 * width` long.
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width * PIXEL_SIZE)?;
        self.data.get(start..end)
    }

    /// Returns the RGBA value at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width {
            return None;
        }
        let row = self.row(y)?;
        let idx = x * PIXEL_SIZE;
        Some([row[idx], row[idx + 1], row[idx + 2], row[idx + 3]])
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    ///
    /// The ROI's origin is this view's origin plus `(x, y)`; an origin that
    /// does not fit in `usize` is reported as out of bounds.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> LocateResult<PixelView<'a>> {
        let out_of_bounds = || LocateError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        match (x.checked_add(width), y.checked_add(height)) {
            (Some(end_x), Some(end_y)) if end_x <= self.width && end_y <= self.height => {}
            _ => return Err(out_of_bounds()),
        }

        let origin = match (self.origin.0.checked_add(x), self.origin.1.checked_add(y)) {
            (Some(ox), Some(oy)) => (ox, oy),
            _ => return Err(out_of_bounds()),
        };
        if width == 0 || height == 0 {
            return Ok(PixelView {
                data: &[],
                width,
                height,
                stride: width * PIXEL_SIZE,
                origin,
            });
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x * PIXEL_SIZE))
            .ok_or(LocateError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(LocateError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        Ok(PixelView::new(data, width, height, self.stride)?.with_origin(origin.0, origin.1))
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> LocateResult<usize> {
    let row_bytes = width
        .checked_mul(PIXEL_SIZE)
        .ok_or(LocateError::InvalidDimensions { width, height })?;
    if stride < row_bytes {
        return Err(LocateError::InvalidStride { width, stride });
    }
    if width == 0 || height == 0 {
        return Ok(0);
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(row_bytes))
        .ok_or(LocateError::InvalidDimensions { width, height })?;
    Ok(needed)
}
