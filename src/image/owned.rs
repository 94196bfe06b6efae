//! Owned contiguous RGBA buffers.

use crate::image::{PixelView, PIXEL_SIZE};
use crate::search::Rect;
use crate::util::{LocateError, LocateResult};

/// Owned canonical RGBA8 buffer with `stride == 4 * width`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl PixelBuffer {
    /// Wraps a contiguous RGBA8 buffer. The length must be exactly `4 * width * height`.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> LocateResult<Self> {
        let needed = byte_len(width, height)?;
        if data.len() < needed {
            return Err(LocateError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(LocateError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates a buffer filled with a single RGBA colour.
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> LocateResult<Self> {
        let pixels = width
            .checked_mul(height)
            .ok_or(LocateError::InvalidDimensions { width, height })?;
        let data = rgba.repeat(pixels);
        Self::new(data, width, height)
    }

    /// Paints `rect` with `rgba`, clipped to the buffer bounds.
    pub fn fill_rect(&mut self, rect: Rect, rgba: [u8; 4]) {
        let x1 = rect.right().min(self.width);
        let y1 = rect.bottom().min(self.height);
        if rect.x >= x1 || rect.y >= y1 {
            return;
        }
        let stride = self.stride();
        for y in rect.y..y1 {
            let start = y * stride + rect.x * PIXEL_SIZE;
            let end = y * stride + x1 * PIXEL_SIZE;
            for px in self.data[start..end].chunks_exact_mut(PIXEL_SIZE) {
                px.copy_from_slice(&rgba);
            }
        }
    }

    /// Sets a single pixel; out-of-bounds coordinates are ignored.
    pub fn put_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.stride() + x * PIXEL_SIZE;
        self.data[idx..idx + PIXEL_SIZE].copy_from_slice(&rgba);
    }

    /// Copies a rectangular region into a new buffer.
    pub fn crop(&self, rect: Rect) -> LocateResult<PixelBuffer> {
        let roi = self.view().roi(rect.x, rect.y, rect.width, rect.height)?;
        let mut data = Vec::with_capacity(rect.area() * PIXEL_SIZE);
        for y in 0..roi.height() {
            if let Some(row) = roi.row(y) {
                data.extend_from_slice(row);
            }
        }
        Self::new(data, rect.width, rect.height)
    }

    /// Returns a borrowed view of the whole buffer.
    pub fn view(&self) -> PixelView<'_> {
        PixelView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.stride(),
            origin: (0, 0),
        }
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in bytes.
    pub fn stride(&self) -> usize {
        self.width * PIXEL_SIZE
    }

    /// Returns the raw RGBA bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer and returns the raw RGBA bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

fn byte_len(width: usize, height: usize) -> LocateResult<usize> {
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(PIXEL_SIZE))
        .ok_or(LocateError::InvalidDimensions { width, height })
}
