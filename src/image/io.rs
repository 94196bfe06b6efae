//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{PixelBuffer, PixelView};
use crate::util::{LocateError, LocateResult};
use std::path::Path;

/// Creates a borrowed view from an RGBA image buffer without copying.
pub fn view_from_rgba_image(img: &image::RgbaImage) -> LocateResult<PixelView<'_>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    PixelView::from_slice(img.as_raw(), width, height)
}

/// Creates an owned canonical buffer from an RGBA image buffer.
pub fn owned_from_rgba_image(img: &image::RgbaImage) -> LocateResult<PixelBuffer> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    PixelBuffer::new(img.as_raw().clone(), width, height)
}

/// Converts any decoded image into an owned canonical buffer.
///
/// RGBA8 input is copied as is; every other colour type goes through
/// `image`'s RGBA conversion.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> LocateResult<PixelBuffer> {
    match img {
        image::DynamicImage::ImageRgba8(rgba) => owned_from_rgba_image(rgba),
        other => owned_from_rgba_image(&other.to_rgba8()),
    }
}

/// Loads an image from disk and converts it to a canonical buffer.
pub fn load_rgba_image<P: AsRef<Path>>(path: P) -> LocateResult<PixelBuffer> {
    let img = image::open(path).map_err(|err| LocateError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}
