//! locate-image finds occurrences of a small sample image inside a larger
//! canvas, exactly or within a tolerated pixel difference.
//!
//! The search is a brute-force sliding window over canonical RGBA8 pixels
//! with two early exits per window (a per-pixel and a whole-window budget),
//! optional row parallelism via the `rayon` feature, an 8-lane kernel via the
//! `simd` feature, and cooperative cancellation checked between rows.
//!
//! ```
//! use locate_image::{find_one, CancelToken, PixelBuffer, Rect, Selection};
//!
//! let mut canvas = PixelBuffer::filled(100, 100, [255, 255, 255, 255]).unwrap();
//! canvas.fill_rect(Rect::new(15, 15, 10, 10), [255, 0, 0, 255]);
//! let sample = PixelBuffer::filled(10, 10, [255, 0, 0, 255]).unwrap();
//!
//! let found = find_one(
//!     canvas.view(),
//!     sample.view(),
//!     0.0,
//!     Selection::BestOverallUnique,
//!     &CancelToken::new(),
//! )
//! .unwrap();
//! assert_eq!(found.rect, Rect::new(15, 15, 10, 10));
//! assert_eq!(found.similarity, 1.0);
//! ```

pub mod cancel;
pub mod candidate;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod search;
pub mod tolerance;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use image::io;

pub use cancel::CancelToken;
pub use candidate::order::{sort_matches, SIMILARITY_DIGITS, SIMILARITY_PRECISION};
pub use image::convert::{to_canonical, PixelLayout, RawImage};
pub use image::{PixelBuffer, PixelView};
pub use search::{
    find_all, find_one, for_each, LocateConfig, Locator, Match, Rect, Selection, Visit,
};
pub use util::{BoxError, LocateError, LocateResult};
