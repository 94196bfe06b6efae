//! Low-level building blocks for custom search pipelines.
//!
//! These expose the window kernels, threshold derivation, the raw scan loop
//! and the collector strategies used by [`Locator`](crate::Locator). Most
//! users should prefer `find_all`, `find_one` and `for_each`.

pub use crate::candidate::collect::{BestFound, CollectAll, Collector, FirstFound};
pub use crate::kernel::scalar::ScalarKernel;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::SimdKernel;
pub use crate::kernel::{pixel_delta, DefaultKernel, WindowKernel};
pub use crate::search::scan::scan;
pub use crate::tolerance::{validate_tolerance, Thresholds};
