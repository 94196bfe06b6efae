//! Optional instrumentation for searches.
//!
//! With the `tracing` feature the macros below forward to the `tracing` crate.
//! Without it they expand to nothing, so call sites stay free of `cfg`.

/// Opens an info-level span around a search.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Emits an info-level event with key/value fields.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
    ($name:expr) => {
        tracing::info!(name: $name)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
    ($name:expr) => {};
}

/// Emits a debug-level event; used on the per-row paths of the scanner.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::debug!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

pub(crate) use trace_debug;
pub(crate) use trace_event;
pub(crate) use trace_span;

/// Stand-in span used when the `tracing` feature is off.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Mirrors `Span::entered()` so `let _guard = trace_span!(..).entered();` compiles.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
