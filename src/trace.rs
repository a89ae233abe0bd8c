//! Tracing hooks that vanish when the `tracing` feature is off.
//!
//! Pipeline stages open spans with `trace_span!` and report counts with
//! `trace_event!(level, name, key = value, ...)`, where `level` is one of the
//! `tracing` level macros (`info`, `debug`, ...). Without the feature the span
//! macro yields a [`NoopSpan`] and events only evaluate their field values.

#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info_span!($name $(, $key = $value)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $key:ident = $value:expr)* $(,)?) => {{
        $(let _ = $value;)*
        $crate::trace::NoopSpan
    }};
}

#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($level:ident, $name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::$level!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($level:ident, $name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        $(let _ = $value;)+
    };
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Stand-in for an entered span when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
