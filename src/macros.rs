/// Emits a `trace` level event when the `tracing` feature is enabled.
/// Expands to nothing otherwise, arguments are not evaluated.
macro_rules! trace_event {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::trace!($($arg)+);
        }
    };
}

pub(crate) use trace_event;
