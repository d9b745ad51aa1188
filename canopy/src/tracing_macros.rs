//! Logging macros that forward to `tracing` when the `tracing` feature is
//! enabled and expand to nothing otherwise.

#[cfg(feature = "tracing")]
#[doc(hidden)]
#[macro_export]
macro_rules! trace {
    ($($tt:tt)*) => { ::tracing::trace!($($tt)*) };
}

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! trace {
    ($($tt:tt)*) => {{}};
}

#[cfg(feature = "tracing")]
#[doc(hidden)]
#[macro_export]
macro_rules! debug {
    ($($tt:tt)*) => { ::tracing::debug!($($tt)*) };
}

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! debug {
    ($($tt:tt)*) => {{}};
}

#[cfg(feature = "tracing")]
#[doc(hidden)]
#[macro_export]
macro_rules! warn {
    ($($tt:tt)*) => { ::tracing::warn!($($tt)*) };
}

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! warn {
    ($($tt:tt)*) => {{}};
}
