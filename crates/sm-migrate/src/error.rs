use sm_core::error::Error;
use sm_core::span::Span;

/// Create a synthesis invariant error
pub fn synthesis_error(message: impl Into<String>) -> Error {
    Error::synthesis(message)
}

/// Create a synthesis invariant error pointing at a source span
pub fn synthesis_error_with_span(message: impl Into<String>, span: Span) -> Error {
    let msg = format!("{} [span {}:{}]", message.into(), span.lo, span.hi);
    Error::synthesis(msg)
}

// Convenience macros for synthesis-time invariant checks

/// Macro to return early with a synthesis invariant error
#[macro_export]
macro_rules! synth_bail {
    ($message:expr) => {
        return Err($crate::error::synthesis_error($message))
    };
    ($message:expr, $span:expr) => {
        return Err($crate::error::synthesis_error_with_span($message, $span))
    };
}

/// Macro to ensure a condition is true, or return a synthesis invariant error
#[macro_export]
macro_rules! synth_ensure {
    ($cond:expr, $message:expr) => {
        if !($cond) {
            $crate::synth_bail!($message);
        }
    };
    ($cond:expr, $message:expr, $span:expr) => {
        if !($cond) {
            $crate::synth_bail!($message, $span);
        }
    };
}
