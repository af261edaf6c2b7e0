#[macro_use]
pub mod macros;

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pretty;
pub mod printer;
pub mod semantics;
pub mod span;

// Re-export commonly used items for convenience
pub use tracing;

pub use printer::SourcePrinter;

// Alias for error types
pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
