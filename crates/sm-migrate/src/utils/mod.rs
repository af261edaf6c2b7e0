// Utils - shared utilities and helper components

pub mod inspection;
pub mod runner;
pub mod verdict;

pub use inspection::*;
pub use runner::*;
pub use verdict::*;
