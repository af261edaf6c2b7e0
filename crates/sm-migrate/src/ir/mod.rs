// IR - typed rewrite plans produced by synthesis and consumed by emission

pub mod pipeline;

pub use pipeline::*;
