// Passes - the stream migration inspection and its synthesis/emission stages

pub mod emit;
pub mod stream_migration;
pub mod synthesize;

pub use emit::*;
pub use stream_migration::*;
pub use synthesize::*;
