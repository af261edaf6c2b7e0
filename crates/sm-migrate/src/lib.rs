// sm-migrate: rewrites foreach loops over collections into stream pipelines
//
// Architecture:
// - queries: Stateless analyses of a loop body (control flow, guard chain,
//   action classification, hazards, method-reference reduction)
// - ir: Typed rewrite plans
// - passes: The StreamMigrationPass inspection plus synthesis and emission
// - utils: Verdicts, the LoopInspection trait and the batch runner
//
// Data flows one way: queries -> synthesize -> emit. Only emit mutates the
// tree, through a single committed TreeEdit.

pub mod error;
pub mod ir;
pub mod options;
pub mod passes;
pub mod queries;
pub mod utils;

// Re-export key types for convenience
pub use options::*;
pub use passes::*;
pub use queries::*;
pub use utils::*;
