// Queries - stateless operations for extracting information from loop bodies

pub mod action;
pub mod control_flow;
pub mod guard_chain;
pub mod hazard;
pub mod method_ref;

pub use action::*;
pub use control_flow::*;
pub use guard_chain::*;
pub use hazard::*;
pub use method_ref::*;
