//! Host-facing analysis services.
//!
//! The rewrite engine never walks control flow or symbol tables itself; it
//! asks a [`Host`] through the traits below. [`SemanticModel`] and
//! [`FlowAnalysis`] are in-memory implementations good enough for tests and
//! for hosts that translate their own trees into [`Tree`].

use crate::ast::{MethodId, NodeId, Tree, TypeRef, VarId};
use crate::error::AnalysisError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

mod flow;
mod host;
mod model;

pub use flow::*;
pub use host::*;
pub use model::*;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitKind {
    #[display("break")]
    Break,
    #[display("continue")]
    Continue,
    #[display("return")]
    Return,
    #[display("throw")]
    Throw,
}

/// Declared shape of a method or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSig {
    /// Declaring class.
    pub owner: String,
    pub name: String,
    pub params: Vec<TypeRef>,
    /// Number of declared type parameters.
    pub type_params: usize,
    pub throws: Vec<TypeRef>,
    /// `None` for `void` methods and constructors.
    pub returns: Option<TypeRef>,
    pub is_static: bool,
}

impl MethodSig {
    pub fn new(owner: &str, name: &str, params: Vec<TypeRef>) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            params,
            type_params: 0,
            throws: Vec::new(),
            returns: None,
            is_static: false,
        }
    }

    /// A constructor of `owner`.
    pub fn constructor(owner: &str, params: Vec<TypeRef>) -> Self {
        Self::new(owner, owner, params)
    }

    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.returns = Some(ty);
        self
    }

    pub fn throwing(mut self, ty: TypeRef) -> Self {
        self.throws.push(ty);
        self
    }

    pub fn with_type_params(mut self, count: usize) -> Self {
        self.type_params = count;
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Control-flow queries over a statement of a tree.
pub trait ControlFlowService {
    /// Statements inside `body` that transfer control out of it.
    fn exit_points(&self, tree: &Tree, body: NodeId) -> AnalysisResult<Vec<(NodeId, ExitKind)>>;

    /// Variables read or written anywhere inside `body`.
    fn used_variables(&self, tree: &Tree, body: NodeId) -> AnalysisResult<BTreeSet<VarId>>;

    /// Variables assigned, incremented or decremented inside `body`.
    fn written_variables(&self, tree: &Tree, body: NodeId) -> AnalysisResult<BTreeSet<VarId>>;

    /// Whether `var` may be captured by a function literal replacing `body`.
    fn is_effectively_final(&self, tree: &Tree, var: VarId, body: NodeId) -> AnalysisResult<bool>;
}

pub trait SymbolResolver {
    fn resolve_variable(&self, tree: &Tree, expr: NodeId) -> Option<VarId>;

    /// Signature of the method or constructor invoked by a call or `new`.
    fn resolve_method(&self, tree: &Tree, call: NodeId) -> Option<MethodSig>;

    fn method(&self, id: MethodId) -> Option<MethodSig>;

    fn type_of(&self, tree: &Tree, expr: NodeId) -> Option<TypeRef>;

    /// Reflexive subtype test on class names. Unknown classes are never
    /// subtypes of anything.
    fn is_subtype(&self, class: &str, ancestor: &str) -> bool;

    /// Unknown exception classes count as checked.
    fn is_unchecked_exception(&self, class: &str) -> bool;

    /// Whether a function literal passed as argument `arg_index` of `call`
    /// gets its target type from context.
    fn is_lambda_target_inferable(&self, tree: &Tree, call: NodeId, arg_index: usize) -> bool;
}

pub trait ReferenceSearch {
    /// Expressions under `scope` that refer to `var`.
    fn references_in(&self, tree: &Tree, var: VarId, scope: NodeId) -> Vec<NodeId>;
}

pub trait CodeFormatter {
    /// Called once a rewrite has been committed.
    fn reformat(&self, _tree: &Tree, _node: NodeId) {}
}

/// Everything the rewrite engine needs from its environment.
pub trait Host: ControlFlowService + SymbolResolver + ReferenceSearch + CodeFormatter {}

impl<T> Host for T where T: ControlFlowService + SymbolResolver + ReferenceSearch + CodeFormatter {}
