//! Typed description of the pipeline replacing a loop.
//!
//! Plans reference existing nodes (conditions, mapped values, the action)
//! by id; those subtrees move into the emitted expression unchanged. New
//! syntax is only created when the plan is lowered by the emitter.

use sm_core::ast::{NodeId, TypeRef, VarId};

/// What stands before `::` in a method reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodRefQualifier {
    /// `Owner::m` for static methods, `Param::m` for unbound receivers and
    /// `T::new` for constructors.
    Type(TypeRef),
    This,
    Super,
    /// A bound receiver reused from the original call.
    Expr(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LambdaBody {
    /// `x -> expr`
    Expr(NodeId),
    /// `x -> { ... }` reusing an existing block.
    Block(NodeId),
    /// `x -> { stmt }` with a fresh block around a single statement.
    Wrapped(NodeId),
}

/// A function-typed argument of a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionalArg {
    MethodRef {
        qualifier: MethodRefQualifier,
        method: String,
    },
    Lambda {
        param: VarId,
        body: LambdaBody,
    },
}

impl FunctionalArg {
    pub fn lambda(param: VarId, body: LambdaBody) -> Self {
        FunctionalArg::Lambda { param, body }
    }

    pub fn is_method_ref(&self) -> bool {
        matches!(self, FunctionalArg::MethodRef { .. })
    }
}

/// Where accumulated elements end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccumulationTarget {
    /// `target.addAll(...)`, reusing the original qualifier expression.
    Qualified(NodeId),
    /// `addAll(...)` on the implicit receiver.
    Implicit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    ForEach(FunctionalArg),
    CollectToList,
    CollectToSet,
    /// `toCollection(() -> supplier)`
    CollectToCustom { supplier: NodeId },
    AddAllToExisting(AccumulationTarget),
}

impl Terminal {
    pub fn is_collect(&self) -> bool {
        !matches!(self, Terminal::ForEach(_))
    }
}

/// A local declaration folded together with the loop that fills it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSite {
    pub declaration: NodeId,
    pub initializer: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePlan {
    pub loop_stmt: NodeId,
    /// The iterated collection expression.
    pub source: NodeId,
    pub param: VarId,
    /// One predicate per guard, outermost first.
    pub filters: Vec<FunctionalArg>,
    pub mapper: Option<FunctionalArg>,
    pub terminal: Terminal,
    pub fold: Option<FoldSite>,
    /// Comments of the discarded parts of the loop, in source order.
    pub orphaned_comments: Vec<NodeId>,
    /// The action statement, kept for re-emitting the terminal function
    /// with an explicit block body.
    pub action: NodeId,
}

impl RewritePlan {
    /// A bare `forEach` on the collection needs no `.stream()`.
    pub fn needs_stream(&self) -> bool {
        self.terminal.is_collect() || !self.filters.is_empty() || self.mapper.is_some()
    }
}
