use super::types::{TypeRef, VarId};
use super::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StmtBlock {
    /// Statements and comments in source order.
    pub stmts: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StmtLocal {
    pub var: VarId,
    pub init: Option<NodeId>,
}

/// Missing parts model incomplete code the host still hands us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StmtIf {
    pub cond: Option<NodeId>,
    pub then_branch: Option<NodeId>,
    pub else_branch: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StmtForEach {
    pub var: VarId,
    pub iterated: Option<NodeId>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StmtWhile {
    pub cond: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StmtLabeled {
    pub label: String,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchClause {
    pub var: VarId,
    /// More than one type for multi-catch.
    pub types: Vec<TypeRef>,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StmtTry {
    pub body: NodeId,
    pub catches: Vec<CatchClause>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StmtKind {
    Block(StmtBlock),
    Expr(NodeId),
    Local(StmtLocal),
    If(StmtIf),
    ForEach(StmtForEach),
    While(StmtWhile),
    Labeled(StmtLabeled),
    Break(Option<String>),
    Continue(Option<String>),
    Return(Option<NodeId>),
    Throw(NodeId),
    Try(StmtTry),
    Empty,
}

impl StmtKind {
    pub fn is_loop(&self) -> bool {
        matches!(self, StmtKind::ForEach(_) | StmtKind::While(_))
    }

    pub fn as_block(&self) -> Option<&StmtBlock> {
        match self {
            StmtKind::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_if(&self) -> Option<&StmtIf> {
        match self {
            StmtKind::If(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn as_for_each(&self) -> Option<&StmtForEach> {
        match self {
            StmtKind::ForEach(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub(super) fn child_slots(&self) -> Vec<NodeId> {
        match self {
            StmtKind::Block(block) => block.stmts.clone(),
            StmtKind::Expr(expr) => vec![*expr],
            StmtKind::Local(local) => local.init.into_iter().collect(),
            StmtKind::If(stmt) => [stmt.cond, stmt.then_branch, stmt.else_branch]
                .into_iter()
                .flatten()
                .collect(),
            StmtKind::ForEach(stmt) => [stmt.iterated, stmt.body].into_iter().flatten().collect(),
            StmtKind::While(stmt) => vec![stmt.cond, stmt.body],
            StmtKind::Labeled(stmt) => vec![stmt.body],
            StmtKind::Return(value) => value.iter().copied().collect(),
            StmtKind::Throw(value) => vec![*value],
            StmtKind::Try(stmt) => std::iter::once(stmt.body)
                .chain(stmt.catches.iter().map(|catch| catch.body))
                .collect(),
            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => Vec::new(),
        }
    }

    pub(super) fn child_slots_mut(&mut self) -> Vec<&mut NodeId> {
        match self {
            StmtKind::Block(block) => block.stmts.iter_mut().collect(),
            StmtKind::Expr(expr) => vec![expr],
            StmtKind::Local(local) => local.init.iter_mut().collect(),
            StmtKind::If(stmt) => stmt
                .cond
                .iter_mut()
                .chain(stmt.then_branch.iter_mut())
                .chain(stmt.else_branch.iter_mut())
                .collect(),
            StmtKind::ForEach(stmt) => stmt.iterated.iter_mut().chain(stmt.body.iter_mut()).collect(),
            StmtKind::While(stmt) => vec![&mut stmt.cond, &mut stmt.body],
            StmtKind::Labeled(stmt) => vec![&mut stmt.body],
            StmtKind::Return(value) => value.iter_mut().collect(),
            StmtKind::Throw(value) => vec![value],
            StmtKind::Try(stmt) => std::iter::once(&mut stmt.body)
                .chain(stmt.catches.iter_mut().map(|catch| &mut catch.body))
                .collect(),
            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => Vec::new(),
        }
    }
}
