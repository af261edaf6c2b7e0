//! Arena-backed syntax tree for a single method body.
//!
//! Nodes are addressed by [`NodeId`] and never move; the only way to change a
//! tree is to stage a [`TreeEdit`] and [`Tree::commit`] it.

use crate::span::Span;
use serde::{Deserialize, Serialize};

mod builder;
mod edit;
mod expr;
mod stmt;
mod types;

pub use builder::*;
pub use edit::*;
pub use expr::*;
pub use stmt::*;
pub use types::*;

crate::arena_id! {
    /// Stable index of a node in a [`Tree`].
    pub struct NodeId("n");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment text including its delimiters.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Stmt(StmtKind),
    Expr(ExprKind),
    Comment(Comment),
}

impl NodeKind {
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Stmt(stmt) => stmt.child_slots(),
            NodeKind::Expr(expr) => expr.child_slots(),
            NodeKind::Comment(_) => Vec::new(),
        }
    }

    fn child_slots_mut(&mut self) -> Vec<&mut NodeId> {
        match self {
            NodeKind::Stmt(stmt) => stmt.child_slots_mut(),
            NodeKind::Expr(expr) => expr.child_slots_mut(),
            NodeKind::Comment(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub span: Span,
}

/// One method body: the node arena, its variable table and the scope it
/// lives in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
    vars: Vec<VarDecl>,
    root: NodeId,
    context: ScopeContext,
    revision: u64,
}

impl Tree {
    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        vars: Vec<VarDecl>,
        root: NodeId,
        context: ScopeContext,
    ) -> Self {
        let mut tree = Self {
            nodes,
            vars,
            root,
            context,
            revision: 0,
        };
        tree.relink();
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn context(&self) -> &ScopeContext {
        &self.context
    }

    /// Bumped by every committed edit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Panics on an id that does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Panics like [`Self::node`]; `stmt`, `expr` and `comment` return `None`
    /// for foreign ids instead.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn stmt(&self, id: NodeId) -> Option<&StmtKind> {
        match self.get(id).map(|node| &node.kind) {
            Some(NodeKind::Stmt(stmt)) => Some(stmt),
            _ => None,
        }
    }

    pub fn expr(&self, id: NodeId) -> Option<&ExprKind> {
        match self.get(id).map(|node| &node.kind) {
            Some(NodeKind::Expr(expr)) => Some(expr),
            _ => None,
        }
    }

    pub fn comment(&self, id: NodeId) -> Option<&Comment> {
        match self.get(id).map(|node| &node.kind) {
            Some(NodeKind::Comment(comment)) => Some(comment),
            _ => None,
        }
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    pub fn var(&self, id: VarId) -> &VarDecl {
        &self.vars[id.index()]
    }

    pub fn vars(&self) -> impl Iterator<Item = (VarId, &VarDecl)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(idx, decl)| (VarId(idx as u32), decl))
    }

    /// Reachable from the root through child links.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId, strict: bool) -> bool {
        let mut current = if strict { self.parent(node) } else { Some(node) };
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Preorder traversal of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants_where(id, |_, _| true)
    }

    /// Preorder traversal that does not enter closure bodies (lambdas and
    /// method references). The closures themselves are still reported.
    pub fn descendants_outside_closures(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants_where(id, |tree, node| {
            !tree.expr(node).is_some_and(ExprKind::is_closure)
        })
    }

    /// Preorder traversal; `enter` decides whether a node's children are
    /// visited. The root of the walk is always entered.
    pub fn descendants_where<F>(&self, id: NodeId, enter: F) -> Vec<NodeId>
    where
        F: Fn(&Tree, NodeId) -> bool,
    {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if current != id && !enter(self, current) {
                continue;
            }
            let children = self.children(current);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// The statement right before `id` in its enclosing block, comments
    /// included.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let block = self.stmt(parent)?.as_block()?;
        let pos = block.stmts.iter().position(|stmt| *stmt == id)?;
        pos.checked_sub(1).map(|prev| block.stmts[prev])
    }

    /// Comments anywhere inside `id`, in source order.
    pub fn comments_in(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|node| self.comment(*node).is_some())
            .collect()
    }

    /// Strip any number of single-statement block wrappers. Comments do not
    /// count as statements.
    pub fn unwrap_single_block(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(StmtKind::Block(block)) = self.stmt(current) {
            let mut stmts = block.stmts.iter().filter(|stmt| self.stmt(**stmt).is_some());
            match (stmts.next(), stmts.next()) {
                (Some(single), None) => current = *single,
                _ => break,
            }
        }
        current
    }

    /// Strip redundant parentheses.
    pub fn skip_parens(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(ExprKind::Paren(inner)) = self.expr(current) {
            current = *inner;
        }
        current
    }

    /// The attached node introducing `var`: a local declaration, a loop,
    /// a lambda or a try statement owning the catch parameter. Fields and
    /// method parameters have none.
    pub fn declaration_of(&self, var: VarId) -> Option<NodeId> {
        self.descendants(self.root).into_iter().find(|id| match self.kind(*id) {
            NodeKind::Stmt(StmtKind::Local(local)) => local.var == var,
            NodeKind::Stmt(StmtKind::ForEach(for_each)) => for_each.var == var,
            NodeKind::Stmt(StmtKind::Try(stmt_try)) => {
                stmt_try.catches.iter().any(|catch| catch.var == var)
            }
            NodeKind::Expr(ExprKind::Lambda(lambda)) => lambda.params.contains(&var),
            _ => false,
        })
    }

    /// Every `ForEach` statement reachable from the root, in preorder.
    pub fn for_each_loops(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| matches!(self.stmt(*id), Some(StmtKind::ForEach(_))))
            .collect()
    }

    fn relink(&mut self) {
        for node in &mut self.nodes {
            node.parent = None;
        }
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            for child in self.nodes[current.index()].kind.children() {
                self.nodes[child.index()].parent = Some(current);
                stack.push(child);
            }
        }
    }
}
