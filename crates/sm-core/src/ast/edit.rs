use super::{Node, NodeId, NodeKind, StmtKind, Tree};
use crate::error::{Error, Result};
use crate::span::Span;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Put `new` where `old` is linked from its parent.
    Replace { old: NodeId, new: NodeId },
    /// Drop a statement from its enclosing block.
    Remove { stmt: NodeId },
    /// Insert `stmt` into the block holding `anchor`, right before it.
    InsertBefore { anchor: NodeId, stmt: NodeId },
}

/// A batch of staged nodes and structural operations.
///
/// Building an edit only reads the tree it was started from; nothing changes
/// until [`Tree::commit`] validates and applies the whole batch. Dropping an
/// edit discards it.
#[derive(Debug, Clone)]
pub struct TreeEdit {
    base_len: usize,
    base_revision: u64,
    staged: Vec<Node>,
    ops: Vec<EditOp>,
}

impl TreeEdit {
    pub fn new(tree: &Tree) -> Self {
        Self {
            base_len: tree.len(),
            base_revision: tree.revision(),
            staged: Vec::new(),
            ops: Vec::new(),
        }
    }

    /// Stage a node; the returned id becomes valid in the tree on commit.
    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId((self.base_len + self.staged.len()) as u32);
        self.staged.push(Node {
            kind,
            parent: None,
            span,
        });
        id
    }

    /// Look at a node staged by this edit.
    pub fn staged(&self, id: NodeId) -> Option<&NodeKind> {
        id.index()
            .checked_sub(self.base_len)
            .and_then(|idx| self.staged.get(idx))
            .map(|node| &node.kind)
    }

    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.ops.push(EditOp::Replace { old, new });
    }

    pub fn remove(&mut self, stmt: NodeId) {
        self.ops.push(EditOp::Remove { stmt });
    }

    pub fn insert_before(&mut self, anchor: NodeId, stmt: NodeId) {
        self.ops.push(EditOp::InsertBefore { anchor, stmt });
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Tree {
    /// Validate and apply an edit as one step. On error the tree is left
    /// exactly as it was.
    pub fn commit(&mut self, edit: TreeEdit) -> Result<()> {
        if let Err(err) = self.validate_edit(&edit) {
            crate::warn!("rejected edit at revision {}: {}", self.revision, err);
            return Err(err);
        }
        crate::trace!("committing {} staged nodes, {} ops", edit.staged.len(), edit.ops.len());

        let TreeEdit { staged, ops, .. } = edit;
        self.nodes.extend(staged);
        for op in ops {
            match op {
                EditOp::Replace { old, new } => match self.parent(old) {
                    Some(parent) => {
                        for slot in self.nodes[parent.index()].kind.child_slots_mut() {
                            if *slot == old {
                                *slot = new;
                            }
                        }
                    }
                    None => self.root = new,
                },
                EditOp::Remove { stmt } => {
                    if let Some(block) = self.parent_block_mut(stmt) {
                        block.retain(|id| *id != stmt);
                    }
                }
                EditOp::InsertBefore { anchor, stmt } => {
                    if let Some(block) = self.parent_block_mut(anchor) {
                        let pos = block.iter().position(|id| *id == anchor).unwrap_or(0);
                        block.insert(pos, stmt);
                    }
                }
            }
            // Keep parent links current so later ops see earlier ones.
            self.relink();
        }
        self.revision += 1;
        crate::debug!("tree now at revision {}", self.revision);
        Ok(())
    }

    fn parent_block_mut(&mut self, id: NodeId) -> Option<&mut Vec<NodeId>> {
        let parent = self.parent(id)?;
        match &mut self.nodes[parent.index()].kind {
            NodeKind::Stmt(StmtKind::Block(block)) => Some(&mut block.stmts),
            _ => None,
        }
    }

    fn validate_edit(&self, edit: &TreeEdit) -> Result<()> {
        if edit.base_revision != self.revision || edit.base_len != self.len() {
            return Err(Error::StaleFinding {
                expected: edit.base_revision,
                actual: self.revision,
            });
        }
        let limit = edit.base_len + edit.staged.len();
        let in_range = |id: NodeId| id.index() < limit;

        // Each existing node may be adopted by at most one staged node.
        let mut adopted: HashSet<NodeId> = HashSet::new();
        for node in &edit.staged {
            for child in node.kind.children() {
                if !in_range(child) {
                    return Err(Error::invalid_edit(format!("staged node links unknown {}", child)));
                }
                if child.index() < edit.base_len && !adopted.insert(child) {
                    return Err(Error::invalid_edit(format!("{} is reused twice", child)));
                }
            }
        }

        let mut consumed: HashSet<NodeId> = HashSet::new();
        for op in &edit.ops {
            let (anchor, placed) = match op {
                EditOp::Replace { old, new } => (*old, Some(*new)),
                EditOp::Remove { stmt } => (*stmt, None),
                EditOp::InsertBefore { anchor, stmt } => (*anchor, Some(*stmt)),
            };
            if !in_range(anchor) || anchor.index() >= edit.base_len {
                return Err(Error::invalid_edit(format!("{} is not an existing node", anchor)));
            }
            if let Some(placed) = placed {
                if !in_range(placed) {
                    return Err(Error::invalid_edit(format!("{} is not a known node", placed)));
                }
            }
            if consumed.contains(&anchor) || !self.is_attached(anchor) {
                return Err(detached(anchor));
            }
            match op {
                EditOp::Replace { .. } => {}
                EditOp::Remove { .. } | EditOp::InsertBefore { .. } => {
                    let in_block = self
                        .parent(anchor)
                        .and_then(|parent| self.stmt(parent))
                        .is_some_and(|stmt| stmt.as_block().is_some());
                    if !in_block {
                        return Err(Error::invalid_edit(format!(
                            "{} is not a statement of a block",
                            anchor
                        )));
                    }
                }
            }
            if !matches!(op, EditOp::InsertBefore { .. }) {
                consumed.insert(anchor);
            }
        }
        Ok(())
    }
}

fn detached(id: NodeId) -> Error {
    Error::invalid_edit(format!("{} is not attached to the tree", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, ScopeContext, TreeBuilder, TypeRef, VarKind};
    use pretty_assertions::assert_eq;

    /// `{ a; b; }` with `a` and `b` local names.
    fn two_statements() -> (Tree, NodeId, NodeId) {
        let mut b = TreeBuilder::new(ScopeContext::default());
        let a = b.declare("a", TypeRef::simple("int"), VarKind::Local);
        let c = b.declare("b", TypeRef::simple("int"), VarKind::Local);
        let a = b.name(a);
        let first = b.expr_stmt(a);
        let c = b.name(c);
        let second = b.expr_stmt(c);
        let root = b.block(vec![first, second]);
        (b.finish(root), first, second)
    }

    #[test]
    fn commit_applies_ops_in_order_and_bumps_revision() -> Result<()> {
        let (mut tree, first, second) = two_statements();
        let moved = match tree.stmt(second) {
            Some(StmtKind::Expr(expr)) => *expr,
            _ => unreachable!(),
        };
        let mut edit = TreeEdit::new(&tree);
        let call = edit.add(
            NodeKind::Expr(ExprKind::Call(crate::ast::ExprCall {
                receiver: Some(moved),
                method: "run".to_string(),
                args: vec![],
                target: None,
            })),
            Span::default(),
        );
        let stmt = edit.add(NodeKind::Stmt(StmtKind::Expr(call)), Span::default());
        edit.insert_before(first, stmt);
        edit.remove(second);
        tree.commit(edit)?;

        assert_eq!(tree.revision(), 1);
        assert_eq!(tree.text(tree.root()), "{ b.run(); a; }");
        assert_eq!(tree.parent(moved), Some(call));
        assert!(!tree.is_attached(second));
        Ok(())
    }

    #[test]
    fn rejected_edits_leave_the_tree_untouched() {
        let (mut tree, first, second) = two_statements();
        let before = tree.text(tree.root());
        let root = tree.root();

        let mut not_in_block = TreeEdit::new(&tree);
        let inner = match tree.stmt(first) {
            Some(StmtKind::Expr(expr)) => *expr,
            _ => unreachable!(),
        };
        not_in_block.remove(inner);

        let mut reused_twice = TreeEdit::new(&tree);
        let block = NodeKind::Stmt(StmtKind::Block(crate::ast::StmtBlock { stmts: vec![first] }));
        let one = reused_twice.add(block.clone(), Span::default());
        let other = reused_twice.add(block, Span::default());
        reused_twice.replace(first, one);
        reused_twice.replace(second, other);

        let mut consumed_twice = TreeEdit::new(&tree);
        consumed_twice.remove(second);
        consumed_twice.remove(second);

        for edit in [not_in_block, reused_twice, consumed_twice] {
            assert!(matches!(tree.commit(edit), Err(Error::InvalidEdit(_))));
        }
        assert_eq!(tree.text(root), before);
        assert_eq!(tree.revision(), 0);
    }

    #[test]
    fn edits_started_on_an_older_revision_are_stale() -> Result<()> {
        let (mut tree, first, second) = two_statements();
        let old = TreeEdit::new(&tree);
        let mut current = TreeEdit::new(&tree);
        current.remove(first);
        tree.commit(current)?;

        let mut old = old;
        old.remove(second);
        assert!(matches!(
            tree.commit(old),
            Err(Error::StaleFinding { expected: 0, actual: 1 })
        ));
        assert_eq!(tree.text(tree.root()), "{ b; }");
        Ok(())
    }
}
