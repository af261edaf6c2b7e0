use super::{AnalysisResult, ControlFlowService, ExitKind};
use crate::ast::{ExprKind, NodeId, NodeKind, StmtKind, Tree, VarId, VarKind};
use crate::error::AnalysisError;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Structural control-flow analysis over a [`Tree`].
///
/// Every query walks the relevant subtree once. A query that visits more
/// nodes than the configured budget fails with [`AnalysisError::Timeout`];
/// raising the cancel flag makes the next visit fail with
/// [`AnalysisError::Canceled`].
#[derive(Debug, Clone, Default)]
pub struct FlowAnalysis {
    budget: Option<usize>,
    canceled: Arc<AtomicBool>,
}

impl FlowAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Shared flag; storing `true` cancels running and future queries.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.canceled.clone()
    }

    fn meter(&self) -> Meter<'_> {
        Meter {
            visited: 0,
            budget: self.budget,
            canceled: &self.canceled,
        }
    }

    /// Preorder walk under `root`, closures skipped unless `enter_closures`.
    fn walk(
        &self,
        tree: &Tree,
        root: NodeId,
        enter_closures: bool,
        mut visit: impl FnMut(NodeId),
    ) -> AnalysisResult<()> {
        let mut meter = self.meter();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            meter.tick()?;
            visit(current);
            let closure = tree.expr(current).is_some_and(ExprKind::is_closure);
            if current != root && closure && !enter_closures {
                continue;
            }
            stack.extend(tree.children(current).into_iter().rev());
        }
        Ok(())
    }

    /// Variables written by each assignment or increment under `root`.
    fn writes(&self, tree: &Tree, root: NodeId) -> AnalysisResult<Vec<(NodeId, VarId)>> {
        let mut writes = Vec::new();
        self.walk(tree, root, true, |id| {
            let target = match tree.expr(id) {
                Some(ExprKind::Assign(assign)) => Some(assign.target),
                Some(ExprKind::Unary(unary)) if unary.op.writes_operand() => Some(unary.operand),
                _ => None,
            };
            if let Some(var) = target.and_then(|target| assigned_var(tree, target)) {
                writes.push((id, var));
            }
        })?;
        Ok(writes)
    }
}

struct Meter<'a> {
    visited: usize,
    budget: Option<usize>,
    canceled: &'a AtomicBool,
}

impl Meter<'_> {
    fn tick(&mut self) -> AnalysisResult<()> {
        if self.canceled.load(Ordering::Relaxed) {
            return Err(AnalysisError::Canceled);
        }
        self.visited += 1;
        match self.budget {
            Some(budget) if self.visited > budget => Err(AnalysisError::Timeout),
            _ => Ok(()),
        }
    }
}

fn assigned_var(tree: &Tree, target: NodeId) -> Option<VarId> {
    match tree.expr(tree.skip_parens(target))? {
        ExprKind::Name(name) => name.var,
        ExprKind::Field(field) => field.var,
        _ => None,
    }
}

fn referenced_var(tree: &Tree, id: NodeId) -> Option<VarId> {
    match tree.expr(id)? {
        ExprKind::Name(name) => name.var,
        ExprKind::Field(field) => field.var,
        _ => None,
    }
}

/// Whether a jump at `jump` stays inside `body`: an unlabelled jump needs an
/// enclosing loop, a labelled one a matching label, between it and `body`
/// inclusive.
fn jump_is_internal(tree: &Tree, jump: NodeId, body: NodeId, label: Option<&str>) -> bool {
    let mut current = tree.parent(jump);
    while let Some(id) = current {
        let matches = match (tree.stmt(id), label) {
            (Some(stmt), None) => stmt.is_loop(),
            (Some(StmtKind::Labeled(labeled)), Some(label)) => labeled.label == label,
            _ => false,
        };
        if matches {
            return true;
        }
        if id == body {
            return false;
        }
        current = tree.parent(id);
    }
    false
}

impl ControlFlowService for FlowAnalysis {
    fn exit_points(&self, tree: &Tree, body: NodeId) -> AnalysisResult<Vec<(NodeId, ExitKind)>> {
        let mut exits = Vec::new();
        self.walk(tree, body, false, |id| {
            let exit = match tree.stmt(id) {
                Some(StmtKind::Break(label)) => (!jump_is_internal(tree, id, body, label.as_deref()))
                    .then_some(ExitKind::Break),
                Some(StmtKind::Continue(label)) => (!jump_is_internal(tree, id, body, label.as_deref()))
                    .then_some(ExitKind::Continue),
                Some(StmtKind::Return(_)) => Some(ExitKind::Return),
                Some(StmtKind::Throw(_)) => Some(ExitKind::Throw),
                _ => None,
            };
            if let Some(exit) = exit {
                exits.push((id, exit));
            }
        })?;
        Ok(exits)
    }

    fn used_variables(&self, tree: &Tree, body: NodeId) -> AnalysisResult<BTreeSet<VarId>> {
        let mut used = BTreeSet::new();
        self.walk(tree, body, true, |id| {
            if let Some(var) = referenced_var(tree, id) {
                used.insert(var);
            }
        })?;
        Ok(used)
    }

    fn written_variables(&self, tree: &Tree, body: NodeId) -> AnalysisResult<BTreeSet<VarId>> {
        Ok(self.writes(tree, body)?.into_iter().map(|(_, var)| var).collect())
    }

    fn is_effectively_final(&self, tree: &Tree, var: VarId, body: NodeId) -> AnalysisResult<bool> {
        let decl = tree.var(var);
        if decl.is_final {
            return Ok(true);
        }
        let writes: Vec<NodeId> = self
            .writes(tree, tree.root())?
            .into_iter()
            .filter(|(_, written)| *written == var)
            .map(|(site, _)| site)
            .collect();

        let is_final = match decl.kind {
            VarKind::Local => {
                let initialized = tree
                    .declaration_of(var)
                    .and_then(|decl| match tree.kind(decl) {
                        NodeKind::Stmt(StmtKind::Local(local)) => Some(local.init.is_some()),
                        _ => None,
                    });
                match initialized {
                    Some(true) => writes.is_empty(),
                    Some(false) => {
                        writes.len() <= 1
                            && writes.iter().all(|site| !tree.is_ancestor(body, *site, false))
                    }
                    None => false,
                }
            }
            _ => writes.is_empty(),
        };
        Ok(is_final)
    }
}
