// Guard chains - nested else-less conditionals wrapping a single action

use sm_core::ast::{NodeId, Tree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardChain {
    /// The `if` statements, outermost first.
    pub guards: Vec<NodeId>,
    /// Their conditions, in the same order.
    pub conditions: Vec<NodeId>,
    /// The innermost statement, with single-statement blocks unwrapped. The
    /// whole (unwrapped) body when there are no guards.
    pub action: NodeId,
}

impl GuardChain {
    pub fn extract(tree: &Tree, body: NodeId) -> Self {
        let mut guards = Vec::new();
        let mut conditions = Vec::new();
        let mut current = tree.unwrap_single_block(body);
        while let Some((cond, then_branch)) = guard_parts(tree, current) {
            guards.push(current);
            conditions.push(cond);
            current = tree.unwrap_single_block(then_branch);
        }
        Self {
            guards,
            conditions,
            action: current,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

/// Condition and `then` branch of an `if` usable as a guard.
fn guard_parts(tree: &Tree, stmt: NodeId) -> Option<(NodeId, NodeId)> {
    let stmt_if = tree.stmt(stmt)?.as_if()?;
    if stmt_if.else_branch.is_some() {
        return None;
    }
    Some((stmt_if.cond?, stmt_if.then_branch?))
}
