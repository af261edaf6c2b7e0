// Hazards - guard conditions that could observe the accumulation target

use super::CollectionRef;
use sm_core::ast::{ExprKind, NodeId, Tree};
use sm_core::semantics::Host;

/// Whether evaluating `condition` may read state that the accumulation
/// mutates.
///
/// A named target is hazardous as soon as the condition mentions it. For the
/// implicit receiver any call on `this`/`super` (qualified or not) and any
/// bare `this` handed to a call counts, since either may reach the receiver's
/// contents. Lambda bodies are not inspected.
pub fn condition_observes_target(
    host: &dyn Host,
    tree: &Tree,
    condition: NodeId,
    target: &CollectionRef,
) -> bool {
    match target {
        CollectionRef::Variable(var) => !host.references_in(tree, *var, condition).is_empty(),
        CollectionRef::ImplicitReceiver => tree
            .descendants_where(condition, |tree, node| {
                !matches!(tree.expr(node), Some(ExprKind::Lambda(_)))
            })
            .into_iter()
            .any(|id| reads_receiver(tree, id)),
    }
}

fn reads_receiver(tree: &Tree, id: NodeId) -> bool {
    match tree.expr(id) {
        Some(ExprKind::Call(call)) => match call.receiver {
            None => true,
            Some(receiver) => matches!(tree.expr(receiver), Some(ExprKind::This | ExprKind::Super)),
        },
        Some(ExprKind::This) => tree
            .parent(id)
            .and_then(|parent| tree.expr(parent))
            .is_some_and(|parent| match parent {
                ExprKind::Call(call) => call.args.contains(&id),
                ExprKind::New(new) => new.args.contains(&id),
                _ => false,
            }),
        _ => false,
    }
}
