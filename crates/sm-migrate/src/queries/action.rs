// Terminal-action classification - accumulation or general side effect

use super::{condition_observes_target, GuardChain};
use crate::utils::{IneligibleReason, Verdict};
use sm_core::ast::{ExprKind, NodeId, StmtKind, Tree, VarId, VarKind};
use sm_core::semantics::Host;

/// The collection an accumulation appends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionRef {
    Variable(VarId),
    /// The enclosing instance, via an unqualified `add(..)`.
    ImplicitReceiver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulation {
    /// The `add` call.
    pub call: NodeId,
    pub target: CollectionRef,
    /// Qualifier expression of the call, absent for the implicit receiver.
    pub qualifier: Option<NodeId>,
    /// The appended value.
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionClassification {
    Accumulation(Accumulation),
    GeneralAction { stmt: NodeId },
}

impl ActionClassification {
    /// Accumulation when every condition holds and no guard observes the
    /// target, general action otherwise.
    pub fn classify(host: &dyn Host, tree: &Tree, chain: &GuardChain) -> Self {
        match accumulation(host, tree, chain) {
            Ok(accumulation) => ActionClassification::Accumulation(accumulation),
            Err(reason) => {
                tracing::trace!(action = %chain.action, %reason, "not an accumulation");
                ActionClassification::GeneralAction { stmt: chain.action }
            }
        }
    }

    pub fn is_accumulation(&self) -> bool {
        matches!(self, ActionClassification::Accumulation(_))
    }
}

/// Check the action of `chain` against every accumulation condition.
pub fn accumulation(
    host: &dyn Host,
    tree: &Tree,
    chain: &GuardChain,
) -> Result<Accumulation, IneligibleReason> {
    let call_id = super::action_expression(tree, chain.action)
        .map(|expr| tree.skip_parens(expr))
        .ok_or(IneligibleReason::NotAnAppendCall)?;
    let call = tree
        .expr(call_id)
        .and_then(ExprKind::as_call)
        .filter(|call| call.method == "add" && call.args.len() == 1)
        .ok_or(IneligibleReason::NotAnAppendCall)?;

    let sig = host
        .resolve_method(tree, call_id)
        .ok_or_else(|| IneligibleReason::UnresolvedCall(tree.text(call_id)))?;
    if sig.name != "add" || sig.params.len() != 1 {
        return Err(IneligibleReason::NotAnAppendCall);
    }

    let (target, class) = match call.receiver {
        None => {
            let context = tree.context();
            match &context.enclosing_class {
                Some(class) if !context.is_static => (CollectionRef::ImplicitReceiver, class.clone()),
                _ => return Err(IneligibleReason::UnresolvedTarget),
            }
        }
        Some(receiver) => {
            let var = match tree.expr(tree.skip_parens(receiver)) {
                Some(ExprKind::Name(_) | ExprKind::Field(_)) => host.resolve_variable(tree, receiver),
                _ => None,
            }
            .ok_or(IneligibleReason::UnresolvedTarget)?;
            let loop_stmt = enclosing_loop(tree, chain.action);
            stable_receiver(host, tree, receiver, loop_stmt).into_result()?;
            (CollectionRef::Variable(var), tree.var(var).ty.name.clone())
        }
    };
    if !host.is_subtype(&class, "Collection") {
        return Err(IneligibleReason::TargetNotCollection);
    }

    if chain
        .conditions
        .iter()
        .any(|cond| condition_observes_target(host, tree, *cond, &target))
    {
        return Err(IneligibleReason::GuardHazard);
    }

    // Type inference and checked exceptions of the value call do not carry
    // over into a mapping function.
    let value = call.args[0];
    if tree.expr(value).is_some_and(ExprKind::is_call_like) {
        let value_sig = host
            .resolve_method(tree, value)
            .ok_or_else(|| IneligibleReason::UnresolvedCall(tree.text(value)))?;
        if let Some(thrown) = value_sig
            .throws
            .iter()
            .find(|thrown| !host.is_unchecked_exception(&thrown.name))
        {
            return Err(IneligibleReason::CheckedException(thrown.name.clone()));
        }
        if value_sig.type_params > 0 {
            return Err(IneligibleReason::GenericValueCall);
        }
    }

    Ok(Accumulation {
        call: call_id,
        target,
        qualifier: call.receiver,
        value,
    })
}

/// The foreach loop whose body holds `action`.
fn enclosing_loop(tree: &Tree, action: NodeId) -> Option<NodeId> {
    let mut current = tree.parent(action);
    while let Some(id) = current {
        if matches!(tree.stmt(id), Some(StmtKind::ForEach(_))) {
            return Some(id);
        }
        current = tree.parent(id);
    }
    None
}

/// Whether `expr` denotes the same collection on every iteration, so that a
/// single `addAll` on it is equivalent. Variables must be declared outside
/// the loop; a field access must itself be rooted in `this`, `super`, a
/// type name or such a variable.
fn stable_receiver(host: &dyn Host, tree: &Tree, expr: NodeId, loop_stmt: Option<NodeId>) -> Verdict {
    let expr = tree.skip_parens(expr);
    match tree.expr(expr) {
        Some(ExprKind::This | ExprKind::Super | ExprKind::TypeName(_)) => Verdict::Safe,
        Some(ExprKind::Name(_)) => match host.resolve_variable(tree, expr) {
            Some(var) => declared_outside(tree, var, loop_stmt),
            None => Verdict::Unknown(IneligibleReason::UnresolvedTarget),
        },
        Some(ExprKind::Field(field)) => match host.resolve_variable(tree, expr) {
            Some(var) => declared_outside(tree, var, loop_stmt)
                .and_then(|| stable_receiver(host, tree, field.receiver, loop_stmt)),
            None => Verdict::Unknown(IneligibleReason::UnresolvedTarget),
        },
        _ => Verdict::Unsafe(IneligibleReason::UnresolvedTarget),
    }
}

fn declared_outside(tree: &Tree, var: VarId, loop_stmt: Option<NodeId>) -> Verdict {
    match tree.var(var).kind {
        VarKind::Parameter | VarKind::Field { .. } => Verdict::Safe,
        VarKind::Local | VarKind::LoopParameter | VarKind::LambdaParameter | VarKind::CatchParameter => {
            match (tree.declaration_of(var), loop_stmt) {
                // The loop declares its own parameter, so the check is not strict.
                (Some(decl), Some(loop_stmt)) if tree.is_ancestor(loop_stmt, decl, false) => {
                    Verdict::Unsafe(IneligibleReason::UnresolvedTarget)
                }
                (Some(_), _) => Verdict::Safe,
                (None, _) => Verdict::Unknown(IneligibleReason::UnresolvedTarget),
            }
        }
    }
}
