// Pipeline synthesis - from a classified loop to a RewritePlan

use super::LoopCandidate;
use crate::ir::*;
use crate::queries::{action_expression, reduce_to_method_ref, Accumulation, ActionClassification, CollectionRef};
use crate::{synth_ensure, MigrationOptions};
use sm_core::ast::{ExprKind, NodeId, NodeKind, StmtKind, Tree, VarId, VarKind};
use sm_core::error::Result;
use sm_core::semantics::Host;

pub fn synthesize(
    host: &dyn Host,
    tree: &Tree,
    candidate: &LoopCandidate,
    options: &MigrationOptions,
) -> Result<RewritePlan> {
    let param = candidate.param;
    let filters = candidate
        .chain
        .conditions
        .iter()
        .map(|cond| FunctionalArg::lambda(param, LambdaBody::Expr(*cond)))
        .collect();

    let mut reused: Vec<NodeId> = candidate.chain.conditions.clone();
    let (mapper, terminal, fold) = match &candidate.action {
        ActionClassification::Accumulation(accumulation) => {
            synth_ensure!(
                tree.expr(accumulation.call)
                    .and_then(ExprKind::as_call)
                    .is_some_and(|call| call.args.len() == 1),
                "accumulation call must have exactly one argument",
                tree.span(accumulation.call)
            );
            reused.push(accumulation.value);
            let mapper = mapping_stage(host, tree, candidate, accumulation, options);
            let (terminal, fold) = collect_terminal(tree, candidate.loop_stmt, accumulation);
            (mapper, terminal, fold)
        }
        ActionClassification::GeneralAction { stmt } => {
            let function = for_each_function(host, tree, *stmt, param, options);
            if !function.is_method_ref() {
                reused.push(*stmt);
            }
            (None, Terminal::ForEach(function), None)
        }
    };

    let orphaned_comments = tree
        .comments_in(candidate.body)
        .into_iter()
        .filter(|comment| !reused.iter().any(|root| tree.is_ancestor(*root, *comment, false)))
        .collect();

    Ok(RewritePlan {
        loop_stmt: candidate.loop_stmt,
        source: candidate.source,
        param,
        filters,
        mapper,
        terminal,
        fold,
        orphaned_comments,
        action: candidate.chain.action,
    })
}

fn mapping_stage(
    host: &dyn Host,
    tree: &Tree,
    candidate: &LoopCandidate,
    accumulation: &Accumulation,
    options: &MigrationOptions,
) -> Option<FunctionalArg> {
    let value = accumulation.value;
    let identity = matches!(
        tree.expr(tree.skip_parens(value)),
        Some(ExprKind::Name(name)) if name.var == Some(candidate.param)
    );
    if identity {
        return None;
    }
    let reduced = options
        .prefer_method_refs
        .then(|| reduce_to_method_ref(host, tree, value, candidate.param))
        .flatten();
    Some(reduced.unwrap_or_else(|| FunctionalArg::lambda(candidate.param, LambdaBody::Expr(value))))
}

fn for_each_function(
    host: &dyn Host,
    tree: &Tree,
    action: NodeId,
    param: VarId,
    options: &MigrationOptions,
) -> FunctionalArg {
    if options.prefer_method_refs {
        if let Some(reduced) = action_expression(tree, action)
            .and_then(|expr| reduce_to_method_ref(host, tree, expr, param))
        {
            return reduced;
        }
    }
    let body = match tree.stmt(action) {
        Some(StmtKind::Expr(expr)) => LambdaBody::Expr(*expr),
        Some(StmtKind::Block(_)) => LambdaBody::Block(action),
        _ => LambdaBody::Wrapped(action),
    };
    FunctionalArg::lambda(param, body)
}

/// Fold into the target's declaration when it is a local initialised with a
/// no-argument constructor right before the loop; append otherwise.
fn collect_terminal(
    tree: &Tree,
    loop_stmt: NodeId,
    accumulation: &Accumulation,
) -> (Terminal, Option<FoldSite>) {
    let append = match accumulation.qualifier {
        Some(qualifier) => AccumulationTarget::Qualified(qualifier),
        None => AccumulationTarget::Implicit,
    };
    let CollectionRef::Variable(var) = accumulation.target else {
        return (Terminal::AddAllToExisting(append), None);
    };
    if tree.var(var).kind != VarKind::Local {
        return (Terminal::AddAllToExisting(append), None);
    }

    let fold = tree.prev_sibling(loop_stmt).and_then(|prev| match tree.kind(prev) {
        NodeKind::Stmt(StmtKind::Local(local)) if local.var == var => {
            let init = local.init?;
            let new = tree.expr(init)?.as_new()?;
            new.args.is_empty().then(|| (prev, init, new.class.name.clone()))
        }
        _ => None,
    });
    match fold {
        Some((declaration, initializer, class)) => {
            let terminal = match class.as_str() {
                "ArrayList" => Terminal::CollectToList,
                "HashSet" => Terminal::CollectToSet,
                _ => Terminal::CollectToCustom {
                    supplier: initializer,
                },
            };
            (
                terminal,
                Some(FoldSite {
                    declaration,
                    initializer,
                }),
            )
        }
        None => (Terminal::AddAllToExisting(append), None),
    }
}
