// Method-reference reduction - `x -> foo(x)` to `Owner::foo`

use crate::ir::{FunctionalArg, MethodRefQualifier};
use sm_core::ast::{ExprKind, NodeId, StmtKind, Tree, TypeRef, VarId};
use sm_core::semantics::Host;

/// The expression of an expression statement, the usual shape of an action
/// that might reduce.
pub fn action_expression(tree: &Tree, action: NodeId) -> Option<NodeId> {
    match tree.stmt(action)? {
        StmtKind::Expr(expr) => Some(*expr),
        _ => None,
    }
}

/// Reduce `param -> expr` to a method reference when `expr` only forwards
/// `param` to a resolved method or constructor.
///
/// Recognised forms:
/// - `foo(x)`: `Owner::foo` when static, `this::foo` in an instance scope
/// - `this.foo(x)`, `super.foo(x)`, `Type.foo(x)`
/// - `obj.foo(x)` with `obj` an effectively final variable or a field of
///   `this`
/// - `x.foo()`: `ParamType::foo`
/// - `new T(x)`: `T::new`
pub fn reduce_to_method_ref(
    host: &dyn Host,
    tree: &Tree,
    expr: NodeId,
    param: VarId,
) -> Option<FunctionalArg> {
    let expr = tree.skip_parens(expr);
    let sig = host.resolve_method(tree, expr)?;
    match tree.expr(expr)? {
        ExprKind::Call(call) => {
            let qualifier = match (call.args.as_slice(), call.receiver) {
                ([arg], None) if is_param(tree, *arg, param) => {
                    if sig.is_static {
                        MethodRefQualifier::Type(TypeRef::simple(sig.owner.clone()))
                    } else if !tree.context().is_static {
                        MethodRefQualifier::This
                    } else {
                        return None;
                    }
                }
                ([arg], Some(receiver)) if is_param(tree, *arg, param) => {
                    bound_qualifier(host, tree, receiver, param, sig.is_static)?
                }
                ([], Some(receiver)) if is_param(tree, receiver, param) && !sig.is_static => {
                    MethodRefQualifier::Type(tree.var(param).ty.raw())
                }
                _ => return None,
            };
            Some(FunctionalArg::MethodRef {
                qualifier,
                method: call.method.clone(),
            })
        }
        ExprKind::New(new) => match new.args.as_slice() {
            [arg] if is_param(tree, *arg, param) => Some(FunctionalArg::MethodRef {
                qualifier: MethodRefQualifier::Type(new.class.raw()),
                method: "new".to_string(),
            }),
            _ => None,
        },
        _ => None,
    }
}

fn is_param(tree: &Tree, expr: NodeId, param: VarId) -> bool {
    match tree.expr(tree.skip_parens(expr)) {
        Some(ExprKind::Name(name)) => name.var == Some(param),
        _ => false,
    }
}

/// Qualifier for `receiver.foo(x)`, if evaluating `receiver` once up front
/// gives the same result as evaluating it per element.
fn bound_qualifier(
    host: &dyn Host,
    tree: &Tree,
    receiver: NodeId,
    param: VarId,
    is_static: bool,
) -> Option<MethodRefQualifier> {
    let stable = |var: VarId| {
        var != param && host.is_effectively_final(tree, var, receiver).unwrap_or(false)
    };
    match tree.expr(receiver)? {
        ExprKind::TypeName(ty) if is_static => Some(MethodRefQualifier::Type(ty.clone())),
        _ if is_static => None,
        ExprKind::This => Some(MethodRefQualifier::This),
        ExprKind::Super => Some(MethodRefQualifier::Super),
        ExprKind::Name(name) => name
            .var
            .filter(|var| stable(*var))
            .map(|_| MethodRefQualifier::Expr(receiver)),
        ExprKind::Field(field) => {
            let on_this = matches!(tree.expr(field.receiver), Some(ExprKind::This));
            field
                .var
                .filter(|var| on_this && stable(*var))
                .map(|_| MethodRefQualifier::Expr(receiver))
        }
        _ => None,
    }
}
