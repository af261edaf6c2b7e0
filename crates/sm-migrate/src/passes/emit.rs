// Emission - lower a RewritePlan into tree edits and commit them

use crate::ir::*;
use crate::options::{CollectorStyle, MigrationOptions};
use crate::utils::RewriteOutcome;
use crate::{synth_bail, synth_ensure};
use sm_core::ast::*;
use sm_core::error::Result;
use sm_core::semantics::Host;
use sm_core::span::Span;

/// Stages new syntax for one plan. Node ids handed out are only valid in
/// the tree once the edit is committed.
struct Lowering<'a> {
    tree: &'a Tree,
    edit: TreeEdit,
    span: Span,
    options: &'a MigrationOptions,
}

impl<'a> Lowering<'a> {
    fn new(tree: &'a Tree, span: Span, options: &'a MigrationOptions) -> Self {
        Self {
            tree,
            edit: TreeEdit::new(tree),
            span,
            options,
        }
    }

    fn expr(&mut self, kind: ExprKind) -> NodeId {
        self.edit.add(NodeKind::Expr(kind), self.span)
    }

    fn stmt(&mut self, kind: StmtKind) -> NodeId {
        self.edit.add(NodeKind::Stmt(kind), self.span)
    }

    fn call(&mut self, receiver: Option<NodeId>, method: &str, args: Vec<NodeId>) -> NodeId {
        self.expr(ExprKind::Call(ExprCall {
            receiver,
            method: method.to_string(),
            args,
            target: None,
        }))
    }

    fn collector(&mut self, factory: &str, args: Vec<NodeId>) -> NodeId {
        let receiver = match self.options.collector_style {
            CollectorStyle::Qualified => {
                Some(self.expr(ExprKind::TypeName(TypeRef::simple("Collectors"))))
            }
            CollectorStyle::StaticImport => None,
        };
        self.call(receiver, factory, args)
    }

    /// The iterated expression, parenthesised unless it already reads as a
    /// single operand.
    fn source(&mut self, source: NodeId) -> NodeId {
        let operand = matches!(
            self.tree.expr(source),
            Some(
                ExprKind::Call(_)
                    | ExprKind::New(_)
                    | ExprKind::Name(_)
                    | ExprKind::Field(_)
                    | ExprKind::This
                    | ExprKind::Super
                    | ExprKind::Paren(_)
            )
        );
        if operand {
            source
        } else {
            self.expr(ExprKind::Paren(source))
        }
    }

    fn function(&mut self, arg: &FunctionalArg) -> NodeId {
        match arg {
            FunctionalArg::MethodRef { qualifier, method } => {
                let qualifier = match qualifier {
                    MethodRefQualifier::Type(ty) => self.expr(ExprKind::TypeName(ty.clone())),
                    MethodRefQualifier::This => self.expr(ExprKind::This),
                    MethodRefQualifier::Super => self.expr(ExprKind::Super),
                    MethodRefQualifier::Expr(expr) => *expr,
                };
                self.expr(ExprKind::MethodRef(ExprMethodRef {
                    qualifier,
                    method: method.clone(),
                }))
            }
            FunctionalArg::Lambda { param, body } => {
                let body = match body {
                    LambdaBody::Expr(expr) => *expr,
                    LambdaBody::Block(block) => *block,
                    LambdaBody::Wrapped(stmt) => self.stmt(StmtKind::Block(StmtBlock { stmts: vec![*stmt] })),
                };
                self.expr(ExprKind::Lambda(ExprLambda {
                    params: vec![*param],
                    explicit_types: false,
                    body,
                }))
            }
        }
    }

    /// `source[.stream()][.filter(..)]*[.map(..)]`
    fn stages(&mut self, plan: &RewritePlan) -> NodeId {
        let mut chain = self.source(plan.source);
        if plan.needs_stream() {
            chain = self.call(Some(chain), "stream", vec![]);
        }
        for filter in &plan.filters {
            let predicate = self.function(filter);
            chain = self.call(Some(chain), "filter", vec![predicate]);
        }
        if let Some(mapper) = &plan.mapper {
            let function = self.function(mapper);
            chain = self.call(Some(chain), "map", vec![function]);
        }
        chain
    }

    fn collect(&mut self, chain: NodeId, factory: &str, args: Vec<NodeId>) -> NodeId {
        let collector = self.collector(factory, args);
        self.call(Some(chain), "collect", vec![collector])
    }

    /// Put `replacement` where the loop is, with orphaned comments in front.
    fn replace_loop(&mut self, plan: &RewritePlan, replacement: NodeId) -> NodeId {
        let in_block = self
            .tree
            .parent(plan.loop_stmt)
            .and_then(|parent| self.tree.stmt(parent))
            .is_some_and(|stmt| stmt.as_block().is_some());
        if in_block || plan.orphaned_comments.is_empty() {
            for comment in &plan.orphaned_comments {
                self.edit.insert_before(plan.loop_stmt, *comment);
            }
            self.edit.replace(plan.loop_stmt, replacement);
            replacement
        } else {
            let mut stmts = plan.orphaned_comments.clone();
            stmts.push(replacement);
            let block = self.stmt(StmtKind::Block(StmtBlock { stmts }));
            self.edit.replace(plan.loop_stmt, block);
            block
        }
    }
}

/// Lower `plan`, commit it, and re-emit the terminal function with an
/// explicit parameter type when the host cannot infer its target type.
pub fn emit(
    host: &dyn Host,
    tree: &mut Tree,
    plan: &RewritePlan,
    options: &MigrationOptions,
) -> Result<RewriteOutcome> {
    synth_ensure!(
        matches!(tree.stmt(plan.loop_stmt), Some(StmtKind::ForEach(_))),
        "rewrite plan does not point at a foreach loop",
        tree.span(plan.loop_stmt)
    );

    let span = tree.span(plan.loop_stmt);
    let mut lowering = Lowering::new(tree, span, options);
    let chain = lowering.stages(plan);

    let mut terminal_call = None;
    let (replacement, folded) = match (&plan.terminal, &plan.fold) {
        (Terminal::ForEach(function), None) => {
            let function = lowering.function(function);
            let call = lowering.call(Some(chain), "forEach", vec![function]);
            terminal_call = Some(call);
            let stmt = lowering.stmt(StmtKind::Expr(call));
            (lowering.replace_loop(plan, stmt), false)
        }
        (Terminal::AddAllToExisting(target), None) => {
            let collected = lowering.collect(chain, "toList", vec![]);
            let receiver = match target {
                AccumulationTarget::Qualified(qualifier) => Some(*qualifier),
                AccumulationTarget::Implicit => None,
            };
            let add_all = lowering.call(receiver, "addAll", vec![collected]);
            let stmt = lowering.stmt(StmtKind::Expr(add_all));
            (lowering.replace_loop(plan, stmt), false)
        }
        (terminal, Some(fold)) => {
            let collected = match terminal {
                Terminal::CollectToList => lowering.collect(chain, "toList", vec![]),
                Terminal::CollectToSet => lowering.collect(chain, "toSet", vec![]),
                Terminal::CollectToCustom { supplier } => {
                    let supplier = lowering.expr(ExprKind::Lambda(ExprLambda {
                        params: vec![],
                        explicit_types: false,
                        body: *supplier,
                    }));
                    lowering.collect(chain, "toCollection", vec![supplier])
                }
                _ => synth_bail!("only collecting terminals fold into a declaration", span),
            };
            for comment in &plan.orphaned_comments {
                lowering.edit.insert_before(fold.declaration, *comment);
            }
            lowering.edit.replace(fold.initializer, collected);
            lowering.edit.remove(plan.loop_stmt);
            (fold.declaration, true)
        }
        (terminal, None) => {
            synth_bail!(format!("{:?} needs a declaration to fold into", terminal), span)
        }
    };

    let edit = lowering.edit;
    tree.commit(edit)?;
    tracing::debug!(
        "replaced {} with `{}`",
        plan.loop_stmt,
        tree.text(replacement)
    );

    let explicit_lambda = match terminal_call {
        Some(call) => disambiguate(host, tree, call, plan)?,
        None => false,
    };
    host.reformat(tree, replacement);

    Ok(RewriteOutcome {
        replacement,
        folded,
        explicit_lambda,
        revision: tree.revision(),
    })
}

/// Replace the function passed to `call` by `(Type x) -> { action }` when
/// its target type cannot be inferred.
fn disambiguate(host: &dyn Host, tree: &mut Tree, call: NodeId, plan: &RewritePlan) -> Result<bool> {
    if host.is_lambda_target_inferable(tree, call, 0) {
        return Ok(false);
    }
    let Some(function) = tree
        .expr(call)
        .and_then(ExprKind::as_call)
        .and_then(|call| call.args.first().copied())
    else {
        synth_bail!("terminal call lost its argument", tree.span(call));
    };
    if !tree.expr(function).is_some_and(ExprKind::is_closure) {
        return Ok(false);
    }
    tracing::debug!("target type of {} is ambiguous, using an explicit parameter", function);

    let span = tree.span(function);
    let mut edit = TreeEdit::new(tree);
    let body = match tree.stmt(plan.action) {
        Some(StmtKind::Block(_)) => plan.action,
        _ => edit.add(
            NodeKind::Stmt(StmtKind::Block(StmtBlock {
                stmts: vec![plan.action],
            })),
            span,
        ),
    };
    let explicit = edit.add(
        NodeKind::Expr(ExprKind::Lambda(ExprLambda {
            params: vec![plan.param],
            explicit_types: true,
            body,
        })),
        span,
    );
    edit.replace(function, explicit);
    tree.commit(edit)?;
    Ok(true)
}
