//! Renders trees back to Java-like source.
//!
//! Parentheses come from operator precedence rather than from the original
//! text, so nodes assembled by a rewrite print correctly without extra care.

use crate::ast::*;
use crate::pretty::{escape_char, escape_string, PrettyCtx, PrettyOptions};
use itertools::Itertools;

pub struct SourcePrinter<'t> {
    tree: &'t Tree,
    options: PrettyOptions,
}

impl<'t> SourcePrinter<'t> {
    pub fn new(tree: &'t Tree) -> Self {
        Self {
            tree,
            options: PrettyOptions::default(),
        }
    }

    /// Single-line output, handy for assertions and diagnostics.
    pub fn compact(tree: &'t Tree) -> Self {
        Self {
            tree,
            options: PrettyOptions::compact(),
        }
    }

    pub fn with_options(tree: &'t Tree, options: PrettyOptions) -> Self {
        Self { tree, options }
    }

    pub fn render(&self, id: NodeId) -> String {
        let mut ctx = PrettyCtx::new(&self.options);
        self.node(id, &mut ctx);
        ctx.finish()
    }

    fn node(&self, id: NodeId, ctx: &mut PrettyCtx<'_>) {
        match self.tree.kind(id) {
            NodeKind::Stmt(stmt) => self.stmt(stmt, ctx),
            NodeKind::Expr(expr) => self.expr(expr, ctx),
            NodeKind::Comment(comment) => ctx.write(&comment.text),
        }
        if self.options.show_ids {
            ctx.write(format!(" /*{}*/", id));
        }
    }

    fn stmt(&self, stmt: &StmtKind, ctx: &mut PrettyCtx<'_>) {
        match stmt {
            StmtKind::Block(block) => self.block(&block.stmts, ctx),
            StmtKind::Expr(expr) => {
                self.node(*expr, ctx);
                ctx.write(";");
            }
            StmtKind::Local(local) => {
                let decl = self.tree.var(local.var);
                if decl.is_final {
                    ctx.write("final ");
                }
                ctx.write(format!("{} {}", decl.ty, decl.name));
                if let Some(init) = local.init {
                    ctx.write(" = ");
                    self.node(init, ctx);
                }
                ctx.write(";");
            }
            StmtKind::If(stmt_if) => {
                ctx.write("if (");
                self.opt(stmt_if.cond, ctx);
                ctx.write(") ");
                self.opt(stmt_if.then_branch, ctx);
                if let Some(else_branch) = stmt_if.else_branch {
                    ctx.write(" else ");
                    self.node(else_branch, ctx);
                }
            }
            StmtKind::ForEach(for_each) => {
                let decl = self.tree.var(for_each.var);
                ctx.write(format!("for ({} {} : ", decl.ty, decl.name));
                self.opt(for_each.iterated, ctx);
                ctx.write(") ");
                self.opt(for_each.body, ctx);
            }
            StmtKind::While(stmt_while) => {
                ctx.write("while (");
                self.node(stmt_while.cond, ctx);
                ctx.write(") ");
                self.node(stmt_while.body, ctx);
            }
            StmtKind::Labeled(labeled) => {
                ctx.write(format!("{}: ", labeled.label));
                self.node(labeled.body, ctx);
            }
            StmtKind::Break(label) => self.jump("break", label.as_deref(), ctx),
            StmtKind::Continue(label) => self.jump("continue", label.as_deref(), ctx),
            StmtKind::Return(value) => {
                ctx.write("return");
                if let Some(value) = value {
                    ctx.write(" ");
                    self.node(*value, ctx);
                }
                ctx.write(";");
            }
            StmtKind::Throw(value) => {
                ctx.write("throw ");
                self.node(*value, ctx);
                ctx.write(";");
            }
            StmtKind::Try(stmt_try) => {
                ctx.write("try ");
                self.node(stmt_try.body, ctx);
                for catch in &stmt_try.catches {
                    let decl = self.tree.var(catch.var);
                    ctx.write(format!(
                        " catch ({} {}) ",
                        catch.types.iter().join(" | "),
                        decl.name
                    ));
                    self.node(catch.body, ctx);
                }
            }
            StmtKind::Empty => ctx.write(";"),
        }
    }

    fn jump(&self, keyword: &str, label: Option<&str>, ctx: &mut PrettyCtx<'_>) {
        ctx.write(keyword);
        if let Some(label) = label {
            ctx.write(format!(" {}", label));
        }
        ctx.write(";");
    }

    fn block(&self, stmts: &[NodeId], ctx: &mut PrettyCtx<'_>) {
        if stmts.is_empty() {
            ctx.write("{}");
            return;
        }
        ctx.write("{");
        ctx.with_indent(|ctx| {
            for stmt in stmts {
                ctx.newline();
                self.node(*stmt, ctx);
            }
        });
        ctx.newline();
        ctx.write("}");
    }

    fn opt(&self, id: Option<NodeId>, ctx: &mut PrettyCtx<'_>) {
        match id {
            Some(id) => self.node(id, ctx),
            None => ctx.write("/*missing*/"),
        }
    }

    fn expr(&self, expr: &ExprKind, ctx: &mut PrettyCtx<'_>) {
        match expr {
            ExprKind::Literal(literal) => ctx.write(render_literal(literal)),
            ExprKind::Name(name) => ctx.write(&name.name),
            ExprKind::TypeName(ty) => ctx.write(ty.to_string()),
            ExprKind::This => ctx.write("this"),
            ExprKind::Super => ctx.write("super"),
            ExprKind::Field(field) => {
                self.operand(field.receiver, 15, ctx);
                ctx.write(format!(".{}", field.name));
            }
            ExprKind::Call(call) => {
                if let Some(receiver) = call.receiver {
                    self.operand(receiver, 15, ctx);
                    ctx.write(".");
                }
                ctx.write(&call.method);
                self.args(&call.args, ctx);
            }
            ExprKind::New(new) => {
                ctx.write(format!("new {}", new.class));
                self.args(&new.args, ctx);
            }
            ExprKind::Binary(binary) => {
                let prec = binary.op.precedence();
                self.operand(binary.lhs, prec, ctx);
                ctx.write(format!(" {} ", binary.op));
                self.operand(binary.rhs, prec + 1, ctx);
            }
            ExprKind::Unary(unary) => {
                if unary.op.is_postfix() {
                    self.operand(unary.operand, 14, ctx);
                    ctx.write(unary.op.to_string());
                } else {
                    ctx.write(unary.op.to_string());
                    self.operand(unary.operand, 13, ctx);
                }
            }
            ExprKind::Assign(assign) => {
                self.operand(assign.target, 2, ctx);
                match assign.op {
                    Some(op) => ctx.write(format!(" {}= ", op)),
                    None => ctx.write(" = "),
                }
                self.operand(assign.value, 1, ctx);
            }
            ExprKind::Paren(inner) => {
                ctx.write("(");
                self.node(*inner, ctx);
                ctx.write(")");
            }
            ExprKind::Lambda(lambda) => {
                match (lambda.params.as_slice(), lambda.explicit_types) {
                    ([single], false) => ctx.write(&self.tree.var(*single).name),
                    (params, explicit) => {
                        let rendered = params
                            .iter()
                            .map(|param| {
                                let decl = self.tree.var(*param);
                                if explicit {
                                    format!("{} {}", decl.ty, decl.name)
                                } else {
                                    decl.name.clone()
                                }
                            })
                            .join(", ");
                        ctx.write(format!("({})", rendered));
                    }
                }
                ctx.write(" -> ");
                self.node(lambda.body, ctx);
            }
            ExprKind::MethodRef(method_ref) => {
                self.operand(method_ref.qualifier, 15, ctx);
                ctx.write(format!("::{}", method_ref.method));
            }
        }
    }

    fn args(&self, args: &[NodeId], ctx: &mut PrettyCtx<'_>) {
        ctx.write("(");
        for (idx, arg) in args.iter().enumerate() {
            if idx > 0 {
                ctx.write(", ");
            }
            self.node(*arg, ctx);
        }
        ctx.write(")");
    }

    /// Render `id`, parenthesised when it binds looser than `min_prec`.
    fn operand(&self, id: NodeId, min_prec: u8, ctx: &mut PrettyCtx<'_>) {
        let needs_parens = self
            .tree
            .expr(id)
            .is_some_and(|expr| expr.precedence() < min_prec);
        if needs_parens {
            ctx.write("(");
            self.node(id, ctx);
            ctx.write(")");
        } else {
            self.node(id, ctx);
        }
    }
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Int(value) => value.to_string(),
        Literal::Bool(value) => value.to_string(),
        Literal::Char(ch) => format!("'{}'", escape_char(*ch)),
        Literal::Str(value) => format!("\"{}\"", escape_string(value)),
        Literal::Null => "null".to_string(),
    }
}

impl Tree {
    /// Compact single-line source of `id`.
    pub fn text(&self, id: NodeId) -> String {
        SourcePrinter::compact(self).render(id)
    }
}
