use super::*;
use crate::span::Span;

/// Builds a [`Tree`] bottom-up. Hosts translate their own syntax trees with
/// it; tests use it to write fixtures.
pub struct TreeBuilder {
    nodes: Vec<Node>,
    vars: Vec<VarDecl>,
    context: ScopeContext,
}

impl TreeBuilder {
    pub fn new(context: ScopeContext) -> Self {
        Self {
            nodes: Vec::new(),
            vars: Vec::new(),
            context,
        }
    }

    pub fn context(&self) -> &ScopeContext {
        &self.context
    }

    pub fn declare(&mut self, name: &str, ty: TypeRef, kind: VarKind) -> VarId {
        let id = VarId(self.vars.len() as u32);
        self.vars.push(VarDecl::new(name, ty, kind));
        id
    }

    pub fn declare_final(&mut self, name: &str, ty: TypeRef, kind: VarKind) -> VarId {
        let id = self.declare(name, ty, kind);
        self.vars[id.index()].is_final = true;
        id
    }

    pub fn var(&self, id: VarId) -> &VarDecl {
        &self.vars[id.index()]
    }

    pub fn node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let offset = id.0 * 8;
        self.nodes.push(Node {
            kind,
            parent: None,
            span: Span::new(0, offset, offset + 8),
        });
        id
    }

    pub fn expr(&mut self, kind: ExprKind) -> NodeId {
        self.node(NodeKind::Expr(kind))
    }

    pub fn stmt(&mut self, kind: StmtKind) -> NodeId {
        self.node(NodeKind::Stmt(kind))
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.expr(ExprKind::Literal(Literal::Int(value)))
    }

    pub fn bool(&mut self, value: bool) -> NodeId {
        self.expr(ExprKind::Literal(Literal::Bool(value)))
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        self.expr(ExprKind::Literal(Literal::Str(value.to_string())))
    }

    pub fn null(&mut self) -> NodeId {
        self.expr(ExprKind::Literal(Literal::Null))
    }

    /// A resolved reference to `var`.
    pub fn name(&mut self, var: VarId) -> NodeId {
        let name = self.vars[var.index()].name.clone();
        self.expr(ExprKind::Name(ExprName {
            name,
            var: Some(var),
        }))
    }

    pub fn unresolved_name(&mut self, name: &str) -> NodeId {
        self.expr(ExprKind::Name(ExprName {
            name: name.to_string(),
            var: None,
        }))
    }

    pub fn type_name(&mut self, ty: TypeRef) -> NodeId {
        self.expr(ExprKind::TypeName(ty))
    }

    pub fn this(&mut self) -> NodeId {
        self.expr(ExprKind::This)
    }

    pub fn super_(&mut self) -> NodeId {
        self.expr(ExprKind::Super)
    }

    pub fn field(&mut self, receiver: NodeId, var: VarId) -> NodeId {
        let name = self.vars[var.index()].name.clone();
        self.expr(ExprKind::Field(ExprField {
            receiver,
            name,
            var: Some(var),
        }))
    }

    pub fn call(
        &mut self,
        receiver: Option<NodeId>,
        method: &str,
        args: Vec<NodeId>,
        target: Option<MethodId>,
    ) -> NodeId {
        self.expr(ExprKind::Call(ExprCall {
            receiver,
            method: method.to_string(),
            args,
            target,
        }))
    }

    pub fn new_object(&mut self, class: TypeRef, args: Vec<NodeId>, target: Option<MethodId>) -> NodeId {
        self.expr(ExprKind::New(ExprNew {
            class,
            args,
            target,
        }))
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.expr(ExprKind::Binary(ExprBinary { op, lhs, rhs }))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.expr(ExprKind::Unary(ExprUnary { op, operand }))
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.expr(ExprKind::Assign(ExprAssign {
            op: None,
            target,
            value,
        }))
    }

    pub fn compound_assign(&mut self, op: BinaryOp, target: NodeId, value: NodeId) -> NodeId {
        self.expr(ExprKind::Assign(ExprAssign {
            op: Some(op),
            target,
            value,
        }))
    }

    pub fn paren(&mut self, inner: NodeId) -> NodeId {
        self.expr(ExprKind::Paren(inner))
    }

    pub fn lambda(&mut self, params: Vec<VarId>, body: NodeId) -> NodeId {
        self.expr(ExprKind::Lambda(ExprLambda {
            params,
            explicit_types: false,
            body,
        }))
    }

    pub fn method_ref(&mut self, qualifier: NodeId, method: &str) -> NodeId {
        self.expr(ExprKind::MethodRef(ExprMethodRef {
            qualifier,
            method: method.to_string(),
        }))
    }

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.stmt(StmtKind::Block(StmtBlock { stmts }))
    }

    pub fn local(&mut self, var: VarId, init: Option<NodeId>) -> NodeId {
        self.stmt(StmtKind::Local(StmtLocal { var, init }))
    }

    pub fn if_then(&mut self, cond: NodeId, then_branch: NodeId) -> NodeId {
        self.stmt(StmtKind::If(StmtIf {
            cond: Some(cond),
            then_branch: Some(then_branch),
            else_branch: None,
        }))
    }

    pub fn if_else(&mut self, cond: NodeId, then_branch: NodeId, else_branch: NodeId) -> NodeId {
        self.stmt(StmtKind::If(StmtIf {
            cond: Some(cond),
            then_branch: Some(then_branch),
            else_branch: Some(else_branch),
        }))
    }

    pub fn for_each(&mut self, var: VarId, iterated: NodeId, body: NodeId) -> NodeId {
        self.stmt(StmtKind::ForEach(StmtForEach {
            var,
            iterated: Some(iterated),
            body: Some(body),
        }))
    }

    pub fn while_loop(&mut self, cond: NodeId, body: NodeId) -> NodeId {
        self.stmt(StmtKind::While(StmtWhile { cond, body }))
    }

    pub fn labeled(&mut self, label: &str, body: NodeId) -> NodeId {
        self.stmt(StmtKind::Labeled(StmtLabeled {
            label: label.to_string(),
            body,
        }))
    }

    pub fn break_(&mut self, label: Option<&str>) -> NodeId {
        self.stmt(StmtKind::Break(label.map(str::to_string)))
    }

    pub fn continue_(&mut self, label: Option<&str>) -> NodeId {
        self.stmt(StmtKind::Continue(label.map(str::to_string)))
    }

    pub fn return_(&mut self, value: Option<NodeId>) -> NodeId {
        self.stmt(StmtKind::Return(value))
    }

    pub fn throw(&mut self, value: NodeId) -> NodeId {
        self.stmt(StmtKind::Throw(value))
    }

    pub fn try_catch(&mut self, body: NodeId, catches: Vec<CatchClause>) -> NodeId {
        self.stmt(StmtKind::Try(StmtTry { body, catches }))
    }

    pub fn empty(&mut self) -> NodeId {
        self.stmt(StmtKind::Empty)
    }

    pub fn comment(&mut self, text: &str) -> NodeId {
        self.node(NodeKind::Comment(Comment {
            text: text.to_string(),
        }))
    }

    pub fn finish(self, root: NodeId) -> Tree {
        Tree::from_parts(self.nodes, self.vars, root, self.context)
    }
}
