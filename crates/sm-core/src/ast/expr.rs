use super::types::{TypeRef, VarId};
use super::NodeId;
use derive_more::Display;
use serde::{Deserialize, Serialize};

crate::arena_id! {
    /// Handle of a method or constructor signature known to the host's
    /// symbol tables. Calls carry it once the host has resolved them.
    pub struct MethodId("m");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    Char(char),
    Str(String),
    Null,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display("*")]
    Mul,
    #[display("/")]
    Div,
    #[display("%")]
    Rem,
    #[display("<")]
    Lt,
    #[display("<=")]
    Le,
    #[display(">")]
    Gt,
    #[display(">=")]
    Ge,
    #[display("==")]
    Eq,
    #[display("!=")]
    Ne,
    #[display("&&")]
    And,
    #[display("||")]
    Or,
    #[display("&")]
    BitAnd,
    #[display("|")]
    BitOr,
    #[display("^")]
    BitXor,
}

impl BinaryOp {
    /// Binding strength, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 3,
            BinaryOp::And => 4,
            BinaryOp::BitOr => 5,
            BinaryOp::BitXor => 6,
            BinaryOp::BitAnd => 7,
            BinaryOp::Eq | BinaryOp::Ne => 8,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 9,
            BinaryOp::Add | BinaryOp::Sub => 11,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 12,
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    #[display("!")]
    Not,
    #[display("-")]
    Neg,
    #[display("++")]
    PreInc,
    #[display("--")]
    PreDec,
    #[display("++")]
    PostInc,
    #[display("--")]
    PostDec,
}

impl UnaryOp {
    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }

    /// Increments and decrements write their operand.
    pub fn writes_operand(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprName {
    pub name: String,
    /// `None` when the host could not resolve the reference.
    pub var: Option<VarId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprField {
    pub receiver: NodeId,
    pub name: String,
    pub var: Option<VarId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprCall {
    /// `None` for an unqualified call on the implicit receiver.
    pub receiver: Option<NodeId>,
    pub method: String,
    pub args: Vec<NodeId>,
    pub target: Option<MethodId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprNew {
    pub class: TypeRef,
    pub args: Vec<NodeId>,
    pub target: Option<MethodId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprBinary {
    pub op: BinaryOp,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprUnary {
    pub op: UnaryOp,
    pub operand: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprAssign {
    /// `Some(op)` for compound assignment such as `+=`.
    pub op: Option<BinaryOp>,
    pub target: NodeId,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprLambda {
    pub params: Vec<VarId>,
    /// Render parameter types, `(String s) -> ...`.
    pub explicit_types: bool,
    /// An expression or a block statement.
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprMethodRef {
    pub qualifier: NodeId,
    /// `new` for constructor references.
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Name(ExprName),
    /// A class used as a qualifier, `Math` in `Math.abs(x)`.
    TypeName(TypeRef),
    This,
    Super,
    Field(ExprField),
    Call(ExprCall),
    New(ExprNew),
    Binary(ExprBinary),
    Unary(ExprUnary),
    Assign(ExprAssign),
    Paren(NodeId),
    Lambda(ExprLambda),
    MethodRef(ExprMethodRef),
}

impl ExprKind {
    pub fn as_call(&self) -> Option<&ExprCall> {
        match self {
            ExprKind::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_new(&self) -> Option<&ExprNew> {
        match self {
            ExprKind::New(new) => Some(new),
            _ => None,
        }
    }

    /// Calls and constructor invocations.
    pub fn is_call_like(&self) -> bool {
        matches!(self, ExprKind::Call(_) | ExprKind::New(_))
    }

    pub fn is_closure(&self) -> bool {
        matches!(self, ExprKind::Lambda(_) | ExprKind::MethodRef(_))
    }

    /// Binding strength used when deciding on parentheses.
    pub fn precedence(&self) -> u8 {
        match self {
            ExprKind::Lambda(_) => 0,
            ExprKind::Assign(_) => 1,
            ExprKind::Binary(binary) => binary.op.precedence(),
            ExprKind::Unary(unary) if unary.op.is_postfix() => 14,
            ExprKind::Unary(_) => 13,
            ExprKind::Literal(_)
            | ExprKind::New(_)
            | ExprKind::Name(_)
            | ExprKind::TypeName(_)
            | ExprKind::This
            | ExprKind::Super
            | ExprKind::Field(_)
            | ExprKind::Call(_)
            | ExprKind::Paren(_)
            | ExprKind::MethodRef(_) => 15,
        }
    }

    pub(super) fn child_slots(&self) -> Vec<NodeId> {
        match self {
            ExprKind::Field(field) => vec![field.receiver],
            ExprKind::Call(call) => call.receiver.iter().chain(call.args.iter()).copied().collect(),
            ExprKind::New(new) => new.args.clone(),
            ExprKind::Binary(binary) => vec![binary.lhs, binary.rhs],
            ExprKind::Unary(unary) => vec![unary.operand],
            ExprKind::Assign(assign) => vec![assign.target, assign.value],
            ExprKind::Paren(inner) => vec![*inner],
            ExprKind::Lambda(lambda) => vec![lambda.body],
            ExprKind::MethodRef(method_ref) => vec![method_ref.qualifier],
            ExprKind::Literal(_)
            | ExprKind::Name(_)
            | ExprKind::TypeName(_)
            | ExprKind::This
            | ExprKind::Super => Vec::new(),
        }
    }

    pub(super) fn child_slots_mut(&mut self) -> Vec<&mut NodeId> {
        match self {
            ExprKind::Field(field) => vec![&mut field.receiver],
            ExprKind::Call(call) => call.receiver.iter_mut().chain(call.args.iter_mut()).collect(),
            ExprKind::New(new) => new.args.iter_mut().collect(),
            ExprKind::Binary(binary) => vec![&mut binary.lhs, &mut binary.rhs],
            ExprKind::Unary(unary) => vec![&mut unary.operand],
            ExprKind::Assign(assign) => vec![&mut assign.target, &mut assign.value],
            ExprKind::Paren(inner) => vec![inner],
            ExprKind::Lambda(lambda) => vec![&mut lambda.body],
            ExprKind::MethodRef(method_ref) => vec![&mut method_ref.qualifier],
            ExprKind::Literal(_)
            | ExprKind::Name(_)
            | ExprKind::TypeName(_)
            | ExprKind::This
            | ExprKind::Super => Vec::new(),
        }
    }
}
