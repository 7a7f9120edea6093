//! The expression subset the constant evaluator (`headc_const`) operates
//! over. headc never analyzes statements or non-constant expressions; method
//! bodies are discarded entirely during lowering, so this subset only needs
//! to cover what can appear in a `final` field initializer, an annotation
//! argument, or an annotation element's default value.

use crate::ty::TypeRefNode;
use headc_core::Span;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LiteralNode {
    Boolean(bool),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Null,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    LogicalNot,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    LogicalAnd,
    LogicalOr,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(LiteralNode, Span),
    /// A bare or qualified name: a field reference, an enum constant
    /// reference, or (resolved later) a package/class prefix of one.
    Name(String, Span),
    FieldAccess {
        target: Box<Expr>,
        name: String,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Ternary {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        span: Span,
    },
    /// `Foo.class`, `int[].class`, etc.
    ClassLiteral { ty: TypeRefNode, span: Span },
    Cast {
        ty: TypeRefNode,
        operand: Box<Expr>,
        span: Span,
    },
    /// `{ 1, 2, 3 }` — an array-valued constant or annotation argument.
    ArrayInit { elements: Vec<Expr>, span: Span },
    /// A nested annotation used as another annotation's element value.
    Annotation(Box<AnnotationUseNode>),
    Paren(Box<Expr>, Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, span)
            | Expr::Name(_, span)
            | Expr::FieldAccess { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Ternary { span, .. }
            | Expr::ClassLiteral { span, .. }
            | Expr::Cast { span, .. }
            | Expr::ArrayInit { span, .. }
            | Expr::Paren(_, span) => *span,
            Expr::Annotation(anno) => anno.span,
        }
    }

    /// A short, human-readable description used in `NotAConstant` diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Expr::Literal(..) => "literal".to_string(),
            Expr::Name(name, _) => name.clone(),
            Expr::FieldAccess { name, .. } => format!("field access `{name}`"),
            Expr::Unary { .. } => "unary expression".to_string(),
            Expr::Binary { .. } => "binary expression".to_string(),
            Expr::Ternary { .. } => "conditional expression".to_string(),
            Expr::ClassLiteral { .. } => "class literal".to_string(),
            Expr::Cast { .. } => "cast expression".to_string(),
            Expr::ArrayInit { .. } => "array initializer".to_string(),
            Expr::Annotation(_) => "annotation value".to_string(),
            Expr::Paren(inner, _) => inner.describe(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationUseNode {
    pub type_ref: TypeRefNode,
    /// `(None, expr)` is the single-element shorthand `@R(42)` (the `value`
    /// element); `(Some(name), expr)` is `@R(name = expr)`.
    pub args: Vec<(Option<String>, Expr)>,
    pub span: Span,
}
